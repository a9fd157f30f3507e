use std::fs;

use async_trait::async_trait;
use notes_core::{DownloadId, RuntimeMessage};
use notes_engine::{
    DirectoryDownloads, DownloadFacility, DownloadFailure, DownloadRequest, SaveFileRelay,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn save_file(filename: &str, content: &str) -> RuntimeMessage {
    RuntimeMessage::SaveFile {
        content: content.into(),
        mime_type: "text/plain".into(),
        filename: filename.into(),
        request_id: "qa-1".into(),
    }
}

#[tokio::test]
async fn saves_into_directory_and_reports_ids() {
    let temp = TempDir::new().unwrap();
    let relay = SaveFileRelay::new(DirectoryDownloads::new(temp.path().to_path_buf()));

    let first = relay.handle(&save_file("chat.txt", "Q | A")).await;
    assert_eq!(
        first,
        Some(RuntimeMessage::DownloadReady {
            request_id: "qa-1".into(),
            filename: "chat.txt".into(),
            download_id: 1,
        })
    );
    let second = relay.handle(&save_file("chat.txt", "Q2 | A2")).await;
    assert!(matches!(
        second,
        Some(RuntimeMessage::DownloadReady { download_id: 2, .. })
    ));

    let downloads = relay.facility();
    assert_eq!(fs::read_to_string(downloads.path_for(1).unwrap()).unwrap(), "Q | A");
    let renamed = downloads.path_for(2).unwrap();
    assert_eq!(renamed.file_name().unwrap(), "chat (1).txt");
    assert_eq!(fs::read_to_string(renamed).unwrap(), "Q2 | A2");
    assert_eq!(downloads.path_for(3), None);
}

#[tokio::test]
async fn bad_filenames_become_download_errors() {
    let temp = TempDir::new().unwrap();
    let relay = SaveFileRelay::new(DirectoryDownloads::new(temp.path().to_path_buf()));

    let outcome = relay.handle(&save_file("../escape.txt", "x")).await;
    let Some(RuntimeMessage::DownloadError {
        request_id,
        filename,
        error,
    }) = outcome
    else {
        panic!("expected download_error, got {outcome:?}");
    };
    assert_eq!(request_id, "qa-1");
    assert_eq!(filename, "../escape.txt");
    assert!(error.contains("invalid filename"));
}

struct Refusing(&'static str);

#[async_trait]
impl DownloadFacility for Refusing {
    async fn download(&self, _request: DownloadRequest) -> Result<DownloadId, DownloadFailure> {
        Err(DownloadFailure::Rejected(self.0.to_string()))
    }
}

#[tokio::test]
async fn facility_messages_are_passed_through_or_defaulted() {
    let relay = SaveFileRelay::new(Refusing("Download canceled by user"));
    let outcome = relay.handle(&save_file("a.txt", "x")).await;
    assert!(matches!(
        outcome,
        Some(RuntimeMessage::DownloadError { ref error, .. }) if error == "Download canceled by user"
    ));

    let relay = SaveFileRelay::new(Refusing(""));
    let outcome = relay.handle(&save_file("a.txt", "x")).await;
    assert!(matches!(
        outcome,
        Some(RuntimeMessage::DownloadError { ref error, .. }) if error == "Download failed"
    ));
}

#[tokio::test]
async fn other_messages_are_ignored() {
    let relay = SaveFileRelay::new(Refusing("unused"));
    let ready = RuntimeMessage::DownloadReady {
        request_id: "r".into(),
        filename: "f".into(),
        download_id: 7,
    };
    assert_eq!(relay.handle(&ready).await, None);
}
