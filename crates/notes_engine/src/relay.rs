//! Background relay: turns `save_file` messages into downloads.
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use notes_core::{DownloadId, RuntimeMessage};
use notes_logging::{notes_error, notes_info};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

const DEFAULT_MIME: &str = "text/plain";

/// `data:<mime>;charset=utf-8,<percent-encoded text>`
pub fn make_data_url(text: &str, mime_type: Option<&str>) -> String {
    let mime = mime_type.filter(|m| !m.is_empty()).unwrap_or(DEFAULT_MIME);
    format!("data:{mime};charset=utf-8,{}", urlencoding::encode(text))
}

/// Inverse of [`make_data_url`]: the MIME type and decoded text.
/// Base64 payloads are not produced here and are not accepted.
pub fn parse_data_url(url: &str) -> Option<(String, String)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mut params = header.split(';');
    let mime = params.next().filter(|m| !m.is_empty()).unwrap_or(DEFAULT_MIME);
    if params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return None;
    }
    let text = urlencoding::decode(payload).ok()?.into_owned();
    Some((mime.to_string(), text))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub filename: String,
    pub save_as: bool,
}

#[derive(Debug, Error)]
pub enum DownloadFailure {
    #[error("Download failed")]
    Unknown,
    #[error("{0}")]
    Rejected(String),
    #[error("unsupported download URL")]
    UnsupportedUrl,
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// The platform's download API.
#[async_trait]
pub trait DownloadFacility: Send + Sync {
    async fn download(&self, request: DownloadRequest) -> Result<DownloadId, DownloadFailure>;
}

pub struct SaveFileRelay<F> {
    facility: F,
}

impl<F: DownloadFacility> SaveFileRelay<F> {
    pub fn new(facility: F) -> Self {
        Self { facility }
    }

    pub fn facility(&self) -> &F {
        &self.facility
    }

    /// Handle one bus message. Only `save_file` produces an outcome.
    pub async fn handle(&self, message: &RuntimeMessage) -> Option<RuntimeMessage> {
        let RuntimeMessage::SaveFile {
            content,
            mime_type,
            filename,
            request_id,
        } = message
        else {
            return None;
        };

        let request = DownloadRequest {
            url: make_data_url(content, Some(mime_type.as_str())),
            filename: filename.clone(),
            save_as: true,
        };

        Some(match self.facility.download(request).await {
            Ok(download_id) => {
                notes_info!("Saved {filename} as download {download_id}");
                RuntimeMessage::DownloadReady {
                    request_id: request_id.clone(),
                    filename: filename.clone(),
                    download_id,
                }
            }
            Err(err) => {
                let mut error = err.to_string();
                if error.trim().is_empty() {
                    error = DownloadFailure::Unknown.to_string();
                }
                notes_error!("save_file {filename}: {error}");
                RuntimeMessage::DownloadError {
                    request_id: request_id.clone(),
                    filename: filename.clone(),
                    error,
                }
            }
        })
    }
}

#[derive(Debug, Default)]
struct Ledger {
    last_id: DownloadId,
    paths: HashMap<DownloadId, PathBuf>,
}

/// Downloads written into a local directory.
///
/// Ids start at 1. With `save_as` an existing file is never replaced; the new
/// one gets a ` (n)` suffix instead.
#[derive(Debug)]
pub struct DirectoryDownloads {
    writer: AtomicFileWriter,
    ledger: Mutex<Ledger>,
}

impl DirectoryDownloads {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn path_for(&self, id: DownloadId) -> Option<PathBuf> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .paths
            .get(&id)
            .cloned()
    }

    fn record(&self, path: PathBuf) -> DownloadId {
        let mut ledger = self
            .ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        ledger.last_id += 1;
        let id = ledger.last_id;
        ledger.paths.insert(id, path);
        id
    }
}

#[async_trait]
impl DownloadFacility for DirectoryDownloads {
    async fn download(&self, request: DownloadRequest) -> Result<DownloadId, DownloadFailure> {
        let (_, text) = parse_data_url(&request.url).ok_or(DownloadFailure::UnsupportedUrl)?;
        let path = if request.save_as {
            self.writer.write_new(&request.filename, text.as_bytes())?
        } else {
            self.writer.write(&request.filename, text.as_bytes())?
        };
        Ok(self.record(path))
    }
}
