use notes_core::{
    update, Effect, Msg, PageAction, PageResponse, PopupState, RuntimeMessage, StatusLine,
};
use pretty_assertions::assert_eq;

fn saving(state: PopupState, filename: &str, request_id: &str) -> PopupState {
    let (state, effects) = update(
        state,
        Msg::PageResponded {
            action: PageAction::CollectNotes,
            response: PageResponse::saving(filename, request_id),
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn pending_download_resolves_to_saved_link() {
    let state = saving(PopupState::new(), "chapter_notes.html", "notes-1");
    assert_eq!(state.view().status, "Saving chapter_notes.html...");
    assert_eq!(state.pending_downloads(), 1);

    let (state, _) = update(
        state,
        Msg::Runtime(RuntimeMessage::DownloadReady {
            request_id: "notes-1".to_string(),
            filename: "ignored.html".to_string(),
            download_id: 42,
        }),
    );
    assert_eq!(state.pending_downloads(), 0);
    assert_eq!(
        state.status(),
        &StatusLine::Saved {
            filename: "chapter_notes.html".to_string(),
            download_id: Some(42),
        }
    );
    let view = state.view();
    assert_eq!(view.status, "Saved chapter_notes.html");
    assert!(view.has_download_link);

    let (_state, effects) = update(state, Msg::DownloadLinkClicked);
    assert_eq!(
        effects,
        vec![Effect::OpenDownload {
            download_id: Some(42)
        }]
    );
}

#[test]
fn unknown_download_ready_is_ignored() {
    let state = saving(PopupState::new(), "chapter_notes.html", "notes-1");
    let (mut state, _) = update(
        state,
        Msg::Runtime(RuntimeMessage::DownloadReady {
            request_id: "someone-else".to_string(),
            filename: "x.txt".to_string(),
            download_id: 3,
        }),
    );
    assert!(state.consume_dirty());
    let (mut state, _) = update(
        state,
        Msg::Runtime(RuntimeMessage::DownloadReady {
            request_id: "someone-else".to_string(),
            filename: "x.txt".to_string(),
            download_id: 3,
        }),
    );
    assert!(!state.consume_dirty());
    assert_eq!(state.view().status, "Saving chapter_notes.html...");
    assert_eq!(state.pending_downloads(), 1);
}

#[test]
fn download_error_reports_and_forgets_request() {
    let state = saving(PopupState::new(), "My chat.txt", "qa-9");
    let (state, _) = update(
        state,
        Msg::Runtime(RuntimeMessage::DownloadError {
            request_id: "qa-9".to_string(),
            filename: "My chat.txt".to_string(),
            error: "Download canceled".to_string(),
        }),
    );
    assert_eq!(state.view().status, "Failed to save My chat.txt. Download canceled");
    assert_eq!(state.pending_downloads(), 0);

    let (state, _) = update(
        state,
        Msg::Runtime(RuntimeMessage::DownloadError {
            request_id: "unknown".to_string(),
            filename: String::new(),
            error: String::new(),
        }),
    );
    assert_eq!(state.view().status, "Failed to save file.");
}

#[test]
fn response_without_request_id_is_saved_immediately() {
    let (state, _) = update(
        PopupState::new(),
        Msg::PageResponded {
            action: PageAction::GenerateQa,
            response: PageResponse {
                success: true,
                ..PageResponse::default()
            },
        },
    );
    assert_eq!(state.view().status, "Saved chapter_qna.txt");
    assert_eq!(state.view().download_id, None);

    let (_state, effects) = update(state, Msg::DownloadLinkClicked);
    assert_eq!(effects, vec![Effect::OpenDownload { download_id: None }]);
}
