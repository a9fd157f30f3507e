use crate::{
    bulk_status_text, is_supported_tab, Effect, Msg, PageAction, PageRequest, PageResponse,
    PopupState, RuntimeMessage, StatusLine, TabInfo,
};

/// Error fragment reported when a tab has no page agent listening.
pub const CONNECTION_LOST: &str = "Could not establish connection";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PopupState, msg: Msg) -> (PopupState, Vec<Effect>) {
    let effects = match msg {
        Msg::CollectNotesClicked(tab) => dispatch(
            &mut state,
            tab,
            PageAction::CollectNotes,
            PageRequest::CollectNotes,
        ),
        Msg::GenerateQaClicked(tab) => {
            dispatch(&mut state, tab, PageAction::GenerateQa, PageRequest::GenerateQa)
        }
        Msg::BulkToggleClicked => {
            if state.toggle_bulk_form(None) {
                vec![Effect::FocusBulkInput]
            } else {
                Vec::new()
            }
        }
        Msg::BulkCancelClicked => {
            state.toggle_bulk_form(Some(false));
            state.set_status_text("Bulk entry cancelled.");
            vec![Effect::ClearBulkInput]
        }
        Msg::BulkSubmitted { tab, text } => {
            let questions = parse_bulk_questions(&text);
            if questions.is_empty() {
                state.set_status_text("Paste at least one question.");
                Vec::new()
            } else {
                let action = PageAction::QueueQuestions {
                    requested: questions.len(),
                };
                dispatch(&mut state, tab, action, PageRequest::BulkQuestions { questions })
            }
        }
        Msg::PageResponded { action, response } => apply_response(&mut state, action, response),
        Msg::PageUnreachable {
            tab_id,
            action,
            request,
            error,
            retried,
        } => {
            if !retried && error.contains(CONNECTION_LOST) {
                vec![Effect::InjectAndRetry {
                    tab_id,
                    action,
                    request,
                }]
            } else {
                let text = if error.trim().is_empty() {
                    action.failure_text()
                } else {
                    error
                };
                state.set_status_text(text);
                Vec::new()
            }
        }
        Msg::Runtime(message) => {
            apply_runtime(&mut state, message);
            Vec::new()
        }
        Msg::DownloadLinkClicked => match state.status() {
            StatusLine::Saved { download_id, .. } => vec![Effect::OpenDownload {
                download_id: *download_id,
            }],
            _ => Vec::new(),
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// One question per non-blank line, trimmed.
pub fn parse_bulk_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn dispatch(
    state: &mut PopupState,
    tab: Option<TabInfo>,
    action: PageAction,
    request: PageRequest,
) -> Vec<Effect> {
    let Some(tab) = tab else {
        state.set_status_text("No active tab found.");
        return Vec::new();
    };
    if !is_supported_tab(&tab) {
        state.set_status_text("Open ChatGPT in the active tab first.");
        return Vec::new();
    }
    vec![Effect::SendToPage {
        tab_id: tab.id,
        action,
        request,
    }]
}

fn apply_response(state: &mut PopupState, action: PageAction, response: PageResponse) -> Vec<Effect> {
    if !response.success {
        let text = response
            .error
            .filter(|error| !error.is_empty())
            .unwrap_or_else(|| action.failure_text());
        state.set_status_text(text);
        return Vec::new();
    }

    match action {
        PageAction::CollectNotes | PageAction::GenerateQa => {
            let filename = response
                .filename
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| action.default_filename().to_string());
            match response.request_id {
                Some(request_id) => {
                    state.set_status_text(format!("Saving {filename}..."));
                    state.track_download(request_id, filename);
                }
                None => state.set_saved(filename, None),
            }
            Vec::new()
        }
        PageAction::QueueQuestions { requested } => {
            let count = response.enqueued.filter(|n| *n > 0).unwrap_or(requested);
            state.set_status_text(format!("Queued {count} question(s)."));
            state.toggle_bulk_form(Some(false));
            vec![Effect::ClearBulkInput]
        }
    }
}

fn apply_runtime(state: &mut PopupState, message: RuntimeMessage) {
    match message {
        RuntimeMessage::DownloadReady {
            request_id,
            filename,
            download_id,
        } => {
            // Events for requests this popup did not issue are ignored.
            if let Some(pending) = state.take_download(&request_id) {
                let filename = if pending.filename.is_empty() {
                    filename
                } else {
                    pending.filename
                };
                state.set_saved(filename, Some(download_id));
            }
        }
        RuntimeMessage::DownloadError {
            request_id,
            filename,
            error,
        } => {
            let filename = state
                .take_download(&request_id)
                .map(|pending| pending.filename)
                .filter(|name| !name.is_empty())
                .or_else(|| Some(filename).filter(|name| !name.is_empty()))
                .unwrap_or_else(|| "file".to_string());
            let text = format!("Failed to save {filename}. {error}");
            state.set_status_text(text.trim());
        }
        RuntimeMessage::BulkStatus(status) => state.set_status_text(bulk_status_text(&status)),
        RuntimeMessage::SaveFile { .. } => {}
    }
}
