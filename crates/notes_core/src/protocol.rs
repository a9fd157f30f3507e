//! Messages exchanged between the popup, the page agent and the background relay.
//!
//! The JSON encoding is the extension messaging shape: camelCase fields,
//! `action` / `type` / `status` tags with snake_case values.
use serde::{Deserialize, Serialize};

/// Caller-generated token correlating an action with its completion event.
pub type RequestId = String;

/// Identifier handed out by the download facility.
pub type DownloadId = u64;

/// Popup → page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageRequest {
    CollectNotes,
    GenerateQa,
    BulkQuestions { questions: Vec<String> },
}

/// Page → popup, in reply to a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enqueued: Option<usize>,
}

impl PageResponse {
    /// A file was handed to the background relay under `request_id`.
    pub fn saving(filename: impl Into<String>, request_id: impl Into<RequestId>) -> Self {
        Self {
            success: true,
            filename: Some(filename.into()),
            request_id: Some(request_id.into()),
            ..Self::default()
        }
    }

    pub fn enqueued(count: usize) -> Self {
        Self {
            success: true,
            enqueued: Some(count),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Broadcast messages on the extension runtime bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RuntimeMessage {
    SaveFile {
        content: String,
        mime_type: String,
        filename: String,
        request_id: RequestId,
    },
    DownloadReady {
        request_id: RequestId,
        filename: String,
        download_id: DownloadId,
    },
    DownloadError {
        request_id: RequestId,
        filename: String,
        error: String,
    },
    BulkStatus(BulkStatus),
}

/// Progress stream of the bulk question driver.
///
/// `index` is 1-based. `total` counts processed, in-flight and pending
/// questions at the moment the event is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum BulkStatus {
    Queued {
        total: usize,
        pending: usize,
        processed: usize,
        added: usize,
    },
    QueuedMore {
        total: usize,
        pending: usize,
        processed: usize,
        added: usize,
    },
    Started {
        total: usize,
        pending: usize,
        processed: usize,
    },
    Asking {
        index: usize,
        total: usize,
        pending: usize,
        question: String,
    },
    WaitingReply {
        index: usize,
        total: usize,
        pending: usize,
        elapsed_ms: u64,
        timeout_ms: u64,
    },
    Answered {
        index: usize,
        total: usize,
        pending: usize,
    },
    Delay {
        index: usize,
        total: usize,
        pending: usize,
        remaining_ms: u64,
    },
    Complete {
        processed: usize,
    },
    Error {
        error: String,
    },
}

impl BulkStatus {
    /// `complete` and `error` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BulkStatus::Complete { .. } | BulkStatus::Error { .. })
    }
}
