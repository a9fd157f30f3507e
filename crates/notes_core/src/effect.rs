use crate::{DownloadId, PageRequest, TabId};

/// Popup action awaiting a page reply; carries what the status text needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    CollectNotes,
    GenerateQa,
    QueueQuestions { requested: usize },
}

impl PageAction {
    /// Verb phrase used in "Failed to ..." messages.
    pub fn label(&self) -> &'static str {
        match self {
            PageAction::CollectNotes => "collect notes",
            PageAction::GenerateQa => "generate Q&A",
            PageAction::QueueQuestions { .. } => "queue questions",
        }
    }

    /// Filename shown when the page reply omits one.
    pub fn default_filename(&self) -> &'static str {
        match self {
            PageAction::CollectNotes => "chapter_notes.html",
            PageAction::GenerateQa => "chapter_qna.txt",
            PageAction::QueueQuestions { .. } => "",
        }
    }

    pub(crate) fn failure_text(&self) -> String {
        format!("Failed to {}.", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver a request to the page agent of `tab_id`.
    SendToPage {
        tab_id: TabId,
        action: PageAction,
        request: PageRequest,
    },
    /// Inject the page agent into `tab_id`, then deliver `request` once more.
    InjectAndRetry {
        tab_id: TabId,
        action: PageAction,
        request: PageRequest,
    },
    /// Open a finished download, or the default download folder without an id.
    OpenDownload { download_id: Option<DownloadId> },
    FocusBulkInput,
    ClearBulkInput,
}
