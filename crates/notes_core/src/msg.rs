use crate::{PageAction, PageRequest, PageResponse, RuntimeMessage, TabId, TabInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User clicked "Collect notes"; carries the active tab if there is one.
    CollectNotesClicked(Option<TabInfo>),
    /// User clicked "Generate Q&A".
    GenerateQaClicked(Option<TabInfo>),
    /// User toggled the bulk question form.
    BulkToggleClicked,
    /// User cancelled the bulk question form.
    BulkCancelClicked,
    /// User submitted the bulk question form.
    BulkSubmitted { tab: Option<TabInfo>, text: String },
    /// The page agent replied to a request.
    PageResponded {
        action: PageAction,
        response: PageResponse,
    },
    /// The page agent could not be reached.
    PageUnreachable {
        tab_id: TabId,
        action: PageAction,
        request: PageRequest,
        error: String,
        retried: bool,
    },
    /// A broadcast arrived on the runtime bus.
    Runtime(RuntimeMessage),
    /// User clicked the filename link in the status line.
    DownloadLinkClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}
