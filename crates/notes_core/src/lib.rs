//! Chat notes core: wire protocol and the pure popup state machine.
mod effect;
mod msg;
mod protocol;
mod state;
mod status;
mod tab;
mod update;
mod view_model;

pub use effect::{Effect, PageAction};
pub use msg::Msg;
pub use protocol::{BulkStatus, DownloadId, PageRequest, PageResponse, RequestId, RuntimeMessage};
pub use state::{PendingDownload, PopupState, StatusLine};
pub use status::{bulk_status_text, delay_status, format_countdown, truncate, waiting_status};
pub use tab::{is_supported_tab, TabId, TabInfo, ALLOWED_HOSTS};
pub use update::{parse_bulk_questions, update, CONNECTION_LOST};
pub use view_model::PopupViewModel;
