use crate::DownloadId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopupViewModel {
    pub status: String,
    /// The status ends with a filename link to a finished download.
    pub has_download_link: bool,
    pub download_id: Option<DownloadId>,
    pub bulk_form_visible: bool,
    pub pending_downloads: usize,
    pub dirty: bool,
}
