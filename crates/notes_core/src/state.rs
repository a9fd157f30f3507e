use std::collections::HashMap;

use crate::view_model::PopupViewModel;
use crate::{DownloadId, RequestId};

/// What the popup status area shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusLine {
    #[default]
    Empty,
    Text(String),
    /// "Saved <filename>" where the filename is a link to the download.
    Saved {
        filename: String,
        download_id: Option<DownloadId>,
    },
}

impl StatusLine {
    pub fn render(&self) -> String {
        match self {
            StatusLine::Empty => String::new(),
            StatusLine::Text(text) => text.clone(),
            StatusLine::Saved { filename, .. } => format!("Saved {filename}"),
        }
    }
}

/// A save request still waiting for its download event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDownload {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopupState {
    status: StatusLine,
    pending_downloads: HashMap<RequestId, PendingDownload>,
    bulk_form_visible: bool,
    dirty: bool,
}

impl PopupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> PopupViewModel {
        let download_id = match &self.status {
            StatusLine::Saved { download_id, .. } => *download_id,
            _ => None,
        };
        PopupViewModel {
            status: self.status.render(),
            has_download_link: matches!(self.status, StatusLine::Saved { .. }),
            download_id,
            bulk_form_visible: self.bulk_form_visible,
            pending_downloads: self.pending_downloads.len(),
            dirty: self.dirty,
        }
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn pending_downloads(&self) -> usize {
        self.pending_downloads.len()
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_status_text(&mut self, text: impl Into<String>) {
        self.status = StatusLine::Text(text.into());
        self.dirty = true;
    }

    pub(crate) fn set_saved(&mut self, filename: String, download_id: Option<DownloadId>) {
        self.status = StatusLine::Saved {
            filename,
            download_id,
        };
        self.dirty = true;
    }

    pub(crate) fn track_download(&mut self, request_id: RequestId, filename: String) {
        self.pending_downloads
            .insert(request_id, PendingDownload { filename });
    }

    pub(crate) fn take_download(&mut self, request_id: &str) -> Option<PendingDownload> {
        self.pending_downloads.remove(request_id)
    }

    /// Shows or hides the bulk form; `None` flips it. Returns the new visibility.
    pub(crate) fn toggle_bulk_form(&mut self, force: Option<bool>) -> bool {
        let visible = force.unwrap_or(!self.bulk_form_visible);
        if visible != self.bulk_form_visible {
            self.bulk_form_visible = visible;
            self.dirty = true;
        }
        visible
    }
}
