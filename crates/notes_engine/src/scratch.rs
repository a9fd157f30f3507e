use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::persist::PersistError;

pub const NOTES_MD_KEY: &str = "notes_md";
pub const NOTES_TEXT_KEY: &str = "notes_text";
pub const NOTES_HTML_KEY: &str = "notes_html";
pub const NOTES_QNA_KEY: &str = "notes_qna";

/// Page-local key/value scratch space holding the latest exports.
pub trait ScratchStore: Send + Sync {
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
}

#[derive(Debug, Default)]
pub struct MemoryScratchStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryScratchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

impl ScratchStore for MemoryScratchStore {
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
