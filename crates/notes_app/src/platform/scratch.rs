//! Scratch storage persisted as a RON map next to the downloads.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use notes_engine::{AtomicFileWriter, PersistError, ScratchStore};
use notes_logging::{notes_info, notes_warn};

const SCRATCH_FILENAME: &str = ".chat_notes_scratch.ron";

pub struct RonScratchStore {
    writer: AtomicFileWriter,
    entries: Mutex<BTreeMap<String, String>>,
}

impl RonScratchStore {
    /// Open the store in `dir`, starting empty when the file is missing or
    /// unreadable.
    pub fn open(dir: &Path) -> Self {
        Self {
            writer: AtomicFileWriter::new(PathBuf::from(dir)),
            entries: Mutex::new(load_entries(&dir.join(SCRATCH_FILENAME))),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

impl ScratchStore for RonScratchStore {
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());

        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&*entries, pretty)
            .map_err(|err| PersistError::Io(std::io::Error::other(err)))?;
        self.writer.write(SCRATCH_FILENAME, content.as_bytes())?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            notes_warn!("Failed to read scratch space from {:?}: {}", path, err);
            return BTreeMap::new();
        }
    };
    match ron::from_str(&content) {
        Ok(entries) => {
            notes_info!("Loaded scratch space from {:?}", path);
            entries
        }
        Err(err) => {
            notes_warn!("Failed to parse scratch space from {:?}: {}", path, err);
            BTreeMap::new()
        }
    }
}
