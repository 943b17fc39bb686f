// File-backed store for the settings document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::SettingsError;
use crate::domain::ports::SettingsStore;

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<Option<String>, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SettingsError::Storage(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    fn save(&self, document: &str) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::Storage(format!("{}: {e}", parent.display())))?;
            }
        }
        fs::write(&self.path, document)
            .map_err(|e| SettingsError::Storage(format!("{}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir() -> PathBuf {
        let n = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("combat_interdiction_{}_{n}", std::process::id()))
    }

    #[test]
    fn when_file_is_missing_then_load_returns_none() {
        let store = FileSettingsStore::new(scratch_dir().join("settings.toml"));

        assert!(matches!(store.load(), Ok(None)));
    }

    #[test]
    fn when_document_is_saved_then_it_is_loaded_back() {
        let dir = scratch_dir();
        let store = FileSettingsStore::new(dir.join("nested").join("settings.toml"));

        store.save("configVersion = \"2.0.0\"\n").expect("saved");
        let loaded = store.load().expect("readable");

        assert_eq!(loaded.as_deref(), Some("configVersion = \"2.0.0\"\n"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn when_path_is_a_directory_then_load_reports_storage_error() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).expect("scratch dir");
        let store = FileSettingsStore::new(&dir);

        assert!(matches!(store.load(), Err(SettingsError::Storage(_))));
        let _ = fs::remove_dir_all(dir);
    }
}
