//! Persisted settings and history: which servers and libraries have been
//! used, per-library settings, and the last-used form values.
//!
//! Stored as one versioned JSON record. Loading is tolerant (a missing or
//! corrupt file yields defaults) and every write goes through a temp file
//! plus rename, so readers never observe a partial record.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use coverscan_model::{ColorScheme, ImageType, Thresholds};

const HISTORY_VERSION: u32 = 1;

/// One set of form values, stored per library and as `last_used`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub images: Vec<ImageType>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub colors: Option<ColorScheme>,
    #[serde(default)]
    pub file_basenames: BTreeMap<ImageType, String>,
    #[serde(default)]
    pub embedded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    pub version: u32,
    #[serde(default)]
    pub servers: Vec<String>,
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub library_settings: BTreeMap<String, StoredSettings>,
    #[serde(default)]
    pub last_used: Option<StoredSettings>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            version: HISTORY_VERSION,
            servers: Vec::new(),
            libraries: Vec::new(),
            library_settings: BTreeMap::new(),
            last_used: None,
        }
    }
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    inner: RwLock<History>,
}

impl HistoryStore {
    /// Load the record, falling back to defaults when the file is absent
    /// or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let history = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<History>(&bytes) {
                Ok(history) => history,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "corrupt history record, starting fresh");
                    History::default()
                }
            },
            Err(_) => History::default(),
        };
        Self {
            path,
            inner: RwLock::new(history),
        }
    }

    pub fn snapshot(&self) -> History {
        self.inner.read().expect("history lock").clone()
    }

    /// Record a run's settings: remember the server and library, update the
    /// per-library settings and the last-used values, then persist.
    pub fn record_run(
        &self,
        library: &str,
        settings: StoredSettings,
    ) -> std::io::Result<()> {
        let snapshot = {
            let mut history = self.inner.write().expect("history lock");
            if !settings.server.is_empty()
                && !history.servers.contains(&settings.server)
            {
                history.servers.push(settings.server.clone());
            }
            if !history.libraries.iter().any(|name| name == library) {
                history.libraries.push(library.to_owned());
            }
            history
                .library_settings
                .insert(library.to_owned(), settings.clone());
            history.last_used = Some(settings);
            history.clone()
        };
        persist(&self.path, &snapshot)
    }
}

fn persist(path: &Path, history: &History) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;
    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(&mut file, history)
        .map_err(std::io::Error::other)?;
    file.flush()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = HistoryStore::load(&path);
        let settings = StoredSettings {
            server: "http://media.example:8096".to_owned(),
            api_key: "key".to_owned(),
            images: vec![ImageType::Primary, ImageType::Backdrop],
            ..Default::default()
        };
        store.record_run("Movies", settings).unwrap();

        let reloaded = HistoryStore::load(&path).snapshot();
        assert_eq!(reloaded.version, HISTORY_VERSION);
        assert_eq!(reloaded.servers, vec!["http://media.example:8096"]);
        assert_eq!(reloaded.libraries, vec!["Movies"]);
        assert_eq!(
            reloaded.library_settings["Movies"].images,
            vec![ImageType::Primary, ImageType::Backdrop]
        );
        assert!(reloaded.last_used.is_some());
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = HistoryStore::load(&path);
        let history = store.snapshot();
        assert!(history.servers.is_empty());
        assert!(history.last_used.is_none());
    }

    #[test]
    fn test_known_entries_are_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = HistoryStore::load(&path);
        let settings = StoredSettings {
            server: "http://media.example:8096".to_owned(),
            ..Default::default()
        };
        store.record_run("Movies", settings.clone()).unwrap();
        store.record_run("Movies", settings).unwrap();
        let history = store.snapshot();
        assert_eq!(history.servers.len(), 1);
        assert_eq!(history.libraries.len(), 1);
    }
}
