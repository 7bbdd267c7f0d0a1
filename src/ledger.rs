//! The move ledger: the durable record that makes undo possible.
//!
//! A ledger maps each destination path produced by a sort pass back to the
//! source path the file came from. Exactly one generation exists at a time:
//! every completed pass replaces the previous ledger wholesale, and the undo
//! operator consumes and clears it.

use crate::config::{ConfigError, ConfigStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Destination -> source mapping for the most recent sort pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<PathBuf, PathBuf>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed move.
    ///
    /// Destination keys are normally unique within one pass because each
    /// destination is freshly computed per move. Should two sources ever
    /// normalize to the same destination, the later record wins and the
    /// earlier mapping is lost.
    pub fn record(&mut self, destination: PathBuf, source: PathBuf) {
        self.entries.insert(destination, source);
    }

    /// Returns the number of recorded moves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no moves are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over (destination, source) pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &PathBuf)> {
        self.entries.iter()
    }

    /// Looks up the recorded source for a destination path.
    pub fn source_for(&self, destination: &Path) -> Option<&PathBuf> {
        self.entries.get(destination)
    }
}

/// Loads and saves the ledger portion of the persisted configuration.
///
/// The ledger rides inside the configuration file; saving it preserves the
/// directory fields and stamps the pass timestamp.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    store: ConfigStore,
}

impl LedgerStore {
    /// Creates a ledger store over the given configuration store.
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    /// Returns the persisted ledger, or an empty one if the backing file is
    /// absent or unreadable.
    pub fn load(&self) -> Ledger {
        self.store.load().ledger
    }

    /// Persists the given ledger, replacing the previous generation.
    ///
    /// The rest of the configuration (directories) is carried over
    /// unchanged; `last_sorted_at` is set to the current time.
    pub fn save(&self, ledger: &Ledger) -> Result<(), ConfigError> {
        let mut config = self.store.load();
        config.ledger = ledger.clone();
        config.last_sorted_at = Some(chrono::Utc::now().to_rfc3339());
        self.store.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tempfile::TempDir;

    fn ledger_store_in(dir: &TempDir) -> LedgerStore {
        LedgerStore::new(ConfigStore::new(dir.path().join("sortwatch.json")))
    }

    #[test]
    fn test_load_without_backing_file_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = ledger_store_in(&temp_dir);

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips_entries() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = ledger_store_in(&temp_dir);

        let mut ledger = Ledger::new();
        ledger.record(
            PathBuf::from("/sort/Images/a.jpg"),
            PathBuf::from("/watch/a.jpg"),
        );
        ledger.record(
            PathBuf::from("/sort/Music/b.mp3"),
            PathBuf::from("/watch/b.mp3"),
        );
        store.save(&ledger).expect("Failed to save ledger");

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.source_for(Path::new("/sort/Images/a.jpg")),
            Some(&PathBuf::from("/watch/a.jpg"))
        );
    }

    #[test]
    fn test_save_replaces_previous_generation() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = ledger_store_in(&temp_dir);

        let mut first = Ledger::new();
        first.record(PathBuf::from("/sort/old"), PathBuf::from("/watch/old"));
        store.save(&first).expect("Failed to save first ledger");

        let mut second = Ledger::new();
        second.record(PathBuf::from("/sort/new"), PathBuf::from("/watch/new"));
        store.save(&second).expect("Failed to save second ledger");

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.source_for(Path::new("/sort/old")).is_none());
    }

    #[test]
    fn test_save_preserves_directory_fields() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_store = ConfigStore::new(temp_dir.path().join("sortwatch.json"));

        let config = AppConfig {
            watch_dir: PathBuf::from("/the/watch"),
            sort_dir: PathBuf::from("/the/sort"),
            ..Default::default()
        };
        config_store.save(&config).expect("Failed to save config");

        let store = LedgerStore::new(config_store.clone());
        store.save(&Ledger::new()).expect("Failed to save ledger");

        let reloaded = config_store.load();
        assert_eq!(reloaded.watch_dir, PathBuf::from("/the/watch"));
        assert_eq!(reloaded.sort_dir, PathBuf::from("/the/sort"));
        assert!(reloaded.last_sorted_at.is_some());
    }

    #[test]
    fn test_record_later_write_wins() {
        let mut ledger = Ledger::new();
        ledger.record(PathBuf::from("/dest"), PathBuf::from("/first"));
        ledger.record(PathBuf::from("/dest"), PathBuf::from("/second"));

        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.source_for(Path::new("/dest")),
            Some(&PathBuf::from("/second"))
        );
    }
}
