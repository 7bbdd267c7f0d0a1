/// Undo support: reversing the most recent sort pass.
///
/// The undo operator consumes the persisted ledger, moving every recorded
/// file back from its destination to its original source path. Entries
/// whose destination no longer holds a file are skipped without error. The
/// ledger is cleared afterwards regardless of individual failures: undo is
/// best effort, then clear, and is never retried automatically.
use crate::ledger::{Ledger, LedgerStore};
use crate::sorter::{SortError, SortResult};
use std::fs;
use std::path::PathBuf;

/// Outcome of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Files moved back, as (destination, restored source path) pairs.
    pub restored: Vec<(PathBuf, PathBuf)>,
    /// Number of ledger entries skipped because the destination file was
    /// gone (moved again, deleted, or already restored).
    pub skipped: usize,
    /// Per-entry failures: the destination that could not be restored and why.
    pub errors: Vec<(PathBuf, String)>,
}

impl UndoReport {
    /// Number of files restored to their original paths.
    pub fn restored_count(&self) -> usize {
        self.restored.len()
    }

    /// Returns true if every present file was restored.
    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Reverses the moves recorded by the last sort pass.
pub struct UndoOperator;

impl UndoOperator {
    /// Restores every recorded move that still has a file at its
    /// destination, then persists an empty ledger.
    ///
    /// An empty ledger makes this a no-op with nothing restored. Source
    /// directories are assumed to exist (they were the original watch
    /// location); no intermediate directories are created.
    ///
    /// # Errors
    ///
    /// `LedgerWriteFailed` if the cleared ledger cannot be persisted.
    /// Individual restore failures are reported, not returned.
    pub fn undo_last(ledger_store: &LedgerStore) -> SortResult<UndoReport> {
        let ledger = ledger_store.load();
        let mut report = UndoReport::default();

        for (destination, source) in ledger.iter() {
            if !destination.exists() {
                report.skipped += 1;
                continue;
            }

            match fs::rename(destination, source) {
                Ok(()) => report.restored.push((destination.clone(), source.clone())),
                Err(e) => {
                    report
                        .errors
                        .push((destination.clone(), format!("Failed to restore file: {}", e)));
                }
            }
        }

        // Clear unconditionally: only one generation of undo exists, and a
        // failed restore is not retried.
        ledger_store
            .save(&Ledger::new())
            .map_err(|source| SortError::LedgerWriteFailed { source })?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::sorter::SortEngine;
    use tempfile::TempDir;

    struct Dirs {
        _temp: TempDir,
        watch: PathBuf,
        sort: PathBuf,
        ledger_store: LedgerStore,
    }

    fn setup() -> Dirs {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let watch = temp.path().join("watch");
        let sort = temp.path().join("sort");
        fs::create_dir(&watch).expect("Failed to create watch dir");
        fs::create_dir(&sort).expect("Failed to create sort dir");
        let ledger_store =
            LedgerStore::new(ConfigStore::new(temp.path().join("sortwatch.json")));
        Dirs {
            _temp: temp,
            watch,
            sort,
            ledger_store,
        }
    }

    #[test]
    fn test_undo_restores_sorted_files() {
        let dirs = setup();
        fs::write(dirs.watch.join("a.jpg"), "img").expect("write");
        fs::write(dirs.watch.join("b.mp3"), "audio").expect("write");

        SortEngine::sort_once(&dirs.watch, &dirs.sort, &dirs.ledger_store).expect("sort");
        let report = UndoOperator::undo_last(&dirs.ledger_store).expect("undo");

        assert_eq!(report.restored_count(), 2);
        assert!(report.is_complete_success());
        assert!(dirs.watch.join("a.jpg").exists());
        assert!(dirs.watch.join("b.mp3").exists());
        assert!(!dirs.sort.join("Images").join("a.jpg").exists());
        assert!(dirs.ledger_store.load().is_empty());
    }

    #[test]
    fn test_undo_with_empty_ledger_is_noop() {
        let dirs = setup();

        let report = UndoOperator::undo_last(&dirs.ledger_store).expect("undo");

        assert_eq!(report.restored_count(), 0);
        assert_eq!(report.skipped, 0);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_undo_skips_missing_destinations() {
        let dirs = setup();
        fs::write(dirs.watch.join("a.jpg"), "img").expect("write");

        SortEngine::sort_once(&dirs.watch, &dirs.sort, &dirs.ledger_store).expect("sort");
        fs::remove_file(dirs.sort.join("Images").join("a.jpg")).expect("remove");

        let report = UndoOperator::undo_last(&dirs.ledger_store).expect("undo");

        assert_eq!(report.restored_count(), 0);
        assert_eq!(report.skipped, 1);
        assert!(report.errors.is_empty(), "missing files are not errors");
        assert!(dirs.ledger_store.load().is_empty());
    }

    #[test]
    fn test_undo_clears_ledger_even_after_failures() {
        let dirs = setup();
        fs::write(dirs.sort.join("stray.txt"), "x").expect("write");

        let mut ledger = Ledger::new();
        // Source directory does not exist, so the rename back must fail.
        ledger.record(
            dirs.sort.join("stray.txt"),
            dirs._temp.path().join("gone").join("stray.txt"),
        );
        dirs.ledger_store.save(&ledger).expect("save ledger");

        let report = UndoOperator::undo_last(&dirs.ledger_store).expect("undo");

        assert_eq!(report.restored_count(), 0);
        assert_eq!(report.errors.len(), 1);
        assert!(
            dirs.ledger_store.load().is_empty(),
            "ledger cleared despite the failure"
        );
    }

    #[test]
    fn test_second_undo_is_noop() {
        let dirs = setup();
        fs::write(dirs.watch.join("a.jpg"), "img").expect("write");

        SortEngine::sort_once(&dirs.watch, &dirs.sort, &dirs.ledger_store).expect("sort");
        UndoOperator::undo_last(&dirs.ledger_store).expect("first undo");
        let report = UndoOperator::undo_last(&dirs.ledger_store).expect("second undo");

        assert_eq!(report.restored_count(), 0);
        assert!(dirs.watch.join("a.jpg").exists());
    }

    #[test]
    fn test_undo_then_sort_round_trips() {
        let dirs = setup();
        fs::write(dirs.watch.join("a.jpg"), "img").expect("write");
        fs::write(dirs.watch.join("c.xyz"), "???").expect("write");

        SortEngine::sort_once(&dirs.watch, &dirs.sort, &dirs.ledger_store).expect("sort");
        UndoOperator::undo_last(&dirs.ledger_store).expect("undo");
        let report =
            SortEngine::sort_once(&dirs.watch, &dirs.sort, &dirs.ledger_store).expect("resort");

        assert_eq!(report.moved_count(), 2);
        assert!(dirs.sort.join("Images").join("a.jpg").exists());
        assert!(dirs.sort.join("Others").join("c.xyz").exists());
    }
}
