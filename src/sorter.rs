/// The sort engine: one pass over the watch directory.
///
/// A pass enumerates the regular files directly under the watch directory,
/// classifies each by extension, creates the category subfolder under the
/// sort directory as needed, moves the file, and records the move in a fresh
/// ledger. The ledger is persisted when the pass completes, replacing the
/// previous generation even when nothing moved.
use crate::category::CategoryTable;
use crate::config::ConfigError;
use crate::ledger::{Ledger, LedgerStore};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during a sort pass.
#[derive(Debug)]
pub enum SortError {
    /// The watch or sort path is missing or not a directory. Fatal to the
    /// pass; nothing has been moved.
    InvalidDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create a category subfolder.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a single file. Recorded per entry, never aborts the
    /// remaining pass.
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// The completed pass could not persist its ledger. The moves have
    /// already happened; only the undo record is affected.
    LedgerWriteFailed { source: ConfigError },
}

impl std::fmt::Display for SortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDirectory { path, source } => {
                write!(f, "Invalid directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::MoveFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::LedgerWriteFailed { source } => {
                write!(f, "Failed to persist move ledger: {}", source)
            }
        }
    }
}

impl std::error::Error for SortError {}

/// Result type for sort engine operations.
pub type SortResult<T> = Result<T, SortError>;

/// A single successful move performed during a pass.
#[derive(Debug, Clone)]
pub struct MovedFile {
    /// Where the file was before the pass.
    pub source: PathBuf,
    /// Where the file is now.
    pub destination: PathBuf,
    /// The category it was filed under.
    pub category: String,
}

/// Outcome of one sort pass.
#[derive(Debug, Default)]
pub struct SortReport {
    /// Every move performed, in processing order.
    pub moved: Vec<MovedFile>,
    /// Per-entry failures: the path that could not be moved and why.
    pub errors: Vec<(PathBuf, String)>,
}

impl SortReport {
    /// Number of files moved by the pass.
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    /// Returns true if every eligible file was moved.
    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Performs sort passes over a watch directory.
pub struct SortEngine;

impl SortEngine {
    /// Runs one full pass, moving every eligible file and persisting the
    /// resulting ledger.
    ///
    /// Both directories must already exist; the engine never creates them,
    /// only category subfolders beneath `sort_dir`. A failing entry (locked
    /// file, permissions, destination name already taken) is recorded in the
    /// report and the pass continues. Running a second pass over an
    /// unchanged directory moves nothing and persists an empty ledger.
    ///
    /// # Errors
    ///
    /// `InvalidDirectory` if either path is missing or not a directory
    /// (nothing is moved), or `LedgerWriteFailed` if the completed pass
    /// cannot persist its ledger.
    pub fn sort_once(
        watch_dir: &Path,
        sort_dir: &Path,
        ledger_store: &LedgerStore,
    ) -> SortResult<SortReport> {
        Self::validate_directory(watch_dir)?;
        Self::validate_directory(sort_dir)?;

        let entries = fs::read_dir(watch_dir).map_err(|e| SortError::InvalidDirectory {
            path: watch_dir.to_path_buf(),
            source: e,
        })?;

        let table = CategoryTable::default();
        let mut ledger = Ledger::new();
        let mut report = SortReport::default();

        for entry in entries.flatten() {
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }

            let file_path = entry.path();
            let category = table.classify_path(&file_path);

            match Self::move_to_category(&file_path, sort_dir, category) {
                Ok(moved) => {
                    ledger.record(moved.destination.clone(), moved.source.clone());
                    report.moved.push(moved);
                }
                Err(e) => {
                    report.errors.push((file_path, e.to_string()));
                }
            }
        }

        // Persist even an empty ledger: the previous generation is gone.
        ledger_store
            .save(&ledger)
            .map_err(|source| SortError::LedgerWriteFailed { source })?;

        Ok(report)
    }

    /// Moves one file into its category subfolder under `sort_dir`.
    ///
    /// Creates the subfolder if absent. If the destination name is already
    /// taken the move fails and the source file is left untouched; the
    /// engine never overwrites.
    fn move_to_category(file_path: &Path, sort_dir: &Path, category: &str) -> SortResult<MovedFile> {
        let category_path = sort_dir.join(category);
        if !category_path.exists() {
            fs::create_dir(&category_path).map_err(|e| SortError::DirectoryCreationFailed {
                path: category_path.clone(),
                source: e,
            })?;
        }

        let file_name = file_path
            .file_name()
            .ok_or_else(|| SortError::MoveFailed {
                source: file_path.to_path_buf(),
                destination: category_path.clone(),
                source_error: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        let destination_path = category_path.join(file_name);

        if destination_path.exists() {
            return Err(SortError::MoveFailed {
                source: file_path.to_path_buf(),
                destination: destination_path,
                source_error: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "destination already exists",
                ),
            });
        }

        fs::rename(file_path, &destination_path).map_err(|e| SortError::MoveFailed {
            source: file_path.to_path_buf(),
            destination: destination_path.clone(),
            source_error: e,
        })?;

        Ok(MovedFile {
            source: file_path.to_path_buf(),
            destination: destination_path,
            category: category.to_string(),
        })
    }

    /// Checks that a path exists and is a directory.
    fn validate_directory(path: &Path) -> SortResult<()> {
        let metadata = fs::metadata(path).map_err(|e| SortError::InvalidDirectory {
            path: path.to_path_buf(),
            source: e,
        })?;

        if !metadata.is_dir() {
            return Err(SortError::InvalidDirectory {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        Ok(())
    }
}
