//! Command-line interface for sortwatch.
//!
//! This module is presentation glue: it parses arguments, wires the stores
//! together, invokes the core operations (sort once, watch, undo, configure)
//! and renders their reports. All actual behavior lives in the core modules.

use crate::config::{AppConfig, ConfigStore};
use crate::ledger::LedgerStore;
use crate::monitor::Monitor;
use crate::output::{ActionLog, OutputFormatter};
use crate::sorter::{SortEngine, SortReport};
use crate::undo::UndoOperator;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Watch a directory and sort incoming files into category subfolders.
#[derive(Debug, Parser)]
#[command(name = "sortwatch", version)]
pub struct Cli {
    /// Path to the persisted configuration file.
    #[arg(long, global = true, default_value = "sortwatch.json")]
    pub config: PathBuf,

    /// Path to the action log file.
    #[arg(long, global = true, default_value = "sortwatch.log")]
    pub log: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// The operation to run.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sort the watch directory once.
    Sort,
    /// Watch for new files and sort on every arrival (Enter stops).
    Watch,
    /// Undo the most recent sort pass.
    Undo,
    /// Set the watch and sort directories.
    Config {
        /// Directory to watch for new files.
        #[arg(long)]
        watch_dir: PathBuf,
        /// Directory to sort files into.
        #[arg(long)]
        sort_dir: PathBuf,
    },
}

/// Dispatches a parsed command line.
pub fn run(cli: Cli) -> Result<(), String> {
    let store = ConfigStore::new(&cli.config);
    let action_log = ActionLog::new(&cli.log);

    match cli.command {
        Command::Sort => run_sort(&store, &action_log),
        Command::Watch => run_watch(&store),
        Command::Undo => run_undo(&store, &action_log),
        Command::Config {
            watch_dir,
            sort_dir,
        } => run_set_config(&store, watch_dir, sort_dir),
    }
}

/// Loads the configuration and checks both directories are usable.
fn load_validated_config(store: &ConfigStore) -> Result<AppConfig, String> {
    let config = store.load();
    if config.watch_dir.as_os_str().is_empty() || config.sort_dir.as_os_str().is_empty() {
        return Err(format!(
            "No directories configured. Run 'sortwatch config --watch-dir <dir> --sort-dir <dir>' first (config: {}).",
            store.path().display()
        ));
    }
    Ok(config)
}

fn run_sort(store: &ConfigStore, action_log: &ActionLog) -> Result<(), String> {
    let config = load_validated_config(store)?;
    OutputFormatter::info(&format!(
        "Sorting contents of: {}",
        config.watch_dir.display()
    ));

    let ledger_store = LedgerStore::new(store.clone());
    let report = SortEngine::sort_once(&config.watch_dir, &config.sort_dir, &ledger_store)
        .map_err(|e| e.to_string())?;

    print_sort_report(&report, action_log);
    Ok(())
}

fn print_sort_report(report: &SortReport, action_log: &ActionLog) {
    if !report.moved.is_empty() {
        let pb = OutputFormatter::create_progress_bar(report.moved.len() as u64);
        for moved in &report.moved {
            action_log.append(&format!(
                "Moved: {} -> {}",
                moved.source.display(),
                moved.destination.display()
            ));
            pb.inc(1);
        }
        pb.finish_and_clear();
    }

    let mut category_counts: HashMap<String, usize> = HashMap::new();
    for moved in &report.moved {
        *category_counts.entry(moved.category.clone()).or_insert(0) += 1;
    }

    for (path, cause) in &report.errors {
        OutputFormatter::error(&format!("{}: {}", path.display(), cause));
    }

    if report.moved.is_empty() && report.errors.is_empty() {
        OutputFormatter::success("Nothing to sort.");
    } else {
        OutputFormatter::summary_table(&category_counts, report.moved_count());
        if report.is_complete_success() {
            OutputFormatter::success("Sorting complete! Use 'sortwatch undo' to revert.");
        } else {
            OutputFormatter::warning("Some files could not be sorted. See errors above.");
        }
    }
}

fn run_watch(store: &ConfigStore) -> Result<(), String> {
    let config = load_validated_config(store)?;
    let ledger_store = LedgerStore::new(store.clone());
    let mut monitor = Monitor::new(&config.watch_dir, &config.sort_dir, ledger_store);
    monitor.start().map_err(|e| e.to_string())?;

    let spinner = OutputFormatter::create_spinner(&format!(
        "Watching {} for new files... press Enter to stop",
        config.watch_dir.display()
    ));

    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);

    spinner.finish_and_clear();
    monitor.stop();
    OutputFormatter::success("Monitoring stopped.");
    Ok(())
}

fn run_undo(store: &ConfigStore, action_log: &ActionLog) -> Result<(), String> {
    OutputFormatter::info("Undoing previous sort...");

    let ledger_store = LedgerStore::new(store.clone());
    let report = UndoOperator::undo_last(&ledger_store).map_err(|e| e.to_string())?;

    for (destination, source) in &report.restored {
        action_log.append(&format!(
            "Restored: {} -> {}",
            destination.display(),
            source.display()
        ));
    }

    OutputFormatter::success(&format!("Restored: {}", report.restored_count()));
    if report.skipped > 0 {
        OutputFormatter::warning(&format!(
            "Skipped {} entries whose files were no longer present",
            report.skipped
        ));
    }
    for (path, cause) in &report.errors {
        OutputFormatter::error(&format!("{}: {}", path.display(), cause));
    }
    Ok(())
}

fn run_set_config(
    store: &ConfigStore,
    watch_dir: PathBuf,
    sort_dir: PathBuf,
) -> Result<(), String> {
    validate_directory(&watch_dir)?;
    validate_directory(&sort_dir)?;

    let mut config = store.load();
    config.watch_dir = watch_dir;
    config.sort_dir = sort_dir;
    store.save(&config).map_err(|e| e.to_string())?;

    OutputFormatter::success(&format!("Configuration saved to {}", store.path().display()));
    Ok(())
}

fn validate_directory(path: &Path) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!(
            "{} is not an existing directory",
            path.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_set_config_rejects_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = ConfigStore::new(temp_dir.path().join("sortwatch.json"));

        let result = run_set_config(
            &store,
            temp_dir.path().join("missing"),
            temp_dir.path().to_path_buf(),
        );
        assert!(result.is_err());
        assert!(!store.path().exists(), "nothing saved on invalid input");
    }

    #[test]
    fn test_set_config_persists_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = ConfigStore::new(temp_dir.path().join("sortwatch.json"));
        let watch = temp_dir.path().join("watch");
        let sort = temp_dir.path().join("sort");
        fs::create_dir(&watch).expect("mkdir");
        fs::create_dir(&sort).expect("mkdir");

        run_set_config(&store, watch.clone(), sort.clone()).expect("config");

        let config = store.load();
        assert_eq!(config.watch_dir, watch);
        assert_eq!(config.sort_dir, sort);
    }

    #[test]
    fn test_sort_requires_configuration() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = ConfigStore::new(temp_dir.path().join("sortwatch.json"));
        let action_log = ActionLog::new(temp_dir.path().join("sortwatch.log"));

        let result = run_sort(&store, &action_log);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["sortwatch", "sort"]).expect("parse");
        assert!(matches!(cli.command, Command::Sort));

        let cli = Cli::try_parse_from([
            "sortwatch",
            "config",
            "--watch-dir",
            "/w",
            "--sort-dir",
            "/s",
        ])
        .expect("parse");
        assert!(matches!(cli.command, Command::Config { .. }));

        let cli =
            Cli::try_parse_from(["sortwatch", "--config", "custom.json", "undo"]).expect("parse");
        assert_eq!(cli.config, PathBuf::from("custom.json"));
    }
}
