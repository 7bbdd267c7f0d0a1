//! sortwatch - automatic directory sorting with undo
//!
//! This library watches a directory for new files, classifies them by
//! extension, and moves them into category subfolders of a destination
//! directory. Every completed pass records a move ledger so the most recent
//! batch can be undone, and a monitor can trigger passes automatically on
//! filesystem creation events.

pub mod category;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod monitor;
pub mod output;
pub mod sorter;
pub mod undo;

pub use category::CategoryTable;
pub use config::{AppConfig, ConfigError, ConfigStore};
pub use ledger::{Ledger, LedgerStore};
pub use monitor::{Monitor, MonitorError};
pub use sorter::{SortEngine, SortError, SortReport};
pub use undo::{UndoOperator, UndoReport};

pub use cli::{Cli, Command, run};
