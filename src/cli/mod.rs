//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod config;
pub mod export;
pub mod report;
pub mod transaction;

pub use config::{handle_config_command, ConfigCommands};
pub use export::{handle_export_command, ExportArgs};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};
