//! # box-sync
//!
//! Upload local files and directories to Box from the command line.
//!
//! The library half re-exports the service façade so other hosts can drive
//! the same flows, and holds the command-line definition used by the
//! `box-sync` binary.

pub mod cli;

pub use core_service::{BoxSyncService, CoreError};
pub use core_sync::UploadReport;
