//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the Box sync core:
//! - Logging and tracing infrastructure
//! - Configuration management and bridge wiring
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the other core crates
//! depend on. It establishes the logging conventions and the fail-fast
//! configuration builder used throughout the system.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{BoxEndpoints, SyncConfig};
pub use error::{Error, Result};
