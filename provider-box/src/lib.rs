//! # Box Provider
//!
//! Implements [`StorageProvider`](bridge_traits::storage::StorageProvider)
//! for the Box Content API v2.0.
//!
//! ## Overview
//!
//! - Folder creation under a parent folder id
//! - Multipart file upload and content replacement
//! - Single token refresh and retry when Box answers `401`
//! - Typed Box error objects; name collisions surface as
//!   [`BridgeError::NameConflict`](bridge_traits::error::BridgeError::NameConflict)
//!   with the conflicting item's id

pub mod connector;
pub mod error;
pub mod types;

pub use connector::BoxConnector;
pub use error::{BoxError, Result};
