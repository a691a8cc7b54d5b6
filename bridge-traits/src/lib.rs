//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and the
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that is provided differently per host (desktop terminal,
//! headless runner, tests).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with opt-in retry, TLS and multipart
//! - [`StorageProvider`](storage::StorageProvider) - Remote folder tree (create, upload, replace)
//!
//! ### Security & Storage
//! - [`SecureStore`](storage::SecureStore) - Credential persistence (Keychain/Secret Service)
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Local file reads and directory listing
//!
//! ### Interaction
//! - [`InteractionProvider`](interaction::InteractionProvider) - Consent, secret entry,
//!   authorization URL and code, progress output
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! use core_runtime::Error;
//!
//! let secure_store = builder.secure_store
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "SecureStore".to_string(),
//!         message: "Enable the 'desktop-shims' feature or inject an implementation.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Remote name
//! collisions are reported as the structured
//! [`BridgeError::NameConflict`](error::BridgeError::NameConflict) variant so
//! callers never need to parse error text.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared behind `Arc`.

pub mod error;
pub mod http;
pub mod interaction;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartForm, MultipartPart};
pub use interaction::{is_affirmative, InteractionProvider};
pub use storage::{
    FileMetadata, FileSystemAccess, RemoteItem, RemoteItemKind, SecureStore, StorageProvider,
};
