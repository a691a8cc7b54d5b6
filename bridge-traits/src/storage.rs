//! Storage and File System Abstractions
//!
//! Provides platform-agnostic traits for local file access, secure credential
//! storage, and the remote folder tree that uploads are mirrored into.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// Local file system access trait
///
/// Only the read side is needed: uploads read a single file or one level of
/// a directory.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn first_bytes(fs: &dyn FileSystemAccess, path: &Path) -> Result<Bytes> {
///     let data = fs.read_file(path).await?;
///     Ok(data.slice(..16.min(data.len())))
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// List the immediate entries of a directory, in the order the
    /// platform returns them
    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Secure credential storage trait
///
/// Secrets are addressed by `(namespace, account)`, mirroring the
/// service/user pair of OS keychains:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service / libsecret
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Use platform-provided secure storage when available
/// - Never log or expose secret values
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// async fn store_token(store: &dyn SecureStore, user: &str, token: &str) -> Result<()> {
///     store.set_secret("box-sync.access-token", user, token).await
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value, replacing any previous value
    async fn set_secret(&self, namespace: &str, account: &str, value: &str) -> Result<()>;

    /// Retrieve a secret value
    ///
    /// Returns `Ok(None)` if nothing is stored under the key.
    async fn get_secret(&self, namespace: &str, account: &str) -> Result<Option<String>>;

    /// Delete a secret. Deleting a missing secret succeeds.
    async fn delete_secret(&self, namespace: &str, account: &str) -> Result<()>;
}

/// Kind of a remote item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteItemKind {
    File,
    Folder,
}

/// Reference to an item in the remote folder tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    pub kind: RemoteItemKind,
}

impl RemoteItem {
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: RemoteItemKind::Folder,
        }
    }

    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: RemoteItemKind::File,
        }
    }
}

/// Remote storage provider trait
///
/// Items are keyed by the provider's string identifiers. A name collision
/// must be reported as [`BridgeError::NameConflict`](crate::error::BridgeError::NameConflict)
/// carrying the identifier of the existing item when the provider exposes it.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Create a folder named `name` inside `parent_id`
    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<RemoteItem>;

    /// Upload a new file named `name` into `parent_id`
    async fn upload_file(&self, parent_id: &str, name: &str, content: Bytes)
        -> Result<RemoteItem>;

    /// Replace the content of an existing file
    async fn update_file_contents(
        &self,
        file_id: &str,
        name: &str,
        content: Bytes,
    ) -> Result<RemoteItem>;
}
