use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid local path: {0:?}")]
    InvalidPath(String),

    #[error("Failed to access local path {path}: {source}")]
    LocalAccess {
        path: String,
        #[source]
        source: BridgeError,
    },

    #[error("Remote error: {0}")]
    Remote(#[from] BridgeError),

    #[error("Name conflict on {name} did not identify the existing item")]
    MissingConflictId { name: String },
}

impl SyncError {
    /// The underlying remote error, if this failure came from the provider
    pub fn remote(&self) -> Option<&BridgeError> {
        match self {
            SyncError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
