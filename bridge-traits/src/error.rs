use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The remote service refused to create an item because its name is taken.
    #[error("Remote item name already in use (code: {code})")]
    NameConflict {
        code: String,
        conflicting_id: Option<String>,
    },

    #[error("Remote API error (status {status}): {message}")]
    RemoteApi {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Interaction cancelled: {0}")]
    InteractionCancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Identifier of the existing item that caused a name conflict, if any.
    pub fn conflicting_id(&self) -> Option<&str> {
        match self {
            BridgeError::NameConflict { conflicting_id, .. } => conflicting_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_name_conflict(&self) -> bool {
        matches!(self, BridgeError::NameConflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_id() {
        let error = BridgeError::NameConflict {
            code: "item_name_in_use".to_string(),
            conflicting_id: Some("12345".to_string()),
        };

        assert!(error.is_name_conflict());
        assert_eq!(error.conflicting_id(), Some("12345"));
    }

    #[test]
    fn test_other_errors_have_no_conflicting_id() {
        let error = BridgeError::RemoteApi {
            status: 500,
            code: None,
            message: "boom".to_string(),
        };

        assert!(!error.is_name_conflict());
        assert_eq!(error.conflicting_id(), None);
    }
}
