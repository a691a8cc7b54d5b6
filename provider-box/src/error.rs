//! Error types for the Box provider

use bridge_traits::error::BridgeError;
use core_auth::AuthError;
use thiserror::Error;

/// Box error code that signals a name collision in the target folder.
/// Any other `409` code, such as a generic `conflict`, is an API error.
pub const NAME_CONFLICT_CODE: &str = "item_name_in_use";

/// Box provider errors
#[derive(Error, Debug)]
pub enum BoxError {
    /// An item with the same name already exists in the target folder
    #[error("Box item name already in use (code: {code})")]
    NameConflict {
        code: String,
        conflicting_id: Option<String>,
    },

    /// API request returned any other error
    #[error("Box API error (status {status_code}): {message}")]
    ApiError {
        status_code: u16,
        code: Option<String>,
        message: String,
    },

    /// Obtaining or renewing the access token failed
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Box operations
pub type Result<T> = std::result::Result<T, BoxError>;

impl From<BoxError> for BridgeError {
    fn from(error: BoxError) -> Self {
        match error {
            BoxError::NameConflict {
                code,
                conflicting_id,
            } => BridgeError::NameConflict {
                code,
                conflicting_id,
            },
            BoxError::ApiError {
                status_code,
                code,
                message,
            } => BridgeError::RemoteApi {
                status: status_code,
                code,
                message,
            },
            BoxError::Auth(e) => {
                BridgeError::OperationFailed(format!("Authentication failed: {}", e))
            }
            BoxError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            BoxError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoxError::ApiError {
            status_code: 404,
            code: Some("not_found".to_string()),
            message: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "Box API error (status 404): Not Found");

        let err = BoxError::NameConflict {
            code: "item_name_in_use".to_string(),
            conflicting_id: Some("12345".to_string()),
        };
        assert!(err.to_string().contains("item_name_in_use"));
    }

    #[test]
    fn test_conversion_to_bridge_error() {
        let bridge: BridgeError = BoxError::NameConflict {
            code: "item_name_in_use".to_string(),
            conflicting_id: Some("12345".to_string()),
        }
        .into();
        assert_eq!(bridge.conflicting_id(), Some("12345"));

        let bridge: BridgeError = BoxError::ApiError {
            status_code: 403,
            code: Some("access_denied_insufficient_permissions".to_string()),
            message: "denied".to_string(),
        }
        .into();
        assert!(matches!(bridge, BridgeError::RemoteApi { status: 403, .. }));

        let bridge: BridgeError = BoxError::Auth(AuthError::NotAuthenticated).into();
        assert!(matches!(bridge, BridgeError::OperationFailed(_)));
    }
}
