use thiserror::Error;

/// Failures while setting up the box-sync runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid endpoint, user id or logging setting
    #[error("Invalid box-sync configuration: {0}")]
    Config(String),

    /// A bridge implementation the runtime needs was not supplied
    #[error("No {capability} bridge available: {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_piece() {
        let err = Error::Config("api_base is not a URL".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid box-sync configuration: api_base is not a URL"
        );

        let err = Error::CapabilityMissing {
            capability: "SecureStore".to_string(),
            message: "keychain unreachable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No SecureStore bridge available: keychain unreachable"
        );
    }
}
