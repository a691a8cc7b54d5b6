use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Identifier of the local credential slot.
///
/// Every secret in the secure store is keyed by this value, so one machine
/// can hold credentials for several Box accounts.
///
/// # Examples
///
/// ```
/// use core_auth::UserId;
///
/// let user = UserId::new("alice").unwrap();
/// assert_eq!(user.as_str(), "alice");
/// assert!(UserId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a user id, rejecting blank values
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AuthError::InvalidUserId(
                "user id cannot be blank".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Box application credentials, entered once per user.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &"[REDACTED]")
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// OAuth 2.0 token set.
///
/// `expires_at` is only known for tokens that came straight from the token
/// endpoint; tokens loaded from the secure store have no expiry and are
/// refreshed when the API answers `401`.
///
/// # Security
///
/// Tokens should be stored securely and never logged. The `Debug`
/// implementation redacts them.
///
/// # Examples
///
/// ```
/// use core_auth::OAuthTokens;
///
/// let tokens = OAuthTokens::new("access", "refresh", Some(3600));
/// assert!(!tokens.is_expired());
///
/// let loaded = OAuthTokens::new("access", "refresh", None);
/// assert!(!loaded.is_expired());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthTokens {
    /// The access token used for API requests
    pub access_token: String,
    /// The refresh token used to obtain new access tokens
    pub refresh_token: String,
    /// When the access token expires (UTC), if known
    pub expires_at: Option<DateTime<Utc>>,
}

impl OAuthTokens {
    /// Create a new token set
    ///
    /// * `expires_in` - Seconds until the access token expires, if known
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }

    /// Check if the access token is expired or will expire within 60 seconds.
    ///
    /// Tokens with an unknown expiry are never considered expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_buffer(60)
    }

    /// Check if the access token is expired with a custom buffer
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at - Duration::seconds(buffer_seconds),
            None => false,
        }
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_blank() {
        assert!(UserId::new("").is_err());
        assert!(matches!(
            UserId::new(" \t"),
            Err(AuthError::InvalidUserId(_))
        ));
        assert_eq!(UserId::new("bob").unwrap().to_string(), "bob");
    }

    #[test]
    fn test_oauth_tokens_expiry() {
        let fresh = OAuthTokens::new("a", "r", Some(3600));
        assert!(!fresh.is_expired());

        let nearly = OAuthTokens::new("a", "r", Some(30));
        assert!(nearly.is_expired());
        assert!(!nearly.is_expired_with_buffer(0));

        let past = OAuthTokens {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Some(Utc::now() - Duration::minutes(5)),
        };
        assert!(past.is_expired_with_buffer(0));

        let unknown = OAuthTokens::new("a", "r", None);
        assert!(!unknown.is_expired_with_buffer(i64::MAX / 2));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let tokens = OAuthTokens::new("secret-access", "secret-refresh", Some(3600));
        let debug = format!("{:?}", tokens);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));

        let creds = ClientCredentials::new("cid-value", "csecret-value");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("cid-value"));
        assert!(!debug.contains("csecret-value"));
    }
}
