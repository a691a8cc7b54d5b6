//! OAuth 2.0 Authorization Code Flow
//!
//! This module implements the RFC 6749 authorization code grant as Box uses
//! it: the user visits an authorization URL, grants access, and pastes the
//! resulting code back into the terminal.
//!
//! # Overview
//!
//! The OAuth flow manager handles:
//! - Building authorization URLs with a CSRF `state`
//! - Extracting the code from a pasted redirect URL
//! - Exchanging authorization codes for tokens
//! - Refreshing access tokens
//!
//! # Security
//!
//! - Generates a cryptographically secure random state
//! - Validates the state when the redirect URL is pasted
//! - Never logs sensitive values (tokens, codes, client secrets)
//!
//! # Example
//!
//! ```no_run
//! use core_auth::oauth::{OAuthConfig, OAuthFlowManager};
//! use core_auth::ClientCredentials;
//! use core_runtime::BoxEndpoints;
//! use std::sync::Arc;
//!
//! # async fn example() -> core_auth::Result<()> {
//! # use bridge_traits::http::HttpClient;
//! # let http_client: Arc<dyn HttpClient> = todo!();
//! let credentials = ClientCredentials::new("client-id", "client-secret");
//! let config = OAuthConfig::from_endpoints(&credentials, &BoxEndpoints::default());
//!
//! let flow_manager = OAuthFlowManager::new(config, http_client);
//! let (auth_url, state) = flow_manager.build_auth_url()?;
//! // Show auth_url, read what the user pastes back...
//! # let pasted = "";
//! let code = state.extract_code(pasted)?;
//! let tokens = flow_manager.exchange_code(&code).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::{ClientCredentials, OAuthTokens};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use bytes::Bytes;
use core_runtime::BoxEndpoints;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// OAuth 2.0 client configuration.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI registered for the Box application
    pub redirect_uri: String,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
}

impl OAuthConfig {
    pub fn from_endpoints(credentials: &ClientCredentials, endpoints: &BoxEndpoints) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            redirect_uri: endpoints.redirect_uri.clone(),
            auth_url: endpoints.auth_url.clone(),
            token_url: endpoints.token_url.clone(),
        }
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &"[REDACTED]")
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// State of one pending authorization.
///
/// Holds the random `state` sent with the authorization URL so the
/// redirect can be checked against it.
#[derive(Debug, Clone)]
pub struct AuthorizationState {
    state: String,
}

impl AuthorizationState {
    /// Generate a fresh 16-byte state, URL-safe base64 without padding.
    pub fn new() -> Self {
        let mut state_bytes = [0u8; 16];
        rand::thread_rng().fill(&mut state_bytes);

        Self {
            state: URL_SAFE_NO_PAD.encode(state_bytes),
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Extract the authorization code from what the user pasted.
    ///
    /// Accepts either the bare code or the full redirect URL. A redirect URL
    /// must carry a `code` parameter, and its `state`, when present, must
    /// match this authorization.
    pub fn extract_code(&self, pasted: &str) -> Result<String> {
        let pasted = pasted.trim();
        if pasted.is_empty() {
            return Err(AuthError::InvalidAuthCode(
                "no authorization code entered".to_string(),
            ));
        }

        let Ok(url) = Url::parse(pasted) else {
            return Ok(pasted.to_string());
        };

        let mut code = None;
        let mut state = None;
        let mut error = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Err(AuthError::InvalidAuthCode(format!(
                "authorization was refused: {}",
                error
            )));
        }

        if let Some(actual) = state {
            if actual != self.state {
                warn!("OAuth state mismatch in pasted redirect URL");
                return Err(AuthError::StateMismatch {
                    expected: self.state.clone(),
                    actual,
                });
            }
        }

        code.filter(|c| !c.is_empty()).ok_or_else(|| {
            AuthError::InvalidAuthCode("redirect URL has no 'code' parameter".to_string())
        })
    }
}

impl Default for AuthorizationState {
    fn default() -> Self {
        Self::new()
    }
}

/// OAuth 2.0 flow manager.
pub struct OAuthFlowManager {
    config: OAuthConfig,
    http_client: Arc<dyn HttpClient>,
}

impl OAuthFlowManager {
    pub fn new(config: OAuthConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Build the authorization URL the user must visit.
    ///
    /// # Returns
    ///
    /// A tuple of (authorization_url, authorization_state)
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization URL cannot be parsed.
    #[instrument(skip(self))]
    pub fn build_auth_url(&self) -> Result<(String, AuthorizationState)> {
        let auth_state = AuthorizationState::new();

        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::Other(format!("Invalid auth URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("state", auth_state.state());

        debug!("Built authorization URL");

        Ok((url.to_string(), auth_state))
    }

    /// Exchange an authorization code for OAuth tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The authorization code is invalid or expired
    /// - Network errors occur
    /// - The token endpoint returns an error
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthTokens> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .http_client
            .execute_with_retry(self.token_request(&params)?, RetryPolicy::no_retry())
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        if !response.is_success() {
            let status = response.status;
            let error_body = response
                .text()
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            warn!(
                status = status,
                error = %error_body,
                "Token exchange failed while exchanging authorization code"
            );

            return Err(AuthError::InvalidAuthCode(format!(
                "Token endpoint returned {}: {}",
                status, error_body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::Other(format!("Failed to parse token response: {}", e)))?;

        let refresh_token = token_response.refresh_token.ok_or_else(|| {
            AuthError::InvalidAuthCode("Token endpoint returned no refresh token".to_string())
        })?;

        info!(
            expires_in = token_response.expires_in,
            "Exchanged authorization code for tokens"
        );

        Ok(OAuthTokens::new(
            token_response.access_token,
            refresh_token,
            Some(token_response.expires_in),
        ))
    }

    /// Refresh an access token using a refresh token.
    ///
    /// Box rotates refresh tokens, so the returned set usually carries a new
    /// refresh token; when the response omits one the old one is kept.
    ///
    /// The request is sent once. Any non-2xx answer is a refresh failure.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<OAuthTokens> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        debug!("Refreshing access token");

        let response = self
            .http_client
            .execute_with_retry(self.token_request(&params)?, RetryPolicy::no_retry())
            .await
            .map_err(|e| AuthError::TokenRefreshFailed(e.to_string()))?;

        if !response.is_success() {
            let status = response.status;
            let error_body = response
                .text()
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            warn!(
                status = status,
                error = %error_body,
                "Token refresh failed"
            );

            return Err(AuthError::TokenRefreshFailed(format!(
                "Token endpoint returned {}: {}",
                status, error_body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::Other(format!("Failed to parse token response: {}", e)))?;

        info!(
            expires_in = token_response.expires_in,
            "Refreshed access token"
        );

        Ok(OAuthTokens::new(
            token_response.access_token,
            token_response
                .refresh_token
                .unwrap_or_else(|| refresh_token.to_string()),
            Some(token_response.expires_in),
        ))
    }

    fn token_request(&self, params: &[(&str, &str)]) -> Result<HttpRequest> {
        let encoded_body = serde_urlencoded::to_string(params)
            .map_err(|e| AuthError::Other(format!("Failed to encode token request: {}", e)))?;

        Ok(
            HttpRequest::new(HttpMethod::Post, self.config.token_url.clone())
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Bytes::from(encoded_body)),
        )
    }
}

/// Token response from the Box token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600 // Default to 1 hour if not specified
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::HttpResponse;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn test_config() -> OAuthConfig {
        OAuthConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost".to_string(),
            auth_url: "https://account.box.com/api/oauth2/authorize".to_string(),
            token_url: "https://api.box.com/oauth2/token".to_string(),
        }
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn body_text(request: &HttpRequest) -> String {
        request
            .body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }

    #[test]
    fn test_authorization_state_is_random() {
        let a = AuthorizationState::new();
        let b = AuthorizationState::new();

        assert_eq!(a.state().len(), 22);
        assert_ne!(a.state(), b.state());
        assert!(!a.state().contains('='));
    }

    #[test]
    fn test_build_auth_url() {
        let manager = OAuthFlowManager::new(test_config(), Arc::new(MockHttpClient::new()));
        let (url, state) = manager.build_auth_url().unwrap();

        assert!(url.starts_with("https://account.box.com/api/oauth2/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost"));
        assert!(url.contains(&format!("state={}", state.state())));
    }

    #[test]
    fn test_build_auth_url_invalid_url() {
        let mut config = test_config();
        config.auth_url = "not a valid url".to_string();

        let manager = OAuthFlowManager::new(config, Arc::new(MockHttpClient::new()));
        assert!(manager.build_auth_url().is_err());
    }

    #[test]
    fn test_extract_code_bare() {
        let state = AuthorizationState::new();
        assert_eq!(state.extract_code("  abc123 \n").unwrap(), "abc123");
        assert!(matches!(
            state.extract_code("   "),
            Err(AuthError::InvalidAuthCode(_))
        ));
    }

    #[test]
    fn test_extract_code_from_redirect_url() {
        let state = AuthorizationState::new();
        let pasted = format!("http://localhost/?state={}&code=xyz789", state.state());

        assert_eq!(state.extract_code(&pasted).unwrap(), "xyz789");
    }

    #[test]
    fn test_extract_code_rejects_foreign_state() {
        let state = AuthorizationState::new();
        let result = state.extract_code("http://localhost/?state=forged&code=xyz789");

        match result {
            Err(AuthError::StateMismatch { actual, .. }) => assert_eq!(actual, "forged"),
            other => panic!("expected state mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_code_reports_denied_access() {
        let state = AuthorizationState::new();
        let result = state.extract_code("http://localhost/?error=access_denied");

        assert!(matches!(result, Err(AuthError::InvalidAuthCode(_))));
    }

    #[tokio::test]
    async fn test_exchange_code_posts_form() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                let body = body_text(req);
                req.url == "https://api.box.com/oauth2/token"
                    && body.contains("grant_type=authorization_code")
                    && body.contains("code=the-code")
                    && body.contains("client_secret=test-secret")
            })
            .times(1)
            .returning(|_| {
                Ok(json_response(
                    200,
                    r#"{"access_token":"A1","refresh_token":"R1","expires_in":3600,"token_type":"bearer"}"#,
                ))
            });

        let manager = OAuthFlowManager::new(test_config(), Arc::new(http));
        let tokens = manager.exchange_code("the-code").await.unwrap();

        assert_eq!(tokens.access_token, "A1");
        assert_eq!(tokens.refresh_token, "R1");
        assert!(tokens.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(1).returning(|_| {
            Ok(json_response(
                400,
                r#"{"error":"invalid_grant","error_description":"Auth code doesn't exist or is invalid"}"#,
            ))
        });

        let manager = OAuthFlowManager::new(test_config(), Arc::new(http));
        let result = manager.exchange_code("stale").await;

        match result {
            Err(AuthError::InvalidAuthCode(message)) => assert!(message.contains("invalid_grant")),
            other => panic!("expected invalid auth code, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refresh_keeps_old_refresh_token_when_omitted() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| body_text(req).contains("grant_type=refresh_token"))
            .times(1)
            .returning(|_| Ok(json_response(200, r#"{"access_token":"A2"}"#)));

        let manager = OAuthFlowManager::new(test_config(), Arc::new(http));
        let tokens = manager.refresh_access_token("R1").await.unwrap();

        assert_eq!(tokens.access_token, "A2");
        assert_eq!(tokens.refresh_token, "R1");
    }

    #[tokio::test]
    async fn test_refresh_server_error_is_not_retried() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(503, "unavailable")));

        let manager = OAuthFlowManager::new(test_config(), Arc::new(http));
        let result = manager.refresh_access_token("R2").await;

        match result {
            Err(AuthError::TokenRefreshFailed(message)) => {
                assert!(message.contains("503"));
                assert!(message.contains("unavailable"));
            }
            other => panic!("expected refresh failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refresh_client_error_is_not_retried() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(400, r#"{"error":"invalid_grant"}"#)));

        let manager = OAuthFlowManager::new(test_config(), Arc::new(http));
        assert!(matches!(
            manager.refresh_access_token("revoked").await,
            Err(AuthError::TokenRefreshFailed(_))
        ));
    }

    #[test]
    fn test_token_response_deserialization_minimal() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "token"}"#).unwrap();
        assert_eq!(response.access_token, "token");
        assert_eq!(response.refresh_token, None);
        assert_eq!(response.expires_in, 3600);
    }
}
