//! Authenticated OAuth session
//!
//! An [`OAuthSession`] owns the current token pair and renews it on demand.
//! API clients depend on the narrower [`TokenSource`] trait so they can be
//! driven by a fixed token in tests.

use crate::error::{AuthError, Result};
use crate::oauth::OAuthFlowManager;
use crate::types::OAuthTokens;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Supplier of bearer tokens for API requests
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current access token, renewed first when it is known to be expired
    async fn access_token(&self) -> Result<String>;

    /// Renew unconditionally, typically after the API answered `401`
    async fn refresh(&self) -> Result<String>;
}

/// Callback invoked after the session renews its tokens
#[async_trait]
pub trait TokenRefreshListener: Send + Sync {
    async fn on_tokens_refreshed(&self, tokens: &OAuthTokens) -> Result<()>;
}

/// OAuth session for one user.
///
/// Starts either authorized (tokens loaded from storage) or pending, in
/// which case [`authorize_with_code`](Self::authorize_with_code) must run
/// before any token is handed out.
pub struct OAuthSession {
    flow: OAuthFlowManager,
    tokens: RwLock<Option<OAuthTokens>>,
    listener: Option<Arc<dyn TokenRefreshListener>>,
}

impl OAuthSession {
    pub fn authorized(
        flow: OAuthFlowManager,
        tokens: OAuthTokens,
        listener: Option<Arc<dyn TokenRefreshListener>>,
    ) -> Self {
        Self {
            flow,
            tokens: RwLock::new(Some(tokens)),
            listener,
        }
    }

    pub fn pending(flow: OAuthFlowManager, listener: Option<Arc<dyn TokenRefreshListener>>) -> Self {
        Self {
            flow,
            tokens: RwLock::new(None),
            listener,
        }
    }

    pub fn flow(&self) -> &OAuthFlowManager {
        &self.flow
    }

    pub async fn is_authorized(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// Exchange an authorization code and adopt the resulting tokens.
    ///
    /// The listener is not invoked; the caller owns persisting the first
    /// token pair.
    #[instrument(skip(self, code))]
    pub async fn authorize_with_code(&self, code: &str) -> Result<OAuthTokens> {
        let tokens = self.flow.exchange_code(code).await?;
        *self.tokens.write().await = Some(tokens.clone());

        info!("Session authorized");
        Ok(tokens)
    }

    /// Snapshot of the current tokens
    pub async fn tokens(&self) -> Option<OAuthTokens> {
        self.tokens.read().await.clone()
    }
}

#[async_trait]
impl TokenSource for OAuthSession {
    async fn access_token(&self) -> Result<String> {
        {
            let guard = self.tokens.read().await;
            let tokens = guard.as_ref().ok_or(AuthError::NotAuthenticated)?;
            if !tokens.is_expired() {
                return Ok(tokens.access_token.clone());
            }
        }

        debug!("Access token expired, refreshing before use");
        self.refresh().await
    }

    #[instrument(skip(self))]
    async fn refresh(&self) -> Result<String> {
        let mut guard = self.tokens.write().await;
        let current = guard.as_ref().ok_or(AuthError::NotAuthenticated)?;

        let renewed = self
            .flow
            .refresh_access_token(&current.refresh_token)
            .await?;
        *guard = Some(renewed.clone());
        drop(guard);

        if let Some(listener) = &self.listener {
            if let Err(e) = listener.on_tokens_refreshed(&renewed).await {
                warn!(error = %e, "Token refresh listener failed");
                return Err(e);
            }
        }

        Ok(renewed.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::OAuthConfig;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
    use bytes::Bytes;
    use chrono::{Duration, Utc};
    use mockall::mock;
    use std::collections::HashMap;
    use std::sync::Mutex;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        seen: Mutex<Vec<OAuthTokens>>,
    }

    #[async_trait]
    impl TokenRefreshListener for RecordingListener {
        async fn on_tokens_refreshed(&self, tokens: &OAuthTokens) -> Result<()> {
            self.seen.lock().unwrap().push(tokens.clone());
            Ok(())
        }
    }

    fn flow(http: MockHttpClient) -> OAuthFlowManager {
        OAuthFlowManager::new(
            OAuthConfig {
                client_id: "cid".to_string(),
                client_secret: "csecret".to_string(),
                redirect_uri: "http://localhost".to_string(),
                auth_url: "https://account.box.com/api/oauth2/authorize".to_string(),
                token_url: "https://api.box.com/oauth2/token".to_string(),
            },
            Arc::new(http),
        )
    }

    fn token_response(access: &str, refresh: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(format!(
                r#"{{"access_token":"{}","refresh_token":"{}","expires_in":3600}}"#,
                access, refresh
            )),
        }
    }

    #[tokio::test]
    async fn test_pending_session_is_not_authenticated() {
        let session = OAuthSession::pending(flow(MockHttpClient::new()), None);

        assert!(!session.is_authorized().await);
        assert!(matches!(
            session.access_token().await,
            Err(AuthError::NotAuthenticated)
        ));
        assert!(matches!(
            session.refresh().await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_loaded_tokens_are_used_without_refresh() {
        let session = OAuthSession::authorized(
            flow(MockHttpClient::new()),
            OAuthTokens::new("A1", "R1", None),
            None,
        );

        assert_eq!(session.access_token().await.unwrap(), "A1");
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_listener_notified() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(token_response("A2", "R2")));

        let listener = Arc::new(RecordingListener::default());
        let expired = OAuthTokens {
            access_token: "A1".to_string(),
            refresh_token: "R1".to_string(),
            expires_at: Some(Utc::now() - Duration::minutes(1)),
        };
        let session = OAuthSession::authorized(flow(http), expired, Some(listener.clone()));

        assert_eq!(session.access_token().await.unwrap(), "A2");
        assert_eq!(session.access_token().await.unwrap(), "A2");

        let seen = listener.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].refresh_token, "R2");
    }

    #[tokio::test]
    async fn test_authorize_with_code_does_not_notify_listener() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(token_response("A1", "R1")));

        let listener = Arc::new(RecordingListener::default());
        let session = OAuthSession::pending(flow(http), Some(listener.clone()));

        let tokens = session.authorize_with_code("code").await.unwrap();
        assert_eq!(tokens.access_token, "A1");
        assert!(session.is_authorized().await);
        assert!(listener.seen.lock().unwrap().is_empty());
    }
}
