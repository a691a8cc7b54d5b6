//! # Credential Manager
//!
//! Turns a local user id into an authenticated Box session.
//!
//! ## Overview
//!
//! `CredentialManager::authenticate` walks through:
//! 1. Consent to use the OS keychain (skipped when warnings are suppressed)
//! 2. One-time entry of the Box application client id and secret
//! 3. Reuse of stored tokens, or the out-of-band authorization code flow
//!
//! The returned [`OAuthSession`] persists every renewed token pair back to
//! the secure store through a [`TokenRefreshListener`].
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{CredentialManager, UserId};
//! use core_runtime::SyncConfig;
//!
//! # async fn example(config: SyncConfig) -> core_auth::Result<()> {
//! let manager = CredentialManager::from_config(&config);
//! let user = UserId::new("alice")?;
//!
//! match manager.authenticate(&user, false).await? {
//!     Some(session) => { /* hand the session to an API client */ }
//!     None => { /* consent declined */ }
//! }
//! # Ok(())
//! # }
//! ```

use crate::credential_store::CredentialStore;
use crate::error::{AuthError, Result};
use crate::oauth::{OAuthConfig, OAuthFlowManager};
use crate::session::{OAuthSession, TokenRefreshListener};
use crate::types::{ClientCredentials, OAuthTokens, UserId};
use async_trait::async_trait;
use bridge_traits::{http::HttpClient, InteractionProvider, SecureStore};
use core_runtime::logging::redact_if_sensitive;
use core_runtime::{BoxEndpoints, SyncConfig};
use std::sync::Arc;
use tracing::{info, instrument};

pub const CONSENT_PROMPT: &str = "WARNING: This tool accesses and stores info \n\
     \x20        in your local keychain.\n\n\
     Do you want to proceed?";

pub const AUTHENTICATION_FAILED: &str = "\nBox authentication failed!\n";

pub const DEVELOPER_ACCOUNT_HINT: &str = "You need to have a Box Developer account to do this.\n\
     Create an app with OAuth 2.0 (user authentication) in the Box Developer Console\n\
     and set its redirect URI to http://localhost.";

const CLIENT_ID_PROMPT: &str = "Paste Client ID Here";
const CLIENT_SECRET_PROMPT: &str = "Paste Client Secret Here";

const AUTHORIZE_STEP_ONE: &str = "To authorize access to your Box account please do the following:\n\n\
     1. Navigate to the following URL in a browser:";
const AUTHORIZE_STEP_TWO: &str = "2. Select 'Grant Access to Box'.\n";
const AUTHORIZE_STEP_THREE: &str = "3. Extract the access code from the resulting URL \
     (in your browser's address bar, the string after 'code='), or copy the whole URL.\n";
const AUTHORIZE_CODE_PROMPT: &str = "4. Paste it here";

/// Obtains, stores and refreshes Box credentials for local users.
pub struct CredentialManager {
    store: CredentialStore,
    http_client: Arc<dyn HttpClient>,
    interaction: Arc<dyn InteractionProvider>,
    endpoints: BoxEndpoints,
}

impl CredentialManager {
    pub fn new(
        secure_store: Arc<dyn SecureStore>,
        http_client: Arc<dyn HttpClient>,
        interaction: Arc<dyn InteractionProvider>,
        endpoints: BoxEndpoints,
    ) -> Self {
        Self {
            store: CredentialStore::new(secure_store),
            http_client,
            interaction,
            endpoints,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.secure_store.clone(),
            config.http_client.clone(),
            config.interaction.clone(),
            config.endpoints.clone(),
        )
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Produce an authenticated session for `user_id`.
    ///
    /// Returns `Ok(None)` when the user declines the keychain consent
    /// prompt; nothing is read from or written to the secure store in that
    /// case. Every other failure is an error.
    #[instrument(skip(self, user_id), fields(user_id = %redact_if_sensitive("user_id", user_id.as_str())))]
    pub async fn authenticate(
        &self,
        user_id: &UserId,
        suppress_warning: bool,
    ) -> Result<Option<Arc<OAuthSession>>> {
        if !suppress_warning && !self.confirm(CONSENT_PROMPT).await? {
            self.interaction.notify(AUTHENTICATION_FAILED);
            info!("Keychain consent declined");
            return Ok(None);
        }

        let credentials = match self.store.client_credentials(user_id).await? {
            Some(credentials) => credentials,
            None => self.bootstrap_client_credentials(user_id).await?,
        };

        let flow = OAuthFlowManager::new(
            OAuthConfig::from_endpoints(&credentials, &self.endpoints),
            self.http_client.clone(),
        );
        let listener: Arc<dyn TokenRefreshListener> = Arc::new(PersistingListener {
            store: self.store.clone(),
            user_id: user_id.clone(),
        });

        let session = match self.store.tokens(user_id).await? {
            Some(tokens) => {
                info!("Using stored tokens");
                OAuthSession::authorized(flow, tokens, Some(listener))
            }
            None => {
                let session = OAuthSession::pending(flow, Some(listener));
                let tokens = self.authorize(&session).await?;
                self.store.store_tokens(user_id, &tokens).await?;
                info!("Authorized and stored initial tokens");
                session
            }
        };

        Ok(Some(Arc::new(session)))
    }

    /// Remove every stored secret for `user_id`.
    #[instrument(skip(self, user_id), fields(user_id = %redact_if_sensitive("user_id", user_id.as_str())))]
    pub async fn forget(&self, user_id: &UserId) -> Result<()> {
        self.store.forget(user_id).await
    }

    async fn bootstrap_client_credentials(&self, user_id: &UserId) -> Result<ClientCredentials> {
        self.interaction.notify(DEVELOPER_ACCOUNT_HINT);

        let client_id = self.prompt_secret(CLIENT_ID_PROMPT).await?;
        let client_secret = self.prompt_secret(CLIENT_SECRET_PROMPT).await?;
        let credentials = ClientCredentials::new(client_id, client_secret);

        self.store
            .store_client_credentials(user_id, &credentials)
            .await?;
        Ok(credentials)
    }

    async fn authorize(&self, session: &OAuthSession) -> Result<OAuthTokens> {
        let (auth_url, auth_state) = session.flow().build_auth_url()?;

        self.interaction.notify(AUTHORIZE_STEP_ONE);
        self.interaction
            .show_authorization_url(&auth_url)
            .await
            .map_err(AuthError::Interaction)?;
        self.interaction.notify(AUTHORIZE_STEP_TWO);
        self.interaction.notify(AUTHORIZE_STEP_THREE);

        let pasted = self
            .interaction
            .prompt_authorization_code(AUTHORIZE_CODE_PROMPT)
            .await
            .map_err(AuthError::Interaction)?;
        let code = auth_state.extract_code(&pasted)?;

        session.authorize_with_code(&code).await
    }

    async fn confirm(&self, prompt: &str) -> Result<bool> {
        self.interaction
            .confirm(prompt)
            .await
            .map_err(AuthError::Interaction)
    }

    async fn prompt_secret(&self, prompt: &str) -> Result<String> {
        let value = self
            .interaction
            .prompt_secret(prompt)
            .await
            .map_err(AuthError::Interaction)?;

        if value.trim().is_empty() {
            return Err(AuthError::Other(format!("{} must not be empty", prompt)));
        }
        Ok(value.trim().to_string())
    }
}

/// Writes renewed tokens back to the secure store.
struct PersistingListener {
    store: CredentialStore,
    user_id: UserId,
}

#[async_trait]
impl TokenRefreshListener for PersistingListener {
    async fn on_tokens_refreshed(&self, tokens: &OAuthTokens) -> Result<()> {
        self.store.store_tokens(&self.user_id, tokens).await
    }
}
