//! Secure Credential Storage
//!
//! Persists the Box application credentials and the OAuth token pair in the
//! platform secure store, one slot per [`UserId`].
//!
//! ## Layout
//!
//! | Namespace | Value |
//! |-----------|-------|
//! | `box-sync.client-id` | Box application client id |
//! | `box-sync.client-secret` | Box application client secret |
//! | `box-sync.access-token` | Current access token |
//! | `box-sync.refresh-token` | Current refresh token |
//!
//! The user id is the account half of every key. Values are stored as plain
//! strings; no secret value is ever logged.

use crate::error::{AuthError, Result};
use crate::types::{ClientCredentials, OAuthTokens, UserId};
use bridge_traits::storage::SecureStore;
use bridge_traits::BridgeError;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const CLIENT_ID_NAMESPACE: &str = "box-sync.client-id";
pub const CLIENT_SECRET_NAMESPACE: &str = "box-sync.client-secret";
pub const ACCESS_TOKEN_NAMESPACE: &str = "box-sync.access-token";
pub const REFRESH_TOKEN_NAMESPACE: &str = "box-sync.refresh-token";

const ALL_NAMESPACES: [&str; 4] = [
    CLIENT_ID_NAMESPACE,
    CLIENT_SECRET_NAMESPACE,
    ACCESS_TOKEN_NAMESPACE,
    REFRESH_TOKEN_NAMESPACE,
];

/// Typed access to the per-user secrets.
#[derive(Clone)]
pub struct CredentialStore {
    secure_store: Arc<dyn SecureStore>,
}

impl CredentialStore {
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        Self { secure_store }
    }

    /// Load the client credentials, if both halves are stored.
    pub async fn client_credentials(&self, user_id: &UserId) -> Result<Option<ClientCredentials>> {
        let client_id = self.get(CLIENT_ID_NAMESPACE, user_id).await?;
        let client_secret = self.get(CLIENT_SECRET_NAMESPACE, user_id).await?;

        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok(Some(ClientCredentials::new(id, secret))),
            (None, None) => Ok(None),
            _ => {
                warn!(user_id = %user_id, "Client credentials are incomplete");
                Ok(None)
            }
        }
    }

    pub async fn store_client_credentials(
        &self,
        user_id: &UserId,
        credentials: &ClientCredentials,
    ) -> Result<()> {
        self.set(CLIENT_ID_NAMESPACE, user_id, &credentials.client_id)
            .await?;
        self.set(CLIENT_SECRET_NAMESPACE, user_id, &credentials.client_secret)
            .await?;

        info!(user_id = %user_id, "Stored client credentials");
        Ok(())
    }

    /// Load the stored token pair.
    ///
    /// An access token without a refresh token cannot be renewed, so that
    /// case is treated as no tokens at all.
    pub async fn tokens(&self, user_id: &UserId) -> Result<Option<OAuthTokens>> {
        let Some(access_token) = self.get(ACCESS_TOKEN_NAMESPACE, user_id).await? else {
            debug!(user_id = %user_id, "No stored access token");
            return Ok(None);
        };

        match self.get(REFRESH_TOKEN_NAMESPACE, user_id).await? {
            Some(refresh_token) => Ok(Some(OAuthTokens::new(access_token, refresh_token, None))),
            None => {
                warn!(
                    user_id = %user_id,
                    "Stored access token has no refresh token; authorization required"
                );
                Ok(None)
            }
        }
    }

    pub async fn store_tokens(&self, user_id: &UserId, tokens: &OAuthTokens) -> Result<()> {
        self.set(ACCESS_TOKEN_NAMESPACE, user_id, &tokens.access_token)
            .await?;
        self.set(REFRESH_TOKEN_NAMESPACE, user_id, &tokens.refresh_token)
            .await?;

        debug!(user_id = %user_id, "Stored OAuth tokens");
        Ok(())
    }

    /// Delete every secret stored for the user. Missing entries are ignored.
    pub async fn forget(&self, user_id: &UserId) -> Result<()> {
        for namespace in ALL_NAMESPACES {
            self.secure_store
                .delete_secret(namespace, user_id.as_str())
                .await
                .map_err(storage_error)?;
        }

        info!(user_id = %user_id, "Removed stored credentials");
        Ok(())
    }

    async fn get(&self, namespace: &str, user_id: &UserId) -> Result<Option<String>> {
        self.secure_store
            .get_secret(namespace, user_id.as_str())
            .await
            .map_err(storage_error)
    }

    async fn set(&self, namespace: &str, user_id: &UserId, value: &str) -> Result<()> {
        self.secure_store
            .set_secret(namespace, user_id.as_str(), value)
            .await
            .map_err(storage_error)
    }
}

fn storage_error(e: BridgeError) -> AuthError {
    warn!(error = %e, "Secure store operation failed");
    AuthError::SecureStorageUnavailable(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockSecureStore {
        data: Mutex<HashMap<(String, String), String>>,
    }

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, namespace: &str, account: &str, value: &str) -> BridgeResult<()> {
            self.data
                .lock()
                .await
                .insert((namespace.to_string(), account.to_string()), value.to_string());
            Ok(())
        }

        async fn get_secret(&self, namespace: &str, account: &str) -> BridgeResult<Option<String>> {
            Ok(self
                .data
                .lock()
                .await
                .get(&(namespace.to_string(), account.to_string()))
                .cloned())
        }

        async fn delete_secret(&self, namespace: &str, account: &str) -> BridgeResult<()> {
            self.data
                .lock()
                .await
                .remove(&(namespace.to_string(), account.to_string()));
            Ok(())
        }
    }

    struct FailingSecureStore;

    #[async_trait]
    impl SecureStore for FailingSecureStore {
        async fn set_secret(&self, _ns: &str, _account: &str, _value: &str) -> BridgeResult<()> {
            Err(BridgeError::NotAvailable("locked".to_string()))
        }

        async fn get_secret(&self, _ns: &str, _account: &str) -> BridgeResult<Option<String>> {
            Err(BridgeError::NotAvailable("locked".to_string()))
        }

        async fn delete_secret(&self, _ns: &str, _account: &str) -> BridgeResult<()> {
            Err(BridgeError::NotAvailable("locked".to_string()))
        }
    }

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_client_credentials_round_trip() {
        let secure_store = Arc::new(MockSecureStore::default());
        let store = CredentialStore::new(secure_store.clone());
        let alice = user("alice");

        assert!(store.client_credentials(&alice).await.unwrap().is_none());

        store
            .store_client_credentials(&alice, &ClientCredentials::new("cid", "csecret"))
            .await
            .unwrap();

        let loaded = store.client_credentials(&alice).await.unwrap().unwrap();
        assert_eq!(loaded, ClientCredentials::new("cid", "csecret"));

        let raw = secure_store
            .get_secret(CLIENT_SECRET_NAMESPACE, "alice")
            .await
            .unwrap();
        assert_eq!(raw.as_deref(), Some("csecret"));
    }

    #[tokio::test]
    async fn test_tokens_are_scoped_per_user() {
        let store = CredentialStore::new(Arc::new(MockSecureStore::default()));
        let alice = user("alice");
        let bob = user("bob");

        store
            .store_tokens(&alice, &OAuthTokens::new("A1", "R1", Some(3600)))
            .await
            .unwrap();

        let loaded = store.tokens(&alice).await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "A1");
        assert_eq!(loaded.refresh_token, "R1");
        assert!(loaded.expires_at.is_none());

        assert!(store.tokens(&bob).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_values_are_stored_verbatim() {
        let store = CredentialStore::new(Arc::new(MockSecureStore::default()));
        let alice = user("alice");

        let cases = [
            ("", "R"),
            ("ключ-доступа ✓", "刷新トークン"),
            ("  A1  ", "\tR1 \n"),
        ];

        for (access, refresh) in cases {
            store
                .store_tokens(&alice, &OAuthTokens::new(access, refresh, None))
                .await
                .unwrap();

            let loaded = store.tokens(&alice).await.unwrap().unwrap();
            assert_eq!(loaded.access_token, access);
            assert_eq!(loaded.refresh_token, refresh);
        }
    }

    #[tokio::test]
    async fn test_access_token_without_refresh_token_is_ignored() {
        let secure_store = Arc::new(MockSecureStore::default());
        secure_store
            .set_secret(ACCESS_TOKEN_NAMESPACE, "alice", "A1")
            .await
            .unwrap();

        let store = CredentialStore::new(secure_store);
        assert!(store.tokens(&user("alice")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_forget_removes_everything_and_is_idempotent() {
        let secure_store = Arc::new(MockSecureStore::default());
        let store = CredentialStore::new(secure_store.clone());
        let alice = user("alice");

        store
            .store_client_credentials(&alice, &ClientCredentials::new("cid", "csecret"))
            .await
            .unwrap();
        store
            .store_tokens(&alice, &OAuthTokens::new("A1", "R1", None))
            .await
            .unwrap();

        store.forget(&alice).await.unwrap();
        store.forget(&alice).await.unwrap();

        assert!(secure_store.data.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_storage_unavailable() {
        let store = CredentialStore::new(Arc::new(FailingSecureStore));

        assert!(matches!(
            store.client_credentials(&user("alice")).await,
            Err(AuthError::SecureStorageUnavailable(_))
        ));
    }
}
