//! Secure Credential Storage using OS Keychain

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use tracing::debug;

/// Keyring-based secure storage implementation
///
/// Uses platform-specific secure storage:
/// - macOS: Keychain
/// - Windows: Credential Manager (DPAPI)
/// - Linux: Secret Service (libsecret)
///
/// The namespace is used as the keyring service and the account as the
/// keyring user, so `("box-sync.access-token", "alice")` shows up in the OS
/// credential manager under service `box-sync.access-token`.
#[derive(Debug, Default, Clone)]
pub struct KeyringSecureStore;

impl KeyringSecureStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(namespace: &str, account: &str) -> Result<Entry> {
        Entry::new(namespace, account).map_err(Self::map_keyring_error)
    }

    /// Convert keyring error to BridgeError
    fn map_keyring_error(e: keyring::Error) -> BridgeError {
        match e {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                BridgeError::NotAvailable(format!("Keyring unavailable: {}", e))
            }
            other => BridgeError::OperationFailed(format!("Keyring error: {}", other)),
        }
    }
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn set_secret(&self, namespace: &str, account: &str, value: &str) -> Result<()> {
        let entry = Self::entry(namespace, account)?;
        entry.set_password(value).map_err(Self::map_keyring_error)?;

        debug!(namespace, account, "Stored secret in keyring");
        Ok(())
    }

    async fn get_secret(&self, namespace: &str, account: &str) -> Result<Option<String>> {
        let entry = Self::entry(namespace, account)?;

        match entry.get_password() {
            Ok(value) => {
                debug!(namespace, account, "Retrieved secret from keyring");
                Ok(Some(value))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(namespace, account, "Secret not found in keyring");
                Ok(None)
            }
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }

    async fn delete_secret(&self, namespace: &str, account: &str) -> Result<()> {
        let entry = Self::entry(namespace, account)?;

        match entry.delete_credential() {
            Ok(_) => {
                debug!(namespace, account, "Deleted secret from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!(namespace, account, "Secret not found (already deleted)");
                Ok(())
            }
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }
}
