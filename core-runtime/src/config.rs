//! # Core Configuration Module
//!
//! Provides configuration management for the Box sync core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `SyncConfig`
//! instance that holds all dependencies and settings the core needs. It
//! enforces fail-fast validation so every required bridge is present before
//! any network or keychain access happens.
//!
//! ## Required Dependencies
//!
//! - `SecureStore` - Client credentials and token persistence
//! - `HttpClient` - OAuth and Box API requests
//! - `FileSystemAccess` - Reading local files to upload
//! - `InteractionProvider` - Consent, secret entry and progress output
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults from
//! `bridge-desktop` are injected for any bridge not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{BoxEndpoints, SyncConfig};
//!
//! let config = SyncConfig::builder()
//!     .user_id("alice")
//!     .endpoints(BoxEndpoints::from_env())
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! Without `desktop-shims`, a missing bridge yields
//! [`Error::CapabilityMissing`] naming the capability and how to supply it.

use crate::error::{Error, Result};
use bridge_traits::{FileSystemAccess, HttpClient, InteractionProvider, SecureStore};
use std::sync::Arc;
use url::Url;

pub const DEFAULT_AUTH_URL: &str = "https://account.box.com/api/oauth2/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.box.com/oauth2/token";
pub const DEFAULT_API_BASE: &str = "https://api.box.com/2.0";
pub const DEFAULT_UPLOAD_BASE: &str = "https://upload.box.com/api/2.0";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost";

pub const ENV_API_BASE: &str = "BOX_SYNC_API_BASE";
pub const ENV_UPLOAD_BASE: &str = "BOX_SYNC_UPLOAD_BASE";
pub const ENV_AUTH_URL: &str = "BOX_SYNC_AUTH_URL";
pub const ENV_TOKEN_URL: &str = "BOX_SYNC_TOKEN_URL";
pub const ENV_REDIRECT_URI: &str = "BOX_SYNC_REDIRECT_URI";

/// Box service endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxEndpoints {
    /// OAuth2 authorization page the user visits
    pub auth_url: String,
    /// OAuth2 token endpoint (code exchange and refresh)
    pub token_url: String,
    /// Content API base, e.g. `https://api.box.com/2.0`
    pub api_base: String,
    /// Upload API base, e.g. `https://upload.box.com/api/2.0`
    pub upload_base: String,
    /// Redirect URI registered for the Box application
    pub redirect_uri: String,
}

impl Default for BoxEndpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }
}

impl BoxEndpoints {
    /// Defaults overridden by the `BOX_SYNC_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            auth_url: pick(ENV_AUTH_URL, DEFAULT_AUTH_URL),
            token_url: pick(ENV_TOKEN_URL, DEFAULT_TOKEN_URL),
            api_base: pick(ENV_API_BASE, DEFAULT_API_BASE),
            upload_base: pick(ENV_UPLOAD_BASE, DEFAULT_UPLOAD_BASE),
            redirect_uri: pick(ENV_REDIRECT_URI, DEFAULT_REDIRECT_URI),
        }
    }

    /// Every endpoint must be an absolute URL
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("auth_url", &self.auth_url),
            ("token_url", &self.token_url),
            ("api_base", &self.api_base),
            ("upload_base", &self.upload_base),
            ("redirect_uri", &self.redirect_uri),
        ] {
            Url::parse(value)
                .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", name, value, e)))?;
        }
        Ok(())
    }
}

/// Core configuration for the Box sync core.
///
/// Use [`SyncConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct SyncConfig {
    /// Key of the per-user slot in the secure store
    pub user_id: String,

    pub endpoints: BoxEndpoints,

    pub http_client: Arc<dyn HttpClient>,

    pub file_system: Arc<dyn FileSystemAccess>,

    pub secure_store: Arc<dyn SecureStore>,

    pub interaction: Arc<dyn InteractionProvider>,

    /// Skip the keychain consent prompt
    pub suppress_warnings: bool,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("user_id", &self.user_id)
            .field("endpoints", &self.endpoints)
            .field("http_client", &"HttpClient { ... }")
            .field("file_system", &"FileSystemAccess { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field("interaction", &"InteractionProvider { ... }")
            .field("suppress_warnings", &self.suppress_warnings)
            .finish()
    }
}

impl SyncConfig {
    /// Creates a new builder for constructing a `SyncConfig`.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Config("User id cannot be empty".to_string()));
        }

        self.endpoints.validate()
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required for {}. \
             Desktop: enable the 'desktop-shims' feature to use the bridge-desktop default. \
             Otherwise: inject an implementation through SyncConfig::builder().",
            capability, purpose
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: e.to_string(),
    })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing("HttpClient", "OAuth and Box API requests"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Ok(Arc::new(bridge_desktop::TokioFileSystem::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Err(capability_missing("FileSystemAccess", "reading local files"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Ok(Arc::new(bridge_desktop::KeyringSecureStore::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(capability_missing("SecureStore", "credential persistence"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_interaction() -> Result<Arc<dyn InteractionProvider>> {
    Ok(Arc::new(bridge_desktop::TerminalInteraction::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_interaction() -> Result<Arc<dyn InteractionProvider>> {
    Err(capability_missing(
        "InteractionProvider",
        "consent prompts and progress output",
    ))
}

/// Builder for constructing [`SyncConfig`] instances.
#[derive(Default)]
pub struct SyncConfigBuilder {
    user_id: Option<String>,
    endpoints: Option<BoxEndpoints>,
    http_client: Option<Arc<dyn HttpClient>>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    interaction: Option<Arc<dyn InteractionProvider>>,
    suppress_warnings: bool,
}

impl SyncConfigBuilder {
    /// Sets the user id whose credentials are used (required).
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the Box endpoints. Defaults to the public Box service.
    pub fn endpoints(mut self, endpoints: BoxEndpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Sets the secure store implementation.
    ///
    /// It must provide platform-appropriate security (Keychain on macOS,
    /// Credential Manager on Windows, Secret Service on Linux).
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    pub fn interaction(mut self, interaction: Arc<dyn InteractionProvider>) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Skip the consent prompt before touching the secure store.
    ///
    /// Default: false
    pub fn suppress_warnings(mut self, suppress: bool) -> Self {
        self.suppress_warnings = suppress;
        self
    }

    /// Builds the final `SyncConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(SyncConfig)` on success, or an error if:
    /// - The user id is missing or blank
    /// - A bridge is missing and `desktop-shims` is disabled
    /// - An endpoint is not a valid URL
    pub fn build(self) -> Result<SyncConfig> {
        let user_id = self.user_id.ok_or_else(|| {
            Error::Config("User id is required. Use .user_id() to set it.".to_string())
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system()?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store()?,
        };

        let interaction = match self.interaction {
            Some(interaction) => interaction,
            None => provide_default_interaction()?,
        };

        let config = SyncConfig {
            user_id,
            endpoints: self.endpoints.unwrap_or_default(),
            http_client,
            file_system,
            secure_store,
            interaction,
            suppress_warnings: self.suppress_warnings,
        };

        config.validate()?;

        Ok(config)
    }
}
