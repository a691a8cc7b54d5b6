//! # Authentication Module
//!
//! Box OAuth 2.0 credentials for a command-line tool.
//!
//! ## Overview
//!
//! This crate obtains, stores, and refreshes OAuth 2.0 credentials for Box
//! through an injected secure store, and hands out an authenticated
//! [`OAuthSession`] that API clients draw bearer tokens from.
//!
//! ## Features
//!
//! - Keychain consent prompt and one-time client credential bootstrap
//! - Out-of-band authorization code flow with CSRF state checks
//! - Token refresh, persisted through a refresh listener
//! - Per-user credential slots and a `forget` operation

pub mod credential_store;
pub mod error;
pub mod manager;
pub mod oauth;
pub mod session;
pub mod types;

pub use credential_store::CredentialStore;
pub use error::{AuthError, Result};
pub use manager::CredentialManager;
pub use oauth::{AuthorizationState, OAuthConfig, OAuthFlowManager};
pub use session::{OAuthSession, TokenRefreshListener, TokenSource};
pub use types::{ClientCredentials, OAuthTokens, UserId};
