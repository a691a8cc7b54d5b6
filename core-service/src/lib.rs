//! Core service façade.
//!
//! [`BoxSyncService`] wires a [`SyncConfig`] into the credential manager, the
//! Box connector and the uploader. Each operation authenticates first, so a
//! host only needs a config to drive an upload. Desktop hosts enable the
//! `desktop-shims` feature to get default bridges from `bridge-desktop`.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::storage::RemoteItem;
use core_auth::{CredentialManager, OAuthSession, UserId};
use core_runtime::SyncConfig;
use core_sync::{SyncUploader, UploadReport};
use provider_box::BoxConnector;
use tracing::{info, instrument};

/// Primary façade exposed to host applications.
pub struct BoxSyncService {
    config: Arc<SyncConfig>,
    user_id: UserId,
    credentials: CredentialManager,
}

impl BoxSyncService {
    /// Create a service for the user named in `config`.
    pub fn new(config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let user_id = UserId::new(config.user_id.clone())?;
        let credentials = CredentialManager::from_config(&config);

        Ok(Self {
            config: Arc::new(config),
            user_id,
            credentials,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Run the credential flow, honouring the configured warning setting.
    ///
    /// Returns `Ok(None)` when consent is declined.
    pub async fn authenticate(&self) -> Result<Option<Arc<OAuthSession>>> {
        Ok(self
            .credentials
            .authenticate(&self.user_id, self.config.suppress_warnings)
            .await?)
    }

    /// Create `path` segment by segment under `root_folder_id`.
    ///
    /// The consent warning is always suppressed for this operation.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn create_folder_path(
        &self,
        path: &str,
        root_folder_id: &str,
    ) -> Result<Vec<RemoteItem>> {
        let uploader = self.uploader(true).await?;
        let created = uploader.create_folder_path(path, root_folder_id).await?;

        info!(count = created.len(), "Folder path created");
        Ok(created)
    }

    /// Upload a local file or directory into `remote_folder_id`.
    #[instrument(skip(self, local_path), fields(user_id = %self.user_id))]
    pub async fn upload_path(
        &self,
        remote_folder_id: &str,
        local_path: &str,
        overwrite: bool,
    ) -> Result<UploadReport> {
        let uploader = self.uploader(self.config.suppress_warnings).await?;
        Ok(uploader
            .upload_path(remote_folder_id, local_path, overwrite)
            .await?)
    }

    /// Remove every stored credential for the configured user.
    pub async fn forget(&self) -> Result<()> {
        Ok(self.credentials.forget(&self.user_id).await?)
    }

    async fn uploader(&self, suppress_warning: bool) -> Result<SyncUploader> {
        let session = self
            .credentials
            .authenticate(&self.user_id, suppress_warning)
            .await?
            .ok_or(CoreError::AuthenticationDeclined)?;

        let connector = BoxConnector::new(
            self.config.http_client.clone(),
            session,
            self.config.endpoints.clone(),
        );

        Ok(SyncUploader::new(
            Arc::new(connector),
            self.config.file_system.clone(),
            self.config.interaction.clone(),
        ))
    }
}
