//! Local to remote uploader
//!
//! [`SyncUploader`] mirrors a local file, or the top level of a local
//! directory, into a remote folder. Name collisions are resolved with the
//! `overwrite` flag:
//!
//! | Source | Collision, `overwrite` | Collision, no `overwrite` |
//! |--------|------------------------|---------------------------|
//! | single file | replace contents | error |
//! | directory entry | replace contents | skip |
//!
//! Any other remote error stops the upload and is returned.

use bridge_traits::error::BridgeError;
use bridge_traits::storage::{FileSystemAccess, RemoteItem, StorageProvider};
use bridge_traits::InteractionProvider;
use bytes::Bytes;
use core_runtime::logging::strip_path;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::local_path::{is_hidden, split_folder_segments, LocalTarget};

/// Shown before an upload that will not overwrite
pub const SKIP_WARNING: &str = "WARNING:\n   \
    This will NOT upload any local file if Box\n   \
    folder contains a file with the same name.\n   \
    It will just skip them!";
pub const FILE_LOADED: &str = "File loaded to Box!";
pub const FILE_FAILED: &str = "Did not save to Box due to following error:";
pub const FOLDER_LOADING: &str = "Loading files to Box folder";
pub const FOLDER_LOADED: &str = " all files loaded to Box!";
pub const FOLDER_STOPPED: &str = "\nStopped saving to Box due to following error:";

/// Default remote root folder
pub const ROOT_FOLDER_ID: &str = "0";

/// Remote names grouped by what happened to them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub replaced: Vec<String>,
    pub skipped: Vec<String>,
}

impl UploadReport {
    pub fn total(&self) -> usize {
        self.uploaded.len() + self.replaced.len() + self.skipped.len()
    }
}

enum Outcome {
    Uploaded,
    Replaced,
}

pub struct SyncUploader {
    provider: Arc<dyn StorageProvider>,
    file_system: Arc<dyn FileSystemAccess>,
    interaction: Arc<dyn InteractionProvider>,
}

impl SyncUploader {
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        file_system: Arc<dyn FileSystemAccess>,
        interaction: Arc<dyn InteractionProvider>,
    ) -> Self {
        Self {
            provider,
            file_system,
            interaction,
        }
    }

    /// Create each segment of `path` as a subfolder of the previous one,
    /// starting at `root_folder_id`.
    ///
    /// Folders are always created; an existing folder surfaces as a name
    /// conflict error. Returns the created folders in order.
    #[instrument(skip(self))]
    pub async fn create_folder_path(
        &self,
        path: &str,
        root_folder_id: &str,
    ) -> Result<Vec<RemoteItem>> {
        let mut parent_id = root_folder_id.to_string();
        let mut created = Vec::new();

        for segment in split_folder_segments(path) {
            let folder = self.provider.create_folder(&parent_id, segment).await?;
            debug!(folder_id = %folder.id, parent_id = %parent_id, "Created folder segment");
            parent_id = folder.id.clone();
            created.push(folder);
        }

        info!(count = created.len(), "Created remote folder path");
        Ok(created)
    }

    /// Upload `local_path` into `remote_folder_id`.
    ///
    /// A file is uploaded under its own name. A directory becomes a
    /// subfolder of the same name (reused if it already exists) holding the
    /// directory's visible top-level files.
    #[instrument(skip(self, local_path), fields(local = %strip_path(local_path)))]
    pub async fn upload_path(
        &self,
        remote_folder_id: &str,
        local_path: &str,
        overwrite: bool,
    ) -> Result<UploadReport> {
        if !overwrite {
            self.interaction.notify(SKIP_WARNING);
        }

        let target = LocalTarget::classify(local_path)
            .ok_or_else(|| SyncError::InvalidPath(local_path.to_string()))?;

        match target {
            LocalTarget::File { path, name } => {
                self.upload_single_file(remote_folder_id, &path, &name, overwrite)
                    .await
            }
            LocalTarget::Directory { path, name } => {
                self.upload_directory(remote_folder_id, &path, &name, overwrite)
                    .await
            }
        }
    }

    async fn upload_single_file(
        &self,
        folder_id: &str,
        path: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<UploadReport> {
        let mut report = UploadReport::default();

        match self.upload_entry(folder_id, Path::new(path), name, overwrite).await {
            Ok(Outcome::Uploaded) => report.uploaded.push(name.to_string()),
            Ok(Outcome::Replaced) => report.replaced.push(name.to_string()),
            Err(e) => {
                self.report_failure(FILE_FAILED, &e);
                return Err(e);
            }
        }

        self.interaction.notify(FILE_LOADED);
        Ok(report)
    }

    async fn upload_directory(
        &self,
        parent_id: &str,
        path: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<UploadReport> {
        let files = self.visible_files(path).await?;
        let folder_id = self.ensure_folder(parent_id, name).await?;

        let mut report = UploadReport::default();
        self.interaction
            .begin_progress(&format!("{} {} ", FOLDER_LOADING, name));

        for (file_path, file_name) in files {
            self.interaction.progress_tick();

            match self
                .upload_entry(&folder_id, &file_path, &file_name, overwrite)
                .await
            {
                Ok(Outcome::Uploaded) => report.uploaded.push(file_name),
                Ok(Outcome::Replaced) => report.replaced.push(file_name),
                Err(e) if !overwrite && is_conflict(&e) => {
                    debug!(file = %file_name, "Skipped existing remote file");
                    report.skipped.push(file_name);
                }
                Err(e) => {
                    self.interaction.end_progress("");
                    self.report_failure(FOLDER_STOPPED, &e);
                    return Err(e);
                }
            }
        }

        self.interaction.end_progress(FOLDER_LOADED);
        info!(
            uploaded = report.uploaded.len(),
            replaced = report.replaced.len(),
            skipped = report.skipped.len(),
            "Directory upload finished"
        );
        Ok(report)
    }

    /// Upload one file, replacing the colliding remote file when
    /// `overwrite` is set. Without it the conflict is returned as is.
    async fn upload_entry(
        &self,
        folder_id: &str,
        path: &Path,
        name: &str,
        overwrite: bool,
    ) -> Result<Outcome> {
        let content = self.read_local(path).await?;

        match self
            .provider
            .upload_file(folder_id, name, content.clone())
            .await
        {
            Ok(item) => {
                debug!(file_id = %item.id, "Uploaded");
                Ok(Outcome::Uploaded)
            }
            Err(e) if e.is_name_conflict() && overwrite => {
                let existing_id = e
                    .conflicting_id()
                    .ok_or_else(|| SyncError::MissingConflictId {
                        name: name.to_string(),
                    })?
                    .to_string();
                self.provider
                    .update_file_contents(&existing_id, name, content)
                    .await?;
                debug!(file_id = %existing_id, "Replaced existing remote file");
                Ok(Outcome::Replaced)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create `name` under `parent_id`, or reuse the folder it collides with
    async fn ensure_folder(&self, parent_id: &str, name: &str) -> Result<String> {
        match self.provider.create_folder(parent_id, name).await {
            Ok(folder) => Ok(folder.id),
            Err(e) => {
                if let Some(existing_id) = e.conflicting_id().map(str::to_string) {
                    debug!(folder_id = %existing_id, "Reusing existing remote folder");
                    return Ok(existing_id);
                }
                Err(e.into())
            }
        }
    }

    /// Visible top-level files of `path`, sorted by name
    async fn visible_files(&self, path: &str) -> Result<Vec<(PathBuf, String)>> {
        let entries = self
            .file_system
            .list_directory(Path::new(path))
            .await
            .map_err(|source| SyncError::LocalAccess {
                path: path.to_string(),
                source,
            })?;

        let mut files = Vec::new();
        for entry in entries {
            let Some(name) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if is_hidden(&name) {
                continue;
            }

            let metadata = self.file_system.metadata(&entry).await.map_err(|source| {
                SyncError::LocalAccess {
                    path: entry.display().to_string(),
                    source,
                }
            })?;
            if metadata.is_directory {
                continue;
            }

            files.push((entry, name));
        }

        files.sort_by(|a, b| a.1.cmp(&b.1));
        debug!(count = files.len(), "Enumerated local files");
        Ok(files)
    }

    async fn read_local(&self, path: &Path) -> Result<Bytes> {
        self.file_system
            .read_file(path)
            .await
            .map_err(|source| SyncError::LocalAccess {
                path: path.display().to_string(),
                source,
            })
    }

    fn report_failure(&self, headline: &str, error: &SyncError) {
        warn!(error = %error, "Upload failed");
        self.interaction.notify(headline);
        self.interaction.notify(&error.to_string());
    }
}

fn is_conflict(error: &SyncError) -> bool {
    error.remote().is_some_and(BridgeError::is_name_conflict)
}
