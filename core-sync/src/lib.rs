//! # Upload Module
//!
//! Mirrors local files into a remote folder tree through an injected
//! [`StorageProvider`](bridge_traits::storage::StorageProvider).
//!
//! ## Components
//!
//! - **Local paths** (`local_path`): normalization, file/directory
//!   classification, remote path segmentation
//! - **Uploader** (`uploader`): folder path creation and file/directory
//!   upload with name-conflict handling

pub mod error;
pub mod local_path;
pub mod uploader;

pub use error::{Result, SyncError};
pub use local_path::LocalTarget;
pub use uploader::{SyncUploader, UploadReport, ROOT_FOLDER_ID};
