//! Local path handling
//!
//! Paths are treated as plain `/`-separated strings. Whether a path names a
//! file or a directory is decided from its text alone: a trailing
//! `.<alphanumerics>` extension means file.

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(/ *)+$").expect("regex"));
static FILE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[A-Za-z0-9]+$").expect("regex"));

/// What an upload source path refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalTarget {
    File { path: String, name: String },
    Directory { path: String, name: String },
}

impl LocalTarget {
    /// Normalize and classify `local_path`.
    ///
    /// Returns `None` when nothing is left after stripping separators.
    pub fn classify(local_path: &str) -> Option<Self> {
        let path = normalize(local_path);
        if path.is_empty() {
            return None;
        }

        let name = final_segment(path).to_string();
        if name.is_empty() {
            return None;
        }

        let path = path.to_string();
        if FILE_EXTENSION.is_match(&path) {
            Some(LocalTarget::File { path, name })
        } else {
            Some(LocalTarget::Directory { path, name })
        }
    }

    pub fn path(&self) -> &str {
        match self {
            LocalTarget::File { path, .. } | LocalTarget::Directory { path, .. } => path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LocalTarget::File { name, .. } | LocalTarget::Directory { name, .. } => name,
        }
    }
}

/// Strip trailing `/` separators, including spaces that follow one.
pub fn normalize(local_path: &str) -> &str {
    match TRAILING_SEPARATORS.find(local_path) {
        Some(m) => &local_path[..m.start()],
        None => local_path,
    }
}

/// Text after the last `/`, or the whole path when it has none
pub fn final_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Folder names of a remote path, in order.
///
/// Empty segments and segments made of a single space are dropped; all
/// other segments are kept verbatim.
pub fn split_folder_segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|segment| !matches!(*segment, "" | " "))
        .collect()
}

/// Whether a directory entry is hidden and must not be uploaded
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
