//! Remote storage collaborators: tree listing, download and upload.

pub mod auth;
pub mod graph;
pub mod local;

use crate::error::Error;

pub use graph::GraphClient;
pub use local::LocalTree;

/// Marker token in canonical parent paths; everything up to and including it is dropped.
pub const ROOT_MARKER: &str = "/root:";

/// One child reported by a remote listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteEntry {
    pub name: String,
    pub is_folder: bool,
    pub is_file: bool,
    /// Canonical parent path, e.g. `/drives/{id}/root:/Ad Lids/Week 41`.
    pub parent_path: String,
    pub remote_id: String,
    pub url: Option<String>,
    pub size: Option<u64>,
    pub last_modified: Option<String>,
}

/// Hierarchical storage that can list the children of a path and fetch file bytes.
/// Paths are relative to the drive root, `/`-separated.
pub trait RemoteTree: Send + Sync {
    /// Immediate children of `path`; pagination is handled by the implementation.
    fn list_children(&self, path: &str) -> Result<Vec<RemoteEntry>, Error>;

    fn download(&self, remote_id: &str) -> Result<Vec<u8>, Error>;
}

/// Destination for produced report files.
pub trait UploadSink {
    /// Stores `content` as `file_name` inside `folder_path`; returns a location for logging.
    fn upload(&self, folder_path: &str, file_name: &str, content: &[u8]) -> Result<String, Error>;
}

/// Joins a remote folder path and a child name with a single `/`.
pub fn join_remote_path(parent: &str, name: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), name)
}

/// Target folder for a week's report: the week folder under the base root.
pub fn upload_folder_path(base_root: &str, folder_name: &str) -> String {
    join_remote_path(base_root.trim_matches('/'), folder_name)
}
