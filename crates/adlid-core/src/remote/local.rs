use super::{join_remote_path, RemoteEntry, RemoteTree, UploadSink, ROOT_MARKER};
use crate::error::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A local directory standing in for the drive root. Item ids are the
/// `/`-separated paths relative to that directory.
pub struct LocalTree {
    root: PathBuf,
}

impl LocalTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl RemoteTree for LocalTree {
    fn list_children(&self, path: &str) -> Result<Vec<RemoteEntry>, Error> {
        let dir = self.resolve(path);
        let read = fs::read_dir(&dir).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Error reading directory {}: {}", dir.display(), err),
            )
        })?;

        let trimmed = path.trim_matches('/');
        let parent_path = if trimmed.is_empty() {
            format!("/drive{}", ROOT_MARKER)
        } else {
            format!("/drive{}/{}", ROOT_MARKER, trimmed)
        };

        let mut entries = Vec::new();
        for entry in read {
            let entry = entry?;
            let metadata = entry.metadata()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let remote_id = if trimmed.is_empty() {
                name.clone()
            } else {
                join_remote_path(trimmed, &name)
            };
            let last_modified = metadata.modified().ok().map(|time| {
                DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
            });
            entries.push(RemoteEntry {
                is_folder: metadata.is_dir(),
                is_file: metadata.is_file(),
                parent_path: parent_path.clone(),
                url: Some(entry.path().display().to_string()),
                size: metadata.is_file().then(|| metadata.len()),
                last_modified,
                remote_id,
                name,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Listed {} children under '{}'", entries.len(), dir.display());
        Ok(entries)
    }

    fn download(&self, remote_id: &str) -> Result<Vec<u8>, Error> {
        Ok(fs::read(self.resolve(remote_id))?)
    }
}

impl UploadSink for LocalTree {
    fn upload(&self, folder_path: &str, file_name: &str, content: &[u8]) -> Result<String, Error> {
        let dir = self.resolve(folder_path);
        fs::create_dir_all(&dir)?;
        let target = dir.join(file_name);
        fs::write(&target, content)?;
        Ok(target.display().to_string())
    }
}
