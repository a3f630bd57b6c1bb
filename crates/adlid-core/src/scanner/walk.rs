use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::remote::{join_remote_path, RemoteEntry, RemoteTree, ROOT_MARKER};
use crate::storage::models::file_extension;
use crate::storage::{InventoryItem, ItemKind};
use std::collections::VecDeque;
use tracing::{debug, error, info};

/// Filters applied while flattening. Folders excluded from the output are still descended into.
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    pub recursive: bool,
    pub include_files: bool,
    pub include_folders: bool,
    /// Case-insensitive substring the item name must contain.
    pub name_contains: Option<String>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            include_files: true,
            include_folders: true,
            name_contains: None,
        }
    }
}

/// Walks a remote tree from `base_root` into a flat inventory.
pub struct TreeFlattener {
    base_root: String,
    options: FlattenOptions,
}

impl TreeFlattener {
    pub fn new(base_root: &str) -> Self {
        Self::with_options(base_root, FlattenOptions::default())
    }

    pub fn with_options(base_root: &str, options: FlattenOptions) -> Self {
        Self {
            base_root: base_root.trim_matches('/').to_string(),
            options,
        }
    }

    /// Lists every item under the base root. Any failed listing aborts the walk.
    ///
    /// Rows come back folders first, then by path and name; the block orderer
    /// establishes the final order.
    pub fn flatten(
        &self,
        tree: &dyn RemoteTree,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<InventoryItem>, Error> {
        let needle = self
            .options
            .name_contains
            .as_deref()
            .map(str::to_lowercase)
            .filter(|n| !n.is_empty());

        let mut items = Vec::new();
        let mut pending: VecDeque<String> = VecDeque::from([self.base_root.clone()]);

        while let Some(current) = pending.pop_front() {
            let children = tree.list_children(&current).map_err(|e| {
                error!("Failed to list '{}': {}", current, e);
                e
            })?;
            debug!("'{}': {} children", current, children.len());

            for child in children {
                if child.is_folder && self.options.recursive {
                    pending.push_back(join_remote_path(&current, &child.name));
                }
                if self.keeps(&child, needle.as_deref()) {
                    items.push(self.to_item(child));
                }
            }
            reporter.on_inventory_progress(items.len(), &current);
        }

        items.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.path.cmp(&b.path))
                .then_with(|| a.name.cmp(&b.name))
        });
        info!("Flattened {} items under '{}'", items.len(), self.base_root);
        Ok(items)
    }

    fn keeps(&self, entry: &RemoteEntry, needle: Option<&str>) -> bool {
        if entry.is_folder && !self.options.include_folders {
            return false;
        }
        if entry.is_file && !self.options.include_files {
            return false;
        }
        match needle {
            Some(needle) => entry.name.to_lowercase().contains(needle),
            None => true,
        }
    }

    fn to_item(&self, entry: RemoteEntry) -> InventoryItem {
        let kind = if entry.is_folder {
            ItemKind::Folder
        } else {
            ItemKind::File
        };
        InventoryItem {
            kind,
            path: relative_parent_path(&entry.parent_path, &self.base_root),
            extension: match kind {
                ItemKind::File => file_extension(&entry.name),
                ItemKind::Folder => None,
            },
            size: match kind {
                ItemKind::File => entry.size,
                ItemKind::Folder => None,
            },
            name: entry.name,
            remote_id: entry.remote_id,
            url: entry.url,
            last_modified: entry.last_modified,
        }
    }
}

/// Converts a canonical parent path into a directory path relative to `base_root`.
///
/// `/drives/x/root:/Ad Lids/Week 41` with base `Ad Lids` becomes `Week 41`.
/// Paths outside the base root pass through unchanged.
pub fn relative_parent_path(canonical: &str, base_root: &str) -> String {
    let after_root = match canonical.split_once(ROOT_MARKER) {
        Some((_, rest)) => rest,
        None => canonical,
    };
    let after_root = after_root.trim_start_matches('/');
    if after_root.is_empty() || after_root == base_root {
        return String::new();
    }
    match after_root
        .strip_prefix(base_root)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        Some(rest) => rest.to_string(),
        None => after_root.to_string(),
    }
}
