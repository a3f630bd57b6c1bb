/// Item type in the flattened inventory. Folders order before files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    Folder,
    File,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Folder => "FOLDER",
            ItemKind::File => "FILE",
        }
    }
}

/// One row of the flattened remote tree.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub kind: ItemKind,
    pub name: String,
    /// Directory path relative to the base root, without the item's own name.
    /// Empty for direct children of the base root.
    pub path: String,
    /// Lower-cased last extension, files only.
    pub extension: Option<String>,
    pub remote_id: String,
    pub url: Option<String>,
    pub size: Option<u64>,
    pub last_modified: Option<String>,
}

impl InventoryItem {
    /// Column headers of the tabular inventory (CSV snapshot and manifest sheet).
    pub const HEADERS: [&'static str; 8] = [
        "Type",
        "Name",
        "Path",
        "File Type",
        "DriveItemId",
        "WebUrl",
        "Size",
        "LastModified",
    ];

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }

    /// A folder living directly under the base root.
    pub fn is_top_level_folder(&self) -> bool {
        self.is_folder() && self.path.is_empty()
    }

    /// Number of `/` segments in `path`; root is 0.
    pub fn depth(&self) -> usize {
        if self.path.is_empty() {
            0
        } else {
            self.path.split('/').count()
        }
    }

    /// Name of the top-level folder owning this row, `None` for root-level files.
    pub fn anchor(&self) -> Option<&str> {
        if self.is_top_level_folder() {
            return Some(&self.name);
        }
        self.path.split('/').next().filter(|segment| !segment.is_empty())
    }

    /// Whether this file lives in `folder` or anywhere below it.
    pub fn is_under(&self, folder: &str) -> bool {
        self.path == folder
            || self
                .path
                .strip_prefix(folder)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn to_record(&self) -> [String; 8] {
        [
            self.kind.as_str().to_string(),
            self.name.clone(),
            self.path.clone(),
            self.extension.clone().unwrap_or_default(),
            self.remote_id.clone(),
            self.url.clone().unwrap_or_default(),
            human_size(self.size),
            self.last_modified.clone().unwrap_or_default(),
        ]
    }
}

/// Result of looking up one target week folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderInfo {
    pub name: String,
    pub remote_id: Option<String>,
    pub found: bool,
}

/// Lower-cased text after the last `.`, or `None`.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

pub fn human_size(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes else {
        return String::new();
    };
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} PB", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: ItemKind, name: &str, path: &str) -> InventoryItem {
        InventoryItem {
            kind,
            name: name.to_string(),
            path: path.to_string(),
            extension: None,
            remote_id: format!("id-{}", name),
            url: None,
            size: None,
            last_modified: None,
        }
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Vendor Prices.XLSX"), Some("xlsx".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
        assert_eq!(file_extension(""), None);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(None), "");
        assert_eq!(human_size(Some(512)), "512.0 B");
        assert_eq!(human_size(Some(2048)), "2.0 KB");
        assert_eq!(human_size(Some(5 * 1024 * 1024)), "5.0 MB");
    }

    #[test]
    fn test_depth_and_anchor() {
        let top = item(ItemKind::Folder, "Week 46", "");
        assert_eq!(top.depth(), 0);
        assert_eq!(top.anchor(), Some("Week 46"));

        let nested = item(ItemKind::File, "a.xlsx", "Week 46/Produce/Late");
        assert_eq!(nested.depth(), 3);
        assert_eq!(nested.anchor(), Some("Week 46"));

        let root_file = item(ItemKind::File, "notes.txt", "");
        assert_eq!(root_file.anchor(), None);
    }

    #[test]
    fn test_is_under() {
        let direct = item(ItemKind::File, "a.xlsx", "Week 46");
        let nested = item(ItemKind::File, "b.xlsx", "Week 46/Sub");
        let sibling = item(ItemKind::File, "c.xlsx", "Week 46 Extra");
        assert!(direct.is_under("Week 46"));
        assert!(nested.is_under("Week 46"));
        assert!(!sibling.is_under("Week 46"));
    }
}
