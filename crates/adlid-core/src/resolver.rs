use crate::storage::{FolderInfo, InventoryItem};
use std::cmp::Reverse;

/// Names of the `horizon` week folders starting at `week`, in ascending week order.
pub fn target_week_folders(week: u32, horizon: u32) -> Vec<String> {
    (week..week.saturating_add(horizon))
        .map(|w| format!("Week {} Final Week {} Initial", w, w + 1))
        .collect()
}

/// First week number in a week-folder name: `"Week 46 Final Week 47 Initial"` gives 46.
pub fn first_week_number(name: &str) -> Option<u32> {
    name.split_whitespace().nth(1)?.parse().ok()
}

/// Sorts folders by descending first week; names without a week number go last.
pub fn sort_latest_first(folders: &mut [FolderInfo]) {
    folders.sort_by_key(|folder| match first_week_number(&folder.name) {
        Some(week) => (0, Reverse(week)),
        None => (1, Reverse(0)),
    });
}

/// Looks up week folders and their files in an inventory snapshot.
pub struct WeekResolver<'a> {
    inventory: &'a [InventoryItem],
}

impl<'a> WeekResolver<'a> {
    pub fn new(inventory: &'a [InventoryItem]) -> Self {
        Self { inventory }
    }

    /// One entry per target folder, in target order. Missing folders are
    /// reported with `found == false`.
    pub fn resolve(&self, week: u32, horizon: u32) -> Vec<FolderInfo> {
        target_week_folders(week, horizon)
            .into_iter()
            .map(|name| {
                let hit = self
                    .inventory
                    .iter()
                    .find(|item| item.is_top_level_folder() && item.name == name);
                FolderInfo {
                    remote_id: hit.map(|item| item.remote_id.clone()),
                    found: hit.is_some(),
                    name,
                }
            })
            .collect()
    }

    /// Every file in `folder_name` or nested anywhere below it, in inventory order.
    pub fn files_under_folder(&self, folder_name: &str) -> Vec<InventoryItem> {
        self.inventory
            .iter()
            .filter(|item| item.is_file() && item.is_under(folder_name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ItemKind;

    fn item(kind: ItemKind, name: &str, path: &str) -> InventoryItem {
        InventoryItem {
            kind,
            name: name.to_string(),
            path: path.to_string(),
            extension: None,
            remote_id: format!("id:{}", name),
            url: None,
            size: None,
            last_modified: None,
        }
    }

    const W46: &str = "Week 46 Final Week 47 Initial";
    const W47: &str = "Week 47 Final Week 48 Initial";

    fn inventory() -> Vec<InventoryItem> {
        vec![
            item(ItemKind::Folder, W46, ""),
            item(ItemKind::Folder, W47, ""),
            item(ItemKind::Folder, "Sub", W46),
            item(ItemKind::File, "a.xlsx", W46),
            item(ItemKind::File, "b.xlsx", &format!("{}/Sub", W46)),
            item(ItemKind::File, "c.xlsx", W47),
            // Same name nested deeper is not a top-level match.
            item(ItemKind::Folder, "Week 48 Final Week 49 Initial", "Archive"),
        ]
    }

    #[test]
    fn test_target_week_folders() {
        assert_eq!(
            target_week_folders(46, 3),
            vec![
                "Week 46 Final Week 47 Initial",
                "Week 47 Final Week 48 Initial",
                "Week 48 Final Week 49 Initial",
            ]
        );
        assert!(target_week_folders(10, 0).is_empty());
    }

    #[test]
    fn test_resolve_reports_missing() {
        let inventory = inventory();
        let resolved = WeekResolver::new(&inventory).resolve(46, 3);
        assert_eq!(resolved.len(), 3);
        assert!(resolved[0].found);
        assert_eq!(resolved[0].remote_id.as_deref(), Some("id:Week 46 Final Week 47 Initial"));
        assert!(resolved[1].found);
        assert!(!resolved[2].found);
        assert_eq!(resolved[2].remote_id, None);
    }

    #[test]
    fn test_files_under_folder_includes_nested() {
        let inventory = inventory();
        let resolver = WeekResolver::new(&inventory);
        let names: Vec<String> = resolver
            .files_under_folder(W46)
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.xlsx"]);
        assert!(resolver.files_under_folder("Week 4").is_empty());
    }

    #[test]
    fn test_sort_latest_first() {
        let mut folders: Vec<FolderInfo> = ["Misc", W46, "Week 48 Final Week 49 Initial", W47]
            .iter()
            .map(|name| FolderInfo {
                name: name.to_string(),
                remote_id: None,
                found: true,
            })
            .collect();
        sort_latest_first(&mut folders);
        let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Week 48 Final Week 49 Initial", W47, W46, "Misc"]);
        assert_eq!(first_week_number("Week x"), None);
    }
}
