use crate::config::RootPosition;
use crate::storage::InventoryItem;
use ahash::AHashMap;

/// Reorders the inventory so every top-level folder is followed by its whole
/// subtree, shallowest first. Root-level files form their own block at the
/// top or bottom.
///
/// Within a block rows sort by: anchor row first, depth, path, folders
/// before files, name. The sort is stable.
pub fn order_by_top_folder_block(
    items: &[InventoryItem],
    root_position: RootPosition,
) -> Vec<InventoryItem> {
    let mut anchors: Vec<&str> = items
        .iter()
        .filter(|item| item.is_top_level_folder())
        .map(|item| item.name.as_str())
        .collect();
    anchors.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    anchors.dedup();

    let rank: AHashMap<&str, i64> = anchors
        .iter()
        .enumerate()
        .map(|(idx, name)| (*name, idx as i64))
        .collect();
    let root_rank = match root_position {
        RootPosition::Top => -1,
        RootPosition::Bottom => anchors.len() as i64,
    };

    let anchor_rank = |item: &InventoryItem| -> i64 {
        item.anchor()
            .and_then(|anchor| rank.get(anchor).copied())
            .unwrap_or(root_rank)
    };

    let mut ordered: Vec<InventoryItem> = items.to_vec();
    ordered.sort_by(|a, b| {
        anchor_rank(a)
            .cmp(&anchor_rank(b))
            .then_with(|| b.is_top_level_folder().cmp(&a.is_top_level_folder()))
            .then_with(|| a.depth().cmp(&b.depth()))
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.name.cmp(&b.name))
    });
    ordered
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
            remote_id: format!("{}/{}", path, name),
            url: None,
            size: None,
            last_modified: None,
        }
    }

    fn sample() -> Vec<InventoryItem> {
        vec![
            item(ItemKind::File, "deep.xlsx", "beta/sub"),
            item(ItemKind::File, "root.txt", ""),
            item(ItemKind::Folder, "sub", "beta"),
            item(ItemKind::Folder, "Beta", ""),
            item(ItemKind::File, "b.xlsx", "alpha"),
            item(ItemKind::Folder, "alpha", ""),
            item(ItemKind::File, "a.xlsx", "alpha"),
            item(ItemKind::Folder, "beta", ""),
            item(ItemKind::File, "top.xlsx", "beta"),
        ]
    }

    fn labels(items: &[InventoryItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| {
                if i.path.is_empty() {
                    i.name.clone()
                } else {
                    format!("{}/{}", i.path, i.name)
                }
            })
            .collect()
    }

    #[test]
    fn test_blocks_with_root_files_on_top() {
        let ordered = order_by_top_folder_block(&sample(), RootPosition::Top);
        assert_eq!(
            labels(&ordered),
            vec![
                "root.txt",
                "alpha",
                "alpha/a.xlsx",
                "alpha/b.xlsx",
                "Beta",
                "beta",
                "beta/sub",
                "beta/top.xlsx",
                "beta/sub/deep.xlsx",
            ]
        );
    }

    #[test]
    fn test_root_files_at_bottom() {
        let ordered = order_by_top_folder_block(&sample(), RootPosition::Bottom);
        assert_eq!(ordered.last().map(|i| i.name.as_str()), Some("root.txt"));
        assert_eq!(ordered[0].name, "alpha");
    }

    #[test]
    fn test_ordering_is_a_permutation_and_idempotent() {
        let input = sample();
        let once = order_by_top_folder_block(&input, RootPosition::Top);
        let twice = order_by_top_folder_block(&once, RootPosition::Top);
        assert_eq!(once, twice);

        let mut a = labels(&input);
        let mut b = labels(&once);
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
