use std::fs;
use std::path::Path;
use tempfile::tempdir;

use adlid_core::config::RootPosition;
use adlid_core::output::write_inventory_csv;
use adlid_core::remote::LocalTree;
use adlid_core::resolver::WeekResolver;
use adlid_core::scanner::{order_by_top_folder_block, TreeFlattener};
use adlid_core::storage::InventoryItem;
use adlid_core::SilentReporter;

/// Layout:
///   drive/
///     Ad Lids/
///       notes.txt
///       Week 47 Final Week 48 Initial/
///         c.xlsx
///       Week 46 Final Week 47 Initial/
///         a.xlsx
///         Produce/
///           b.xlsx
///           Late/
///             d.xls
///     Other/
///       ignored.xlsx
fn create_test_tree(drive: &Path) {
    let base = drive.join("Ad Lids");
    let w46 = base.join("Week 46 Final Week 47 Initial");
    let w47 = base.join("Week 47 Final Week 48 Initial");
    fs::create_dir_all(w46.join("Produce/Late")).unwrap();
    fs::create_dir_all(&w47).unwrap();
    fs::create_dir_all(drive.join("Other")).unwrap();

    fs::write(base.join("notes.txt"), "read me").unwrap();
    fs::write(w46.join("a.xlsx"), "a").unwrap();
    fs::write(w46.join("Produce/b.xlsx"), "bb").unwrap();
    fs::write(w46.join("Produce/Late/d.xls"), "dddd").unwrap();
    fs::write(w47.join("c.xlsx"), "ccc").unwrap();
    fs::write(drive.join("Other/ignored.xlsx"), "x").unwrap();
}

fn inventory(drive: &Path) -> Vec<InventoryItem> {
    let tree = LocalTree::new(drive);
    TreeFlattener::new("Ad Lids")
        .flatten(&tree, &SilentReporter)
        .unwrap()
}

fn label(item: &InventoryItem) -> String {
    if item.path.is_empty() {
        item.name.clone()
    } else {
        format!("{}/{}", item.path, item.name)
    }
}

#[test]
fn test_paths_are_relative_to_base_root() {
    let tmp = tempdir().unwrap();
    create_test_tree(tmp.path());
    let items = inventory(tmp.path());

    assert_eq!(items.len(), 9);
    assert!(items.iter().all(|i| !i.path.starts_with("Ad Lids")));
    assert!(items.iter().all(|i| i.name != "ignored.xlsx"));

    let top_level: Vec<&str> = items
        .iter()
        .filter(|i| i.is_top_level_folder())
        .map(|i| i.name.as_str())
        .collect();
    for item in &items {
        if item.path.is_empty() {
            continue;
        }
        let first = item.path.split('/').next().unwrap();
        assert_eq!(
            top_level.iter().filter(|name| **name == first).count(),
            1,
            "{} has no unique top-level owner",
            label(item)
        );
    }

    let d = items.iter().find(|i| i.name == "d.xls").unwrap();
    assert_eq!(d.path, "Week 46 Final Week 47 Initial/Produce/Late");
    assert_eq!(d.extension.as_deref(), Some("xls"));
    assert_eq!(d.size, Some(4));
}

#[test]
fn test_block_order_groups_each_top_level_folder() {
    let tmp = tempdir().unwrap();
    create_test_tree(tmp.path());
    let ordered = order_by_top_folder_block(&inventory(tmp.path()), RootPosition::Top);

    let labels: Vec<String> = ordered.iter().map(label).collect();
    assert_eq!(
        labels,
        vec![
            "notes.txt",
            "Week 46 Final Week 47 Initial",
            "Week 46 Final Week 47 Initial/Produce",
            "Week 46 Final Week 47 Initial/a.xlsx",
            "Week 46 Final Week 47 Initial/Produce/Late",
            "Week 46 Final Week 47 Initial/Produce/b.xlsx",
            "Week 46 Final Week 47 Initial/Produce/Late/d.xls",
            "Week 47 Final Week 48 Initial",
            "Week 47 Final Week 48 Initial/c.xlsx",
        ]
    );

    let again = order_by_top_folder_block(&ordered, RootPosition::Top);
    assert_eq!(ordered, again);

    let bottom = order_by_top_folder_block(&ordered, RootPosition::Bottom);
    assert_eq!(label(bottom.last().unwrap()), "notes.txt");
}

#[test]
fn test_resolver_against_local_inventory() {
    let tmp = tempdir().unwrap();
    create_test_tree(tmp.path());
    let items = inventory(tmp.path());
    let resolver = WeekResolver::new(&items);

    let found: Vec<(String, bool)> = resolver
        .resolve(46, 3)
        .into_iter()
        .map(|f| (f.name, f.found))
        .collect();
    assert_eq!(
        found,
        vec![
            ("Week 46 Final Week 47 Initial".to_string(), true),
            ("Week 47 Final Week 48 Initial".to_string(), true),
            ("Week 48 Final Week 49 Initial".to_string(), false),
        ]
    );

    let mut files: Vec<String> = resolver
        .files_under_folder("Week 46 Final Week 47 Initial")
        .iter()
        .map(|f| f.name.clone())
        .collect();
    files.sort();
    assert_eq!(files, vec!["a.xlsx", "b.xlsx", "d.xls"]);
}

#[test]
fn test_inventory_snapshot_csv() {
    let tmp = tempdir().unwrap();
    create_test_tree(tmp.path());
    let ordered = order_by_top_folder_block(&inventory(tmp.path()), RootPosition::Top);

    let out = tmp.path().join("out/assets/inventory.csv");
    write_inventory_csv(&ordered, &out).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec!["Type", "Name", "Path", "File Type", "DriveItemId", "WebUrl", "Size", "LastModified"]
    );
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), ordered.len());
    assert_eq!(&records[0][0], "FILE");
    assert_eq!(&records[0][1], "notes.txt");
    assert_eq!(&records[0][6], "7.0 B");
    assert_eq!(&records[1][0], "FOLDER");
    assert_eq!(&records[1][6], "");
}
