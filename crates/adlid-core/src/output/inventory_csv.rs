use crate::error::Error;
use crate::storage::InventoryItem;
use csv::Writer;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes the inventory as CSV with a header row. Sizes are human-readable.
pub fn write_inventory<W: Write>(items: &[InventoryItem], writer: W) -> Result<(), Error> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(InventoryItem::HEADERS)?;
    for item in items {
        writer.write_record(item.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Snapshot of the inventory for inspection between runs. Never read back.
pub fn write_inventory_csv(items: &[InventoryItem], path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_inventory(items, fs::File::create(path)?)?;
    info!("Wrote {} inventory rows to {}", items.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ItemKind;

    #[test]
    fn test_write_inventory() {
        let items = vec![
            InventoryItem {
                kind: ItemKind::Folder,
                name: "Week 46 Final Week 47 Initial".to_string(),
                path: String::new(),
                extension: None,
                remote_id: "F1".to_string(),
                url: None,
                size: None,
                last_modified: Some("2025-11-10T12:00:00Z".to_string()),
            },
            InventoryItem {
                kind: ItemKind::File,
                name: "prices, final.xlsx".to_string(),
                path: "Week 46 Final Week 47 Initial".to_string(),
                extension: Some("xlsx".to_string()),
                remote_id: "F2".to_string(),
                url: Some("https://example/f2".to_string()),
                size: Some(3 * 1024),
                last_modified: None,
            },
        ];
        let mut buffer = Vec::new();
        write_inventory(&items, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Type,Name,Path,File Type,DriveItemId,WebUrl,Size,LastModified");
        assert_eq!(
            lines[1],
            "FOLDER,Week 46 Final Week 47 Initial,,,F1,,,2025-11-10T12:00:00Z"
        );
        assert_eq!(
            lines[2],
            "FILE,\"prices, final.xlsx\",Week 46 Final Week 47 Initial,xlsx,F2,https://example/f2,3.0 KB,"
        );
    }
}
