//! Well-known column names shared by the extractor, consolidator and report writer.

pub const SOURCE_FILE: &str = "SourceFile";
pub const SHEET_NAME: &str = "SheetName";
pub const FOLDER: &str = "Folder";

/// Provenance columns in their fixed insertion order.
pub const PROVENANCE: [&str; 3] = [FOLDER, SOURCE_FILE, SHEET_NAME];

/// Column order of the price-only report sheet.
pub const REPORT_COLUMNS: [&str; 16] = [
    "Loading Start Date",
    "Loading End Date",
    "Commodity",
    "Vendor",
    "Item",
    "Description",
    "Ad Lid Price",
    "FOB or Delivered",
    "Confirm by Date",
    "Country of Origin",
    "Loading Location",
    "Estimated Quantity Needed",
    "Notes",
    FOLDER,
    SOURCE_FILE,
    SHEET_NAME,
];

pub fn is_provenance(name: &str) -> bool {
    PROVENANCE.contains(&name)
}

/// Columns kept through empty-column dropping so a blank report column survives to projection.
pub fn is_report_column(name: &str) -> bool {
    REPORT_COLUMNS.contains(&name)
}
