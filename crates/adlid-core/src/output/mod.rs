//! Report artifacts: per-folder workbooks and the inventory snapshot.

pub mod inventory_csv;
pub mod xlsx;

use crate::error::Error;
use crate::extract::FileTable;
use crate::storage::{InventoryItem, Table};
use std::path::PathBuf;

pub use inventory_csv::{write_inventory, write_inventory_csv};
pub use xlsx::{sanitize_sheet_name, XlsxReportWriter};

pub const MANIFEST_SHEET: &str = "__manifest__";
pub const CONSOLIDATED_SHEET: &str = "Consolidated";
pub const PRICE_SHEET: &str = "AdLidPriceOnly";

/// Everything produced for one week folder.
#[derive(Debug, Clone)]
pub struct FolderReport {
    pub folder_name: String,
    /// Files found under the folder, extracted or not.
    pub manifest: Vec<InventoryItem>,
    pub file_tables: Vec<FileTable>,
    pub consolidated: Table,
    /// Ranked report table; `None` when the price column was missing.
    pub price_only: Option<Table>,
}

/// A serialized report, already on disk at `path`.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub path: PathBuf,
    pub content: Vec<u8>,
}

/// Serializes a folder report into one artifact.
pub trait ReportSink {
    fn write_report(&self, report: &FolderReport) -> Result<ReportArtifact, Error>;
}

/// `Week 46/Sub` becomes `Week 46_Sub.xlsx`.
pub fn report_file_name(folder_name: &str) -> String {
    format!("{}.xlsx", folder_name.replace('/', "_"))
}
