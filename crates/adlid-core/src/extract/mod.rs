//! Per-file table extraction for a resolved week folder.

pub mod workbook;

use crate::columns::{SHEET_NAME, SOURCE_FILE};
use crate::config::SheetStrategy;
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::remote::RemoteTree;
use crate::storage::{Cell, InventoryItem, Table};
use tracing::{debug, error, info};

pub use workbook::{AllSheets, FirstSheet, SheetTable, WorkbookParser};

/// Extensions handed to the workbook parser; anything else is skipped.
pub const TABULAR_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xlsb", "xls"];

/// `SheetName` value of the placeholder row for a workbook with no usable sheet.
pub const EMPTY_WORKBOOK_MARKER: &str = "__EMPTY_WORKBOOK__";

/// All surviving sheets of one file, tagged with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTable {
    pub file_name: String,
    pub table: Table,
}

pub fn is_tabular(item: &InventoryItem) -> bool {
    item.extension
        .as_deref()
        .is_some_and(|ext| TABULAR_EXTENSIONS.contains(&ext))
}

pub struct FileTableExtractor {
    parser: Box<dyn WorkbookParser>,
}

impl FileTableExtractor {
    pub fn new(parser: Box<dyn WorkbookParser>) -> Self {
        Self { parser }
    }

    pub fn from_strategy(strategy: SheetStrategy) -> Self {
        match strategy {
            SheetStrategy::AllSheets => Self::new(Box::new(AllSheets)),
            SheetStrategy::FirstSheet => Self::new(Box::new(FirstSheet)),
        }
    }

    /// Extracts every file in `files`, keeping their order. Files that are not
    /// workbooks, fail to download, or fail to parse are logged and left out.
    #[cfg(not(feature = "rayon"))]
    pub fn extract_folder(
        &self,
        tree: &dyn RemoteTree,
        files: &[InventoryItem],
        reporter: &dyn ProgressReporter,
    ) -> Vec<FileTable> {
        let mut tables = Vec::new();
        for (idx, file) in files.iter().enumerate() {
            if let Some(table) = self.extract_logged(tree, file) {
                tables.push(table);
            }
            reporter.on_file_processed(idx + 1, files.len());
        }
        tables
    }

    /// Extracts every file in `files` in parallel, keeping their order. Files
    /// that are not workbooks, fail to download, or fail to parse are logged
    /// and left out.
    #[cfg(feature = "rayon")]
    pub fn extract_folder(
        &self,
        tree: &dyn RemoteTree,
        files: &[InventoryItem],
        reporter: &dyn ProgressReporter,
    ) -> Vec<FileTable> {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let done = AtomicUsize::new(0);
        let results: Vec<Option<FileTable>> = files
            .par_iter()
            .map(|file| {
                let table = self.extract_logged(tree, file);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                reporter.on_file_processed(finished, files.len());
                table
            })
            .collect();
        results.into_iter().flatten().collect()
    }

    fn extract_logged(&self, tree: &dyn RemoteTree, file: &InventoryItem) -> Option<FileTable> {
        match self.extract_file(tree, file) {
            Ok(table) => table,
            Err(e) => {
                error!("Skipping {} ({}): {}", file.name, file.remote_id, e);
                None
            }
        }
    }

    /// `Ok(None)` for files that are not workbooks.
    pub fn extract_file(
        &self,
        tree: &dyn RemoteTree,
        file: &InventoryItem,
    ) -> Result<Option<FileTable>, Error> {
        if !is_tabular(file) {
            info!("Skipping non-Excel file: {}", file.name);
            return Ok(None);
        }
        let content = tree.download(&file.remote_id)?;
        debug!("Downloaded {} ({} bytes)", file.name, content.len());
        let table = self.build_file_table(&file.name, &content)?;
        Ok(Some(FileTable {
            file_name: file.name.clone(),
            table,
        }))
    }

    /// Parses `content` and stacks its informative sheets, each tagged with
    /// `SourceFile` and `SheetName`. A workbook with nothing left yields a
    /// single placeholder row.
    pub fn build_file_table(&self, file_name: &str, content: &[u8]) -> Result<Table, Error> {
        let mut parts = Vec::new();
        for sheet in self.parser.parse(content)? {
            let mut table = sheet.table;
            table.drop_empty_columns();
            if table.width() == 0 || table.is_empty() {
                debug!("{}: sheet '{}' has no data", file_name, sheet.name);
                continue;
            }
            table.insert_column(0, SHEET_NAME, Cell::text(sheet.name.as_str()));
            table.insert_column(0, SOURCE_FILE, Cell::text(file_name));
            parts.push(table);
        }

        if parts.is_empty() {
            info!("{}: no sheet with data", file_name);
            return Ok(Table::from_rows(
                vec![SOURCE_FILE.to_string(), SHEET_NAME.to_string()],
                vec![vec![
                    Cell::text(file_name),
                    Cell::text(EMPTY_WORKBOOK_MARKER),
                ]],
            ));
        }
        Ok(Table::union_all(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubParser(Vec<SheetTable>);

    impl WorkbookParser for StubParser {
        fn parse(&self, _content: &[u8]) -> Result<Vec<SheetTable>, Error> {
            Ok(self.0.clone())
        }
    }

    fn sheet(name: &str, columns: &[&str], rows: Vec<Vec<Cell>>) -> SheetTable {
        SheetTable {
            name: name.to_string(),
            table: Table::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows),
        }
    }

    #[test]
    fn test_empty_sheets_dropped() {
        let parser = StubParser(vec![
            sheet("Blank", &["Unnamed: 0"], vec![]),
            sheet(
                "Prices",
                &["Item", "Remarks"],
                vec![vec![Cell::Number(101.0), Cell::Empty]],
            ),
        ]);
        let table = FileTableExtractor::new(Box::new(parser))
            .build_file_table("w46.xlsx", b"")
            .unwrap();
        assert_eq!(table.columns(), &["SourceFile", "SheetName", "Item"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 1), &Cell::text("Prices"));
    }

    #[test]
    fn test_workbook_without_data_yields_placeholder() {
        let parser = StubParser(vec![sheet("Sheet1", &["A"], vec![])]);
        let table = FileTableExtractor::new(Box::new(parser))
            .build_file_table("empty.xlsx", b"")
            .unwrap();
        assert_eq!(table.columns(), &["SourceFile", "SheetName"]);
        assert_eq!(
            table.rows()[0],
            vec![Cell::text("empty.xlsx"), Cell::text(EMPTY_WORKBOOK_MARKER)]
        );
    }

    fn two_sheet_workbook() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for (name, item) in [("Produce", 101.0), ("Dairy", 202.0)] {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name).unwrap();
            sheet.write_string(0, 0, "Item").unwrap();
            sheet.write_number(1, 0, item).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_first_sheet_strategy_ignores_later_sheets() {
        let table = FileTableExtractor::from_strategy(SheetStrategy::FirstSheet)
            .build_file_table("w46.xlsx", &two_sheet_workbook())
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 1), &Cell::text("Produce"));
        assert_eq!(table.cell(0, 2), &Cell::Number(101.0));
    }

    #[test]
    fn test_all_sheets_strategy_stacks_every_sheet() {
        let table = FileTableExtractor::from_strategy(SheetStrategy::AllSheets)
            .build_file_table("w46.xlsx", &two_sheet_workbook())
            .unwrap();
        let sheets: Vec<String> = table
            .column(SHEET_NAME)
            .unwrap()
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(sheets, vec!["Produce", "Dairy"]);
    }

    #[test]
    fn test_header_only_sheet_contributes_nothing() {
        let parser = StubParser(vec![
            sheet("Template", &["Notes"], vec![]),
            sheet("Prices", &["Item"], vec![vec![Cell::Number(7.0)]]),
        ]);
        let table = FileTableExtractor::new(Box::new(parser))
            .build_file_table("w46.xlsx", b"")
            .unwrap();
        assert_eq!(table.columns(), &["SourceFile", "SheetName", "Item"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_garbage_bytes_fail_to_parse() {
        let extractor = FileTableExtractor::from_strategy(SheetStrategy::AllSheets);
        assert!(extractor.build_file_table("bad.xlsx", b"not a workbook").is_err());
    }
}
