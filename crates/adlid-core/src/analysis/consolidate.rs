use crate::columns::{FOLDER, SHEET_NAME, SOURCE_FILE};
use crate::config::MergeMode;
use crate::extract::FileTable;
use crate::storage::{Cell, Table};
use tracing::debug;

/// Adds `Folder`, `SourceFile` and `SheetName` at positions 0, 1 and 2 when missing.
pub fn ensure_provenance(table: &mut Table, folder: &str, file_name: &str) {
    table.insert_column(0, FOLDER, Cell::text(folder));
    table.insert_column(1, SOURCE_FILE, Cell::text(file_name));
    table.insert_column(2, SHEET_NAME, Cell::Empty);
}

/// Merges the per-file tables of one folder.
pub struct Consolidator {
    mode: MergeMode,
}

impl Consolidator {
    pub fn new(mode: MergeMode) -> Self {
        Self { mode }
    }

    /// Rows keep file order, then row order within a file. No files gives an empty table.
    pub fn consolidate(&self, folder: &str, files: &[FileTable]) -> Table {
        let tables: Vec<Table> = files
            .iter()
            .map(|file| {
                let mut table = file.table.clone();
                ensure_provenance(&mut table, folder, &file.file_name);
                table.drop_empty_columns();
                table
            })
            .collect();

        let merged = match self.mode {
            MergeMode::Union => Table::union_all(tables),
            MergeMode::Intersection => {
                let Some(first) = tables.first() else {
                    return Table::default();
                };
                let common: Vec<String> = first
                    .columns()
                    .iter()
                    .filter(|column| tables.iter().all(|t| t.has_column(column)))
                    .cloned()
                    .collect();
                Table::union_all(tables.iter().map(|t| t.retain_columns(&common)).collect())
            }
        };
        debug!(
            "Consolidated {} files in '{}': {} columns, {} rows",
            files.len(),
            folder,
            merged.width(),
            merged.len()
        );
        merged
    }
}
