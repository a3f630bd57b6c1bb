use crate::error::Error;
use crate::storage::{Cell, Table};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use std::collections::HashSet;
use std::io::Cursor;
use tracing::debug;

/// One parsed worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub table: Table,
}

/// Turns workbook bytes into sheet tables. The first row of each sheet is the header.
pub trait WorkbookParser: Send + Sync {
    fn parse(&self, content: &[u8]) -> Result<Vec<SheetTable>, Error>;
}

/// Parses every sheet, in workbook order.
pub struct AllSheets;

impl WorkbookParser for AllSheets {
    fn parse(&self, content: &[u8]) -> Result<Vec<SheetTable>, Error> {
        read_sheets(content, usize::MAX)
    }
}

/// Parses only the first sheet.
pub struct FirstSheet;

impl WorkbookParser for FirstSheet {
    fn parse(&self, content: &[u8]) -> Result<Vec<SheetTable>, Error> {
        read_sheets(content, 1)
    }
}

fn read_sheets(content: &[u8], limit: usize) -> Result<Vec<SheetTable>, Error> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(content))?;
    let names: Vec<String> = workbook.sheet_names().into_iter().take(limit).collect();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let table = range_to_table(&range);
        debug!(
            "Sheet '{}': {} columns, {} rows",
            name,
            table.width(),
            table.len()
        );
        sheets.push(SheetTable { name, table });
    }
    Ok(sheets)
}

/// First row becomes the header; fully empty rows below it are skipped.
pub fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let mut table = Table::new(header_names(header));
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(cell_from_data).collect();
        if cells.iter().all(Cell::is_missing) {
            continue;
        }
        table.push_row(cells);
    }
    table
}

/// Blank headers become `Unnamed: {idx}`; repeats get a `.N` suffix.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, data)| {
            let raw = cell_from_data(data).to_string();
            let base = match raw.trim() {
                "" => format!("Unnamed: {}", idx),
                trimmed => trimmed.to_string(),
            };
            let mut name = base.clone();
            let mut n = 1;
            while seen.contains(&name) {
                name = format!("{}.{}", base, n);
                n += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

pub fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match data.as_datetime() {
            Some(dt) => Cell::DateTime(dt),
            None => data
                .as_f64()
                .map(Cell::Number)
                .unwrap_or_else(|| Cell::Text(data.to_string())),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
