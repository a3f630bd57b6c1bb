use super::{
    report_file_name, FolderReport, ReportArtifact, ReportSink, CONSOLIDATED_SHEET,
    MANIFEST_SHEET, PRICE_SHEET,
};
use crate::columns;
use crate::error::Error;
use crate::storage::{Cell, InventoryItem, Table};
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, Worksheet, XlsxError};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

const MAX_SHEET_NAME: usize = 31;
const MIN_WIDTH: usize = 8;
const MAX_WIDTH: usize = 60;
const MAX_MEASURED_CHARS: usize = 200;
const SHADE: u32 = 0xF2F2F2;
const PLAIN: u32 = 0xFFFFFF;

/// Writes each folder report to `{output_dir}/{folder}.xlsx`.
pub struct XlsxReportWriter {
    output_dir: PathBuf,
    item_column: String,
}

impl XlsxReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, item_column: &str) -> Self {
        Self {
            output_dir: output_dir.into(),
            item_column: item_column.to_string(),
        }
    }

    /// Builds the workbook in memory.
    pub fn render(&self, report: &FolderReport) -> Result<Vec<u8>, Error> {
        let mut workbook = Workbook::new();
        let mut names = SheetNames::default();
        let formats = Formats::new();

        for fixed in [MANIFEST_SHEET, CONSOLIDATED_SHEET, PRICE_SHEET] {
            names.reserve(fixed);
        }

        let manifest = workbook.add_worksheet();
        manifest.set_name(MANIFEST_SHEET)?;
        write_manifest(manifest, &report.manifest, &formats)?;

        let mut file_sheets = Vec::with_capacity(report.file_tables.len());
        for file in &report.file_tables {
            let sheet = workbook.add_worksheet();
            sheet.set_name(names.claim(&file.file_name))?;
            write_table(sheet, &file.table, &formats, None)?;
            file_sheets.push(sheet.name());
        }

        let consolidated = workbook.add_worksheet();
        consolidated.set_name(CONSOLIDATED_SHEET)?;
        write_table(consolidated, &report.consolidated, &formats, None)?;

        if let Some(price_only) = &report.price_only {
            let sheet = workbook.add_worksheet();
            sheet.set_name(PRICE_SHEET)?;
            let shading = item_shading(price_only, &self.item_column);
            write_table(sheet, price_only, &formats, shading.as_deref())?;
        }

        // A hidden sheet cannot be the active one, so hide only when another sheet takes focus.
        let visible = if report.price_only.is_some() {
            Some(PRICE_SHEET.to_string())
        } else {
            file_sheets.first().cloned()
        };
        if let Some(visible) = visible {
            workbook.worksheet_from_name(&visible)?.set_active(true);
            for hidden in [MANIFEST_SHEET, CONSOLIDATED_SHEET] {
                workbook.worksheet_from_name(hidden)?.set_hidden(true);
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

impl ReportSink for XlsxReportWriter {
    fn write_report(&self, report: &FolderReport) -> Result<ReportArtifact, Error> {
        let content = self.render(report)?;
        fs::create_dir_all(&self.output_dir)?;
        let file_name = report_file_name(&report.folder_name);
        let path = self.output_dir.join(&file_name);
        fs::write(&path, &content)?;
        info!("Wrote {} ({} bytes)", path.display(), content.len());
        Ok(ReportArtifact {
            file_name,
            path,
            content,
        })
    }
}

struct Formats {
    header: Format,
    date: Format,
    plain: Format,
    shaded: Format,
    shaded_date: Format,
}

impl Formats {
    fn new() -> Self {
        let date_pattern = "yyyy-mm-dd hh:mm:ss";
        let fill = |rgb: u32| {
            Format::new()
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(rgb))
        };
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format(date_pattern),
            plain: fill(PLAIN),
            shaded: fill(SHADE),
            shaded_date: fill(SHADE).set_num_format(date_pattern),
        }
    }
}

/// Excel sheet names: no `[]:*?/\`, no edge apostrophes, at most 31 characters,
/// unique regardless of case.
#[derive(Default)]
struct SheetNames {
    used: HashSet<String>,
}

impl SheetNames {
    fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_lowercase());
    }

    fn claim(&mut self, raw: &str) -> String {
        let base = sanitize_sheet_name(raw);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate.to_lowercase()) {
            let suffix = format!("~{}", n);
            let keep = MAX_SHEET_NAME - suffix.chars().count();
            candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            n += 1;
        }
        self.used.insert(candidate.to_lowercase());
        candidate
    }
}

pub fn sanitize_sheet_name(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let truncated: String = replaced
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME)
        .collect();
    let truncated = truncated.trim_matches('\'');
    if truncated.trim().is_empty() {
        "Sheet".to_string()
    } else {
        truncated.to_string()
    }
}

/// Per-row shade flag, toggling whenever the item value changes from the row above.
fn item_shading(table: &Table, item_column: &str) -> Option<Vec<bool>> {
    let idx = table
        .columns()
        .iter()
        .position(|c| c.trim().eq_ignore_ascii_case(item_column.trim()))?;
    let mut flags = Vec::with_capacity(table.len());
    let mut shaded = true;
    let mut previous: Option<&Cell> = None;
    for row in table.rows() {
        let current = &row[idx];
        if previous.is_some_and(|p| p != current) {
            shaded = !shaded;
        }
        flags.push(shaded);
        previous = Some(current);
    }
    Some(flags)
}

fn write_manifest(
    sheet: &mut Worksheet,
    items: &[InventoryItem],
    formats: &Formats,
) -> Result<(), XlsxError> {
    let mut widths = vec![0usize; InventoryItem::HEADERS.len()];
    for (col, header) in InventoryItem::HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &formats.header)?;
        widths[col] = header.chars().count();
    }
    for (row, item) in items.iter().enumerate() {
        for (col, value) in item.to_record().iter().enumerate() {
            sheet.write_string(row as u32 + 1, col as u16, value)?;
            widths[col] = widths[col].max(measure(value));
        }
    }
    apply_widths(sheet, &widths, |_| false)
}

fn write_table(
    sheet: &mut Worksheet,
    table: &Table,
    formats: &Formats,
    shading: Option<&[bool]>,
) -> Result<(), XlsxError> {
    let mut widths = vec![0usize; table.width()];
    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &formats.header)?;
        widths[col] = name.chars().count();
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let r = idx as u32 + 1;
        let shade = shading.map(|flags| flags[idx]);
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            let (format, date_format) = match shade {
                Some(true) => (Some(&formats.shaded), &formats.shaded_date),
                Some(false) => (Some(&formats.plain), &formats.date),
                None => (None, &formats.date),
            };
            match (cell, format) {
                (Cell::Empty, Some(format)) => {
                    sheet.write_blank(r, c, format)?;
                }
                (Cell::Empty, None) => {}
                (Cell::Text(s), Some(format)) => {
                    sheet.write_string_with_format(r, c, s, format)?;
                }
                (Cell::Text(s), None) => {
                    sheet.write_string(r, c, s)?;
                }
                (Cell::Number(n), Some(format)) => {
                    sheet.write_number_with_format(r, c, *n, format)?;
                }
                (Cell::Number(n), None) => {
                    sheet.write_number(r, c, *n)?;
                }
                (Cell::Bool(b), Some(format)) => {
                    sheet.write_boolean_with_format(r, c, *b, format)?;
                }
                (Cell::Bool(b), None) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                (Cell::DateTime(dt), _) => {
                    sheet.write_datetime_with_format(r, c, dt, date_format)?;
                }
            }
            widths[col] = widths[col].max(measure(&cell.to_string()));
        }
    }

    let names = table.columns();
    apply_widths(sheet, &widths, |col| columns::is_provenance(&names[col]))
}

fn measure(value: &str) -> usize {
    value.chars().take(MAX_MEASURED_CHARS).count()
}

fn apply_widths(
    sheet: &mut Worksheet,
    widths: &[usize],
    skip: impl Fn(usize) -> bool,
) -> Result<(), XlsxError> {
    for (col, width) in widths.iter().enumerate() {
        if skip(col) {
            continue;
        }
        let width = (width + 2).clamp(MIN_WIDTH, MAX_WIDTH);
        sheet.set_column_width(col as u16, width as f64)?;
    }
    debug!("Sized {} columns", widths.len());
    Ok(())
}
