use crate::error::Error;
use crate::storage::{Cell, Table};
use tracing::debug;

/// Cleaned strings longer than this are taken to be timestamps, not prices.
const MAX_PRICE_DIGITS: usize = 7;

/// Normalizes one price cell: keeps digits and periods only, and rejects
/// anything that compresses to more than seven characters as a stray date.
///
/// `"$ 34.95"` gives `"34.95"`; `"2025-10-18 00:00:00"` and blanks give `None`.
pub fn clean_price_cell(cell: &Cell) -> Option<String> {
    let raw = price_text(cell);
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.len() > MAX_PRICE_DIGITS {
        return None;
    }
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Whole-number floats keep a trailing `.0`, so `13.0` reads `"13.0"` and
/// counts toward the length check like any other digit.
fn price_text(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{:.1}", n),
        other => other.to_string(),
    }
}

/// True when every non-missing cell is a native date/time and there is at least one.
pub fn is_native_date_column(cells: &[&Cell]) -> bool {
    let mut present = cells.iter().filter(|cell| !cell.is_missing()).peekable();
    present.peek().is_some() && present.all(|cell| matches!(cell, Cell::DateTime(_)))
}

/// Cleans a whole column. A native date column yields no prices at all.
pub fn clean_price_column(cells: &[&Cell]) -> Vec<Option<String>> {
    if is_native_date_column(cells) {
        return vec![None; cells.len()];
    }
    cells.iter().map(|cell| clean_price_cell(cell)).collect()
}

/// Rows of `table` whose price cleans to a value, with the cleaned text in
/// place of the raw price. Fails when the price column is absent.
pub fn price_only_table(table: &Table, price_column: &str) -> Result<Table, Error> {
    let Some(idx) = table.column_index(price_column) else {
        return Err(Error::MissingColumns(vec![price_column.to_string()]));
    };
    let cells: Vec<&Cell> = table.rows().iter().map(|row| &row[idx]).collect();
    let cleaned = clean_price_column(&cells);

    let mut out = Table::new(table.columns().to_vec());
    for (row, price) in table.rows().iter().zip(cleaned) {
        if let Some(price) = price {
            let mut row = row.clone();
            row[idx] = Cell::Text(price);
            out.push_row(row);
        }
    }
    debug!(
        "Price filter on '{}' kept {} of {} rows",
        price_column,
        out.len(),
        table.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date_cell(y: i32, m: u32, d: u32) -> Cell {
        Cell::DateTime(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_clean_price_cell() {
        assert_eq!(clean_price_cell(&Cell::text("2025-10-18 00:00:00")), None);
        assert_eq!(clean_price_cell(&Cell::text("$ 34.95")), Some("34.95".to_string()));
        assert_eq!(clean_price_cell(&Cell::text("13.5")), Some("13.5".to_string()));
        assert_eq!(clean_price_cell(&Cell::Number(13.5)), Some("13.5".to_string()));
        assert_eq!(clean_price_cell(&Cell::Number(13.0)), Some("13.0".to_string()));
        assert_eq!(clean_price_cell(&Cell::text("   ")), None);
        assert_eq!(clean_price_cell(&Cell::Empty), None);
        assert_eq!(clean_price_cell(&Cell::text("TBD")), None);
        assert_eq!(clean_price_cell(&date_cell(2025, 10, 18)), None);
    }

    #[test]
    fn test_seven_character_threshold() {
        assert_eq!(clean_price_cell(&Cell::text("1234.50")), Some("1234.50".to_string()));
        assert_eq!(clean_price_cell(&Cell::text("12345.50")), None);
        assert_eq!(clean_price_cell(&Cell::Number(12345.0)), Some("12345.0".to_string()));
        assert_eq!(clean_price_cell(&Cell::Number(123456.0)), None);
        assert_eq!(clean_price_cell(&Cell::text("1234567")), Some("1234567".to_string()));
    }

    #[test]
    fn test_native_date_column_is_all_missing() {
        let a = date_cell(2025, 10, 18);
        let b = date_cell(2025, 10, 25);
        let blank = Cell::Empty;
        let cells = vec![&a, &blank, &b];
        assert!(is_native_date_column(&cells));
        assert_eq!(clean_price_column(&cells), vec![None, None, None]);

        let empty: Vec<&Cell> = vec![&blank];
        assert!(!is_native_date_column(&empty));
    }

    #[test]
    fn test_price_only_table_filters_and_replaces() {
        let table = Table::from_rows(
            vec!["Item".to_string(), "Ad Lid Price".to_string()],
            vec![
                vec![Cell::Number(1.0), Cell::text("$ 34.95")],
                vec![Cell::Number(2.0), Cell::text("2025-10-18 00:00:00")],
                vec![Cell::Number(3.0), Cell::Empty],
                vec![Cell::Number(4.0), Cell::Number(13.5)],
            ],
        );
        let priced = price_only_table(&table, "Ad Lid Price").unwrap();
        assert_eq!(priced.len(), 2);
        assert_eq!(priced.cell(0, 1), &Cell::text("34.95"));
        assert_eq!(priced.cell(1, 0), &Cell::Number(4.0));
        assert_eq!(priced.cell(1, 1), &Cell::text("13.5"));
        // The source table is untouched.
        assert_eq!(table.cell(0, 1), &Cell::text("$ 34.95"));
    }

    #[test]
    fn test_price_only_table_requires_price_column() {
        let table = Table::new(vec!["Item".to_string()]);
        assert!(matches!(
            price_only_table(&table, "Ad Lid Price"),
            Err(Error::MissingColumns(_))
        ));
    }
}
