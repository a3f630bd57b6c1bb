use crate::columns::REPORT_COLUMNS;
use crate::config::ColumnNames;
use crate::error::Error;
use crate::storage::{Cell, Table};
use ahash::AHashMap;
use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d"];

/// Orders a price-only table for the report.
///
/// Four stable passes, in this order:
/// 1. numeric `Item` ascending, non-numeric last;
/// 2. `Item` group size descending;
/// 3. group's earliest start date ascending, undated groups last;
/// 4. groups kept in the order reached so far, rows inside a group by their
///    own start date, then price (missing last).
///
/// Columns absent from the table make every row tie on that key.
pub struct Ranker {
    columns: ColumnNames,
}

struct RowKeys {
    item: Option<String>,
    item_number: Option<f64>,
    date: Option<NaiveDateTime>,
    price: Option<f64>,
}

impl Ranker {
    pub fn new(columns: &ColumnNames) -> Self {
        Self {
            columns: columns.clone(),
        }
    }

    pub fn rank(&self, table: &Table) -> Table {
        let keys = self.row_keys(table);
        let mut order: Vec<usize> = (0..table.len()).collect();

        // Phase 1
        order.sort_by(|&a, &b| none_last(keys[a].item_number, keys[b].item_number, f64::total_cmp));

        // Phase 2
        let mut group_size: AHashMap<&str, usize> = AHashMap::new();
        for key in &keys {
            if let Some(item) = key.item.as_deref() {
                *group_size.entry(item).or_default() += 1;
            }
        }
        let size_of = |row: usize| -> usize {
            keys[row]
                .item
                .as_deref()
                .and_then(|item| group_size.get(item).copied())
                .unwrap_or(0)
        };
        order.sort_by(|&a, &b| size_of(b).cmp(&size_of(a)));

        // Phase 3
        let mut group_start: AHashMap<&str, NaiveDateTime> = AHashMap::new();
        for key in &keys {
            if let (Some(item), Some(date)) = (key.item.as_deref(), key.date) {
                group_start
                    .entry(item)
                    .and_modify(|earliest| *earliest = (*earliest).min(date))
                    .or_insert(date);
            }
        }
        let start_of = |row: usize| -> Option<NaiveDateTime> {
            keys[row]
                .item
                .as_deref()
                .and_then(|item| group_start.get(item).copied())
        };
        order.sort_by(|&a, &b| none_last(start_of(a), start_of(b), |x, y| x.cmp(y)));

        // Phase 4
        let mut group_rank: AHashMap<&str, usize> = AHashMap::new();
        for &row in &order {
            if let Some(item) = keys[row].item.as_deref() {
                let next = group_rank.len();
                group_rank.entry(item).or_insert(next);
            }
        }
        let rank_of = |row: usize| -> usize {
            keys[row]
                .item
                .as_deref()
                .and_then(|item| group_rank.get(item).copied())
                .unwrap_or(usize::MAX)
        };
        order.sort_by(|&a, &b| {
            rank_of(a)
                .cmp(&rank_of(b))
                .then_with(|| none_last(keys[a].date, keys[b].date, |x, y| x.cmp(y)))
                .then_with(|| none_last(keys[a].price, keys[b].price, f64::total_cmp))
        });

        table.reorder(&order)
    }

    fn row_keys(&self, table: &Table) -> Vec<RowKeys> {
        let item_idx = table.column_index(&self.columns.item);
        let date_idx = table.column_index(&self.columns.start_date);
        let price_idx = table.column_index(&self.columns.price);

        table
            .rows()
            .iter()
            .map(|row| {
                let item = item_idx.and_then(|i| item_key(&row[i]));
                RowKeys {
                    item_number: item.as_deref().and_then(numeric_item),
                    item,
                    date: date_idx.and_then(|i| parse_date(&row[i])),
                    price: price_idx.and_then(|i| parse_price(&row[i])),
                }
            })
            .collect()
    }
}

/// Ascending with `None` after every value.
fn none_last<T: Copy>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn item_key(cell: &Cell) -> Option<String> {
    let text = cell.to_string();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn numeric_item(item: &str) -> Option<f64> {
    let digits: String = item
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_price(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|n| n.is_finite())
}

fn parse_date(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => {
            let s = s.trim();
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    DATE_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
        }
        _ => None,
    }
}

/// Restricts a ranked table to the report sheet's fixed column order.
pub fn project_report_columns(table: &Table) -> Result<Table, Error> {
    table.select(&REPORT_COLUMNS)
}
