use crate::columns;
use crate::error::Error;
use chrono::NaiveDateTime;
use std::fmt;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A loosely typed spreadsheet value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Cell::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

/// Schema-less table: named columns and rows of cells. Every row has exactly
/// `columns.len()` cells and column names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Appends a row, padding with `Empty` or truncating to the table width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) {
        self.rows[row][col] = value;
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Inserts `name` at `position` (clamped to the width) filled with `fill`.
    /// Returns false and leaves the table untouched when the column exists.
    pub fn insert_column(&mut self, position: usize, name: &str, fill: Cell) -> bool {
        if self.has_column(name) {
            return false;
        }
        let position = position.min(self.columns.len());
        self.columns.insert(position, name.to_string());
        for row in &mut self.rows {
            row.insert(position, fill.clone());
        }
        true
    }

    /// Drops columns with no non-missing value. Report columns, provenance
    /// included, are kept even when blank.
    pub fn drop_empty_columns(&mut self) {
        let keep: Vec<bool> = (0..self.columns.len())
            .map(|idx| {
                columns::is_report_column(&self.columns[idx])
                    || self.rows.iter().any(|row| !row[idx].is_missing())
            })
            .collect();
        if keep.iter().all(|k| *k) {
            return;
        }
        self.columns = retain_flags(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            *row = retain_flags(std::mem::take(row), &keep);
        }
    }

    /// New table with exactly `names`, in that order.
    pub fn select(&self, names: &[&str]) -> Result<Table, Error> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }
        let indexes: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        Ok(self.project(&indexes))
    }

    /// New table with the subset of `names` this table carries, in the order of `names`.
    pub fn retain_columns(&self, names: &[String]) -> Table {
        let indexes: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        self.project(&indexes)
    }

    fn project(&self, indexes: &[usize]) -> Table {
        Table {
            columns: indexes.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indexes.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Rows in the order given by `order` (a permutation or subset of row indexes).
    pub fn reorder(&self, order: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: order.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Concatenates rows keeping the superset of columns in first-appearance order.
    /// Cells absent from a source table are `Empty`.
    pub fn union_all(tables: Vec<Table>) -> Table {
        let mut out = Table::default();
        for table in &tables {
            for column in &table.columns {
                if !out.has_column(column) {
                    out.columns.push(column.clone());
                }
            }
        }
        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .filter_map(|column| out.column_index(column))
                .collect();
            for row in table.rows {
                let mut merged = vec![Cell::Empty; out.columns.len()];
                for (cell, &target) in row.into_iter().zip(&mapping) {
                    merged[target] = cell;
                }
                out.rows.push(merged);
            }
        }
        out
    }
}

fn retain_flags<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, &k)| k.then_some(item))
        .collect()
}
