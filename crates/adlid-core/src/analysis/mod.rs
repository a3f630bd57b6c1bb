pub mod clean;
pub mod consolidate;
pub mod rank;

pub use clean::{clean_price_cell, clean_price_column, is_native_date_column, price_only_table};
pub use consolidate::{ensure_provenance, Consolidator};
pub use rank::{project_report_columns, Ranker};
