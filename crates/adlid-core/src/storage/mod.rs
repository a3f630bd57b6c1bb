pub mod models;
pub mod table;

pub use models::{FolderInfo, InventoryItem, ItemKind};
pub use table::{Cell, Table};
