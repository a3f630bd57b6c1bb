pub mod order;
pub mod walk;

pub use order::order_by_top_folder_block;
pub use walk::{relative_parent_path, FlattenOptions, TreeFlattener};
