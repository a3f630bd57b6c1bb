/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif bars; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_inventory_start(&self) {}
    fn on_inventory_progress(&self, _items_found: usize, _current_path: &str) {}
    fn on_inventory_complete(&self, _total_items: usize, _duration_secs: f64) {}
    fn on_folder_start(&self, _folder: &str, _total_files: usize) {}
    fn on_file_processed(&self, _files_done: usize, _total_files: usize) {}
    fn on_folder_complete(&self, _folder: &str, _report_rows: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
