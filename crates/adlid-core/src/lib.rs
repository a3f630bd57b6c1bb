pub mod analysis;
pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod output;
pub mod progress;
pub mod remote;
pub mod resolver;
pub mod scanner;
pub mod storage;
pub mod week;

pub use config::AppConfig;
pub use engine::{FolderOutcome, ReportEngine, RunResult};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
