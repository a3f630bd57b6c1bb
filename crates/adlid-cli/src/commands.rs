use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "adlid")]
#[command(about = "Weekly ad lid price summaries from OneDrive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the inventory, summarize the current week folders and write reports
    Run {
        #[command(flatten)]
        week: WeekArgs,
        #[command(flatten)]
        source: SourceArgs,
        /// Upload each report into its week folder
        #[arg(long)]
        upload: bool,
    },
    /// Build the ordered inventory and write it as CSV
    Inventory {
        /// Output path (defaults to the configured inventory_csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show which week folders resolve for the reference week
    Resolve {
        #[command(flatten)]
        week: WeekArgs,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct WeekArgs {
    /// Reference week number (defaults to config, then the current calendar week)
    #[arg(short, long)]
    pub week: Option<u32>,
    /// Number of week folders to resolve
    #[arg(long)]
    pub horizon: Option<u32>,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Read from a local directory mirroring the drive root instead of Microsoft Graph
    #[arg(long, value_name = "DIR")]
    pub local: Option<PathBuf>,
}
