mod commands;
mod logging;
mod progress;

use std::path::Path;
use std::process;

use adlid_core::output::XlsxReportWriter;
use adlid_core::remote::{GraphClient, LocalTree, RemoteTree, UploadSink};
use adlid_core::week::{CalendarWeek, FixedWeek, WeekSource};
use adlid_core::{AppConfig, ReportEngine, SilentReporter};
use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, SourceArgs, WeekArgs};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match adlid_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let outcome = match args.command {
        Some(Commands::Run {
            week,
            source,
            upload,
        }) => run_report(&config, &week, &source, upload),
        Some(Commands::Inventory { output, source }) => {
            run_inventory(&config, output.as_deref(), &source)
        }
        Some(Commands::Resolve { week, source }) => run_resolve(&config, &week, &source),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

/// The storage a command reads from: Microsoft Graph, or a local mirror of the drive.
enum Backend {
    Graph(GraphClient),
    Local(LocalTree),
}

impl Backend {
    fn connect(config: &AppConfig, source: &SourceArgs) -> anyhow::Result<Self> {
        match &source.local {
            Some(dir) => {
                info!("Reading from local directory {}", dir.display());
                Ok(Backend::Local(LocalTree::new(dir)))
            }
            None => {
                let client = GraphClient::connect(&config.graph)
                    .context("connecting to Microsoft Graph")?;
                Ok(Backend::Graph(client))
            }
        }
    }

    fn tree(&self) -> &dyn RemoteTree {
        match self {
            Backend::Graph(client) => client,
            Backend::Local(tree) => tree,
        }
    }

    fn uploader(&self) -> &dyn UploadSink {
        match self {
            Backend::Graph(client) => client,
            Backend::Local(tree) => tree,
        }
    }
}

fn with_week_overrides(config: &AppConfig, args: &WeekArgs) -> anyhow::Result<AppConfig> {
    let mut config = config.clone();
    if let Some(week) = args.week {
        config.week = Some(week);
    }
    if let Some(horizon) = args.horizon {
        config.horizon = horizon;
    }
    config.validate()?;
    Ok(config)
}

fn week_source(config: &AppConfig) -> Box<dyn WeekSource> {
    match config.week {
        Some(week) => Box::new(FixedWeek(week)),
        None => Box::new(CalendarWeek),
    }
}

fn run_report(
    config: &AppConfig,
    week: &WeekArgs,
    source: &SourceArgs,
    upload: bool,
) -> anyhow::Result<()> {
    let config = with_week_overrides(config, week)?;
    let backend = Backend::connect(&config, source)?;
    let weeks = week_source(&config);
    let sink = XlsxReportWriter::new(&config.output_dir, &config.columns.item);
    let uploader = (upload || config.upload).then(|| backend.uploader());

    let engine = ReportEngine::new(config);
    let reporter = CliReporter::new();
    let result = engine.run(backend.tree(), weeks.as_ref(), &sink, uploader, &reporter)?;

    println!();
    info!(
        "Inventory: {}, Reports: {}",
        format!("{:.2}s", result.inventory_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.report_duration.as_secs_f64()).green(),
    );
    info!(
        "Week {}: {} items, {} folders processed, {} report rows",
        format!("{}", result.reference_week).cyan(),
        format!("{}", result.inventory_items).cyan(),
        format!("{}", result.folders_processed()).cyan(),
        format!("{}", result.report_rows()).cyan(),
    );
    for folder in &result.folders {
        match &folder.artifact {
            Some(path) => info!(
                "{} -> {} ({}/{} files)",
                folder.folder_name,
                path.display().to_string().green(),
                folder.files_extracted,
                folder.files_found,
            ),
            None => warn!("{}: no report written", folder.folder_name),
        }
    }
    for missing in &result.folders_missing {
        warn!("{} {}", "Missing:".red(), missing);
    }

    Ok(())
}

fn run_inventory(
    config: &AppConfig,
    output: Option<&Path>,
    source: &SourceArgs,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(output) = output {
        config.inventory_csv = Some(output.display().to_string());
    }
    let backend = Backend::connect(&config, source)?;
    let engine = ReportEngine::new(config);
    let items = engine.build_inventory(backend.tree(), &CliReporter::new())?;

    let folders = items.iter().filter(|i| i.is_folder()).count();
    info!(
        "{} folders, {} files",
        format!("{}", folders).cyan(),
        format!("{}", items.len() - folders).cyan(),
    );
    match engine.config().inventory_csv.as_deref() {
        Some(path) if !path.trim().is_empty() => info!("Inventory written to {}", path),
        _ => warn!("No inventory_csv configured; nothing written"),
    }
    Ok(())
}

fn run_resolve(config: &AppConfig, week: &WeekArgs, source: &SourceArgs) -> anyhow::Result<()> {
    let mut config = with_week_overrides(config, week)?;
    config.inventory_csv = None;
    let backend = Backend::connect(&config, source)?;
    let reference_week = week_source(&config).current_week();

    let engine = ReportEngine::new(config);
    let items = engine.build_inventory(backend.tree(), &SilentReporter)?;
    println!("Reference week {}", reference_week);
    for folder in engine.resolve(&items, reference_week) {
        if folder.found {
            println!("  {} {}", "found  ".green(), folder.name);
        } else {
            println!("  {} {}", "missing".red(), folder.name);
        }
    }
    Ok(())
}
