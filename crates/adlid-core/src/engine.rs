use crate::analysis::{price_only_table, project_report_columns, Consolidator, Ranker};
use crate::config::AppConfig;
use crate::error::Error;
use crate::extract::FileTableExtractor;
use crate::output::{write_inventory_csv, FolderReport, ReportSink};
use crate::progress::ProgressReporter;
use crate::remote::{upload_folder_path, RemoteTree, UploadSink};
use crate::resolver::{sort_latest_first, WeekResolver};
use crate::scanner::{order_by_top_folder_block, TreeFlattener};
use crate::storage::{FolderInfo, InventoryItem};
use crate::week::WeekSource;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct ReportEngine {
    config: AppConfig,
}

#[derive(Debug)]
pub struct RunResult {
    pub inventory_duration: Duration,
    pub report_duration: Duration,
    pub reference_week: u32,
    pub inventory_items: usize,
    pub folders_missing: Vec<String>,
    pub folders: Vec<FolderOutcome>,
}

impl RunResult {
    pub fn folders_processed(&self) -> usize {
        self.folders.len()
    }

    pub fn report_rows(&self) -> usize {
        self.folders.iter().map(|f| f.report_rows).sum()
    }
}

/// What happened to one resolved week folder.
#[derive(Debug)]
pub struct FolderOutcome {
    pub folder_name: String,
    pub files_found: usize,
    pub files_extracted: usize,
    pub consolidated_rows: usize,
    pub report_rows: usize,
    /// `None` when no file in the folder produced a table.
    pub artifact: Option<PathBuf>,
    pub uploaded_to: Option<String>,
}

impl ReportEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Flatten and block-order the remote tree, writing the CSV snapshot when configured.
    pub fn build_inventory(
        &self,
        tree: &dyn RemoteTree,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<InventoryItem>, Error> {
        info!("Building inventory of '{}'...", self.config.base_root());
        reporter.on_inventory_start();
        let start = Instant::now();

        let items = TreeFlattener::new(self.config.base_root()).flatten(tree, reporter)?;
        let ordered = order_by_top_folder_block(&items, self.config.root_position);

        reporter.on_inventory_complete(ordered.len(), start.elapsed().as_secs_f64());
        if let Some(path) = self.snapshot_path() {
            write_inventory_csv(&ordered, path)?;
        }
        Ok(ordered)
    }

    fn snapshot_path(&self) -> Option<&Path> {
        self.config
            .inventory_csv
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(Path::new)
    }

    /// Target folders for `week`, latest week first.
    pub fn resolve(&self, inventory: &[InventoryItem], week: u32) -> Vec<FolderInfo> {
        let mut folders = WeekResolver::new(inventory).resolve(week, self.config.horizon);
        sort_latest_first(&mut folders);
        folders
    }

    /// Extract, consolidate and rank the files of one folder. `Ok(None)` when no
    /// file produced a table. A folder whose table lacks a report column still
    /// gets its report, without the price sheet.
    pub fn process_folder(
        &self,
        tree: &dyn RemoteTree,
        folder_name: &str,
        manifest: Vec<InventoryItem>,
        reporter: &dyn ProgressReporter,
    ) -> Result<Option<FolderReport>, Error> {
        reporter.on_folder_start(folder_name, manifest.len());
        info!("Processing '{}' ({} files)", folder_name, manifest.len());

        let extractor = FileTableExtractor::from_strategy(self.config.sheet_strategy);
        let file_tables = extractor.extract_folder(tree, &manifest, reporter);
        if file_tables.is_empty() {
            warn!("No readable workbooks in '{}'", folder_name);
            return Ok(None);
        }

        let consolidated =
            Consolidator::new(self.config.merge_mode).consolidate(folder_name, &file_tables);

        let ranker = Ranker::new(&self.config.columns);
        let report = price_only_table(&consolidated, &self.config.columns.price)
            .and_then(|priced| project_report_columns(&ranker.rank(&priced)));
        let price_only = match report {
            Ok(table) => Some(table),
            Err(Error::MissingColumns(missing)) => {
                warn!(
                    "'{}' is missing column(s) {}; price sheet omitted",
                    folder_name,
                    missing.join(", ")
                );
                None
            }
            Err(e) => return Err(e),
        };
        debug!(
            "'{}': {} consolidated rows, {} report rows",
            folder_name,
            consolidated.len(),
            price_only.as_ref().map_or(0, |t| t.len())
        );

        Ok(Some(FolderReport {
            folder_name: folder_name.to_string(),
            manifest,
            file_tables,
            consolidated,
            price_only,
        }))
    }

    /// Full run: inventory, week resolution, one report per found folder,
    /// and an upload of each report when an uploader is given.
    pub fn run(
        &self,
        tree: &dyn RemoteTree,
        weeks: &dyn WeekSource,
        sink: &dyn ReportSink,
        uploader: Option<&dyn UploadSink>,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunResult, Error> {
        // Phase 1: Inventory
        let inventory_start = Instant::now();
        let inventory = self.build_inventory(tree, reporter)?;
        let inventory_duration = inventory_start.elapsed();

        // Phase 2: Resolve
        let reference_week = weeks.current_week();
        info!(
            "Reference week {}, horizon {}",
            reference_week, self.config.horizon
        );
        let targets = self.resolve(&inventory, reference_week);

        // Phase 3: Reports
        let report_start = Instant::now();
        let mut folders_missing = Vec::new();
        let mut folders = Vec::new();
        for target in targets {
            if !target.found {
                warn!("Folder not found in inventory: {}", target.name);
                folders_missing.push(target.name);
                continue;
            }

            let folder_start = Instant::now();
            let manifest = WeekResolver::new(&inventory).files_under_folder(&target.name);
            let mut outcome = FolderOutcome {
                folder_name: target.name.clone(),
                files_found: manifest.len(),
                files_extracted: 0,
                consolidated_rows: 0,
                report_rows: 0,
                artifact: None,
                uploaded_to: None,
            };

            if let Some(report) = self.process_folder(tree, &target.name, manifest, reporter)? {
                outcome.files_extracted = report.file_tables.len();
                outcome.consolidated_rows = report.consolidated.len();
                outcome.report_rows = report.price_only.as_ref().map_or(0, |t| t.len());

                let artifact = sink.write_report(&report)?;
                if let Some(uploader) = uploader {
                    let folder_path = upload_folder_path(self.config.base_root(), &target.name);
                    let location =
                        uploader.upload(&folder_path, &artifact.file_name, &artifact.content)?;
                    info!("Uploaded {} to {}", artifact.file_name, location);
                    outcome.uploaded_to = Some(location);
                }
                outcome.artifact = Some(artifact.path);
            }

            reporter.on_folder_complete(
                &outcome.folder_name,
                outcome.report_rows,
                folder_start.elapsed().as_secs_f64(),
            );
            folders.push(outcome);
        }

        Ok(RunResult {
            inventory_duration,
            report_duration: report_start.elapsed(),
            reference_week,
            inventory_items: inventory.len(),
            folders_missing,
            folders,
        })
    }
}
