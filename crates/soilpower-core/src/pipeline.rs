//! Pipeline orchestrator: runs deduplication, pruning and imputation in order,
//! materialising every intermediate table.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::Serialize;

use crate::config::PipelineParams;
use crate::csv_io::{read_csv, write_csv, CsvOptions};
use crate::dedup::{deduplicate, DedupSummary};
use crate::error::{Result, SoilError};
use crate::impute::{spatial_cluster_imputation, ImputeSummary};
use crate::prune::drop_columns;
use crate::table::Table;

pub const DEDUPLICATED_FILE: &str = "deduplicated.csv";
pub const PRUNED_FILE: &str = "pruned.csv";
pub const IMPUTED_FILE: &str = "imputed.csv";

/// Where each stage's artifact was written.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutputs {
    pub deduplicated: PathBuf,
    pub pruned: PathBuf,
    pub imputed: PathBuf,
    pub validation: PathBuf,
}

impl StageOutputs {
    pub fn in_dir(dir: &Path) -> Self {
        let imputed = dir.join(IMPUTED_FILE);
        Self {
            deduplicated: dir.join(DEDUPLICATED_FILE),
            pruned: dir.join(PRUNED_FILE),
            validation: validation_path(&imputed),
            imputed,
        }
    }
}

/// Full output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub dedup: DedupSummary,
    pub pruned_columns: usize,
    pub impute: ImputeSummary,
    pub outputs: StageOutputs,
    pub elapsed_ms: u64,
}

/// `<stem>_validation.txt` next to the imputed file.
pub fn validation_path(imputed: &Path) -> PathBuf {
    let stem = imputed.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    imputed.with_file_name(format!("{stem}_validation.txt"))
}

/// Tables produced by the in-memory stages.
#[derive(Debug, Clone)]
pub struct StageTables {
    pub deduplicated: Table,
    pub pruned: Table,
    pub imputed: Table,
    pub dedup: DedupSummary,
    pub impute: ImputeSummary,
}

/// In-memory stages only; no files are touched.
pub fn run_stages(input: &Table, params: &PipelineParams) -> Result<StageTables> {
    let (deduplicated, dedup) = deduplicate(input)?;
    let pruned = drop_columns(&deduplicated, &params.prune_prefixes, &params.prune_columns);
    let (imputed, impute) = spatial_cluster_imputation(&pruned, &params.impute_params())?;
    Ok(StageTables { deduplicated, pruned, imputed, dedup, impute })
}

/// Read `input`, run every stage, and write each artifact into `out_dir` as soon
/// as its stage completes. A failing stage leaves earlier artifacts on disk.
///
/// Stage order:
///   1. Deduplication on (LAT, LON, YEAR)
///   2. Column pruning
///   3. Spatial-cluster imputation
///   4. Validation report
pub fn run_pipeline(input: &Path, out_dir: &Path, read_opts: &CsvOptions, params: &PipelineParams) -> Result<PipelineSummary> {
    let start = Instant::now();
    let impute_params = params.impute_params();
    impute_params.clustering.validate()?;
    let outputs = StageOutputs::in_dir(out_dir);

    let raw = read_csv(input, read_opts)?;
    info!("loaded {} rows x {} columns from {}", raw.len(), raw.width(), input.display());

    // ── 1. Deduplication ────────────────────────────────────────────────────
    let (deduplicated, dedup) = deduplicate(&raw)?;
    write_csv(&outputs.deduplicated, &deduplicated)?;

    // ── 2. Column pruning ───────────────────────────────────────────────────
    let pruned = drop_columns(&deduplicated, &params.prune_prefixes, &params.prune_columns);
    write_csv(&outputs.pruned, &pruned)?;

    // ── 3. Spatial-cluster imputation ───────────────────────────────────────
    let (imputed, impute) = spatial_cluster_imputation(&pruned, &impute_params)?;
    write_csv(&outputs.imputed, &imputed)?;

    // ── 4. Validation report ────────────────────────────────────────────────
    fs::write(&outputs.validation, impute.report.to_string())
        .map_err(|e| SoilError::io(&outputs.validation, e))?;

    let summary = PipelineSummary {
        dedup,
        pruned_columns: deduplicated.width() - pruned.width(),
        impute,
        outputs,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    info!("pipeline finished in {} ms", summary.elapsed_ms);
    Ok(summary)
}
