//! Soil and climate table processing: collection, spatial join, identity-key
//! deduplication, column pruning, and spatial-cluster imputation.
pub mod config;
pub mod coords;
pub mod csv_io;
pub mod dedup;
pub mod error;
pub mod impute;
pub mod join;
pub mod pipeline;
pub mod prune;
pub mod table;

pub use config::PipelineParams;
pub use csv_io::{collect_dir, read_csv, write_csv, CsvOptions};
pub use dedup::{deduplicate, DedupSummary};
pub use error::{Result, SoilError};
pub use impute::nearest_fill::FallbackMode;
pub use impute::{spatial_cluster_imputation, ImputeParams, ImputeSummary};
pub use join::spatial_join;
pub use pipeline::{run_pipeline, run_stages, PipelineSummary};
pub use table::{Record, Table, Value};
