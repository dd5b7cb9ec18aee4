use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SoilError};
use crate::impute::dbscan::DbscanParams;
use crate::impute::nearest_fill::FallbackMode;
use crate::impute::{default_excluded_columns, ImputeParams};

/// Caller-supplied knobs for the whole pipeline.
/// Missing keys in a params file take these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineParams {
    /// DBSCAN radius in degrees.
    pub eps: f64,
    /// DBSCAN minimum neighbourhood size.
    pub min_samples: usize,
    pub fallback: FallbackMode,
    /// Columns never imputed.
    pub excluded_columns: Vec<String>,
    /// Column-name prefixes removed by the pruning stage.
    pub prune_prefixes: Vec<String>,
    /// Exact column names removed by the pruning stage.
    pub prune_columns: Vec<String>,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            eps: 0.5,
            min_samples: 5,
            fallback: FallbackMode::Sequential,
            excluded_columns: default_excluded_columns(),
            prune_prefixes: vec!["SOIL".into(), "PROP".into()],
            prune_columns: vec!["PARAMETER".into()],
        }
    }
}

impl PipelineParams {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| SoilError::io(path, e))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(text)?;
        params.impute_params().clustering.validate()?;
        Ok(params)
    }

    pub fn impute_params(&self) -> ImputeParams {
        ImputeParams {
            clustering: DbscanParams { eps: self.eps, min_samples: self.min_samples },
            fallback: self.fallback,
            excluded_columns: self.excluded_columns.clone(),
        }
    }
}
