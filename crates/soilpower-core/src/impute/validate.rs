//! Before/after missing-value audit.

use std::fmt;

use serde::Serialize;

use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImputationReport {
    pub total_missing_before: usize,
    pub total_missing_after: usize,
    /// Columns with at least one missing cell before imputation, in column order.
    pub missing_before: Vec<(String, usize)>,
    /// Columns with at least one missing cell after imputation, in column order.
    pub missing_after: Vec<(String, usize)>,
}

impl ImputationReport {
    pub fn compare(before: &Table, after: &Table) -> Self {
        Self {
            total_missing_before: before.total_missing(),
            total_missing_after: after.total_missing(),
            missing_before: columns_with_missing(before),
            missing_after: columns_with_missing(after),
        }
    }

    pub fn filled(&self) -> usize {
        self.total_missing_before.saturating_sub(self.total_missing_after)
    }
}

fn columns_with_missing(t: &Table) -> Vec<(String, usize)> {
    (0..t.width())
        .map(|c| (t.columns[c].clone(), t.missing_in_column(c)))
        .filter(|(_, n)| *n > 0)
        .collect()
}

impl fmt::Display for ImputationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Imputation Validation Results")?;
        writeln!(f, "=============================")?;
        writeln!(f)?;
        writeln!(f, "Total missing values before: {}", self.total_missing_before)?;
        writeln!(f, "Total missing values after: {}", self.total_missing_after)?;
        writeln!(f)?;
        writeln!(f, "Columns with missing values before:")?;
        for (col, n) in &self.missing_before {
            writeln!(f, "  {col}: {n}")?;
        }
        writeln!(f)?;
        writeln!(f, "Columns with missing values after:")?;
        for (col, n) in &self.missing_after {
            writeln!(f, "  {col}: {n}")?;
        }
        Ok(())
    }
}
