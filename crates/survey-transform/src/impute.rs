//! Mode imputation.

use std::cmp::Ordering;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::data_utils::{column_names, numeric_values, set_f64_column};
use crate::error::{Result, TransformError};

/// Fill value for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMode {
    pub attribute: String,
    pub mode: f64,
}

/// Per-column modes learned from the fitting table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Imputer {
    columns: Vec<ColumnMode>,
}

impl Imputer {
    /// Learns the mode of every column.
    ///
    /// Text columns are a coercion error and a column without any observed
    /// value is a degenerate-statistics error.
    pub fn fit(df: &DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());
        for attribute in column_names(df) {
            let values = numeric_values(df, &attribute)?;
            let mode = mode(&values)?.ok_or_else(|| TransformError::DegenerateStatistics {
                attribute: attribute.clone(),
                reason: "no observed values to take a mode from".to_string(),
            })?;
            trace!(%attribute, mode, "fitted mode");
            columns.push(ColumnMode { attribute, mode });
        }
        Ok(Self { columns })
    }

    pub fn mode_of(&self, attribute: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|column| column.attribute == attribute)
            .map(|column| column.mode)
    }

    pub fn columns(&self) -> &[ColumnMode] {
        &self.columns
    }

    /// Fills nulls with the learned modes; every column becomes `Float64`.
    ///
    /// Returns the columns that had gaps with their fill counts.
    pub fn apply(&self, df: &mut DataFrame) -> Result<Vec<(String, usize)>> {
        let mut filled = Vec::new();
        for ColumnMode { attribute, mode } in &self.columns {
            let values = numeric_values(df, attribute)?;
            let gaps = values.iter().filter(|v| v.is_none()).count();
            let complete: Vec<Option<f64>> =
                values.into_iter().map(|v| Some(v.unwrap_or(*mode))).collect();
            set_f64_column(df, attribute, complete)?;
            if gaps > 0 {
                filled.push((attribute.clone(), gaps));
            }
        }
        Ok(filled)
    }
}

/// Most frequent value; ties go to the smallest value.
pub fn mode(values: &[Option<f64>]) -> PolarsResult<Option<f64>> {
    let observed = Series::new("value".into(), values).drop_nulls();
    if observed.is_empty() {
        return Ok(None);
    }
    let counts = observed.value_counts(false, false, "counts".into(), false)?;
    let distinct = counts.column("value")?.f64()?;
    let frequency = counts.column("counts")?.idx()?;

    let best = distinct
        .iter()
        .zip(frequency.iter())
        .filter_map(|(value, count)| Some((value?, count?)))
        .reduce(|best, candidate| match candidate.1.cmp(&best.1) {
            Ordering::Greater => candidate,
            Ordering::Equal if candidate.0 < best.0 => candidate,
            _ => best,
        });
    Ok(best.map(|(value, _)| value))
}
