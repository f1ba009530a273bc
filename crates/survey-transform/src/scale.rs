//! Standard scaling with population statistics.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use survey_model::ZeroVariancePolicy;
use tracing::trace;

use crate::data_utils::{column_names, numeric_values, set_f64_column};
use crate::error::{Result, TransformError};

/// Centre and scale for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub attribute: String,
    pub mean: f64,
    /// Population standard deviation, or 1 for a zero-variance column.
    pub scale: f64,
    pub zero_variance: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    columns: Vec<ColumnScale>,
}

impl Scaler {
    /// Learns mean and population standard deviation per column.
    pub fn fit(df: &DataFrame, policy: ZeroVariancePolicy) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());
        for attribute in column_names(df) {
            let values: Vec<f64> = numeric_values(df, &attribute)?
                .into_iter()
                .flatten()
                .collect();
            let (mean, std) = population_stats(&values).ok_or_else(|| {
                TransformError::DegenerateStatistics {
                    attribute: attribute.clone(),
                    reason: "mean or standard deviation is not finite".to_string(),
                }
            })?;
            trace!(%attribute, mean, std, "fitted scale");

            let zero_variance = std <= f64::EPSILON * mean.abs().max(1.0);
            if zero_variance && policy == ZeroVariancePolicy::Fail {
                return Err(TransformError::DegenerateStatistics {
                    attribute,
                    reason: "zero variance".to_string(),
                });
            }
            columns.push(ColumnScale {
                attribute,
                mean,
                scale: if zero_variance { 1.0 } else { std },
                zero_variance,
            });
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnScale] {
        &self.columns
    }

    pub fn get(&self, attribute: &str) -> Option<&ColumnScale> {
        self.columns.iter().find(|c| c.attribute == attribute)
    }

    /// Rewrites every fitted column as `(value - mean) / scale`.
    pub fn apply(&self, df: &mut DataFrame) -> Result<()> {
        for ColumnScale {
            attribute,
            mean,
            scale,
            ..
        } in &self.columns
        {
            let scaled: Vec<Option<f64>> = numeric_values(df, attribute)?
                .into_iter()
                .map(|v| v.map(|v| (v - mean) / scale))
                .collect();
            set_f64_column(df, attribute, scaled)?;
        }
        Ok(())
    }
}

/// Mean and population standard deviation (ddof = 0).
pub fn population_stats(values: &[f64]) -> Option<(f64, f64)> {
    let ca = Float64Chunked::from_slice("value".into(), values);
    let mean = ca.mean()?;
    let std = ca.std(0)?;
    (mean.is_finite() && std.is_finite()).then_some((mean, std))
}
