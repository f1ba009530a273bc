//! Sparse and redundant column pruning.
//!
//! Both pruners decide from the fitting table only. The decisions are kept
//! as [`ColumnDrop`] lists so the same columns can be removed from any later
//! table.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use survey_ingest::polars_utils::{f64_values, is_numeric_dtype};
use survey_model::DropReason;

use crate::data_utils::{drop_present, missing_fraction};
use crate::error::Result;

/// A column removed without replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrop {
    pub attribute: String,
    pub reason: DropReason,
}

/// Removes the listed columns that are present in `df`.
pub fn apply_drops(df: &mut DataFrame, drops: &[ColumnDrop]) -> usize {
    drop_present(df, drops.iter().map(|drop| drop.attribute.as_str()))
}

/// Selects columns whose missing fraction strictly exceeds the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparsePruner {
    threshold: f64,
}

impl SparsePruner {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn fit(&self, df: &DataFrame) -> Vec<ColumnDrop> {
        df.get_columns()
            .iter()
            .filter_map(|col| {
                let fraction = missing_fraction(col);
                (fraction > self.threshold).then(|| ColumnDrop {
                    attribute: col.name().to_string(),
                    reason: DropReason::Sparse {
                        missing_fraction: fraction,
                    },
                })
            })
            .collect()
    }
}

/// Selects numeric columns that are near-duplicates of an earlier column.
///
/// Columns are visited in table order. Each is compared against every
/// numeric column before it, including columns already marked for removal,
/// and dropped as soon as one absolute correlation strictly exceeds the
/// threshold. The first numeric column is never dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedundantPruner {
    threshold: f64,
}

impl RedundantPruner {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn fit(&self, df: &DataFrame) -> Result<Vec<ColumnDrop>> {
        let mut earlier: Vec<(String, Vec<Option<f64>>)> = Vec::new();
        let mut drops = Vec::new();

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) {
                continue;
            }
            let name = col.name().to_string();
            let values = f64_values(col)?;

            let redundant = earlier.iter().find_map(|(other, other_values)| {
                pearson(other_values, &values)
                    .map(f64::abs)
                    .filter(|r| *r > self.threshold)
                    .map(|r| (other.clone(), r))
            });

            if let Some((correlated_with, correlation)) = redundant {
                drops.push(ColumnDrop {
                    attribute: name.clone(),
                    reason: DropReason::Redundant {
                        correlated_with,
                        correlation,
                    },
                });
            }
            earlier.push((name, values));
        }
        Ok(drops)
    }
}

/// Pearson correlation over pairwise-complete observations.
///
/// Returns `None` when fewer than two rows have both values, when either
/// side has zero variance, or when the result is not finite.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    if xs.len() < 2 {
        return None;
    }

    let xs = Float64Chunked::from_vec("x".into(), xs);
    let ys = Float64Chunked::from_vec("y".into(), ys);
    polars::prelude::cov::pearson_corr(&xs, &ys)
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(-1.0, 1.0))
}
