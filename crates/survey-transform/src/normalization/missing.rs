//! Metadata-driven missing-code resolution.
//!
//! Survey attributes reserve codes such as `-1`, `0` or `9` for "unknown".
//! The resolver reads each attribute's sentinel list from the metadata table
//! and turns matching cells into nulls. Re-applying it is a no-op.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use survey_ingest::polars_utils::{f64_values, is_numeric_dtype, parse_f64, string_values};
use survey_model::{MetadataTable, PipelineOptions};

use crate::data_utils::set_f64_column;
use crate::error::Result;

/// Resolved sentinel codes for one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingCodes {
    pub attribute: String,
    pub codes: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingCodeResolver {
    attributes: Vec<MissingCodes>,
}

impl MissingCodeResolver {
    /// Parses every metadata sentinel list.
    ///
    /// Tokens the sentinel rules already rewrite (such as `X` for
    /// `CAMEO_DEUG_2015`) are skipped; any other non-numeric token is a
    /// coercion error. Attributes with an empty list are omitted.
    pub fn from_metadata(metadata: &MetadataTable, options: &PipelineOptions) -> Result<Self> {
        let mut attributes = Vec::new();
        for record in metadata.iter() {
            let consumed = options.consumed_tokens(&record.attribute);
            let codes = record.sentinel_codes(&consumed)?;
            if !codes.is_empty() {
                attributes.push(MissingCodes {
                    attribute: record.attribute.clone(),
                    codes,
                });
            }
        }
        Ok(Self { attributes })
    }

    pub fn codes_for(&self, attribute: &str) -> Option<&[f64]> {
        self.attributes
            .iter()
            .find(|entry| entry.attribute == attribute)
            .map(|entry| entry.codes.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MissingCodes> {
        self.attributes.iter()
    }

    /// Replaces sentinel cells with nulls; returns the number replaced.
    ///
    /// Attributes absent from the table are skipped. Numeric columns with a
    /// replacement become `Float64`; text columns stay text and are compared
    /// by parsing each cell.
    pub fn apply(&self, df: &mut DataFrame) -> Result<usize> {
        let mut total = 0;
        for entry in &self.attributes {
            let Ok(col) = df.column(&entry.attribute) else {
                continue;
            };
            let replaced = if is_numeric_dtype(col.dtype()) {
                let (values, replaced) = replace_numeric(f64_values(col)?, &entry.codes);
                if replaced > 0 {
                    set_f64_column(df, &entry.attribute, values)?;
                }
                replaced
            } else {
                let (values, replaced) = replace_text(string_values(col)?, &entry.codes);
                if replaced > 0 {
                    df.with_column(Column::new(entry.attribute.as_str().into(), values))?;
                }
                replaced
            };
            if replaced > 0 {
                tracing::debug!(attribute = %entry.attribute, replaced, "resolved missing codes");
            }
            total += replaced;
        }
        Ok(total)
    }
}

fn replace_numeric(values: Vec<Option<f64>>, codes: &[f64]) -> (Vec<Option<f64>>, usize) {
    let mut replaced = 0;
    let values = values
        .into_iter()
        .map(|cell| match cell {
            Some(v) if codes.contains(&v) => {
                replaced += 1;
                None
            }
            other => other,
        })
        .collect();
    (values, replaced)
}

fn replace_text(values: Vec<Option<String>>, codes: &[f64]) -> (Vec<Option<String>>, usize) {
    let mut replaced = 0;
    let values = values
        .into_iter()
        .map(|cell| match cell {
            Some(text) if parse_f64(&text).is_some_and(|v| codes.contains(&v)) => {
                replaced += 1;
                None
            }
            other => other,
        })
        .collect();
    (values, replaced)
}
