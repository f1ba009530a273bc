//! Indicator expansion.
//!
//! A categorical attribute is replaced by one 0/1 column per category seen
//! in the fitting table. Categories are sorted ascending and indicator names
//! follow `<ATTRIBUTE>_<value>`. Missing is never a category: a missing cell
//! yields zeros in every indicator, as does a category the fit never saw.

use std::cmp::Ordering;
use std::fmt;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use survey_ingest::polars_utils::{f64_values, format_numeric, is_numeric_dtype, parse_f64, string_values};
use survey_model::{
    DecisionAction, DecisionRecord, DropReason, MetadataTable, PipelineOptions, Stage,
};

use crate::data_utils::{append_column, column, drop_column, drop_present, has_column};
use crate::error::{Result, TransformError};

/// An observed category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    Number(f64),
    Text(String),
}

impl CategoryValue {
    fn matches(&self, cell: &CategoryValue) -> bool {
        match (self, cell) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Text(b)) | (Self::Text(b), Self::Number(a)) => {
                parse_f64(b).is_some_and(|v| v == *a)
            }
        }
    }

    fn cmp_ascending(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.write_str(&format_numeric(*value)),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Reads a column as category cells.
fn category_cells(col: &Column) -> Result<Vec<Option<CategoryValue>>> {
    if is_numeric_dtype(col.dtype()) {
        return Ok(f64_values(col)?
            .into_iter()
            .map(|cell| cell.map(CategoryValue::Number))
            .collect());
    }
    Ok(string_values(col)?
        .into_iter()
        .map(|cell| cell.map(CategoryValue::Text))
        .collect())
}

/// The categories of one attribute and how to expand them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorExpansion {
    pub attribute: String,
    pub categories: Vec<CategoryValue>,
}

impl IndicatorExpansion {
    /// Collects the distinct non-missing values of `attribute`, sorted.
    pub fn fit(df: &DataFrame, attribute: &str) -> Result<Self> {
        let mut categories: Vec<CategoryValue> = Vec::new();
        for cell in category_cells(column(df, attribute)?)?.into_iter().flatten() {
            if !categories.iter().any(|known| known.matches(&cell)) {
                categories.push(cell);
            }
        }
        categories.sort_by(CategoryValue::cmp_ascending);
        Ok(Self {
            attribute: attribute.to_string(),
            categories,
        })
    }

    pub fn cardinality(&self) -> usize {
        self.categories.len()
    }

    pub fn indicator_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|category| format!("{}_{category}", self.attribute))
            .collect()
    }

    /// Builds the indicator columns without touching the table.
    pub fn indicators(&self, df: &DataFrame) -> Result<Vec<Column>> {
        let cells = category_cells(column(df, &self.attribute)?)?;
        Ok(self
            .categories
            .iter()
            .zip(self.indicator_names())
            .map(|(category, name)| {
                let values: Vec<f64> = cells
                    .iter()
                    .map(|cell| match cell {
                        Some(cell) if category.matches(cell) => 1.0,
                        _ => 0.0,
                    })
                    .collect();
                Column::new(name.into(), values)
            })
            .collect())
    }

    /// Replaces the attribute with its indicators, appended at the end.
    ///
    /// An indicator whose name is already a column is an error.
    pub fn apply(&self, df: &mut DataFrame) -> Result<Vec<String>> {
        let indicators = self.indicators(df)?;
        drop_column(df, &self.attribute)?;
        for indicator in indicators {
            append_column(df, indicator)?;
        }
        Ok(self.indicator_names())
    }
}

/// Identifier drops and indicator expansions for declared categoricals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalPlan {
    pub identifier_drops: Vec<String>,
    pub expansions: Vec<IndicatorExpansion>,
}

impl CategoricalPlan {
    /// Decides which categorical attributes to drop and which to expand.
    ///
    /// Identifier attributes are dropped regardless of cardinality. Other
    /// categorical attributes still present are expanded when their
    /// cardinality lies strictly between the option bounds. An identifier
    /// that is absent must have been removed by an earlier decision in
    /// `prior`, otherwise the table has the wrong schema.
    pub fn fit(
        df: &DataFrame,
        metadata: &MetadataTable,
        options: &PipelineOptions,
        prior: &DecisionRecord,
    ) -> Result<(Self, DecisionRecord)> {
        let mut plan = Self::default();
        let mut record = DecisionRecord::new();

        for attribute in &options.identifier_attributes {
            if has_column(df, attribute) {
                plan.identifier_drops.push(attribute.clone());
                record.push(
                    Stage::CategoricalExpansion,
                    attribute.as_str(),
                    DecisionAction::Dropped {
                        reason: DropReason::Identifier,
                    },
                );
            } else {
                record.push(
                    Stage::CategoricalExpansion,
                    attribute.as_str(),
                    skip_removed(prior, attribute)?,
                );
            }
        }

        for attribute in metadata.categorical_attributes() {
            if options.identifier_attributes.iter().any(|id| id == attribute)
                || !has_column(df, attribute)
            {
                continue;
            }
            let expansion = IndicatorExpansion::fit(df, attribute)?;
            let cardinality = expansion.cardinality();
            if cardinality > options.min_categories && cardinality < options.max_categories {
                record.push(
                    Stage::CategoricalExpansion,
                    attribute,
                    DecisionAction::Expanded {
                        indicators: expansion.indicator_names(),
                    },
                );
                plan.expansions.push(expansion);
            } else {
                tracing::debug!(attribute, cardinality, "categorical attribute kept as is");
            }
        }

        Ok((plan, record))
    }

    /// Drops identifiers present and expands every planned attribute.
    pub fn apply(&self, df: &mut DataFrame) -> Result<()> {
        // An identifier absent from an unseen table was dropped earlier.
        let dropped = drop_present(df, self.identifier_drops.iter().map(String::as_str));
        if dropped < self.identifier_drops.len() {
            tracing::debug!(
                absent = self.identifier_drops.len() - dropped,
                "identifier attributes already absent"
            );
        }
        for expansion in &self.expansions {
            expansion.apply(df)?;
        }
        Ok(())
    }
}

/// Decision for a fixed-list attribute that is no longer in the table.
pub(crate) fn skip_removed(prior: &DecisionRecord, attribute: &str) -> Result<DecisionAction> {
    if prior.was_removed(attribute) {
        tracing::warn!(attribute, "attribute already removed by an earlier stage");
        Ok(DecisionAction::Skipped {
            reason: "already removed by an earlier stage".to_string(),
        })
    } else {
        Err(TransformError::missing_attribute(attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_names_drop_trailing_zero() {
        let expansion = IndicatorExpansion {
            attribute: "NATIONALITAET_KZ".to_string(),
            categories: vec![CategoryValue::Number(1.0), CategoryValue::Number(2.0)],
        };
        assert_eq!(
            expansion.indicator_names(),
            vec!["NATIONALITAET_KZ_1", "NATIONALITAET_KZ_2"]
        );
    }

    #[test]
    fn numeric_and_text_categories_match() {
        assert!(CategoryValue::Number(3.0).matches(&CategoryValue::Text("3".to_string())));
        assert!(!CategoryValue::Number(3.0).matches(&CategoryValue::Text("3A".to_string())));
    }
}
