//! Mixed-code decomposition.
//!
//! Some attributes pack two dimensions into one code. The youth-cohort code
//! splits into decade and movement, the international typology into wealth
//! and life stage. Remaining composite attributes become indicators. All
//! originals are removed; derived attributes are appended first, then the
//! indicators.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use survey_model::{DecisionAction, DecisionRecord, ModelError, PipelineOptions, Stage};

use crate::data_utils::{append_column, drop_column, has_column, numeric_values};
use crate::encoding::categorical::{IndicatorExpansion, skip_removed};
use crate::encoding::lookup::CodeTable;
use crate::error::{Result, TransformError};

/// One composite attribute and the tables applied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub attribute: String,
    pub tables: Vec<CodeTable>,
}

impl Decomposition {
    pub fn output_names(&self) -> Vec<String> {
        self.tables
            .iter()
            .map(|table| table.output_name().to_string())
            .collect()
    }

    fn outputs(&self, df: &DataFrame) -> Result<Vec<Column>> {
        let codes = numeric_values(df, &self.attribute)?;
        self.tables
            .iter()
            .map(|table| {
                let values = table.map_values(&self.attribute, &codes)?;
                Ok(Column::new(table.output_name().into(), values))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixedPlan {
    pub decompositions: Vec<Decomposition>,
    pub expansions: Vec<IndicatorExpansion>,
}

impl MixedPlan {
    /// Plans decomposition for the configured composite attributes.
    ///
    /// An attribute an earlier decision in `prior` already removed is
    /// skipped; any other absent attribute is a schema error.
    pub fn fit(
        df: &DataFrame,
        options: &PipelineOptions,
        prior: &DecisionRecord,
    ) -> Result<(Self, DecisionRecord)> {
        let mut plan = Self::default();
        let mut record = DecisionRecord::new();

        for attribute in &options.decomposed_attributes {
            let tables = CodeTable::for_attribute(attribute).ok_or_else(|| {
                TransformError::InvalidOptions {
                    source: ModelError::InvalidOption {
                        name: "decomposed_attributes",
                        reason: format!("no lookup tables for {attribute}"),
                    },
                }
            })?;
            if !has_column(df, attribute) {
                record.push(
                    Stage::MixedDecomposition,
                    attribute.as_str(),
                    skip_removed(prior, attribute)?,
                );
                continue;
            }
            let decomposition = Decomposition {
                attribute: attribute.clone(),
                tables: tables.to_vec(),
            };
            record.push(
                Stage::MixedDecomposition,
                attribute.as_str(),
                DecisionAction::Decomposed {
                    outputs: decomposition.output_names(),
                },
            );
            plan.decompositions.push(decomposition);
        }

        for attribute in &options.mixed_indicator_attributes {
            if !has_column(df, attribute) {
                record.push(
                    Stage::MixedDecomposition,
                    attribute.as_str(),
                    skip_removed(prior, attribute)?,
                );
                continue;
            }
            let expansion = IndicatorExpansion::fit(df, attribute)?;
            record.push(
                Stage::MixedDecomposition,
                attribute.as_str(),
                DecisionAction::Expanded {
                    indicators: expansion.indicator_names(),
                },
            );
            plan.expansions.push(expansion);
        }

        Ok((plan, record))
    }

    /// Names of every column this plan appends, in order.
    pub fn output_names(&self) -> Vec<String> {
        self.decompositions
            .iter()
            .flat_map(Decomposition::output_names)
            .chain(self.expansions.iter().flat_map(IndicatorExpansion::indicator_names))
            .collect()
    }

    pub fn apply(&self, df: &mut DataFrame) -> Result<()> {
        // Read every source before removing any of them.
        let mut derived = Vec::new();
        for decomposition in &self.decompositions {
            derived.extend(decomposition.outputs(df)?);
        }
        for expansion in &self.expansions {
            derived.extend(expansion.indicators(df)?);
        }

        let sources = self
            .decompositions
            .iter()
            .map(|d| d.attribute.as_str())
            .chain(self.expansions.iter().map(|e| e.attribute.as_str()));
        for source in sources {
            drop_column(df, source)?;
        }

        for col in derived {
            append_column(df, col)?;
        }
        Ok(())
    }
}
