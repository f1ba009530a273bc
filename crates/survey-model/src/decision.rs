//! Inspectable record of the column-membership decisions a pipeline run made.
//!
//! Stages 3-6 decide which columns exist from runtime statistics (missing
//! rate, correlation, cardinality). Each decision is captured here so the
//! outcome can be audited and tested independently of the table's shape.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The eight pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SentinelNormalization,
    MissingCodes,
    SparseColumns,
    RedundantColumns,
    CategoricalExpansion,
    MixedDecomposition,
    Imputation,
    Scaling,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::SentinelNormalization,
        Stage::MissingCodes,
        Stage::SparseColumns,
        Stage::RedundantColumns,
        Stage::CategoricalExpansion,
        Stage::MixedDecomposition,
        Stage::Imputation,
        Stage::Scaling,
    ];

    /// 1-based position in the pipeline.
    pub fn number(self) -> u8 {
        match self {
            Self::SentinelNormalization => 1,
            Self::MissingCodes => 2,
            Self::SparseColumns => 3,
            Self::RedundantColumns => 4,
            Self::CategoricalExpansion => 5,
            Self::MixedDecomposition => 6,
            Self::Imputation => 7,
            Self::Scaling => 8,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::SentinelNormalization => "sentinel normalization",
            Self::MissingCodes => "missing-code resolution",
            Self::SparseColumns => "sparse-column pruning",
            Self::RedundantColumns => "redundant-column pruning",
            Self::CategoricalExpansion => "categorical expansion",
            Self::MixedDecomposition => "mixed-code decomposition",
            Self::Imputation => "imputation",
            Self::Scaling => "scaling",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {} ({})", self.number(), self.display_name())
    }
}

/// Why a column was removed without replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    Sparse {
        missing_fraction: f64,
    },
    Redundant {
        correlated_with: String,
        correlation: f64,
    },
    /// Identifier or free-text attribute with no feature value.
    Identifier,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sparse { missing_fraction } => {
                write!(f, "{:.1}% missing", missing_fraction * 100.0)
            }
            Self::Redundant {
                correlated_with,
                correlation,
            } => write!(f, "|r| = {correlation:.3} with {correlated_with}"),
            Self::Identifier => f.write_str("identifier / free text"),
        }
    }
}

/// What happened to one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DecisionAction {
    Dropped { reason: DropReason },
    /// Replaced by indicator columns.
    Expanded { indicators: Vec<String> },
    /// Replaced by derived attributes.
    Decomposed { outputs: Vec<String> },
    /// A fixed-list attribute an earlier stage had already removed.
    Skipped { reason: String },
    Imputed { fill_value: f64, filled: usize },
    /// Centred but not rescaled.
    ZeroVariance { mean: f64 },
}

impl DecisionAction {
    /// Whether the attribute no longer exists after this decision.
    pub fn removes_column(&self) -> bool {
        matches!(
            self,
            Self::Dropped { .. } | Self::Expanded { .. } | Self::Decomposed { .. }
        )
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dropped { reason } => write!(f, "dropped: {reason}"),
            Self::Expanded { indicators } => {
                write!(f, "expanded into {} indicators", indicators.len())
            }
            Self::Decomposed { outputs } => write!(f, "decomposed into {}", outputs.join(", ")),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
            Self::Imputed { fill_value, filled } => {
                write!(f, "filled {filled} cells with {fill_value}")
            }
            Self::ZeroVariance { mean } => write!(f, "zero variance, centred at {mean}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDecision {
    pub stage: Stage,
    pub attribute: String,
    pub action: DecisionAction,
}

/// Ordered audit log of decisions across all stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    decisions: Vec<ColumnDecision>,
}

impl DecisionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Stage, attribute: impl Into<String>, action: DecisionAction) {
        self.decisions.push(ColumnDecision {
            stage,
            attribute: attribute.into(),
            action,
        });
    }

    pub fn extend(&mut self, other: DecisionRecord) {
        self.decisions.extend(other.decisions);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDecision> {
        self.decisions.iter()
    }

    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &ColumnDecision> {
        self.decisions.iter().filter(move |d| d.stage == stage)
    }

    /// Attributes dropped outright, in decision order.
    pub fn dropped(&self) -> Vec<&str> {
        self.decisions
            .iter()
            .filter(|d| matches!(d.action, DecisionAction::Dropped { .. }))
            .map(|d| d.attribute.as_str())
            .collect()
    }

    /// Whether some decision already removed `attribute` from the table.
    pub fn was_removed(&self, attribute: &str) -> bool {
        self.decisions
            .iter()
            .any(|d| d.attribute == attribute && d.action.removes_column())
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// Table shape after a stage completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageShape {
    pub stage: Stage,
    pub rows: usize,
    pub columns: usize,
}
