//! Error types for the cleaning pipeline.

use survey_model::{ModelError, Stage};
use thiserror::Error;

/// Errors raised while fitting or applying the pipeline.
#[derive(Debug, Error)]
pub enum TransformError {
    // === Schema Errors ===
    /// A required attribute is absent from the table.
    #[error("attribute '{attribute}' not found in table")]
    MissingAttribute { attribute: String },

    /// The table does not carry the features a fitted pipeline expects.
    #[error("table lacks fitted features: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    // === Value Errors ===
    /// A cell or sentinel code could not be interpreted.
    #[error("cannot coerce '{value}' in attribute '{attribute}': {reason}")]
    Coercion {
        attribute: String,
        value: String,
        reason: String,
    },

    /// A statistic is undefined for the column.
    #[error("degenerate statistics for attribute '{attribute}': {reason}")]
    DegenerateStatistics { attribute: String, reason: String },

    /// Fitting needs at least one row.
    #[error("input table has no rows")]
    EmptyTable,

    /// Options failed validation.
    #[error("invalid options: {source}")]
    InvalidOptions {
        #[source]
        source: ModelError,
    },

    /// A stage altered the number of rows.
    #[error("row count changed from {expected} to {actual}")]
    RowCountChanged { expected: usize, actual: usize },

    // === DataFrame Errors ===
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    /// A failure inside a pipeline stage.
    #[error("{stage}: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<TransformError>,
    },
}

impl TransformError {
    /// Wraps the error with the stage it occurred in.
    ///
    /// Errors that already carry a stage are returned unchanged.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage the error occurred in, when known.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error with any stage wrapper removed.
    pub fn root(&self) -> &TransformError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn coercion(
        attribute: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Coercion {
            attribute: attribute.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_attribute(attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute: attribute.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

impl From<ModelError> for TransformError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NonNumericSentinel { attribute, token } => Self::Coercion {
                attribute,
                value: token,
                reason: "sentinel code is not numeric".to_string(),
            },
            source => Self::InvalidOptions { source },
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_wrapper_names_stage_and_attribute() {
        let err = TransformError::coercion("OST_WEST_KZ", "Z", "unknown letter code")
            .in_stage(Stage::SentinelNormalization);
        assert_eq!(
            err.to_string(),
            "stage 1 (sentinel normalization): cannot coerce 'Z' in attribute 'OST_WEST_KZ': unknown letter code"
        );
        assert_eq!(err.stage(), Some(Stage::SentinelNormalization));
        assert!(matches!(err.root(), TransformError::Coercion { .. }));
    }

    #[test]
    fn stage_wrapper_is_not_nested() {
        let err = TransformError::EmptyTable
            .in_stage(Stage::Imputation)
            .in_stage(Stage::Scaling);
        assert_eq!(err.stage(), Some(Stage::Imputation));
    }

    #[test]
    fn non_numeric_sentinel_becomes_coercion() {
        let err: TransformError = ModelError::NonNumericSentinel {
            attribute: "CAMEO_DEUG_2015".to_string(),
            token: "X".to_string(),
        }
        .into();
        assert!(matches!(err, TransformError::Coercion { ref value, .. } if value == "X"));
    }

    #[test]
    fn schema_mismatch_lists_columns() {
        let err = TransformError::SchemaMismatch {
            missing: vec!["DECADE".to_string(), "WEALTH".to_string()],
        };
        assert_eq!(err.to_string(), "table lacks fitted features: DECADE, WEALTH");
    }
}
