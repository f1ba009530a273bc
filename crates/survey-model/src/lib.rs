//! Data model for survey feature preparation.
//!
//! - **attribute**: the external attribute metadata table
//! - **options**: pipeline thresholds, fixed attribute lists and stage-1 rules
//! - **decision**: stage identifiers and the column decision record

pub mod attribute;
pub mod decision;
pub mod error;
pub mod options;

pub use attribute::{AttributeMetadata, AttributeType, MetadataTable};
pub use decision::{
    ColumnDecision, DecisionAction, DecisionRecord, DropReason, Stage, StageShape,
};
pub use error::{ModelError, Result};
pub use options::{PipelineOptions, SentinelRule, ZeroVariancePolicy, default_sentinel_rules};
