//! Survey cleaning transformations.
//!
//! This crate turns a raw survey table into a numeric, standardized feature
//! table in eight ordered stages:
//!
//! 1. **normalization::sentinel**: letter tokens and letter categories
//! 2. **normalization::missing**: metadata sentinel codes become nulls
//! 3. **pruning**: sparse columns
//! 4. **pruning**: redundant (highly correlated) columns
//! 5. **encoding::categorical**: identifier drops and indicator expansion
//! 6. **encoding::mixed**: composite-code decomposition
//! 7. **impute**: mode imputation
//! 8. **scale**: standard scaling
//!
//! [`CleaningPipeline`] fits the stages; [`FittedPipeline`] re-applies them.

pub mod data_utils;
pub mod encoding;
mod error;
pub mod impute;
pub mod normalization;
pub mod pipeline;
pub mod pruning;
pub mod scale;

pub use error::{Result, TransformError};
pub use pipeline::{CleaningPipeline, FittedPipeline, PipelineRun};
