//! CLI library components for `survey-prep`.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
