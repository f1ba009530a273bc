//! TOML run configuration.
//!
//! A configuration file holds an optional field separator and a `[pipeline]`
//! table that deserializes into [`PipelineOptions`]; every key is optional.
//!
//! ```toml
//! separator = ","
//!
//! [pipeline]
//! missing_threshold = 0.2
//! zero_variance = "fail"
//!
//! [[pipeline.sentinel_rules]]
//! kind = "recode"
//! attribute = "OST_WEST_KZ"
//! mapping = [["W", 1.0], ["O", 2.0]]
//! ```

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use survey_model::PipelineOptions;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    pub separator: Option<char>,
    pub pipeline: PipelineOptions,
}

/// Flag values that take precedence over the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub separator: Option<char>,
    pub missing_threshold: Option<f64>,
    pub correlation_threshold: Option<f64>,
}

impl PrepConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse configuration")
    }

    /// Reads the file at `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(separator) = overrides.separator {
            self.separator = Some(separator);
        }
        if let Some(threshold) = overrides.missing_threshold {
            self.pipeline.missing_threshold = threshold;
        }
        if let Some(threshold) = overrides.correlation_threshold {
            self.pipeline.correlation_threshold = threshold;
        }
        self
    }

    /// The separator as a byte, or `default` when none is configured.
    pub fn separator_byte(&self, default: u8) -> Result<u8> {
        match self.separator {
            None => Ok(default),
            Some(separator) => separator_byte(separator),
        }
    }
}

/// Converts a separator character to the single byte the CSV readers take.
pub fn separator_byte(separator: char) -> Result<u8> {
    if !separator.is_ascii() || separator == '"' || separator == '\n' || separator == '\r' {
        bail!("unsupported separator {separator:?}");
    }
    Ok(separator as u8)
}
