//! Attribute metadata: declared type and sentinel codes per survey attribute.
//!
//! The metadata table is an external collaborator. It is consumed read-only by
//! the missing-code resolver (sentinel lists) and the categorical expander
//! (declared types).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Declared measurement type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    Categorical,
    Mixed,
    Numeric,
    Ordinal,
    Interval,
    /// Any type label the pipeline has no special handling for.
    Other(String),
}

impl AttributeType {
    /// Parses a type label, case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "categorical" => Self::Categorical,
            "mixed" => Self::Mixed,
            "numeric" => Self::Numeric,
            "ordinal" => Self::Ordinal,
            "interval" => Self::Interval,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Categorical => "categorical",
            Self::Mixed => "mixed",
            Self::Numeric => "numeric",
            Self::Ordinal => "ordinal",
            Self::Interval => "interval",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for AttributeType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<AttributeType> for String {
    fn from(value: AttributeType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One metadata row: attribute name, declared type, raw sentinel list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    pub attribute: String,
    pub attribute_type: AttributeType,
    /// Comma-separated sentinel codes as authored, e.g. `[-1,0]` or `-1,9`.
    pub missing_codes: Option<String>,
}

impl AttributeMetadata {
    pub fn new(attribute: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            attribute: attribute.into(),
            attribute_type,
            missing_codes: None,
        }
    }

    /// Sets the raw sentinel-code list.
    pub fn with_missing_codes(mut self, codes: impl Into<String>) -> Self {
        let codes = codes.into();
        self.missing_codes = if codes.trim().is_empty() {
            None
        } else {
            Some(codes)
        };
        self
    }

    /// Splits the raw sentinel list into trimmed tokens.
    ///
    /// Surrounding brackets are tolerated; empty tokens are discarded, so both
    /// an absent list and `[]` yield no tokens.
    pub fn sentinel_tokens(&self) -> Vec<&str> {
        let Some(raw) = self.missing_codes.as_deref() else {
            return Vec::new();
        };
        let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
        inner
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Parses the sentinel list into numeric codes.
    ///
    /// Tokens listed in `consumed` were rewritten by an earlier stage and are
    /// skipped. Every other token must be numeric.
    pub fn sentinel_codes(&self, consumed: &[String]) -> Result<Vec<f64>> {
        let mut codes = Vec::new();
        for token in self.sentinel_tokens() {
            if consumed.iter().any(|c| c == token) {
                continue;
            }
            let code = token
                .parse::<f64>()
                .map_err(|_| ModelError::NonNumericSentinel {
                    attribute: self.attribute.clone(),
                    token: token.to_string(),
                })?;
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        Ok(codes)
    }

    pub fn is_categorical(&self) -> bool {
        self.attribute_type == AttributeType::Categorical
    }
}

/// The attribute metadata table, in authored order, indexed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AttributeMetadata>", into = "Vec<AttributeMetadata>")]
pub struct MetadataTable {
    records: Vec<AttributeMetadata>,
    index: BTreeMap<String, usize>,
}

impl MetadataTable {
    /// Builds the table, rejecting duplicate attribute names.
    pub fn new(records: Vec<AttributeMetadata>) -> Result<Self> {
        let mut index = BTreeMap::new();
        for (position, record) in records.iter().enumerate() {
            if index.insert(record.attribute.clone(), position).is_some() {
                return Err(ModelError::DuplicateAttribute {
                    attribute: record.attribute.clone(),
                });
            }
        }
        Ok(Self { records, index })
    }

    pub fn get(&self, attribute: &str) -> Option<&AttributeMetadata> {
        self.index.get(attribute).map(|&pos| &self.records[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeMetadata> {
        self.records.iter()
    }

    /// Attributes declared categorical, in table order.
    pub fn categorical_attributes(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|record| record.is_categorical())
            .map(|record| record.attribute.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TryFrom<Vec<AttributeMetadata>> for MetadataTable {
    type Error = ModelError;

    fn try_from(records: Vec<AttributeMetadata>) -> Result<Self> {
        Self::new(records)
    }
}

impl From<MetadataTable> for Vec<AttributeMetadata> {
    fn from(table: MetadataTable) -> Self {
        table.records
    }
}
