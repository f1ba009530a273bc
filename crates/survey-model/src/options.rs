//! Configuration options for survey preparation.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Behavior when the scaler meets a column with zero variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroVariancePolicy {
    /// Subtract the mean and leave the scale at 1 (the column becomes zeros).
    #[default]
    Center,
    /// Abort with a degenerate-statistics error.
    Fail,
}

/// A stage-1 rule for an attribute whose raw encoding mixes numbers and tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SentinelRule {
    /// Tokens map to `code`; every other value must be integral.
    TokenToCode {
        attribute: String,
        tokens: Vec<String>,
        code: i64,
    },
    /// Tokens become missing; other values are left as they are.
    TokenToMissing {
        attribute: String,
        tokens: Vec<String>,
    },
    /// Letter categories are recoded to numbers.
    Recode {
        attribute: String,
        mapping: Vec<(String, f64)>,
    },
}

impl SentinelRule {
    pub fn attribute(&self) -> &str {
        match self {
            Self::TokenToCode { attribute, .. }
            | Self::TokenToMissing { attribute, .. }
            | Self::Recode { attribute, .. } => attribute,
        }
    }

    /// Raw tokens this rule rewrites.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Self::TokenToCode { tokens, .. } | Self::TokenToMissing { tokens, .. } => {
                tokens.clone()
            }
            Self::Recode { mapping, .. } => mapping.iter().map(|(token, _)| token.clone()).collect(),
        }
    }
}

/// Default stage-1 rules for the German population survey extracts.
pub fn default_sentinel_rules() -> Vec<SentinelRule> {
    vec![
        SentinelRule::TokenToCode {
            attribute: "CAMEO_DEUG_2015".to_string(),
            tokens: vec!["X".to_string()],
            code: -1,
        },
        SentinelRule::TokenToCode {
            attribute: "CAMEO_INTL_2015".to_string(),
            tokens: vec!["XX".to_string()],
            code: -1,
        },
        SentinelRule::TokenToMissing {
            attribute: "CAMEO_DEU_2015".to_string(),
            tokens: vec!["XX".to_string()],
        },
        SentinelRule::Recode {
            attribute: "OST_WEST_KZ".to_string(),
            mapping: vec![("W".to_string(), 1.0), ("O".to_string(), 2.0)],
        },
    ]
}

fn default_identifier_attributes() -> Vec<String> {
    ["CAMEO_DEU_2015", "D19_LETZTER_KAUF_BRANCHE", "EINGEFUEGT_AM"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_decomposed_attributes() -> Vec<String> {
    ["PRAEGENDE_JUGENDJAHRE", "CAMEO_INTL_2015"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_mixed_indicator_attributes() -> Vec<String> {
    ["LP_LEBENSPHASE_GROB", "WOHNLAGE", "PLZ8_BAUMAX"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Options controlling the preparation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Columns whose missing fraction strictly exceeds this are dropped.
    pub missing_threshold: f64,

    /// Columns whose absolute correlation with an earlier retained column
    /// strictly exceeds this are dropped.
    pub correlation_threshold: f64,

    /// Exclusive lower bound on categories for indicator expansion.
    pub min_categories: usize,

    /// Exclusive upper bound on categories for indicator expansion.
    pub max_categories: usize,

    /// High-cardinality identifiers or free text, dropped outright.
    pub identifier_attributes: Vec<String>,

    /// Composite attributes split into derived attributes through lookup tables.
    pub decomposed_attributes: Vec<String>,

    /// Composite attributes expanded into indicators during decomposition.
    pub mixed_indicator_attributes: Vec<String>,

    /// Stage-1 sentinel/type rules.
    pub sentinel_rules: Vec<SentinelRule>,

    pub zero_variance: ZeroVariancePolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            missing_threshold: 0.30,
            correlation_threshold: 0.95,
            min_categories: 2,
            max_categories: 30,
            identifier_attributes: default_identifier_attributes(),
            decomposed_attributes: default_decomposed_attributes(),
            mixed_indicator_attributes: default_mixed_indicator_attributes(),
            sentinel_rules: default_sentinel_rules(),
            zero_variance: ZeroVariancePolicy::default(),
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = threshold;
        self
    }

    pub fn with_correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = threshold;
        self
    }

    pub fn with_sentinel_rules(mut self, rules: Vec<SentinelRule>) -> Self {
        self.sentinel_rules = rules;
        self
    }

    pub fn with_identifier_attributes(mut self, attributes: Vec<String>) -> Self {
        self.identifier_attributes = attributes;
        self
    }

    pub fn with_decomposed_attributes(mut self, attributes: Vec<String>) -> Self {
        self.decomposed_attributes = attributes;
        self
    }

    pub fn with_mixed_indicator_attributes(mut self, attributes: Vec<String>) -> Self {
        self.mixed_indicator_attributes = attributes;
        self
    }

    pub fn with_zero_variance(mut self, policy: ZeroVariancePolicy) -> Self {
        self.zero_variance = policy;
        self
    }

    /// Checks thresholds and category bounds.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.missing_threshold) {
            return Err(ModelError::InvalidOption {
                name: "missing_threshold",
                reason: format!("{} is outside [0, 1]", self.missing_threshold),
            });
        }
        if !(0.0..=1.0).contains(&self.correlation_threshold) {
            return Err(ModelError::InvalidOption {
                name: "correlation_threshold",
                reason: format!("{} is outside [0, 1]", self.correlation_threshold),
            });
        }
        if self.min_categories >= self.max_categories {
            return Err(ModelError::InvalidOption {
                name: "max_categories",
                reason: format!(
                    "{} must exceed min_categories {}",
                    self.max_categories, self.min_categories
                ),
            });
        }
        let mut seen = Vec::new();
        for rule in &self.sentinel_rules {
            if seen.contains(&rule.attribute()) {
                return Err(ModelError::InvalidOption {
                    name: "sentinel_rules",
                    reason: format!("more than one rule for {}", rule.attribute()),
                });
            }
            seen.push(rule.attribute());
        }
        Ok(())
    }

    /// Tokens consumed by the stage-1 rule for `attribute`, if any.
    pub fn consumed_tokens(&self, attribute: &str) -> Vec<String> {
        self.sentinel_rules
            .iter()
            .filter(|rule| rule.attribute() == attribute)
            .flat_map(SentinelRule::tokens)
            .collect()
    }
}
