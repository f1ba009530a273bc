//! Sentinel and type normalization.
//!
//! A handful of attributes arrive as text because a letter token sits among
//! numeric codes, or because the attribute is a letter category. Each
//! [`SentinelRule`] rewrites one such attribute into a numeric column.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use survey_ingest::polars_utils::{format_numeric, is_numeric_dtype, parse_f64, parse_integral, string_values};
use survey_model::SentinelRule;

use crate::data_utils::{column, set_f64_column};
use crate::error::{Result, TransformError};

/// Applies the configured sentinel rules, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentinelNormalizer {
    rules: Vec<SentinelRule>,
}

impl SentinelNormalizer {
    pub fn new(rules: Vec<SentinelRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SentinelRule] {
        &self.rules
    }

    /// Rewrites every rule's attribute in place.
    ///
    /// Fails with a schema error when a rule's attribute is absent and with a
    /// coercion error on any unexpected token.
    pub fn apply(&self, df: &mut DataFrame) -> Result<()> {
        for rule in &self.rules {
            apply_rule(df, rule)?;
            tracing::debug!(attribute = rule.attribute(), "normalized sentinel tokens");
        }
        Ok(())
    }
}

fn apply_rule(df: &mut DataFrame, rule: &SentinelRule) -> Result<()> {
    match rule {
        SentinelRule::TokenToCode {
            attribute,
            tokens,
            code,
        } => token_to_code(df, attribute, tokens, *code),
        SentinelRule::TokenToMissing { attribute, tokens } => token_to_missing(df, attribute, tokens),
        SentinelRule::Recode { attribute, mapping } => recode(df, attribute, mapping),
    }
}

fn is_token(tokens: &[String], value: &str) -> bool {
    tokens.iter().any(|token| token == value)
}

fn token_to_code(df: &mut DataFrame, attribute: &str, tokens: &[String], code: i64) -> Result<()> {
    let values = string_values(column(df, attribute)?)?;
    let mut codes: Vec<Option<i64>> = Vec::with_capacity(values.len());
    for value in values {
        let converted = match value.as_deref().map(str::trim) {
            None => None,
            Some(raw) if is_token(tokens, raw) => Some(code),
            Some(raw) => Some(parse_integral(raw).ok_or_else(|| {
                TransformError::coercion(attribute, raw, "expected an integer code")
            })?),
        };
        codes.push(converted);
    }
    df.with_column(Column::new(attribute.into(), codes))?;
    Ok(())
}

fn token_to_missing(df: &mut DataFrame, attribute: &str, tokens: &[String]) -> Result<()> {
    let col = column(df, attribute)?;
    if is_numeric_dtype(col.dtype()) {
        // Only numeric tokens can occur in a numeric column.
        let numeric: Vec<f64> = tokens.iter().filter_map(|t| parse_f64(t)).collect();
        if numeric.is_empty() {
            return Ok(());
        }
        let values: Vec<Option<f64>> = string_values(col)?
            .into_iter()
            .map(|cell| cell.as_deref().and_then(parse_f64))
            .map(|cell| cell.filter(|v| !numeric.contains(v)))
            .collect();
        return set_f64_column(df, attribute, values);
    }
    let values: Vec<Option<String>> = string_values(col)?
        .into_iter()
        .map(|cell| cell.filter(|raw| !is_token(tokens, raw.trim())))
        .collect();
    df.with_column(Column::new(attribute.into(), values))?;
    Ok(())
}

fn recode(df: &mut DataFrame, attribute: &str, mapping: &[(String, f64)]) -> Result<()> {
    let values = string_values(column(df, attribute)?)?;
    let mut recoded = Vec::with_capacity(values.len());
    for value in values {
        let converted = match value.as_deref().map(str::trim) {
            None => None,
            Some(raw) => Some(recode_value(attribute, mapping, raw)?),
        };
        recoded.push(converted);
    }
    set_f64_column(df, attribute, recoded)
}

fn recode_value(attribute: &str, mapping: &[(String, f64)], raw: &str) -> Result<f64> {
    if let Some((_, target)) = mapping.iter().find(|(token, _)| token == raw) {
        return Ok(*target);
    }
    // Already recoded: accept the target codes themselves.
    if let Some(number) = parse_f64(raw)
        && mapping.iter().any(|(_, target)| *target == number)
    {
        return Ok(number);
    }
    let expected: Vec<String> = mapping
        .iter()
        .map(|(token, target)| format!("{token}={}", format_numeric(*target)))
        .collect();
    Err(TransformError::coercion(
        attribute,
        raw,
        format!("expected one of {}", expected.join(", ")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recode_value_accepts_targets() {
        let mapping = vec![("W".to_string(), 1.0), ("O".to_string(), 2.0)];
        assert_eq!(recode_value("OST_WEST_KZ", &mapping, "O").unwrap(), 2.0);
        assert_eq!(recode_value("OST_WEST_KZ", &mapping, "1.0").unwrap(), 1.0);
        let err = recode_value("OST_WEST_KZ", &mapping, "3").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot coerce '3' in attribute 'OST_WEST_KZ': expected one of W=1, O=2"
        );
    }
}
