//! Polars column and value helpers.
//!
//! Conversions between Polars columns and plain Rust vectors, plus the
//! numeric parsing and formatting rules shared by the pipeline stages.

use polars::prelude::*;

/// Returns true for integer, float and boolean dtypes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Extracts a numeric column as `f64` values, nulls preserved.
///
/// Text columns are rejected, never cast.
pub fn f64_values(column: &Column) -> PolarsResult<Vec<Option<f64>>> {
    if !is_numeric_dtype(column.dtype()) {
        return Err(PolarsError::InvalidOperation(
            format!(
                "column '{}' has non-numeric dtype {}",
                column.name(),
                column.dtype()
            )
            .into(),
        ));
    }
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Extracts any column as owned strings, nulls preserved.
pub fn string_values(column: &Column) -> PolarsResult<Vec<Option<String>>> {
    let cast;
    let source = if matches!(column.dtype(), DataType::String) {
        column
    } else {
        cast = column.cast(&DataType::String)?;
        &cast
    };
    Ok(source
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Parses a string as i64, returning None for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<i64>().ok()
}

/// Parses an integral value written either as `8` or as `8.0`.
pub fn parse_integral(value: &str) -> Option<i64> {
    if let Some(parsed) = parse_i64(value) {
        return Some(parsed);
    }
    parse_f64(value).and_then(integral)
}

/// Converts a float to i64 when it has no fractional part.
pub fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(value as i64)
    } else {
        None
    }
}
