//! DataFrame access helpers shared by the stages.
//!
//! Every lookup goes through [`column`] so that an absent attribute surfaces
//! as a schema error rather than a bare Polars failure.

use polars::prelude::*;
use survey_ingest::polars_utils::{f64_values, is_numeric_dtype, parse_f64};

use crate::error::{Result, TransformError};

/// Borrow a column, failing with a schema error when absent.
pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| TransformError::missing_attribute(name))
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Column names in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Read a column as numbers.
///
/// Numeric dtypes are cast. Text cells must parse as numbers; the first one
/// that does not is reported as a coercion error.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = column(df, name)?;
    if is_numeric_dtype(col.dtype()) {
        return Ok(f64_values(col)?);
    }
    if !matches!(col.dtype(), DataType::String) {
        return Err(TransformError::coercion(
            name,
            col.dtype().to_string(),
            "column type is not numeric",
        ));
    }
    col.str()?
        .into_iter()
        .map(|cell| match cell {
            None => Ok(None),
            Some(text) => parse_f64(text)
                .map(Some)
                .ok_or_else(|| TransformError::coercion(name, text, "not a number")),
        })
        .collect()
}

/// Replace (or append) a column with 64-bit float values.
pub fn set_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

/// Append a derived column, failing when its name is already taken.
pub fn append_column(df: &mut DataFrame, col: Column) -> Result<()> {
    if has_column(df, col.name()) {
        return Err(TransformError::DataFrame {
            message: format!("derived column '{}' already exists", col.name()),
        });
    }
    df.with_column(col)?;
    Ok(())
}

/// Drop a column, failing when absent.
pub fn drop_column(df: &mut DataFrame, name: &str) -> Result<()> {
    df.drop_in_place(name)
        .map_err(|_| TransformError::missing_attribute(name))?;
    Ok(())
}

/// Drop each named column that is present; returns how many were dropped.
pub fn drop_present<'a>(df: &mut DataFrame, names: impl IntoIterator<Item = &'a str>) -> usize {
    names
        .into_iter()
        .filter(|name| df.drop_in_place(name).is_ok())
        .count()
}

/// Fraction of null cells in a column; zero for an empty table.
pub fn missing_fraction(col: &Column) -> f64 {
    if col.is_empty() {
        return 0.0;
    }
    col.null_count() as f64 / col.len() as f64
}
