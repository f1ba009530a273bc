//! Tests for DataFrame access helpers.

use polars::prelude::*;
use survey_transform::TransformError;
use survey_transform::data_utils::{
    column_names, drop_present, missing_fraction, numeric_values, set_f64_column,
};

fn frame() -> DataFrame {
    DataFrame::new(vec![
        Series::new("ALTER_HH".into(), vec![Some(1i64), None, Some(3), None]).into(),
        Series::new("CAMEO_DEUG_2015".into(), vec![Some("4"), Some("8"), None, Some("2")]).into(),
        Series::new("CAMEO_DEU_2015".into(), vec![Some("8A"), None, Some("4C"), Some("1A")]).into(),
    ])
    .unwrap()
}

#[test]
fn numeric_values_parse_numeric_text() {
    let df = frame();
    assert_eq!(
        numeric_values(&df, "CAMEO_DEUG_2015").unwrap(),
        vec![Some(4.0), Some(8.0), None, Some(2.0)]
    );
    assert_eq!(
        numeric_values(&df, "ALTER_HH").unwrap(),
        vec![Some(1.0), None, Some(3.0), None]
    );
}

#[test]
fn numeric_values_reject_codes_with_letters() {
    let df = frame();
    let err = numeric_values(&df, "CAMEO_DEU_2015").unwrap_err();
    assert!(matches!(err, TransformError::Coercion { ref value, .. } if value == "8A"));
}

#[test]
fn absent_column_is_schema_error() {
    let df = frame();
    let err = numeric_values(&df, "AGER_TYP").unwrap_err();
    assert!(matches!(err, TransformError::MissingAttribute { ref attribute } if attribute == "AGER_TYP"));
}

#[test]
fn missing_fraction_counts_nulls() {
    let df = frame();
    let fraction = missing_fraction(df.column("ALTER_HH").unwrap());
    assert!((fraction - 0.5).abs() < 1e-12);
}

#[test]
fn set_and_drop_columns() {
    let mut df = frame();
    set_f64_column(&mut df, "DECADE", vec![Some(40.0), None, Some(90.0), Some(60.0)]).unwrap();
    assert_eq!(column_names(&df).last().map(String::as_str), Some("DECADE"));

    let dropped = drop_present(&mut df, ["ALTER_HH", "NOT_THERE"]);
    assert_eq!(dropped, 1);
    assert_eq!(
        column_names(&df),
        vec!["CAMEO_DEUG_2015", "CAMEO_DEU_2015", "DECADE"]
    );
}
