use std::fs;

use polars::prelude::*;
use survey_ingest::{IngestError, ReadOptions, read_raw_table, write_table};
use tempfile::TempDir;

#[test]
fn reads_semicolon_extract_with_mixed_columns() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("azdias.csv");
    fs::write(
        &path,
        "AGER_TYP;CAMEO_DEUG_2015;CAMEO_INTL_2015;OST_WEST_KZ\n\
         -1;8;51;W\n\
         2;X;XX;O\n\
         ;4;24;\n",
    )
    .expect("write csv");

    let df = read_raw_table(&path, &ReadOptions::default()).expect("read table");
    assert_eq!(df.shape(), (3, 4));
    assert_eq!(df.column("CAMEO_DEUG_2015").unwrap().dtype(), &DataType::String);
    assert_eq!(df.column("OST_WEST_KZ").unwrap().dtype(), &DataType::String);
    assert_eq!(df.column("AGER_TYP").unwrap().null_count(), 1);
}

#[test]
fn comma_separator_is_configurable() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("customers.csv");
    fs::write(&path, "ALTER_HH,ANZ_PERSONEN\n1,2\n3,4\n").expect("write csv");

    let options = ReadOptions::default().with_separator(b',');
    let df = read_raw_table(&path, &options).expect("read table");
    assert_eq!(df.get_column_names_owned().len(), 2);
}

#[test]
fn empty_file_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("empty.csv");
    fs::write(&path, "").expect("write csv");

    let err = read_raw_table(&path, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::EmptyCsv { .. }));
}

#[test]
fn writes_table_that_reads_back() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("clean.csv");
    let mut df = DataFrame::new(vec![
        Column::new("DECADE".into(), vec![-0.5f64, 1.5]),
        Column::new("MOVEMENT".into(), vec![1.0f64, -1.0]),
    ])
    .expect("frame");

    write_table(&mut df, &path, b',').expect("write table");
    let text = fs::read_to_string(&path).expect("read output");
    assert!(text.starts_with("DECADE,MOVEMENT\n"));

    let back = read_raw_table(&path, &ReadOptions::default().with_separator(b',')).expect("read");
    assert_eq!(back.shape(), (2, 2));
}
