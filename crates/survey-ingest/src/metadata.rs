//! Attribute metadata loading.
//!
//! Reads the attribute metadata CSV (one row per attribute with its declared
//! type and sentinel-code list) into a [`MetadataTable`]. Header names are
//! matched case-insensitively against a small set of aliases; any other
//! columns, such as an unnamed index or `information_level`, are ignored.

use std::path::Path;

use survey_model::{AttributeMetadata, AttributeType, MetadataTable};

use crate::error::{IngestError, Result};

/// Header aliases for the attribute name column.
pub const ATTRIBUTE_COLUMN: &[&str] = &["attribute", "attribute_name", "name"];

/// Header aliases for the declared type column.
pub const TYPE_COLUMN: &[&str] = &["type", "attribute_type", "data_type"];

/// Header aliases for the sentinel-code list column.
pub const MISSING_COLUMN: &[&str] = &["missing_or_unknown", "missing_codes", "missing"];

#[derive(Debug)]
struct MetadataSchema {
    attribute: usize,
    attribute_type: usize,
    missing: Option<usize>,
}

fn find_header(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let normalized = header.trim().trim_start_matches('\u{feff}').to_lowercase();
        aliases.iter().any(|alias| normalized == *alias)
    })
}

fn detect_schema(headers: &[String], path: &Path) -> Result<MetadataSchema> {
    let required = |aliases: &[&str], column: &str| {
        find_header(headers, aliases).ok_or_else(|| IngestError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })
    };
    Ok(MetadataSchema {
        attribute: required(ATTRIBUTE_COLUMN, "attribute")?,
        attribute_type: required(TYPE_COLUMN, "type")?,
        missing: find_header(headers, MISSING_COLUMN),
    })
}

/// Loads the attribute metadata table from a comma-separated file.
///
/// Rows with a blank attribute name are skipped. A duplicate attribute name
/// fails with [`IngestError::InvalidMetadata`].
pub fn load_attribute_metadata(path: &Path) -> Result<MetadataTable> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let read_error = |source: csv::Error| IngestError::MetadataRead {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(read_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(read_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let schema = detect_schema(&headers, path)?;
    tracing::debug!(?schema, "Detected metadata schema");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(read_error)?;
        let attribute = row.get(schema.attribute).unwrap_or_default().trim();
        if attribute.is_empty() {
            continue;
        }
        let attribute_type =
            AttributeType::parse(row.get(schema.attribute_type).unwrap_or_default());
        let mut record = AttributeMetadata::new(attribute, attribute_type);
        if let Some(missing) = schema.missing.and_then(|idx| row.get(idx)) {
            record = record.with_missing_codes(missing);
        }
        records.push(record);
    }

    let table = MetadataTable::new(records).map_err(|source| IngestError::InvalidMetadata {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(count = table.len(), "Loaded attribute metadata");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_header_is_case_insensitive() {
        let headers = vec![
            "\u{feff}Attribute".to_string(),
            "Information_Level".to_string(),
            "TYPE".to_string(),
        ];
        assert_eq!(find_header(&headers, ATTRIBUTE_COLUMN), Some(0));
        assert_eq!(find_header(&headers, TYPE_COLUMN), Some(2));
        assert_eq!(find_header(&headers, MISSING_COLUMN), None);
    }

    #[test]
    fn test_missing_type_column_is_reported() {
        let headers = vec!["attribute".to_string(), "missing_or_unknown".to_string()];
        let err = detect_schema(&headers, Path::new("feat_info.csv")).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "type"));
    }
}
