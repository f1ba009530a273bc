//! Raw survey table reading and cleaned table writing.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Field separator used by the raw survey extracts.
pub const DEFAULT_SEPARATOR: u8 = b';';

/// Options for reading a raw survey table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    pub separator: u8,
    /// Rows scanned for dtype inference; `None` scans the whole file so that
    /// a token deep in a numeric column still yields a text column.
    pub infer_schema_length: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            infer_schema_length: None,
        }
    }
}

impl ReadOptions {
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }
}

/// Reads a raw survey table.
///
/// Empty fields become nulls. Columns holding any non-numeric token are read
/// as text and left for the sentinel normalizer to resolve.
pub fn read_raw_table(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let size = std::fs::metadata(path)
        .map_err(|_| IngestError::FileNotFound {
            path: path.to_path_buf(),
        })?
        .len();
    if size == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let separator = options.separator;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .map_parse_options(|parse| parse.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.width() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Loaded raw table"
    );
    Ok(df)
}

/// Writes a table as CSV with a header row.
pub fn write_table(df: &mut DataFrame, path: &Path, separator: u8) -> Result<()> {
    let mut file = File::create(path).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(df)?;
    tracing::debug!(path = %path.display(), rows = df.height(), "Wrote table");
    Ok(())
}
