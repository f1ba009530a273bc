//! Survey data ingestion utilities.
//!
//! Loads raw survey extracts into Polars DataFrames, loads the attribute
//! metadata table, and writes cleaned tables back out.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use survey_ingest::{ReadOptions, load_attribute_metadata, read_raw_table};
//!
//! let metadata = load_attribute_metadata(Path::new("data/feat_info.csv"))?;
//! let df = read_raw_table(Path::new("data/azdias.csv"), &ReadOptions::default())?;
//! ```

mod error;
mod metadata;
pub mod polars_utils;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === Raw Tables ===
pub use table::{DEFAULT_SEPARATOR, ReadOptions, read_raw_table, write_table};

// === Metadata ===
pub use metadata::{ATTRIBUTE_COLUMN, MISSING_COLUMN, TYPE_COLUMN, load_attribute_metadata};
