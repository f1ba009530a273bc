//! File-level drivers for the two CLI workflows.
//!
//! - **clean**: load metadata and the raw table, fit every stage, write the
//!   cleaned table and optionally the fitted parameters
//! - **apply**: load fitted parameters and a raw table, re-apply, write
//!
//! Fitted parameters are stored as pretty-printed JSON.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use survey_ingest::{ReadOptions, load_attribute_metadata, read_raw_table, write_table};
use survey_model::PipelineOptions;
use survey_transform::{CleaningPipeline, FittedPipeline};

use crate::types::{ApplyResult, CleanResult};

#[derive(Debug, Clone)]
pub struct CleanInput {
    pub raw: PathBuf,
    pub metadata: PathBuf,
    pub output: PathBuf,
    pub params: Option<PathBuf>,
    pub options: PipelineOptions,
    pub separator: u8,
}

#[derive(Debug, Clone)]
pub struct ApplyInput {
    pub raw: PathBuf,
    pub params: PathBuf,
    pub output: PathBuf,
    pub separator: u8,
}

pub fn clean(input: &CleanInput) -> Result<CleanResult> {
    let span = info_span!("clean", raw = %input.raw.display());
    let _guard = span.enter();
    let start = Instant::now();

    let metadata = load_attribute_metadata(&input.metadata).context("load attribute metadata")?;
    let read_options = ReadOptions::default().with_separator(input.separator);
    let raw = read_raw_table(&input.raw, &read_options).context("read raw table")?;

    let pipeline =
        CleaningPipeline::new(input.options.clone(), metadata).context("configure pipeline")?;
    let (fitted, mut cleaned) = pipeline.fit(raw).context("fit pipeline")?;

    write_table(&mut cleaned, &input.output, input.separator).context("write cleaned table")?;
    if let Some(path) = &input.params {
        save_params(&fitted, path)?;
    }

    info!(
        rows = cleaned.height(),
        columns = cleaned.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "clean complete"
    );
    Ok(CleanResult {
        output: input.output.clone(),
        params: input.params.clone(),
        rows: cleaned.height(),
        columns: cleaned.width(),
        shapes: fitted.shapes().to_vec(),
        decisions: fitted.decisions().clone(),
    })
}

pub fn apply(input: &ApplyInput) -> Result<ApplyResult> {
    let span = info_span!("apply", raw = %input.raw.display());
    let _guard = span.enter();
    let start = Instant::now();

    let fitted = load_params(&input.params)?;
    let read_options = ReadOptions::default().with_separator(input.separator);
    let raw = read_raw_table(&input.raw, &read_options).context("read raw table")?;

    let mut run = fitted.apply(raw).context("apply fitted pipeline")?;
    write_table(&mut run.table, &input.output, input.separator)
        .context("write cleaned table")?;

    info!(
        rows = run.table.height(),
        columns = run.table.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "apply complete"
    );
    Ok(ApplyResult {
        output: input.output.clone(),
        rows: run.table.height(),
        columns: run.table.width(),
        shapes: run.shapes,
    })
}

pub fn save_params(fitted: &FittedPipeline, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(fitted).context("serialize fitted parameters")?;
    std::fs::write(path, json)
        .with_context(|| format!("write fitted parameters {}", path.display()))?;
    info!(path = %path.display(), "saved fitted parameters");
    Ok(())
}

pub fn load_params(path: &Path) -> Result<FittedPipeline> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read fitted parameters {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("parse fitted parameters {}", path.display()))
}
