use anyhow::{Context, Result};
use tracing::debug;

use survey_cli::config::{Overrides, PrepConfig, separator_byte};
use survey_cli::pipeline::{ApplyInput, CleanInput, apply, clean};
use survey_cli::types::{ApplyResult, CleanResult};
use survey_ingest::DEFAULT_SEPARATOR;

use crate::cli::{ApplyArgs, CleanArgs};

pub fn run_clean(args: &CleanArgs) -> Result<CleanResult> {
    let config = PrepConfig::load(args.config.as_deref())?.with_overrides(Overrides {
        separator: args.separator,
        missing_threshold: args.missing_threshold,
        correlation_threshold: args.correlation_threshold,
    });
    debug!(?config, "resolved configuration");
    let separator = config
        .separator_byte(DEFAULT_SEPARATOR)
        .context("resolve separator")?;

    clean(&CleanInput {
        raw: args.raw.clone(),
        metadata: args.metadata.clone(),
        output: args.output.clone(),
        params: args.params.clone(),
        options: config.pipeline,
        separator,
    })
}

pub fn run_apply(args: &ApplyArgs) -> Result<ApplyResult> {
    let separator = match args.separator {
        Some(separator) => separator_byte(separator).context("resolve separator")?,
        None => DEFAULT_SEPARATOR,
    };
    apply(&ApplyInput {
        raw: args.raw.clone(),
        params: args.params.clone(),
        output: args.output.clone(),
        separator,
    })
}
