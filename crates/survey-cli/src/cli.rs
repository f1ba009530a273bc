//! CLI argument definitions for survey-prep.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "survey-prep",
    version,
    about = "Clean demographic survey extracts into standardized numeric features",
    long_about = "Clean demographic survey extracts into standardized numeric features.\n\n\
                  `clean` fits the eight preparation stages on a training extract;\n\
                  `apply` re-applies saved parameters to new extracts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit the pipeline on a raw extract and write the cleaned table.
    Clean(CleanArgs),

    /// Apply previously fitted parameters to another raw extract.
    Apply(ApplyArgs),
}

#[derive(Parser)]
pub struct CleanArgs {
    /// Raw survey extract (delimited text with a header row).
    #[arg(value_name = "RAW")]
    pub raw: PathBuf,

    /// Attribute metadata table (attribute, type, missing_or_unknown).
    #[arg(long = "metadata", value_name = "CSV")]
    pub metadata: PathBuf,

    /// Destination for the cleaned table.
    #[arg(long = "output", short = 'o', value_name = "CSV")]
    pub output: PathBuf,

    /// Save the fitted parameters as JSON for later `apply` runs.
    #[arg(long = "params", value_name = "JSON")]
    pub params: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Field separator of the raw extract and the output (default ';').
    #[arg(long = "separator", value_name = "CHAR")]
    pub separator: Option<char>,

    /// Drop columns whose missing fraction exceeds this value.
    #[arg(long = "missing-threshold", value_name = "FRACTION")]
    pub missing_threshold: Option<f64>,

    /// Drop columns whose absolute correlation with a kept column exceeds this value.
    #[arg(long = "correlation-threshold", value_name = "R")]
    pub correlation_threshold: Option<f64>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Raw survey extract to clean.
    #[arg(value_name = "RAW")]
    pub raw: PathBuf,

    /// Fitted parameters written by `clean --params`.
    #[arg(long = "params", value_name = "JSON")]
    pub params: PathBuf,

    /// Destination for the cleaned table.
    #[arg(long = "output", short = 'o', value_name = "CSV")]
    pub output: PathBuf,

    /// Field separator of the raw extract and the output (default ';').
    #[arg(long = "separator", value_name = "CHAR")]
    pub separator: Option<char>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
