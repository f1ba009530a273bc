//! The eight-stage cleaning pipeline.
//!
//! [`CleaningPipeline::fit`] runs every stage on a training table and returns
//! the cleaned table together with a [`FittedPipeline`]. The fitted pipeline
//! holds every learned parameter (drop lists, category lists, modes, scales)
//! and re-applies them unchanged to any other table, so an unseen extract is
//! cleaned into exactly the same feature schema.
//!
//! # Example
//!
//! ```ignore
//! use survey_transform::CleaningPipeline;
//!
//! let pipeline = CleaningPipeline::new(options, metadata)?;
//! let (fitted, cleaned) = pipeline.fit(population)?;
//! let customers = fitted.apply(customers)?.table;
//! ```

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use survey_model::{
    DecisionAction, DecisionRecord, MetadataTable, PipelineOptions, Stage, StageShape,
};
use tracing::{debug, info, info_span, warn};

use crate::data_utils::column_names;
use crate::encoding::{CategoricalPlan, MixedPlan};
use crate::error::{Result, TransformError};
use crate::impute::Imputer;
use crate::normalization::{MissingCodeResolver, SentinelNormalizer};
use crate::pruning::{ColumnDrop, RedundantPruner, SparsePruner, apply_drops};
use crate::scale::Scaler;

/// Runs stages in order, guarding row count and recording shapes.
struct StageRunner {
    rows: usize,
    shapes: Vec<StageShape>,
}

impl StageRunner {
    fn new(rows: usize) -> Self {
        Self {
            rows,
            shapes: Vec::with_capacity(Stage::ALL.len()),
        }
    }

    fn run<T>(
        &mut self,
        stage: Stage,
        df: &mut DataFrame,
        body: impl FnOnce(&mut DataFrame) -> Result<T>,
    ) -> Result<T> {
        let span = info_span!("stage", number = stage.number(), name = stage.display_name());
        let _guard = span.enter();

        let output = body(df).map_err(|err| err.in_stage(stage))?;
        // A table without columns has no height to compare.
        if df.width() > 0 && df.height() != self.rows {
            return Err(TransformError::RowCountChanged {
                expected: self.rows,
                actual: df.height(),
            }
            .in_stage(stage));
        }
        info!(rows = df.height(), columns = df.width(), "stage complete");
        self.shapes.push(StageShape {
            stage,
            rows: df.height(),
            columns: df.width(),
        });
        Ok(output)
    }
}

fn log_decisions(record: &DecisionRecord) {
    for decision in record.iter() {
        debug!(attribute = %decision.attribute, action = %decision.action, "column decision");
    }
}

/// Unfitted pipeline: options plus the attribute metadata table.
#[derive(Debug, Clone)]
pub struct CleaningPipeline {
    options: PipelineOptions,
    metadata: MetadataTable,
}

impl CleaningPipeline {
    /// Validates the options.
    pub fn new(options: PipelineOptions, metadata: MetadataTable) -> Result<Self> {
        options
            .validate()
            .map_err(|source| TransformError::InvalidOptions { source })?;
        Ok(Self { options, metadata })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    /// Fits every stage on `df` and returns the fitted pipeline and the
    /// cleaned table.
    pub fn fit(&self, mut df: DataFrame) -> Result<(FittedPipeline, DataFrame)> {
        if df.height() == 0 {
            return Err(TransformError::EmptyTable);
        }
        let options = &self.options;
        let mut runner = StageRunner::new(df.height());
        let mut decisions = DecisionRecord::new();

        let normalizer = SentinelNormalizer::new(options.sentinel_rules.clone());
        runner.run(Stage::SentinelNormalization, &mut df, |df| normalizer.apply(df))?;

        let missing_codes = runner.run(Stage::MissingCodes, &mut df, |df| {
            let resolver = MissingCodeResolver::from_metadata(&self.metadata, options)?;
            let replaced = resolver.apply(df)?;
            debug!(replaced, "sentinel cells replaced");
            Ok(resolver)
        })?;

        let sparse_drops = runner.run(Stage::SparseColumns, &mut df, |df| {
            let drops = SparsePruner::new(options.missing_threshold).fit(df);
            apply_drops(df, &drops);
            Ok(drops)
        })?;
        record_drops(&mut decisions, Stage::SparseColumns, &sparse_drops);

        let redundant_drops = runner.run(Stage::RedundantColumns, &mut df, |df| {
            let drops = RedundantPruner::new(options.correlation_threshold).fit(df)?;
            apply_drops(df, &drops);
            Ok(drops)
        })?;
        record_drops(&mut decisions, Stage::RedundantColumns, &redundant_drops);

        let categorical = runner.run(Stage::CategoricalExpansion, &mut df, |df| {
            let (plan, record) = CategoricalPlan::fit(df, &self.metadata, options, &decisions)?;
            plan.apply(df)?;
            log_decisions(&record);
            decisions.extend(record);
            Ok(plan)
        })?;

        let mixed = runner.run(Stage::MixedDecomposition, &mut df, |df| {
            let (plan, record) = MixedPlan::fit(df, options, &decisions)?;
            plan.apply(df)?;
            log_decisions(&record);
            decisions.extend(record);
            Ok(plan)
        })?;
        let feature_schema = column_names(&df);

        let imputer = runner.run(Stage::Imputation, &mut df, |df| {
            let imputer = Imputer::fit(df)?;
            for (attribute, filled) in imputer.apply(df)? {
                if let Some(fill_value) = imputer.mode_of(&attribute) {
                    decisions.push(
                        Stage::Imputation,
                        attribute,
                        DecisionAction::Imputed { fill_value, filled },
                    );
                }
            }
            Ok(imputer)
        })?;

        let scaler = runner.run(Stage::Scaling, &mut df, |df| {
            let scaler = Scaler::fit(df, options.zero_variance)?;
            for column in scaler.columns().iter().filter(|c| c.zero_variance) {
                warn!(attribute = %column.attribute, mean = column.mean, "zero variance, column centred only");
                decisions.push(
                    Stage::Scaling,
                    column.attribute.as_str(),
                    DecisionAction::ZeroVariance { mean: column.mean },
                );
            }
            scaler.apply(df)?;
            Ok(scaler)
        })?;

        info!(
            rows = df.height(),
            columns = df.width(),
            dropped = decisions.dropped().len(),
            "pipeline fitted"
        );

        let fitted = FittedPipeline {
            normalizer,
            missing_codes,
            sparse_drops,
            redundant_drops,
            categorical,
            mixed,
            feature_schema,
            imputer,
            scaler,
            output_columns: column_names(&df),
            shapes: runner.shapes,
            decisions,
        };
        Ok((fitted, df))
    }
}

fn record_drops(record: &mut DecisionRecord, stage: Stage, drops: &[ColumnDrop]) {
    for drop in drops {
        debug!(attribute = %drop.attribute, reason = %drop.reason, "column dropped");
        record.push(
            stage,
            drop.attribute.as_str(),
            DecisionAction::Dropped {
                reason: drop.reason.clone(),
            },
        );
    }
}

/// Output of [`FittedPipeline::apply`].
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub table: DataFrame,
    pub shapes: Vec<StageShape>,
}

/// Every parameter learned by [`CleaningPipeline::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    normalizer: SentinelNormalizer,
    missing_codes: MissingCodeResolver,
    sparse_drops: Vec<ColumnDrop>,
    redundant_drops: Vec<ColumnDrop>,
    categorical: CategoricalPlan,
    mixed: MixedPlan,
    /// Column order after mixed-code decomposition.
    feature_schema: Vec<String>,
    imputer: Imputer,
    scaler: Scaler,
    output_columns: Vec<String>,
    /// Shapes observed while fitting.
    shapes: Vec<StageShape>,
    decisions: DecisionRecord,
}

impl FittedPipeline {
    /// Re-applies the fitted parameters to another table.
    ///
    /// Columns the fit dropped are dropped when present. Columns the fit
    /// reads must be present. After decomposition the table is reduced to the
    /// fitted feature schema; features it lacks are a schema mismatch.
    pub fn apply(&self, mut df: DataFrame) -> Result<PipelineRun> {
        let mut runner = StageRunner::new(df.height());

        runner.run(Stage::SentinelNormalization, &mut df, |df| {
            self.normalizer.apply(df)
        })?;
        runner.run(Stage::MissingCodes, &mut df, |df| {
            self.missing_codes.apply(df).map(|_| ())
        })?;
        runner.run(Stage::SparseColumns, &mut df, |df| {
            apply_drops(df, &self.sparse_drops);
            Ok(())
        })?;
        runner.run(Stage::RedundantColumns, &mut df, |df| {
            apply_drops(df, &self.redundant_drops);
            Ok(())
        })?;
        runner.run(Stage::CategoricalExpansion, &mut df, |df| {
            self.categorical.apply(df)
        })?;
        runner.run(Stage::MixedDecomposition, &mut df, |df| {
            self.mixed.apply(df)?;
            *df = align_to_schema(df, &self.feature_schema)?;
            Ok(())
        })?;
        runner.run(Stage::Imputation, &mut df, |df| {
            self.imputer.apply(df).map(|_| ())
        })?;
        runner.run(Stage::Scaling, &mut df, |df| self.scaler.apply(df))?;

        info!(rows = df.height(), columns = df.width(), "pipeline applied");
        Ok(PipelineRun {
            table: df,
            shapes: runner.shapes,
        })
    }

    pub fn decisions(&self) -> &DecisionRecord {
        &self.decisions
    }

    pub fn shapes(&self) -> &[StageShape] {
        &self.shapes
    }

    pub fn feature_schema(&self) -> &[String] {
        &self.feature_schema
    }

    pub fn output_columns(&self) -> &[String] {
        &self.output_columns
    }

    pub fn missing_codes(&self) -> &MissingCodeResolver {
        &self.missing_codes
    }

    pub fn categorical(&self) -> &CategoricalPlan {
        &self.categorical
    }

    pub fn mixed(&self) -> &MixedPlan {
        &self.mixed
    }

    pub fn imputer(&self) -> &Imputer {
        &self.imputer
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }
}

/// Selects the fitted features in fitted order, dropping any extras.
fn align_to_schema(df: &DataFrame, schema: &[String]) -> Result<DataFrame> {
    let present = column_names(df);
    let missing: Vec<String> = schema
        .iter()
        .filter(|name| !present.contains(name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(TransformError::SchemaMismatch { missing });
    }
    let extra = present.len() - schema.len();
    if extra > 0 {
        debug!(extra, "dropping columns outside the fitted schema");
    }
    Ok(df.select(schema.iter().map(String::as_str))?)
}
