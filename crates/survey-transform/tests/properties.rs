//! Property-based tests for pipeline invariants.

use polars::prelude::*;
use proptest::prelude::*;
use survey_model::{AttributeMetadata, AttributeType, MetadataTable, PipelineOptions};
use survey_transform::CleaningPipeline;
use survey_transform::data_utils::numeric_values;
use survey_transform::normalization::MissingCodeResolver;
use survey_transform::pruning::{RedundantPruner, apply_drops, pearson};

fn plain_options() -> PipelineOptions {
    PipelineOptions::default()
        .with_sentinel_rules(Vec::new())
        .with_identifier_attributes(Vec::new())
        .with_decomposed_attributes(Vec::new())
        .with_mixed_indicator_attributes(Vec::new())
}

fn frame(columns: &[Vec<Option<i64>>]) -> DataFrame {
    DataFrame::new(
        columns
            .iter()
            .enumerate()
            .map(|(i, values)| Column::new(format!("SEMIO_{i}").into(), values.clone()))
            .collect(),
    )
    .unwrap()
}

/// Random integer tables; the first column has no gaps so at least one
/// column survives pruning.
fn table_strategy() -> impl Strategy<Value = Vec<Vec<Option<i64>>>> {
    (2usize..12, 0usize..5).prop_flat_map(|(rows, extra)| {
        let complete = prop::collection::vec((-3i64..7).prop_map(Some), rows);
        let gappy = prop::collection::vec(
            prop::collection::vec(prop::option::weighted(0.85, -3i64..7), rows),
            extra,
        );
        (complete, gappy).prop_map(|(first, mut rest)| {
            rest.insert(0, first);
            rest
        })
    })
}

proptest! {
    #[test]
    fn row_count_is_preserved_and_output_is_standardized(columns in table_strategy()) {
        let rows = columns[0].len();
        let pipeline = CleaningPipeline::new(plain_options(), MetadataTable::default()).unwrap();
        let (fitted, cleaned) = pipeline.fit(frame(&columns)).unwrap();

        prop_assert_eq!(cleaned.height(), rows);
        prop_assert!(fitted.shapes().iter().all(|shape| shape.rows == rows));

        for col in cleaned.get_columns() {
            prop_assert_eq!(col.null_count(), 0);
            let values: Vec<f64> = col.f64().unwrap().into_iter().flatten().collect();
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            prop_assert!(mean.abs() < 1e-9);
            let stats = fitted.scaler().get(col.name().as_str()).unwrap();
            if stats.zero_variance {
                prop_assert!(var < 1e-18);
            } else {
                prop_assert!((var - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn sparse_threshold_holds_after_fit(columns in table_strategy()) {
        let pipeline = CleaningPipeline::new(plain_options(), MetadataTable::default()).unwrap();
        let (fitted, _) = pipeline.fit(frame(&columns)).unwrap();
        let df = frame(&columns);
        for name in fitted.feature_schema() {
            let col = df.column(name).unwrap();
            let fraction = col.null_count() as f64 / col.len() as f64;
            prop_assert!(fraction <= 0.30);
        }
    }

    #[test]
    fn retained_pairs_are_below_threshold(columns in table_strategy(), threshold in 0.5f64..0.99) {
        let mut df = frame(&columns);
        let drops = RedundantPruner::new(threshold).fit(&df).unwrap();
        apply_drops(&mut df, &drops);

        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                let x = numeric_values(&df, a).unwrap();
                let y = numeric_values(&df, b).unwrap();
                if let Some(r) = pearson(&x, &y) {
                    prop_assert!(r.abs() <= threshold);
                }
            }
        }
    }

    #[test]
    fn missing_code_resolution_is_idempotent(
        columns in table_strategy(),
        codes in prop::collection::vec(-3i64..7, 0..3),
    ) {
        let listed = codes.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",");
        let metadata = MetadataTable::new(
            (0..columns.len())
                .map(|i| {
                    AttributeMetadata::new(format!("SEMIO_{i}"), AttributeType::Ordinal)
                        .with_missing_codes(format!("[{listed}]"))
                })
                .collect(),
        )
        .unwrap();
        let resolver = MissingCodeResolver::from_metadata(&metadata, &plain_options()).unwrap();

        let mut df = frame(&columns);
        resolver.apply(&mut df).unwrap();
        let once = df.clone();
        prop_assert_eq!(resolver.apply(&mut df).unwrap(), 0);
        prop_assert!(df.equals_missing(&once));

        for i in 0..columns.len() {
            let values = numeric_values(&df, &format!("SEMIO_{i}")).unwrap();
            for value in values.into_iter().flatten() {
                prop_assert!(!codes.iter().any(|c| *c as f64 == value));
            }
        }
    }
}
