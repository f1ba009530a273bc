//! Tests for categorical expansion and mixed-code decomposition.

use polars::prelude::*;
use survey_model::{
    AttributeMetadata, AttributeType, DecisionAction, DecisionRecord, DropReason, MetadataTable,
    PipelineOptions, Stage,
};
use survey_transform::TransformError;
use survey_transform::data_utils::column_names;
use survey_transform::encoding::{CategoricalPlan, CodeTable, IndicatorExpansion, MixedPlan};

fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn categorical_metadata() -> MetadataTable {
    MetadataTable::new(vec![
        AttributeMetadata::new("AGER_TYP", AttributeType::Categorical),
        AttributeMetadata::new("ALTER_HH", AttributeType::Interval),
        AttributeMetadata::new("ANREDE_KZ", AttributeType::Categorical),
        AttributeMetadata::new("CAMEO_DEU_2015", AttributeType::Categorical),
        AttributeMetadata::new("SHOPPER_TYP", AttributeType::Categorical),
    ])
    .unwrap()
}

fn categorical_frame() -> DataFrame {
    DataFrame::new(vec![
        Column::new("AGER_TYP".into(), vec![Some(1.0), Some(2.0), Some(3.0), None, Some(2.0)]),
        Column::new("ALTER_HH".into(), vec![Some(10.0), Some(12.0), Some(15.0), Some(9.0), Some(20.0)]),
        Column::new("ANREDE_KZ".into(), vec![Some(1i64), Some(2), Some(1), Some(2), Some(1)]),
        Column::new("CAMEO_DEU_2015".into(), vec![Some("8A"), Some("4C"), None, Some("2D"), Some("1A")]),
        Column::new("SHOPPER_TYP".into(), vec![Some(0i64), Some(3), Some(1), Some(2), Some(0)]),
    ])
    .unwrap()
}

fn categorical_options() -> PipelineOptions {
    PipelineOptions::default().with_identifier_attributes(vec!["CAMEO_DEU_2015".to_string()])
}

#[test]
fn test_expansion_appends_sorted_indicators() {
    let mut df = categorical_frame();
    let (plan, record) = CategoricalPlan::fit(
        &df,
        &categorical_metadata(),
        &categorical_options(),
        &DecisionRecord::new(),
    )
    .unwrap();
    plan.apply(&mut df).unwrap();

    assert_eq!(
        column_names(&df),
        vec![
            "ALTER_HH",
            "ANREDE_KZ",
            "AGER_TYP_1",
            "AGER_TYP_2",
            "AGER_TYP_3",
            "SHOPPER_TYP_0",
            "SHOPPER_TYP_1",
            "SHOPPER_TYP_2",
            "SHOPPER_TYP_3",
        ]
    );
    assert_eq!(
        f64_column(&df, "AGER_TYP_2"),
        vec![Some(0.0), Some(1.0), Some(0.0), Some(0.0), Some(1.0)]
    );
    // A missing original yields zeros in every indicator.
    for name in ["AGER_TYP_1", "AGER_TYP_2", "AGER_TYP_3"] {
        assert_eq!(f64_column(&df, name)[3], Some(0.0));
    }

    let actions: Vec<(&str, &DecisionAction)> = record
        .iter()
        .map(|d| (d.attribute.as_str(), &d.action))
        .collect();
    assert_eq!(actions.len(), 3);
    assert_eq!(
        actions[0],
        (
            "CAMEO_DEU_2015",
            &DecisionAction::Dropped {
                reason: DropReason::Identifier
            }
        )
    );
    assert!(matches!(actions[1], ("AGER_TYP", DecisionAction::Expanded { .. })));
    assert!(matches!(actions[2], ("SHOPPER_TYP", DecisionAction::Expanded { .. })));
}

#[test]
fn test_cardinality_bounds_are_exclusive() {
    let df = categorical_frame();
    let options = categorical_options();
    let options = PipelineOptions {
        max_categories: 3,
        ..options
    };
    let (plan, _) = CategoricalPlan::fit(
        &df,
        &categorical_metadata(),
        &options,
        &DecisionRecord::new(),
    )
    .unwrap();
    // Two categories (ANREDE_KZ) and three categories (AGER_TYP) are both
    // outside (2, 3); four (SHOPPER_TYP) is too.
    assert!(plan.expansions.is_empty());
    assert_eq!(plan.identifier_drops, vec!["CAMEO_DEU_2015"]);
}

#[test]
fn test_absent_identifier_is_schema_error_unless_removed() {
    let mut df = categorical_frame();
    df.drop_in_place("CAMEO_DEU_2015").unwrap();

    let err = CategoricalPlan::fit(
        &df,
        &categorical_metadata(),
        &categorical_options(),
        &DecisionRecord::new(),
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::MissingAttribute { .. }));

    let mut prior = DecisionRecord::new();
    prior.push(
        Stage::SparseColumns,
        "CAMEO_DEU_2015",
        DecisionAction::Dropped {
            reason: DropReason::Sparse {
                missing_fraction: 0.4,
            },
        },
    );
    let (plan, record) = CategoricalPlan::fit(
        &df,
        &categorical_metadata(),
        &categorical_options(),
        &prior,
    )
    .unwrap();
    assert!(plan.identifier_drops.is_empty());
    assert!(matches!(
        record.iter().next().map(|d| &d.action),
        Some(DecisionAction::Skipped { .. })
    ));
}

#[test]
fn test_unseen_category_yields_zero_indicators() {
    let train = categorical_frame();
    let expansion = IndicatorExpansion::fit(&train, "SHOPPER_TYP").unwrap();

    let mut unseen = DataFrame::new(vec![Column::new(
        "SHOPPER_TYP".into(),
        vec![Some(7i64), Some(3)],
    )])
    .unwrap();
    let names = expansion.apply(&mut unseen).unwrap();
    assert_eq!(names.len(), 4);
    assert_eq!(f64_column(&unseen, "SHOPPER_TYP_3"), vec![Some(0.0), Some(1.0)]);
    for name in &names {
        assert_eq!(f64_column(&unseen, name)[0], Some(0.0));
    }
}

#[test]
fn test_indicator_name_collision_is_an_error() {
    let train = categorical_frame();
    let expansion = IndicatorExpansion::fit(&train, "ANREDE_KZ").unwrap();

    let mut df = DataFrame::new(vec![
        Column::new("ANREDE_KZ".into(), vec![Some(1i64), Some(2)]),
        Column::new("ANREDE_KZ_2".into(), vec![Some(5.0), Some(6.0)]),
    ])
    .unwrap();
    let err = expansion.apply(&mut df).unwrap_err();
    match err {
        TransformError::DataFrame { message } => assert!(message.contains("ANREDE_KZ_2"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
    // The existing column is never overwritten.
    assert_eq!(f64_column(&df, "ANREDE_KZ_2"), vec![Some(5.0), Some(6.0)]);
}

#[test]
fn test_apply_tolerates_identifier_already_dropped() {
    let train = categorical_frame();
    let (plan, _) = CategoricalPlan::fit(
        &train,
        &categorical_metadata(),
        &categorical_options(),
        &DecisionRecord::new(),
    )
    .unwrap();

    let mut unseen = train.clone();
    unseen.drop_in_place("CAMEO_DEU_2015").unwrap();
    plan.apply(&mut unseen).unwrap();
    assert!(!column_names(&unseen).contains(&"CAMEO_DEU_2015".to_string()));
    assert!(column_names(&unseen).contains(&"AGER_TYP_1".to_string()));
}

#[test]
fn test_text_categories_keep_their_labels() {
    let df = categorical_frame();
    let expansion = IndicatorExpansion::fit(&df, "CAMEO_DEU_2015").unwrap();
    assert_eq!(
        expansion.indicator_names(),
        vec![
            "CAMEO_DEU_2015_1A",
            "CAMEO_DEU_2015_2D",
            "CAMEO_DEU_2015_4C",
            "CAMEO_DEU_2015_8A",
        ]
    );
}

fn mixed_frame() -> DataFrame {
    DataFrame::new(vec![
        Column::new("ALTER_HH".into(), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
        Column::new(
            "PRAEGENDE_JUGENDJAHRE".into(),
            vec![Some(1.0), Some(9.0), Some(0.0), Some(-1.0), None],
        ),
        Column::new(
            "CAMEO_INTL_2015".into(),
            vec![Some(11i64), Some(55), Some(-1), Some(24), None],
        ),
        Column::new("WOHNLAGE".into(), vec![Some(1.0), Some(3.0), None, Some(1.0), Some(8.0)]),
    ])
    .unwrap()
}

fn mixed_options() -> PipelineOptions {
    PipelineOptions::default().with_mixed_indicator_attributes(vec!["WOHNLAGE".to_string()])
}

#[test]
fn test_youth_and_wealth_codes_decompose() {
    let mut df = mixed_frame();
    let (plan, record) = MixedPlan::fit(&df, &mixed_options(), &DecisionRecord::new()).unwrap();
    plan.apply(&mut df).unwrap();

    assert_eq!(
        column_names(&df),
        vec![
            "ALTER_HH",
            "DECADE",
            "MOVEMENT",
            "WEALTH",
            "LIFE_STAGE",
            "WOHNLAGE_1",
            "WOHNLAGE_3",
            "WOHNLAGE_8",
        ]
    );
    assert_eq!(
        f64_column(&df, "DECADE"),
        vec![Some(40.0), Some(70.0), None, None, None]
    );
    assert_eq!(
        f64_column(&df, "MOVEMENT"),
        vec![Some(0.0), Some(1.0), None, None, None]
    );
    assert_eq!(
        f64_column(&df, "WEALTH"),
        vec![Some(1.0), Some(5.0), None, Some(2.0), None]
    );
    assert_eq!(
        f64_column(&df, "LIFE_STAGE"),
        vec![Some(1.0), Some(5.0), None, Some(4.0), None]
    );
    assert_eq!(plan.output_names(), column_names(&df)[1..].to_vec());
    assert_eq!(record.for_stage(Stage::MixedDecomposition).count(), 3);
}

#[test]
fn test_code_outside_domain_is_coercion_error() {
    let mut df = mixed_frame();
    df.with_column(Column::new(
        "PRAEGENDE_JUGENDJAHRE".into(),
        vec![Some(1.0), Some(16.0), None, None, None],
    ))
    .unwrap();
    let (plan, _) = MixedPlan::fit(&df, &mixed_options(), &DecisionRecord::new()).unwrap();
    let err = plan.apply(&mut df).unwrap_err();
    assert!(matches!(err, TransformError::Coercion { ref value, .. } if value == "16"));
}

#[test]
fn test_unknown_decomposition_is_invalid_option() {
    let df = mixed_frame();
    let options = mixed_options().with_decomposed_attributes(vec!["WOHNLAGE".to_string()]);
    let err = MixedPlan::fit(&df, &options, &DecisionRecord::new()).unwrap_err();
    assert!(matches!(err, TransformError::InvalidOptions { .. }));
}

#[test]
fn test_lookup_tables_map_missing_codes_to_missing() {
    for table in [
        CodeTable::Decade,
        CodeTable::Movement,
        CodeTable::Wealth,
        CodeTable::LifeStage,
    ] {
        assert_eq!(table.lookup("CODE", Some(0.0)).unwrap(), None);
        assert_eq!(table.lookup("CODE", Some(-1.0)).unwrap(), None);
        assert_eq!(table.lookup("CODE", None).unwrap(), None);
    }
    assert!(CodeTable::Wealth.lookup("CAMEO_INTL_2015", Some(16.0)).is_err());
}
