//! Serialization tests for the survey model.

use survey_model::{
    AttributeMetadata, AttributeType, DecisionAction, DecisionRecord, DropReason, MetadataTable,
    PipelineOptions, SentinelRule, Stage,
};

fn sample_metadata() -> MetadataTable {
    MetadataTable::new(vec![
        AttributeMetadata::new("AGER_TYP", AttributeType::Categorical).with_missing_codes("-1,0"),
        AttributeMetadata::new("ALTERSKATEGORIE_GROB", AttributeType::Ordinal)
            .with_missing_codes("-1,0,9"),
        AttributeMetadata::new("PRAEGENDE_JUGENDJAHRE", AttributeType::Mixed)
            .with_missing_codes("-1,0"),
        AttributeMetadata::new("ANZ_PERSONEN", AttributeType::Numeric),
    ])
    .expect("valid metadata")
}

#[test]
fn metadata_round_trips_through_json() {
    let table = sample_metadata();
    let json = serde_json::to_string(&table).expect("serialize metadata");
    let round: MetadataTable = serde_json::from_str(&json).expect("deserialize metadata");
    assert_eq!(round, table);
    assert_eq!(
        round
            .get("ALTERSKATEGORIE_GROB")
            .map(|m| m.sentinel_codes(&[]).unwrap()),
        Some(vec![-1.0, 0.0, 9.0])
    );
}

#[test]
fn duplicate_metadata_fails_to_deserialize() {
    let json = r#"[
        {"attribute": "AGER_TYP", "attribute_type": "categorical", "missing_codes": null},
        {"attribute": "AGER_TYP", "attribute_type": "categorical", "missing_codes": "-1"}
    ]"#;
    let result: Result<MetadataTable, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn categorical_attributes_keep_table_order() {
    let table = MetadataTable::new(vec![
        AttributeMetadata::new("SHOPPER_TYP", AttributeType::Categorical),
        AttributeMetadata::new("ANZ_PERSONEN", AttributeType::Numeric),
        AttributeMetadata::new("CJT_GESAMTTYP", AttributeType::Categorical),
    ])
    .unwrap();
    let names: Vec<&str> = table.categorical_attributes().collect();
    assert_eq!(names, vec!["SHOPPER_TYP", "CJT_GESAMTTYP"]);
}

#[test]
fn decision_record_serializes_with_tags() {
    let mut record = DecisionRecord::new();
    record.push(
        Stage::CategoricalExpansion,
        "CAMEO_DEU_2015",
        DecisionAction::Dropped {
            reason: DropReason::Identifier,
        },
    );
    let value = serde_json::to_value(&record).expect("serialize record");
    assert_eq!(value["decisions"][0]["stage"], "categorical_expansion");
    assert_eq!(value["decisions"][0]["action"]["action"], "dropped");
    assert_eq!(value["decisions"][0]["action"]["reason"]["kind"], "identifier");

    let round: DecisionRecord = serde_json::from_value(value).expect("deserialize record");
    assert_eq!(round, record);
}

#[test]
fn sentinel_rules_deserialize_from_tagged_json() {
    let json = r#"{
        "sentinel_rules": [
            {"kind": "recode", "attribute": "OST_WEST_KZ", "mapping": [["W", 1.0], ["O", 2.0]]}
        ]
    }"#;
    let options: PipelineOptions = serde_json::from_str(json).expect("deserialize options");
    assert_eq!(
        options.sentinel_rules,
        vec![SentinelRule::Recode {
            attribute: "OST_WEST_KZ".to_string(),
            mapping: vec![("W".to_string(), 1.0), ("O".to_string(), 2.0)],
        }]
    );
}
