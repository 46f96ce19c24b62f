//! Tests for trials-model types.

use serde_json::json;
use trials_model::{DatasetId, FieldRecord, FieldValue, RawPage};

#[test]
fn field_record_defaults_to_null_for_unknown_fields() {
    let mut record = FieldRecord::new("NCT00000001");
    record.insert("brief_title", FieldValue::Text("A study".to_string()));
    record.insert("conditions", FieldValue::List(vec![json!("Asthma")]));

    assert_eq!(record.text("brief_title"), Some("A study"));
    assert!(record.get("official_title").is_null());
    assert_eq!(record.list("conditions").len(), 1);
    assert!(record.list("brief_title").is_empty());
}

#[test]
fn raw_page_serializes_with_dataset_string() {
    let page = RawPage::new(
        DatasetId::new("trials").unwrap(),
        vec![json!({"protocolSection": {}})],
        Some("token-2".to_string()),
    );
    let value = serde_json::to_value(&page).expect("serialize page");
    assert_eq!(value["dataset"], json!("trials"));
    assert_eq!(value["next_token"], json!("token-2"));

    let round: RawPage = serde_json::from_value(value).expect("deserialize page");
    assert_eq!(round, page);
}

#[test]
fn raw_page_rejects_invalid_dataset_on_load() {
    let value = json!({
        "dataset": "../x",
        "records": [],
        "next_token": null,
        "fetched_at": "2024-02-19T00:00:00Z"
    });
    assert!(serde_json::from_value::<RawPage>(value).is_err());
}
