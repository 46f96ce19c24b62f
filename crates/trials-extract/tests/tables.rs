use proptest::prelude::*;
use serde_json::{Value, json};
use trials_extract::{TableSpec, build_tables, fda_table_specs, trial_table_specs};
use trials_model::{CellValue, FieldRecord, FieldValue};

fn trial(id: &str, interventions: &[&str]) -> FieldRecord {
    let mut record = FieldRecord::new(id);
    record.insert("brief_title", FieldValue::Text(format!("Title {id}")));
    record.insert(
        "interventions",
        FieldValue::List(interventions.iter().map(|name| json!({ "name": name })).collect()),
    );
    record
}

fn spec(name: &str) -> Vec<TableSpec> {
    trial_table_specs()
        .into_iter()
        .filter(|spec| spec.name == name)
        .collect()
}

#[test]
fn exploded_rows_keep_element_order_and_repeat_parent() {
    let records = vec![trial("NCT1", &["b", "a", "b"]), trial("NCT2", &[]), trial("NCT3", &["c"])];
    let tables = build_tables(&records, &spec("trial_interventions_raw")).unwrap();
    let table = &tables[0];

    let names: Vec<_> = table
        .column_values("intervention_name")
        .unwrap()
        .into_iter()
        .filter_map(CellValue::as_text)
        .collect();
    assert_eq!(names, vec!["b", "a", "b", "c"]);
    let parents: Vec<_> = table
        .column_values("nct_id")
        .unwrap()
        .into_iter()
        .filter_map(CellValue::as_text)
        .collect();
    assert_eq!(parents, vec!["NCT1", "NCT1", "NCT1", "NCT3"]);
}

#[test]
fn singleton_tables_have_one_row_per_record() {
    let records = vec![trial("NCT1", &["x"]), trial("NCT1", &[])];
    let tables = build_tables(&records, &trial_table_specs()).unwrap();
    let names: Vec<&str> = tables.iter().map(|table| table.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "trials",
            "trial_status",
            "trial_interventions_raw",
            "trial_locations",
            "trial_conditions"
        ]
    );
    assert_eq!(tables[0].height(), 2);
    assert_eq!(tables[0].cell(0, "official_title"), Some(&CellValue::Missing));
    assert_eq!(tables[1].columns[0], "nct_id");
}

#[test]
fn fda_full_columns_are_stable() {
    let tables = build_tables(&[], &fda_table_specs()).unwrap();
    assert_eq!(
        tables[0].columns,
        vec![
            "record_id",
            "submission_status_date",
            "submission_status",
            "application_number",
            "brand_name",
            "sponsor_name",
            "generic_name",
            "substance_name",
            "manufacturer_name",
        ]
    );
}

proptest! {
    #[test]
    fn exploded_row_count_is_sum_of_list_lengths(lengths in prop::collection::vec(0usize..6, 0..20)) {
        let records: Vec<FieldRecord> = lengths
            .iter()
            .enumerate()
            .map(|(idx, len)| {
                let mut record = FieldRecord::new(format!("NCT{idx}"));
                let items: Vec<Value> = (0..*len).map(|n| json!(format!("cond{n}"))).collect();
                record.insert("conditions", FieldValue::List(items));
                record
            })
            .collect();

        let tables = build_tables(&records, &spec("trial_conditions")).unwrap();
        prop_assert_eq!(tables[0].height(), lengths.iter().sum::<usize>());

        let again = build_tables(&records, &spec("trial_conditions")).unwrap();
        prop_assert_eq!(&tables, &again);
    }
}
