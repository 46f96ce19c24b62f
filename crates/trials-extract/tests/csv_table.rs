use std::path::Path;

use tempfile::TempDir;
use trials_extract::{read_table, table_path, write_csv, write_tables};
use trials_model::{CellValue, Table};

fn conditions() -> Table {
    let mut table = Table::new(
        "trial_conditions",
        vec!["nct_id".to_string(), "condition".to_string(), "keywords".to_string()],
    );
    table
        .push_row(vec![
            CellValue::text("NCT1"),
            CellValue::text("Asthma, Severe"),
            CellValue::text("lung inhaler"),
        ])
        .unwrap();
    table
        .push_row(vec![CellValue::text("NCT2"), CellValue::text("COPD"), CellValue::Missing])
        .unwrap();
    table
}

#[test]
fn renders_header_and_empty_missing_cells() {
    let mut buffer = Vec::new();
    write_csv(&conditions(), &mut buffer, Path::new("memory")).unwrap();
    let rendered = String::from_utf8(buffer).unwrap();
    insta::assert_snapshot!(rendered, @r#"
    nct_id,condition,keywords
    NCT1,"Asthma, Severe",lung inhaler
    NCT2,COPD,
    "#);
}

#[test]
fn tables_read_back_unchanged() {
    let dir = TempDir::new().unwrap();
    let csv_dir = dir.path().join("csvs");
    let table = conditions();

    let paths = write_tables(&csv_dir, std::slice::from_ref(&table)).unwrap();
    assert_eq!(paths, vec![table_path(&csv_dir, "trial_conditions")]);

    let back = read_table("trial_conditions", &paths[0]).unwrap();
    assert_eq!(back, table);
}

#[test]
fn empty_table_keeps_its_header() {
    let dir = TempDir::new().unwrap();
    let table = Table::new("trial_sex", vec!["nct_id".to_string(), "total".to_string()]);
    let paths = write_tables(dir.path(), std::slice::from_ref(&table)).unwrap();
    let back = read_table("trial_sex", &paths[0]).unwrap();
    assert_eq!(back.columns, table.columns);
    assert_eq!(back.height(), 0);
}
