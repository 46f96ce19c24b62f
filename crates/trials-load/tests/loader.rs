use tempfile::TempDir;
use trials_load::{LoadError, SqliteLoader, VIEWS_VERSION};
use trials_model::{CellValue, Table};

fn table(name: &str, columns: &[&str], rows: &[&[Option<&str>]]) -> Table {
    let mut table = Table::new(name, columns.iter().map(|c| c.to_string()).collect());
    for row in rows {
        table
            .push_row(row.iter().map(|cell| CellValue::from_option(*cell)).collect())
            .unwrap();
    }
    table
}

fn fixture() -> Vec<Table> {
    vec![
        table(
            "trials",
            &["nct_id", "brief_title", "official_title", "lead_sponsor"],
            &[
                &[Some("NCT1"), Some("A"), None, Some("Acme")],
                &[Some("NCT2"), Some("B"), None, Some("Acme")],
            ],
        ),
        table(
            "trial_status",
            &["nct_id", "overall_status", "start_date", "completion_date", "why_stopped"],
            &[&[Some("NCT1"), Some("COMPLETED"), Some("2020-01"), None, None]],
        ),
        table(
            "trial_interventions",
            &["nct_id", "intervention_name"],
            &[
                &[Some("NCT1"), Some("humira")],
                &[Some("NCT2"), Some("humira")],
                &[Some("NCT2"), Some("placebo")],
            ],
        ),
    ]
}

#[test]
fn replace_load_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db").join("trials.db");

    let mut loader = SqliteLoader::open(&path).unwrap();
    loader.load(&fixture()).unwrap();
    let once: Vec<_> = ["trials", "trial_status", "trial_interventions"]
        .iter()
        .map(|name| loader.rows(name).unwrap())
        .collect();

    loader.load(&fixture()).unwrap();
    let twice: Vec<_> = ["trials", "trial_status", "trial_interventions"]
        .iter()
        .map(|name| loader.rows(name).unwrap())
        .collect();

    assert_eq!(once, twice);
    assert_eq!(loader.row_count("trial_interventions").unwrap(), 3);
    assert_eq!(loader.user_version().unwrap(), VIEWS_VERSION);
}

#[test]
fn missing_cells_load_as_null() {
    let mut loader = SqliteLoader::open_in_memory().unwrap();
    loader.load(&fixture()).unwrap();
    let rows = loader.rows("trials").unwrap();
    assert_eq!(
        rows[0],
        vec![
            Some("NCT1".to_string()),
            Some("A".to_string()),
            None,
            Some("Acme".to_string())
        ]
    );
}

#[test]
fn views_are_created_only_for_available_tables() {
    let mut loader = SqliteLoader::open_in_memory().unwrap();
    let report = loader.load(&fixture()).unwrap();

    assert_eq!(
        report.views,
        vec!["drug_trial_counts", "sponsor_trial_counts", "trial_drug_details"]
    );
    let counts = loader.rows("drug_trial_counts").unwrap();
    assert!(counts.contains(&vec![Some("humira".to_string()), Some("2".to_string())]));
    assert_eq!(loader.row_count("trial_drug_details").unwrap(), 3);
    assert!(!loader.table_exists("trial_race").unwrap());
}

#[test]
fn reload_replaces_stale_rows() {
    let mut loader = SqliteLoader::open_in_memory().unwrap();
    loader.load(&fixture()).unwrap();
    let smaller = vec![table(
        "trials",
        &["nct_id", "brief_title", "official_title", "lead_sponsor"],
        &[&[Some("NCT9"), None, None, None]],
    )];
    loader.load(&smaller).unwrap();
    assert_eq!(loader.row_count("trials").unwrap(), 1);
    assert_eq!(loader.rows("trials").unwrap()[0][0].as_deref(), Some("NCT9"));
    // Tables outside the load set are left alone.
    assert_eq!(loader.row_count("trial_interventions").unwrap(), 3);
}

#[test]
fn unusable_database_directory_is_reported() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("data");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let err = match SqliteLoader::open(&blocker.join("trials.db")) {
        Ok(_) => panic!("opening below a regular file should fail"),
        Err(err) => err,
    };
    match err {
        LoadError::Directory { path, .. } => assert_eq!(path, blocker),
        other => panic!("unexpected error: {other}"),
    }
}
