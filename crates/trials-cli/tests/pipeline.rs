//! End-to-end stage tests over a temporary workspace, without network access.

use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;
use trials_cli::config::{PathsConfig, PipelineConfig, SourceSettings};
use trials_cli::pipeline::{DatasetSelection, LOAD_TABLES, PipelineContext, RunOptions};
use trials_fetch::{FetchError, PageClient, PageResponse, PageStore, StopReason, WriteMode};
use trials_load::{SqliteLoader, VIEWS_VERSION};
use trials_model::{DatasetId, RawPage};

fn config(root: &Path) -> PipelineConfig {
    let quiet = SourceSettings {
        page_delay_ms: Some(0),
        retries: Some(0),
        ..SourceSettings::default()
    };
    PipelineConfig {
        paths: PathsConfig {
            data_dir: root.join("data"),
            csv_dir: root.join("data/csvs"),
            database: root.join("data/trials.db"),
        },
        trials: quiet.clone(),
        fda: quiet,
        ..PipelineConfig::default()
    }
}

fn category(title: &str, values: &[&str]) -> Value {
    let measurements: Vec<Value> = values.iter().map(|value| json!({ "value": value })).collect();
    json!({ "title": title, "measurements": measurements })
}

fn study(id: &str, sponsor: &str, interventions: &[&str], race: Vec<Value>) -> Value {
    let interventions: Vec<Value> = interventions
        .iter()
        .map(|name| json!({ "type": "DRUG", "name": name }))
        .collect();
    json!({
        "protocolSection": {
            "identificationModule": { "nctId": id, "briefTitle": format!("Study {id}") },
            "sponsorCollaboratorsModule": { "leadSponsor": { "name": sponsor } },
            "statusModule": {
                "overallStatus": "COMPLETED",
                "startDateStruct": { "date": "2019-03" },
                "primaryCompletionDateStruct": { "date": "2021-06-30" }
            },
            "conditionsModule": { "conditions": ["Psoriasis"], "keywords": ["skin", "plaque"] },
            "armsInterventionsModule": { "interventions": interventions },
            "contactsLocationsModule": { "locations": [ { "city": "Boston", "country": "United States" } ] }
        },
        "resultsSection": {
            "baselineCharacteristicsModule": {
                "measures": [ {
                    "title": "Race/Ethnicity, Customized",
                    "paramType": "COUNT_OF_PARTICIPANTS",
                    "classes": [ { "categories": race } ]
                } ]
            }
        }
    })
}

fn drug(brand: &str, sponsor: &str) -> Value {
    json!({
        "application_number": format!("BLA-{brand}"),
        "sponsor_name": sponsor,
        "products": [ { "brand_name": brand } ],
        "submissions": [ { "submission_status": "AP", "submission_status_date": "20021231" } ],
        "openfda": { "generic_name": ["GENERIC"] }
    })
}

fn seed(store: &PageStore, race_label: &str) {
    let trials = vec![
        study(
            "NCT001",
            "AbbVie",
            &["Humira", "Humiraa", "Placebo"],
            vec![
                category("White", &["3", "5"]),
                category("Caucasian", &["2"]),
                category(race_label, &["1"]),
            ],
        ),
        study("NCT002", "Pfizer", &["Advil"], Vec::new()),
    ];
    store
        .append_page(&RawPage::new(DatasetId::trials(), trials, None))
        .unwrap();
    let drugs = vec![
        drug("HUMIRA", "ABBVIE"),
        drug("Humira", "ABBVIE"),
        drug("ADVIL", "PFIZER"),
    ];
    store
        .append_page(&RawPage::new(DatasetId::fda(), drugs, None))
        .unwrap();
}

fn sorted(mut rows: Vec<Vec<Option<String>>>) -> Vec<Vec<Option<String>>> {
    rows.sort();
    rows
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

#[test]
fn build_then_load_from_stored_pages() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let database = config.paths.database.clone();
    let mut ctx = PipelineContext::new(config, RunOptions::default()).unwrap();
    seed(ctx.store(), "Asian");

    let built = ctx.build().unwrap();
    assert_eq!(built.canonical_drugs, 2);
    assert!(built.race_labels.unmatched.is_empty());
    for name in LOAD_TABLES {
        assert!(
            built.csv_paths.iter().any(|path| path.ends_with(format!("{name}.csv"))),
            "missing csv for {name}"
        );
    }

    let report = ctx.load().unwrap();
    assert_eq!(report.tables.len(), LOAD_TABLES.len());
    assert!(report.views.contains(&"drug_trial_counts".to_string()));
    drop(ctx);

    let loader = SqliteLoader::open(&database).unwrap();
    assert_eq!(loader.user_version().unwrap(), VIEWS_VERSION);
    assert_eq!(
        sorted(loader.rows("trial_interventions").unwrap()),
        vec![
            vec![text("NCT001"), text("humira")],
            vec![text("NCT001"), text("placebo")],
            vec![text("NCT002"), text("advil")],
        ]
    );
    assert_eq!(loader.row_count("fda_full").unwrap(), 3);
    assert_eq!(loader.row_count("trial_locations").unwrap(), 2);

    let race = loader.rows("trial_race").unwrap();
    assert_eq!(race.len(), 2);
    // nct_id, american_indian_or_alaska_native, asian, black, hawaiian_or_pacific_islander, white
    assert_eq!(race[0][0], text("NCT001"));
    assert_eq!(race[0][2], text("1"));
    assert_eq!(race[0][5], text("7"));
    assert_eq!(race[1][5], None);

    let status = loader.rows("trial_status").unwrap();
    assert_eq!(
        status[0],
        vec![text("NCT001"), text("COMPLETED"), text("2019-03"), text("2021-06-30"), None]
    );

    let conditions = loader.rows("trial_conditions").unwrap();
    assert_eq!(conditions[0], vec![text("NCT001"), text("Psoriasis"), text("skin plaque")]);
}

#[test]
fn strict_build_stops_on_unrecognized_labels() {
    let dir = TempDir::new().unwrap();
    let options = RunOptions {
        strict: Some(true),
        ..RunOptions::default()
    };
    let ctx = PipelineContext::new(config(dir.path()), options).unwrap();
    seed(ctx.store(), "Japanese");

    let err = ctx.build().unwrap_err();
    assert!(err.to_string().contains("Japanese"), "{err}");

    let report = ctx.labels(trials_recode::RecodeMode::Strict).unwrap();
    assert_eq!(report.outcome.unmatched, vec!["Japanese".to_string()]);
    assert_eq!(report.labels.len(), 3);
}

#[test]
fn lenient_build_codes_unrecognized_labels_unknown() {
    let dir = TempDir::new().unwrap();
    let ctx = PipelineContext::new(config(dir.path()), RunOptions::default()).unwrap();
    seed(ctx.store(), "Japanese");

    let built = ctx.build().unwrap();
    let race = built
        .tables
        .iter()
        .find(|table| table.name == "trial_race")
        .unwrap();
    assert_eq!(
        race.cell(0, "unknown").and_then(|cell| cell.as_text()),
        Some("1")
    );
}

#[test]
fn load_without_build_names_the_missing_table() {
    let dir = TempDir::new().unwrap();
    let mut ctx = PipelineContext::new(config(dir.path()), RunOptions::default()).unwrap();

    let err = ctx.load().unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("trial_conditions.csv"), "{message}");
    assert!(message.contains("run `build` first"), "{message}");
}

/// Answers every trials request with one final page and every drug request
/// with a short page.
struct OfflineClient;

impl PageClient for OfflineClient {
    fn get(&self, endpoint: &str, _query: &[(String, String)]) -> Result<PageResponse, FetchError> {
        if endpoint.contains("clinicaltrials") {
            Ok(PageResponse::ok(json!({
                "studies": [ study("NCT900", "Novartis", &["Cosentyx"], Vec::new()) ]
            })))
        } else {
            Ok(PageResponse::ok(json!({ "results": [ drug("COSENTYX", "NOVARTIS") ] })))
        }
    }
}

#[test]
fn run_fetches_builds_and_loads() {
    let dir = TempDir::new().unwrap();
    let options = RunOptions {
        write_mode: WriteMode::Replace,
        ..RunOptions::default()
    };
    let mut ctx = PipelineContext::new(config(dir.path()), options).unwrap();
    seed(ctx.store(), "Asian");

    let (fetched, built, loaded) = ctx.run(&OfflineClient, DatasetSelection::All).unwrap();
    assert_eq!(fetched.len(), 2);
    assert!(fetched.iter().all(|report| report.stop == StopReason::NoContinuation));
    // Replace mode discards the seeded pages.
    assert_eq!(ctx.store().records(&DatasetId::trials()).unwrap().len(), 1);
    assert_eq!(built.canonical_drugs, 1);
    assert_eq!(loaded.tables.len(), LOAD_TABLES.len());
}

#[test]
fn limit_override_applies_to_every_source() {
    let dir = TempDir::new().unwrap();
    let options = RunOptions {
        limit_total: Some(25),
        ..RunOptions::default()
    };
    let ctx = PipelineContext::new(config(dir.path()), options).unwrap();
    for dataset in DatasetSelection::All.datasets() {
        let source = ctx.source_config(&dataset).unwrap();
        assert_eq!(source.limit_total, Some(25));
        assert_eq!(source.page_delay_ms, 0);
    }
}
