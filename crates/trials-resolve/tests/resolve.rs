use proptest::prelude::*;
use trials_model::{CellValue, Table};
use trials_resolve::{
    LeaderClusterer, NameClusterer, NameMapping, apply_mapping, build_canonical, canonical_table,
    match_names, similarity,
};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn fda(brands: &[Option<&str>]) -> Table {
    let mut table = Table::new(
        "fda_full",
        vec!["record_id".to_string(), "brand_name".to_string()],
    );
    for (idx, brand) in brands.iter().enumerate() {
        table
            .push_row(vec![CellValue::text(format!("r{idx}")), CellValue::from_option(*brand)])
            .unwrap();
    }
    table
}

fn interventions(rows: &[(&str, &str)]) -> Table {
    let mut table = Table::new(
        "trial_interventions_raw",
        vec!["nct_id".to_string(), "intervention_name".to_string()],
    );
    for (id, name) in rows {
        table
            .push_row(vec![CellValue::text(*id), CellValue::text(*name)])
            .unwrap();
    }
    table
}

#[test]
fn canonical_names_are_lowercased_and_clustered() {
    let table = fda(&[
        Some("HUMIRA"),
        Some("Humira"),
        None,
        Some("Lipitor"),
        Some("humiraa"),
        Some("  "),
    ]);
    let drugs = build_canonical(&table, "brand_name", &LeaderClusterer::default()).unwrap();

    let canonical: Vec<&str> = drugs.iter().map(|drug| drug.name.as_str()).collect();
    assert_eq!(canonical, vec!["humira", "lipitor"]);
    assert_eq!(drugs[0].members, vec![0, 1, 4]);
    assert_eq!(drugs[1].members, vec![3]);

    let out = canonical_table(&drugs).unwrap();
    assert_eq!(out.name, "canonical_drugs");
    assert_eq!(out.cell(1, "brand_name"), Some(&CellValue::text("lipitor")));
}

#[test]
fn custom_clusterer_controls_representatives() {
    struct OneCluster;
    impl NameClusterer for OneCluster {
        fn cluster(&self, names: &[String]) -> Vec<usize> {
            vec![0; names.len()]
        }
    }
    let table = fda(&[Some("b"), Some("a")]);
    let drugs = build_canonical(&table, "brand_name", &OneCluster).unwrap();
    assert_eq!(drugs.len(), 1);
    assert_eq!(drugs[0].name, "b");
}

#[test]
fn score_exactly_at_tolerance_matches() {
    let canonical = names(&["martha"]);
    let tolerance = similarity("martha", "marhta");
    let mapping = match_names(&canonical, ["MARHTA"], tolerance);
    assert_eq!(mapping.get("marhta"), Some("martha"));
}

#[test]
fn different_first_characters_are_never_compared() {
    let canonical = names(&["xanax"]);
    // Near-identical, but blocked on the first character.
    let mapping = match_names(&canonical, ["zanax"], 0.0);
    assert!(mapping.is_empty());
}

#[test]
fn first_qualifying_candidate_wins() {
    let canonical = names(&["advilx", "advil"]);
    let mapping = match_names(&canonical, ["advil"], 0.85);
    assert_eq!(mapping.get("advil"), Some("advilx"));
}

#[test]
fn applying_mapping_passes_through_and_dedupes() {
    let mut mapping = NameMapping::default();
    mapping.insert("humira pen", "humira");
    let raw = interventions(&[
        ("NCT1", "Humira Pen"),
        ("NCT1", "humira"),
        ("NCT1", "Placebo"),
        ("NCT2", "HUMIRA PEN"),
        ("NCT1", "placebo"),
    ]);

    let out = apply_mapping(&raw, "intervention_name", &mapping, "trial_interventions").unwrap();

    assert_eq!(out.name, "trial_interventions");
    let rows: Vec<(String, String)> = out
        .rows
        .iter()
        .map(|row| {
            (
                row[0].as_text().unwrap().to_string(),
                row[1].as_text().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("NCT1".to_string(), "humira".to_string()),
            ("NCT1".to_string(), "placebo".to_string()),
            ("NCT2".to_string(), "humira".to_string()),
        ]
    );
}

#[test]
fn missing_column_is_an_error() {
    let raw = interventions(&[]);
    assert!(apply_mapping(&raw, "nope", &NameMapping::default(), "x").is_err());
}

proptest! {
    #[test]
    fn mapped_names_share_first_character(
        canonical in prop::collection::vec("[a-d][a-z]{0,8}", 0..12),
        raw in prop::collection::vec("[a-d][a-z]{0,8}", 0..12),
    ) {
        let mapping = match_names(&canonical, raw.iter().map(String::as_str), 0.5);
        for (from, to) in mapping.iter() {
            prop_assert_eq!(from.chars().next(), to.chars().next());
            prop_assert!(similarity(to, from) >= 0.5);
        }
    }
}
