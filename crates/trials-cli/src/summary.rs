use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use trials_cli::pipeline::{BuildOutput, LabelReport};
use trials_fetch::{FetchReport, StopReason};
use trials_load::LoadReport;

use crate::commands::CommandOutput;

pub fn print_summary(output: &CommandOutput) {
    match output {
        CommandOutput::Fetched(reports) => print_fetch(reports),
        CommandOutput::Built(built) => print_build(built),
        CommandOutput::Loaded(loaded) => print_load(loaded),
        CommandOutput::Ran {
            fetched,
            built,
            loaded,
        } => {
            print_fetch(fetched);
            print_build(built);
            print_load(loaded);
        }
        CommandOutput::Labels(report) => print_labels(report),
    }
}

fn print_fetch(reports: &[FetchReport]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Pages"),
        header_cell("Records"),
        header_cell("Stopped"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for report in reports {
        table.add_row(vec![
            Cell::new(report.dataset.as_str()).fg(Color::Cyan),
            Cell::new(report.pages.len()),
            Cell::new(report.records),
            stop_cell(&report.stop),
        ]);
    }
    println!("{table}");
}

fn print_build(built: &BuildOutput) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for output in &built.tables {
        table.add_row(vec![
            Cell::new(&output.name).fg(Color::Cyan),
            Cell::new(output.height()),
            Cell::new(output.columns.len()),
        ]);
    }
    println!("{table}");
    println!(
        "Race labels: {} recoded; canonical drugs: {}; intervention names mapped: {}",
        built.race_labels.table.len(),
        built.canonical_drugs,
        built.mapped_names
    );
    if let Some(dir) = built.csv_paths.first().and_then(|path| path.parent()) {
        println!("CSV output: {}", dir.display());
    }
}

fn print_load(loaded: &LoadReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let mut total = 0usize;
    for (name, rows) in &loaded.tables {
        total += rows;
        table.add_row(vec![Cell::new(name).fg(Color::Cyan), Cell::new(rows)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    if loaded.views.is_empty() {
        println!("Views: none");
    } else {
        println!("Views: {}", loaded.views.join(", "));
    }
}

fn print_labels(report: &LabelReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Label"), header_cell("Code")]);
    apply_table_style(&mut table);
    for (label, code) in report.outcome.table.iter() {
        table.add_row(vec![Cell::new(label), Cell::new(code.as_str())]);
    }
    for label in &report.outcome.unmatched {
        table.add_row(vec![
            Cell::new(label),
            Cell::new("UNMATCHED")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
        ]);
    }
    println!("{table}");
    println!("{} distinct label(s) discovered", report.labels.len());
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn stop_cell(stop: &StopReason) -> Cell {
    match stop {
        StopReason::NoContinuation | StopReason::CapReached | StopReason::EmptyPage => {
            Cell::new(stop.to_string()).fg(Color::Green)
        }
        StopReason::Status(_) | StopReason::MissingKey(_) => {
            Cell::new(stop.to_string()).fg(Color::Yellow)
        }
    }
}
