//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use scout_highlight::Highlighter;
pub use scout_highlight::{dim, header, subheader, success, warning};
use scout_results::{EntityType, ResultRecord};
use scout_search::{BarrierReport, CycleOutcome, NotFoundCause, SearchState};
use serde::Serialize;

/// JSON output for `scout search --json`.
#[derive(Serialize)]
struct JsonSearchOutput<'a> {
    /// Final search state, with each result list cut to the limit.
    state: &'a SearchState,
    /// How the cycle's requests settled, when the cycle reached aggregation.
    report: Option<&'a BarrierReport>,
}

/// Prints the outcome of a search and returns the exit code.
///
/// Not-found is a successful search. Only a failed interpretation is a failure.
pub fn output_search(
    state: &SearchState,
    outcome: &CycleOutcome,
    limit: usize,
    json: bool,
) -> ExitCode {
    let shown = truncated(state, limit);
    let report = match outcome {
        CycleOutcome::Completed { report, .. } => Some(report),
        _ => None,
    };

    if json {
        let output = JsonSearchOutput {
            state: &shown,
            report,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json_str) => println!("{json_str}"),
            Err(e) => {
                eprintln!("error: failed to serialize JSON: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_text(state, &shown, report);
    }

    if let CycleOutcome::Failed { error, .. } = outcome {
        eprintln!("error: search failed: {error}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Copy of `state` keeping at most `limit` records per entity type.
fn truncated(state: &SearchState, limit: usize) -> SearchState {
    let mut shown = state.clone();
    for entity in EntityType::ALL {
        shown.results.get_mut(entity).truncate(limit);
    }
    shown
}

/// Renders the counts table followed by the records of the selected type.
fn print_text(full: &SearchState, shown: &SearchState, report: Option<&BarrierReport>) {
    if full.error.is_some() {
        return;
    }
    if full.not_found == Some(NotFoundCause::Interpretation) {
        println!("{}", dim("No match: the query could not be interpreted."));
        return;
    }

    println!("{}", header(&format!("Results for \"{}\"", full.query)));
    println!("{}", counts_table(full, shown));

    if let Some(report) = report.filter(|r| r.vacuous() > 0) {
        println!(
            "{}",
            warning(&format!(
                "{} of {} requests contributed nothing (see -v for details)",
                report.vacuous(),
                report.dispatched
            ))
        );
    }
    println!();

    if full.not_found == Some(NotFoundCause::EmptyResults) {
        println!("{}", dim("No scenes found."));
        if full.return_type == EntityType::Scene {
            return;
        }
        println!();
    }

    let records = shown.displayed();
    println!("{}", subheader(&format!("{}s:", full.return_type)));
    if records.is_empty() {
        println!("   {}", dim("(none)"));
        return;
    }
    let highlighter = Highlighter::new();
    for record in records {
        println!("{}", format_record(record, &highlighter));
    }
}

/// Per-entity result counts, marking the displayed type.
fn counts_table(full: &SearchState, shown: &SearchState) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Type", "Results", "Shown"]);

    let total = full.counts();
    let displayed = shown.counts();
    for entity in EntityType::ALL {
        let name = if entity == full.return_type {
            format!("{entity} *")
        } else {
            entity.to_string()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(total.get(entity).to_string()),
            Cell::new(displayed.get(entity).to_string()),
        ]);
    }
    table
}

/// One record as `score  {json}`.
fn format_record(record: &ResultRecord, highlighter: &Highlighter) -> String {
    let json = serde_json::to_string(record.fields()).unwrap_or_default();
    let highlighted = highlighter.highlight_json(&json);
    format!(
        "   {}  {}",
        dim(&format!("{:.3}", record.score_or_zero())),
        highlighted.trim_end()
    )
}
