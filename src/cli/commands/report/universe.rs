//! Store universe coverage report

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::open_repository;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::summary::{universe_tracking, CoverageSlice};

#[derive(clap::Args, Debug)]
pub struct UniverseArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: UniverseArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let universe = universe_tracking(&repo);

    if global.format == OutputFormat::Json {
        let mut json = serde_json::to_string_pretty(&universe).into_diagnostic()?;
        json.push('\n');
        return super::write_output(&json, args.output);
    }

    let mut output = String::new();
    output.push_str("# Universe Tracking\n\n");

    let mut totals = Builder::default();
    totals.push_record(["Metric", "Value"]);
    totals.push_record(["Registered Stores", &universe.total_stores.to_string()]);
    totals.push_record(["Visited Stores", &universe.visited_stores.to_string()]);
    totals.push_record(["Coverage", &format!("{:.2}%", universe.coverage_pct)]);
    output.push_str(&totals.build().with(Style::markdown()).to_string());
    output.push('\n');

    output.push_str("\n## By Category\n\n");
    let mut table = Builder::default();
    table.push_record(["Category", "Total", "Visited", "Coverage"]);
    for row in &universe.by_category {
        table.push_record([
            row.category.to_string(),
            row.slice.total.to_string(),
            row.slice.visited.to_string(),
            format!("{:.2}%", row.slice.coverage_pct),
        ]);
    }
    output.push_str(&table.build().with(Style::markdown()).to_string());
    output.push('\n');

    if !universe.by_state.is_empty() {
        output.push_str("\n## By State\n\n");
        let mut table = Builder::default();
        table.push_record(["State", "Vet", "Pet Store"]);
        for row in &universe.by_state {
            table.push_record([
                row.state.clone(),
                slice_cell(&row.vet),
                slice_cell(&row.pet_store),
            ]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    super::write_output(&output, args.output)
}

fn slice_cell(slice: &CoverageSlice) -> String {
    format!(
        "{}/{} ({:.2}%)",
        slice.visited, slice.total, slice.coverage_pct
    )
}
