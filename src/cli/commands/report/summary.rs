//! Activity summary report

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{clock_at, open_repository};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::summary::{monthly_summary, weekly_summary, MonthlySummary, WeeklySummary};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Period {
    Week,
    Month,
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Reporting period
    #[arg(long, short = 'p', default_value = "week")]
    pub period: Period,

    /// Reference date (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub at: Option<chrono::NaiveDate>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let clock = clock_at(args.at);

    let output = match args.period {
        Period::Week => {
            let summary = weekly_summary(&repo, clock.as_ref());
            if global.format == OutputFormat::Json {
                let mut json = serde_json::to_string_pretty(&summary).into_diagnostic()?;
                json.push('\n');
                json
            } else {
                render_weekly(&summary)
            }
        }
        Period::Month => {
            let summary = monthly_summary(&repo, clock.as_ref());
            if global.format == OutputFormat::Json {
                let mut json = serde_json::to_string_pretty(&summary).into_diagnostic()?;
                json.push('\n');
                json
            } else {
                render_monthly(&summary)
            }
        }
    };

    super::write_output(&output, args.output)
}

fn render_weekly(summary: &WeeklySummary) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "# Weekly Summary ({} to {})\n\n",
        summary.week_start, summary.week_end
    ));

    let mut metrics = Builder::default();
    metrics.push_record(["Metric", "Value"]);
    metrics.push_record(["Total Visits", &summary.total_visits.to_string()]);
    metrics.push_record(["Completed", &summary.completed_visits.to_string()]);
    metrics.push_record(["Pending", &summary.pending_visits.to_string()]);
    metrics.push_record(["Stores Visited", &summary.stores_visited.to_string()]);
    metrics.push_record(["New Stores", &summary.new_stores.to_string()]);
    metrics.push_record(["Accounts Opened", &summary.accounts_opened.to_string()]);
    metrics.push_record([
        "Conversion Rate",
        &format!("{:.0}%", summary.conversion_rate * 100.0),
    ]);
    output.push_str(&metrics.build().with(Style::markdown()).to_string());
    output.push('\n');

    if !summary.visits_by_salesperson.is_empty() {
        output.push_str("\n## Visits by Salesperson\n\n");
        let mut table = Builder::default();
        table.push_record(["Salesperson", "Visits"]);
        for group in &summary.visits_by_salesperson {
            table.push_record([group.name.clone(), group.visits.to_string()]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    if !summary.top_performers.is_empty() {
        output.push_str("\n## Top Performers\n\n");
        let mut table = Builder::default();
        table.push_record(["Logged By", "Visits"]);
        for group in &summary.top_performers {
            table.push_record([group.name.clone(), group.visits.to_string()]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    output
}

fn render_monthly(summary: &MonthlySummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("# Monthly Summary ({})\n\n", summary.month));

    let mut metrics = Builder::default();
    metrics.push_record(["Metric", "Value"]);
    metrics.push_record(["Total Visits", &summary.total_visits.to_string()]);
    metrics.push_record(["Stores Visited", &summary.stores_visited.to_string()]);
    metrics.push_record(["Revisited Stores", &summary.revisited_stores.to_string()]);
    metrics.push_record(["New Stores", &summary.new_stores.len().to_string()]);
    metrics.push_record(["Accounts Opened", &summary.accounts_opened.to_string()]);
    metrics.push_record([
        "Conversion Rate",
        &format!("{:.0}%", summary.conversion_rate * 100.0),
    ]);
    output.push_str(&metrics.build().with(Style::markdown()).to_string());
    output.push('\n');

    if !summary.new_stores.is_empty() {
        output.push_str("\n## New Stores\n\n");
        let mut table = Builder::default();
        table.push_record(["Store", "Category", "State"]);
        for store in &summary.new_stores {
            table.push_record([
                store.name.clone(),
                store.category.to_string(),
                store.state.clone(),
            ]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    if !summary.top_products.is_empty() {
        output.push_str("\n## Top Products\n\n");
        let mut table = Builder::default();
        table.push_record(["Product", "Promotions"]);
        for product in &summary.top_products {
            table.push_record([product.name.clone(), product.promotions.to_string()]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    if !summary.visits_by_salesperson.is_empty() {
        output.push_str("\n## Visits by Salesperson\n\n");
        let mut table = Builder::default();
        table.push_record(["Salesperson", "Visits"]);
        for group in &summary.visits_by_salesperson {
            table.push_record([group.name.clone(), group.visits.to_string()]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    output
}
