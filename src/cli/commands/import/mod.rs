//! `fieldtrack import` command - Import stores and visits from CSV files

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{clock_at, open_repository};
use crate::cli::GlobalOpts;
use crate::core::csvio::RowSet;
use crate::core::reconcile::{ImportKind, Reconciler, RowAction};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Import kind (stores, store-visits, store-updates, vet-updates)
    pub kind: Option<ImportKind>,

    /// CSV file to import
    pub file: Option<PathBuf>,

    /// Print a CSV header template for the import kind
    #[arg(long)]
    pub template: bool,

    /// Report what would happen without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Reference date for row defaults (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub at: Option<chrono::NaiveDate>,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let kind = args.kind.ok_or_else(|| {
        miette::miette!(
            "Import kind required. Supported: stores, store-visits, store-updates, vet-updates"
        )
    })?;

    if args.template {
        print!("{}", kind.template());
        return Ok(());
    }

    let file_path = args.file.clone().ok_or_else(|| {
        miette::miette!("CSV file required. Usage: fieldtrack import stores data.csv")
    })?;
    if !file_path.exists() {
        return Err(miette::miette!("File not found: {}", file_path.display()));
    }

    let mut repo = open_repository(global)?;
    let clock = clock_at(args.at);

    let rows = RowSet::from_path(&file_path).into_diagnostic()?;
    if rows.is_empty() {
        println!("{} No data rows in {}", style("!").yellow(), file_path.display());
        return Ok(());
    }

    if !global.quiet {
        println!(
            "{} Importing {} rows from {}{}",
            style("→").blue(),
            style(kind.as_str()).cyan(),
            style(file_path.display()).yellow(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
        println!();
    }

    let report = Reconciler::new(&mut repo, clock.as_ref())
        .dry_run(args.dry_run)
        .run(kind, &rows)
        .map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        for outcome in &report.outcomes {
            let (glyph, verb) = match outcome.action {
                RowAction::StoreAdded => (style("✓").green(), "added store"),
                RowAction::StoreUpdated => (style("✓").yellow(), "updated store"),
                RowAction::VisitCreated => (style("✓").green(), "logged visit"),
                RowAction::Skipped => (style("✗").red(), "skipped"),
            };
            print!("  {} row {}: {} {}", glyph, outcome.row, verb, outcome.label);
            if let Some(detail) = &outcome.detail {
                print!(" ({})", style(detail).dim());
            }
            println!();
        }
    }

    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Import Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Rows processed: {}", style(report.rows_processed).cyan());
    println!("  Stores added:   {}", style(report.stores_added).green());
    if report.stores_updated > 0 {
        println!("  Stores updated: {}", style(report.stores_updated).yellow());
    }
    if report.visits_created > 0 {
        println!("  Visits logged:  {}", style(report.visits_created).green());
    }
    if report.skipped > 0 {
        println!("  Skipped:        {}", style(report.skipped).dim());
    }

    if args.dry_run {
        println!();
        println!(
            "{}",
            style("Dry run complete. No files were written.").yellow()
        );
    }

    Ok(())
}
