//! `fieldtrack report` command - Activity and coverage reports

mod summary;
mod universe;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::GlobalOpts;

pub use summary::SummaryArgs;
pub use universe::UniverseArgs;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Weekly or monthly activity summary
    Summary(SummaryArgs),

    /// Store universe coverage by category and state
    Universe(UniverseArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Summary(args) => summary::run(args, global),
        ReportCommands::Universe(args) => universe::run(args, global),
    }
}

pub(crate) fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
