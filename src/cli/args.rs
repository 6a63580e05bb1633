//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs,
    export::ExportArgs,
    import::ImportArgs,
    init::InitArgs,
    registry::{ProductCommands, SalespersonCommands},
    report::ReportCommands,
    store::StoreCommands,
    user::UserCommands,
    visit::VisitCommands,
};

#[derive(Parser)]
#[command(name = "fieldtrack")]
#[command(author, version, about = "Sales-force visit tracking for pet stores and vet clinics")]
#[command(
    long_about = "A Unix-style tool for tracking store registrations, visit logs, and territory coverage as plain text files under version control."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .fieldtrack/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pick a sensible format per command
    Auto,
    /// Aligned plain-text columns
    Tsv,
    Json,
    Yaml,
    Csv,
    /// IDs only, one per line
    Id,
    /// Markdown tables
    Md,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new fieldtrack workspace
    Init(InitArgs),

    /// Store management (pet stores and vet clinics)
    #[command(subcommand)]
    Store(StoreCommands),

    /// Visit log management
    #[command(subcommand)]
    Visit(VisitCommands),

    /// Team member management and login
    #[command(subcommand)]
    User(UserCommands),

    /// Product catalog management
    #[command(subcommand)]
    Product(ProductCommands),

    /// Salesperson roster management
    #[command(subcommand)]
    Salesperson(SalespersonCommands),

    /// Import stores and visits from CSV files
    Import(ImportArgs),

    /// Export workspace data to CSV files
    Export(ExportArgs),

    /// Activity summaries and universe coverage reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}
