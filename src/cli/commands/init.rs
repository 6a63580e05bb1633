//! `fieldtrack init` command - Initialize a new workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::repository::Repository;
use crate::core::workspace::{Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .fieldtrack/ already exists
    #[arg(long)]
    pub force: bool,

    /// Skip seeding the default product catalog and salesperson roster
    #[arg(long)]
    pub no_seed: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let workspace = if args.force {
        Workspace::init_force(&path)
    } else {
        Workspace::init(&path)
    };

    match workspace {
        Ok(workspace) => {
            if !args.no_seed {
                let mut repo =
                    Repository::open(workspace).map_err(|e| miette::miette!("{}", e))?;
                repo.seed_registries().map_err(|e| miette::miette!("{}", e))?;
                println!(
                    "{} Seeded product catalog and salesperson roster",
                    style("✓").green()
                );
                println!(
                    "{} Initialized fieldtrack workspace at {}",
                    style("✓").green(),
                    style(repo.workspace().root().display()).cyan()
                );
            } else {
                println!(
                    "{} Initialized fieldtrack workspace at {}",
                    style("✓").green(),
                    style(workspace.root().display()).cyan()
                );
            }
            println!();
            println!("Created workspace structure:");
            for dir in [
                ".fieldtrack/",
                ".fieldtrack/config.yaml",
                "stores/",
                "visits/",
                "team/",
                "lists/",
            ] {
                println!("  {}", style(dir).dim());
            }
            println!();
            println!("Next steps:");
            println!(
                "  {} Register your first store",
                style("fieldtrack store new").yellow()
            );
            println!(
                "  {} Import stores from CSV",
                style("fieldtrack import stores data.csv").yellow()
            );
            println!(
                "  {} See weekly activity",
                style("fieldtrack report summary").yellow()
            );
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} fieldtrack workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("fieldtrack init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
