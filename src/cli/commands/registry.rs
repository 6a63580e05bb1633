//! `fieldtrack product` and `fieldtrack salesperson` commands
//!
//! Both registries are flat name lists persisted under lists/. The two
//! command trees share the same small set of operations.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::open_repository;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::registry::Registry;

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List the product catalog
    List,

    /// Add a product
    Add(EntryArgs),

    /// Remove a product
    Rm(EntryArgs),
}

#[derive(Subcommand, Debug)]
pub enum SalespersonCommands {
    /// List the salesperson roster
    List,

    /// Add a salesperson
    Add(EntryArgs),

    /// Remove a salesperson
    Rm(EntryArgs),
}

#[derive(clap::Args, Debug)]
pub struct EntryArgs {
    /// Entry name
    pub name: String,
}

pub fn run_product(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::List => {
            let repo = open_repository(global)?;
            print_registry(repo.products(), "product", global)
        }
        ProductCommands::Add(args) => {
            let mut repo = open_repository(global)?;
            let added = repo
                .add_product(&args.name)
                .map_err(|e| miette::miette!("{}", e))?;
            print_change(added, "product", &args.name, true);
            Ok(())
        }
        ProductCommands::Rm(args) => {
            let mut repo = open_repository(global)?;
            let removed = repo
                .remove_product(&args.name)
                .map_err(|e| miette::miette!("{}", e))?;
            print_change(removed, "product", &args.name, false);
            Ok(())
        }
    }
}

pub fn run_salesperson(cmd: SalespersonCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SalespersonCommands::List => {
            let repo = open_repository(global)?;
            print_registry(repo.salespersons(), "salesperson", global)
        }
        SalespersonCommands::Add(args) => {
            let mut repo = open_repository(global)?;
            let added = repo
                .add_salesperson(&args.name)
                .map_err(|e| miette::miette!("{}", e))?;
            print_change(added, "salesperson", &args.name, true);
            Ok(())
        }
        SalespersonCommands::Rm(args) => {
            let mut repo = open_repository(global)?;
            let removed = repo
                .remove_salesperson(&args.name)
                .map_err(|e| miette::miette!("{}", e))?;
            print_change(removed, "salesperson", &args.name, false);
            Ok(())
        }
    }
}

fn print_registry(registry: &Registry, label: &str, global: &GlobalOpts) -> Result<()> {
    if registry.is_empty() {
        println!("No {} entries found.", label);
        return Ok(());
    }
    match global.format {
        OutputFormat::Json => {
            let entries: Vec<&str> = registry.iter().collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&entries)
                    .map_err(|e| miette::miette!("{}", e))?
            );
        }
        _ => {
            for entry in registry.iter() {
                println!("{}", entry);
            }
        }
    }
    Ok(())
}

fn print_change(changed: bool, label: &str, name: &str, adding: bool) {
    match (changed, adding) {
        (true, true) => println!(
            "{} Added {} {}",
            style("✓").green(),
            label,
            style(name).yellow()
        ),
        (true, false) => println!(
            "{} Removed {} {}",
            style("✓").green(),
            label,
            style(name).yellow()
        ),
        (false, true) => println!(
            "{} {} '{}' already exists",
            style("!").yellow(),
            label,
            name
        ),
        (false, false) => println!(
            "{} No {} named '{}'",
            style("!").yellow(),
            label,
            name
        ),
    }
}
