//! `fieldtrack store` command - Store management

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{
    format_date, format_short_id, open_repository, resolve_format, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::clock::{Clock, SystemClock};
use crate::core::csvio::escape_field;
use crate::core::shortid::ShortIdIndex;
use crate::core::Config;
use crate::entities::store::{Store, StoreCategory};

#[derive(Subcommand, Debug)]
pub enum StoreCommands {
    /// List stores with filtering
    List(ListArgs),

    /// Register a new store
    New(NewArgs),

    /// Show a store's details and visit history
    Show(ShowArgs),

    /// Edit a store's file in your editor
    Edit(EditArgs),

    /// Delete a store
    Rm(RmArgs),
}

/// Category filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryFilter {
    Vet,
    PetStore,
    Grooming,
    Breeding,
    Other,
    All,
}

impl CategoryFilter {
    fn matches(&self, category: StoreCategory) -> bool {
        match self {
            CategoryFilter::Vet => category == StoreCategory::Vet,
            CategoryFilter::PetStore => category == StoreCategory::PetStore,
            CategoryFilter::Grooming => category == StoreCategory::Grooming,
            CategoryFilter::Breeding => category == StoreCategory::Breeding,
            CategoryFilter::Other => category == StoreCategory::Other,
            CategoryFilter::All => true,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by category
    #[arg(long, short = 'c', default_value = "all")]
    pub category: CategoryFilter,

    /// Filter by state (exact, case-insensitive)
    #[arg(long)]
    pub state: Option<String>,

    /// Filter by assigned salesperson (substring match)
    #[arg(long)]
    pub salesperson: Option<String>,

    /// Search in name, city, and person-in-charge info
    #[arg(long)]
    pub search: Option<String>,

    /// Show only stores still displaying the "New" badge
    #[arg(long)]
    pub new_only: bool,

    /// Show only ex-customers
    #[arg(long)]
    pub ex_customers: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Store name (required unless interactive)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Store category
    #[arg(long, short = 'c')]
    pub category: Option<StoreCategory>,

    /// State
    #[arg(long)]
    pub state: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,

    /// Street address
    #[arg(long)]
    pub address: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Person-in-charge details
    #[arg(long)]
    pub pic: Option<String>,

    /// Assigned salesperson
    #[arg(long)]
    pub salesperson: Option<String>,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Store ID, short ID (@N), or name fragment
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Store ID, short ID (@N), or name fragment
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Store ID, short ID (@N), or name fragment
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

pub fn run(cmd: StoreCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StoreCommands::List(args) => run_list(args, global),
        StoreCommands::New(args) => run_new(args, global),
        StoreCommands::Show(args) => run_show(args, global),
        StoreCommands::Edit(args) => run_edit(args, global),
        StoreCommands::Rm(args) => run_rm(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let clock = SystemClock;

    let mut stores: Vec<&Store> = repo
        .stores()
        .iter()
        .filter(|s| args.category.matches(s.category))
        .filter(|s| {
            args.state
                .as_ref()
                .map_or(true, |state| s.state.eq_ignore_ascii_case(state))
        })
        .filter(|s| {
            args.salesperson.as_ref().map_or(true, |sp| {
                s.salesperson.to_lowercase().contains(&sp.to_lowercase())
            })
        })
        .filter(|s| {
            args.search.as_ref().map_or(true, |search| {
                let needle = search.to_lowercase();
                s.name.to_lowercase().contains(&needle)
                    || s.city.to_lowercase().contains(&needle)
                    || s.pic_info.to_lowercase().contains(&needle)
            })
        })
        .filter(|s| !args.new_only || s.displays_as_new(&clock))
        .filter(|s| !args.ex_customers || s.is_ex_customer)
        .collect();

    if let Some(limit) = args.limit {
        stores.truncate(limit);
    }

    if args.count {
        println!("{}", stores.len());
        return Ok(());
    }

    if stores.is_empty() {
        println!("No stores found.");
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(repo.workspace());
    short_ids.ensure_all(stores.iter().map(|s| s.id.to_string()));
    let _ = short_ids.save(repo.workspace());

    let format = resolve_format(global, &Config::load());

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&stores).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&stores).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("short_id,id,name,category,state,city,salesperson,new");
            for store in &stores {
                let short_id = short_ids
                    .get_short_id(&store.id.to_string())
                    .map(|n| n.to_string())
                    .unwrap_or_default();
                println!(
                    "{},{},{},{},{},{},{},{}",
                    short_id,
                    store.id,
                    escape_field(&store.name),
                    store.category,
                    escape_field(&store.state),
                    escape_field(&store.city),
                    escape_field(&store.salesperson),
                    store.displays_as_new(&clock)
                );
            }
        }
        OutputFormat::Id => {
            for store in &stores {
                println!("{}", store.id);
            }
        }
        OutputFormat::Md => {
            println!("| Short | Name | Category | State | Salesperson |");
            println!("|---|---|---|---|---|");
            for store in &stores {
                println!(
                    "| {} | {} | {} | {} | {} |",
                    short_ids.display(&store.id),
                    store.name,
                    store.category,
                    store.state,
                    store.salesperson
                );
            }
        }
        _ => {
            println!(
                "{:<8} {:<17} {:<28} {:<10} {:<12} {:<16} {}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NAME").bold(),
                style("CATEGORY").bold(),
                style("STATE").bold(),
                style("SALESPERSON").bold(),
                style("NEW").bold()
            );
            println!("{}", "-".repeat(100));
            for store in &stores {
                let badge = if store.displays_as_new(&clock) {
                    style("new").green().to_string()
                } else {
                    String::new()
                };
                println!(
                    "{:<8} {:<17} {:<28} {:<10} {:<12} {:<16} {}",
                    style(short_ids.display(&store.id)).cyan(),
                    format_short_id(&store.id),
                    truncate_str(&store.name, 26),
                    store.category,
                    truncate_str(&store.state, 10),
                    truncate_str(&store.salesperson, 14),
                    badge
                );
            }
            println!();
            println!(
                "{} store(s) found. Use {} to reference by short ID.",
                style(stores.len()).cyan(),
                style("@N").cyan()
            );
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let clock = SystemClock;

    let (name, category) = if args.interactive {
        let theme = ColorfulTheme::default();
        let name: String = Input::with_theme(&theme)
            .with_prompt("Store name")
            .interact_text()
            .into_diagnostic()?;
        let categories = [
            StoreCategory::PetStore,
            StoreCategory::Vet,
            StoreCategory::Grooming,
            StoreCategory::Breeding,
            StoreCategory::Other,
        ];
        let labels: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt("Category")
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;
        (name, categories[choice])
    } else {
        let name = args
            .name
            .clone()
            .ok_or_else(|| miette::miette!("Store name required. Use --name or --interactive."))?;
        (name, args.category.unwrap_or_default())
    };

    let mut store = Store::new(&name, category, clock.now());
    if let Some(state) = args.state {
        store.state = state;
    }
    if let Some(city) = args.city {
        store.city = city;
    }
    if let Some(address) = args.address {
        store.address = address;
    }
    if let Some(phone) = args.phone {
        store.phone = phone;
    }
    if let Some(email) = args.email {
        store.email = email;
    }
    if let Some(pic) = args.pic {
        store.pic_info = pic;
    }
    if let Some(salesperson) = args.salesperson {
        store.salesperson = salesperson;
    }

    let id = store.id.clone();
    let path = repo.workspace().entity_path(&id);
    repo.add_store(store).map_err(|e| miette::miette!("{}", e))?;

    let mut short_ids = ShortIdIndex::load(repo.workspace());
    let short_id = short_ids.add(id.to_string());
    let _ = short_ids.save(repo.workspace());

    println!(
        "{} Registered store {}",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan()
    );
    println!("   {}", style(path.display()).dim());
    println!("   Name: {}", style(&name).yellow());
    println!("   Category: {}", category);

    Ok(())
}

fn resolve_store<'a>(
    repo: &'a crate::core::Repository,
    reference: &str,
) -> Result<&'a Store> {
    let short_ids = ShortIdIndex::load(repo.workspace());
    let resolved = short_ids
        .resolve(reference)
        .unwrap_or_else(|| reference.to_string());
    repo.find_store(&resolved)
        .ok_or_else(|| miette::miette!("No store found matching '{}'", reference))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let clock = SystemClock;
    let store = resolve_store(&repo, &args.id)?;

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(store).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(store).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            println!("{}", store.id);
        }
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("ID").bold(),
                style(store.id.to_string()).cyan()
            );
            print!("{}: {}", style("Name").bold(), style(&store.name).yellow());
            if store.displays_as_new(&clock) {
                print!(" {}", style("[new]").green());
            }
            if store.is_ex_customer {
                print!(" {}", style("[ex-customer]").red());
            }
            println!();
            println!("{}: {}", style("Category").bold(), store.category);
            println!("{}", style("─".repeat(60)).dim());

            if !store.address.is_empty() || !store.city.is_empty() || !store.state.is_empty() {
                println!();
                println!("{}:", style("Location").bold());
                if !store.address.is_empty() {
                    println!("  {}", store.address);
                }
                let mut locality = Vec::new();
                for part in [&store.city, &store.state, &store.zip_code] {
                    if !part.is_empty() {
                        locality.push(part.clone());
                    }
                }
                if !locality.is_empty() {
                    println!("  {}", locality.join(", "));
                }
            }

            if !store.phone.is_empty() || !store.email.is_empty() || !store.pic_info.is_empty() {
                println!();
                println!("{}:", style("Contact").bold());
                if !store.pic_info.is_empty() {
                    println!("  PIC: {}", store.pic_info);
                }
                if !store.phone.is_empty() {
                    println!("  Phone: {}", store.phone);
                }
                if !store.email.is_empty() {
                    println!("  Email: {}", store.email);
                }
            }

            if !store.salesperson.is_empty() {
                println!();
                println!("{}: {}", style("Salesperson").bold(), store.salesperson);
            }
            if let Some(species) = store.species {
                println!("{}: {}", style("Species mix").bold(), species);
            }
            if let Some(terms) = store.payment_terms {
                println!("{}: {}", style("Payment terms").bold(), terms);
            }

            let visits = repo.visits_for_store(&store.id);
            if !visits.is_empty() {
                println!();
                println!("{} ({}):", style("Visits").bold(), visits.len());
                for visit in &visits {
                    let statuses: Vec<String> =
                        visit.visit_status.iter().map(|s| s.to_string()).collect();
                    println!(
                        "  • {} {} [{}]",
                        format_date(&visit.date),
                        visit.visit_type,
                        statuses.join(", ")
                    );
                }
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Registered").dim(),
                store.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let config = Config::load();
    let store = resolve_store(&repo, &args.id)?;
    let path = repo.workspace().entity_path(&store.id);

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(config.editor()).yellow()
    );
    config.run_editor(&path).into_diagnostic()?;
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let (id, name) = {
        let store = resolve_store(&repo, &args.id)?;
        (store.id.clone(), store.name.clone())
    };

    if !args.force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete store '{}'?", name))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    repo.delete_store(&id).map_err(|e| miette::miette!("{}", e))?;
    println!(
        "{} Deleted store {}",
        style("✓").green(),
        style(&name).yellow()
    );
    Ok(())
}
