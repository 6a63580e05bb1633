//! `fieldtrack visit` command - Visit log management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{clock_at, format_date, open_repository, resolve_format, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::csvio::escape_field;
use crate::core::session::Session;
use crate::core::shortid::ShortIdIndex;
use crate::entities::visit::{PotentialLevel, VisitLog, VisitStatus, VisitType};

#[derive(Subcommand, Debug)]
pub enum VisitCommands {
    /// List visit logs
    List(ListArgs),

    /// Log a new visit
    New(NewArgs),

    /// Show a visit's details
    Show(ShowArgs),

    /// Delete a visit log
    Rm(RmArgs),

    /// Show the status choices available for a store
    Statuses(StatusesArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only visits for this store (ID, @N, or name fragment)
    #[arg(long, short = 's')]
    pub store: Option<String>,

    /// Only visits on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Only visits carrying this status
    #[arg(long)]
    pub status: Option<VisitStatus>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Store to log against (ID, @N, or name fragment)
    #[arg(long, short = 's')]
    pub store: String,

    /// Visit date (YYYY-MM-DD, default: today)
    #[arg(long, short = 'd')]
    pub date: Option<NaiveDate>,

    /// Visit type
    #[arg(long, short = 't', default_value = "first_visit")]
    pub visit_type: VisitType,

    /// Status flags (repeatable)
    #[arg(long)]
    pub status: Vec<VisitStatus>,

    /// Sales potential estimate
    #[arg(long, default_value = "medium")]
    pub potential: PotentialLevel,

    /// Products promoted (repeatable)
    #[arg(long, short = 'p')]
    pub product: Vec<String>,

    /// Visit notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Agreed next steps
    #[arg(long)]
    pub next_steps: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Visit ID or short ID (@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Visit ID or short ID (@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct StatusesArgs {
    /// Store (ID, @N, or name fragment)
    pub store: String,
}

pub fn run(cmd: VisitCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        VisitCommands::List(args) => run_list(args, global),
        VisitCommands::New(args) => run_new(args, global),
        VisitCommands::Show(args) => run_show(args, global),
        VisitCommands::Rm(args) => run_rm(args, global),
        VisitCommands::Statuses(args) => run_statuses(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;

    let store_filter = match &args.store {
        Some(reference) => {
            let short_ids = ShortIdIndex::load(repo.workspace());
            let resolved = short_ids
                .resolve(reference)
                .unwrap_or_else(|| reference.clone());
            let store = repo
                .find_store(&resolved)
                .ok_or_else(|| miette::miette!("No store found matching '{}'", reference))?;
            Some(store.id.clone())
        }
        None => None,
    };

    let mut visits: Vec<&VisitLog> = repo
        .visits()
        .iter()
        .filter(|v| {
            store_filter
                .as_ref()
                .map_or(true, |id| v.store_id.as_ref() == Some(id))
        })
        .filter(|v| args.since.map_or(true, |since| v.date.date_naive() >= since))
        .filter(|v| {
            args.status
                .map_or(true, |status| v.visit_status.contains(&status))
        })
        .collect();

    if let Some(limit) = args.limit {
        visits.truncate(limit);
    }

    if args.count {
        println!("{}", visits.len());
        return Ok(());
    }

    if visits.is_empty() {
        println!("No visits found.");
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(repo.workspace());
    short_ids.ensure_all(visits.iter().map(|v| v.id.to_string()));
    let _ = short_ids.save(repo.workspace());

    let format = resolve_format(global, &Config::load());

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&visits).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&visits).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("short_id,id,date,store,type,statuses,potential");
            for visit in &visits {
                let statuses: Vec<String> =
                    visit.visit_status.iter().map(|s| s.to_string()).collect();
                println!(
                    "{},{},{},{},{},{},{}",
                    short_ids
                        .get_short_id(&visit.id.to_string())
                        .map(|n| n.to_string())
                        .unwrap_or_default(),
                    visit.id,
                    format_date(&visit.date),
                    escape_field(&repo.visit_store_label(visit)),
                    visit.visit_type,
                    escape_field(&statuses.join(";")),
                    visit.potential_level
                );
            }
        }
        OutputFormat::Id => {
            for visit in &visits {
                println!("{}", visit.id);
            }
        }
        _ => {
            println!(
                "{:<8} {:<12} {:<28} {:<12} {:<28} {}",
                style("SHORT").bold().dim(),
                style("DATE").bold(),
                style("STORE").bold(),
                style("TYPE").bold(),
                style("STATUSES").bold(),
                style("POTENTIAL").bold()
            );
            println!("{}", "-".repeat(100));
            for visit in &visits {
                let statuses: Vec<String> =
                    visit.visit_status.iter().map(|s| s.to_string()).collect();
                println!(
                    "{:<8} {:<12} {:<28} {:<12} {:<28} {}",
                    style(short_ids.display(&visit.id)).cyan(),
                    format_date(&visit.date),
                    truncate_str(&repo.visit_store_label(visit), 26),
                    visit.visit_type,
                    truncate_str(&statuses.join(","), 26),
                    visit.potential_level
                );
            }
            println!();
            println!("{} visit(s) found.", style(visits.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let clock = clock_at(args.date);

    let (store_id, store_name) = {
        let short_ids = ShortIdIndex::load(repo.workspace());
        let resolved = short_ids
            .resolve(&args.store)
            .unwrap_or_else(|| args.store.clone());
        let store = repo
            .find_store(&resolved)
            .ok_or_else(|| miette::miette!("No store found matching '{}'", args.store))?;

        // The one-time opened-account rule: reject statuses the store no
        // longer qualifies for.
        let allowed = repo.available_statuses(store);
        for status in &args.status {
            if !allowed.contains(status) {
                return Err(miette::miette!(
                    "Status '{}' is not available for '{}'. Run 'fieldtrack visit statuses {}' to see the choices.",
                    status,
                    store.name,
                    args.store
                ));
            }
        }
        (store.id.clone(), store.name.clone())
    };

    let mut visit = VisitLog::new(&store_name, clock.now());
    visit.store_id = Some(store_id.clone());
    visit.visit_type = args.visit_type;
    visit.visit_status = if args.status.is_empty() {
        vec![VisitStatus::Completed]
    } else {
        args.status.clone()
    };
    visit.potential_level = args.potential;
    visit.products_promoted = args.product.clone();
    visit.notes = args.notes.unwrap_or_default();
    visit.next_steps = args.next_steps.unwrap_or_default();
    if visit.opened_account() {
        visit.account_opened_date = Some(visit.date);
    }

    match Session::load(repo.workspace()) {
        Some(session) => {
            visit.user_id = Some(session.user_id);
            visit.user_name = session.name;
        }
        // Not logged in: stamp the configured author so the visit still
        // records who logged it
        None => visit.user_name = Config::load().author(),
    }

    let opened = visit.opened_account();
    let id = visit.id.clone();
    repo.add_visit(visit).map_err(|e| miette::miette!("{}", e))?;

    // Opening an account retires any ex-customer mark on the store
    if opened {
        if let Some(store) = repo.store_by_id(&store_id).cloned() {
            if store.is_ex_customer {
                let mut store = store;
                store.is_ex_customer = false;
                repo.update_store(store).map_err(|e| miette::miette!("{}", e))?;
            }
        }
    }

    let mut short_ids = ShortIdIndex::load(repo.workspace());
    let short_id = short_ids.add(id.to_string());
    let _ = short_ids.save(repo.workspace());

    println!(
        "{} Logged visit {} to {}",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan(),
        style(&store_name).yellow()
    );
    if opened {
        println!("{} Account opened for this store", style("✓").green());
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let short_ids = ShortIdIndex::load(repo.workspace());
    let resolved = short_ids
        .resolve(&args.id)
        .unwrap_or_else(|| args.id.clone());

    let visit = repo
        .visits()
        .iter()
        .find(|v| v.id.to_string().starts_with(&resolved.to_uppercase()))
        .ok_or_else(|| miette::miette!("No visit found matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(visit).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(visit).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            println!("{}", visit.id);
        }
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("ID").bold(),
                style(visit.id.to_string()).cyan()
            );
            println!(
                "{}: {}",
                style("Store").bold(),
                style(repo.visit_store_label(visit)).yellow()
            );
            println!("{}: {}", style("Date").bold(), format_date(&visit.date));
            println!("{}: {}", style("Type").bold(), visit.visit_type);
            let statuses: Vec<String> =
                visit.visit_status.iter().map(|s| s.to_string()).collect();
            println!("{}: {}", style("Statuses").bold(), statuses.join(", "));
            println!(
                "{}: {}",
                style("Potential").bold(),
                visit.potential_level
            );
            println!("{}", style("─".repeat(60)).dim());

            if !visit.products_promoted.is_empty() {
                println!();
                println!(
                    "{}: {}",
                    style("Products promoted").bold(),
                    visit.products_promoted.join(", ")
                );
            }
            if let Some(date) = visit.account_opened_date {
                println!();
                println!(
                    "{}: {}",
                    style("Account opened").bold(),
                    format_date(&date)
                );
            }
            if !visit.notes.is_empty() {
                println!();
                println!("{}:", style("Notes").bold());
                println!("{}", visit.notes);
            }
            if !visit.next_steps.is_empty() {
                println!();
                println!("{}:", style("Next steps").bold());
                println!("{}", visit.next_steps);
            }
            if !visit.user_name.is_empty() {
                println!();
                println!("{}: {}", style("Logged by").dim(), visit.user_name);
            }
        }
    }

    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let short_ids = ShortIdIndex::load(repo.workspace());
    let resolved = short_ids
        .resolve(&args.id)
        .unwrap_or_else(|| args.id.clone());

    let (id, label) = {
        let visit = repo
            .visits()
            .iter()
            .find(|v| v.id.to_string().starts_with(&resolved.to_uppercase()))
            .ok_or_else(|| miette::miette!("No visit found matching '{}'", args.id))?;
        (
            visit.id.clone(),
            format!("{} ({})", repo.visit_store_label(visit), format_date(&visit.date)),
        )
    };

    if !args.force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete visit {}?", label))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    repo.delete_visit(&id).map_err(|e| miette::miette!("{}", e))?;
    println!("{} Deleted visit {}", style("✓").green(), style(label).yellow());
    Ok(())
}

fn run_statuses(args: StatusesArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let short_ids = ShortIdIndex::load(repo.workspace());
    let resolved = short_ids
        .resolve(&args.store)
        .unwrap_or_else(|| args.store.clone());
    let store = repo
        .find_store(&resolved)
        .ok_or_else(|| miette::miette!("No store found matching '{}'", args.store))?;

    println!(
        "Status choices for {}:",
        style(&store.name).yellow()
    );
    for status in repo.available_statuses(store) {
        println!("  • {}", status);
    }
    Ok(())
}
