//! `fieldtrack export` command - Export workspace data to CSV

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::open_repository;
use crate::cli::GlobalOpts;
use crate::core::csvio::{export_collection, write_csv, ToCsv};
use crate::entities::store::Store;
use crate::entities::user::User;
use crate::entities::visit::VisitLog;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportKind {
    Stores,
    Visits,
    Team,
    Products,
    Salespersons,
}

impl ExportKind {
    fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Stores => "stores",
            ExportKind::Visits => "visits",
            ExportKind::Team => "team",
            ExportKind::Products => "products",
            ExportKind::Salespersons => "salespersons",
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// What to export
    pub kind: ExportKind,

    /// Output file (default: <kind>.csv, `-` for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl ToCsv for Store {
    fn csv_headers() -> Vec<&'static str> {
        vec![
            "id",
            "name",
            "category",
            "region",
            "area",
            "state",
            "address",
            "city",
            "zipCode",
            "phone",
            "email",
            "picInfo",
            "salesperson",
            "isNew",
            "isExCustomer",
            "createdAt",
        ]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.to_string(),
            self.region.clone(),
            self.area.clone(),
            self.state.clone(),
            self.address.clone(),
            self.city.clone(),
            self.zip_code.clone(),
            self.phone.clone(),
            self.email.clone(),
            self.pic_info.clone(),
            self.salesperson.clone(),
            self.is_new.to_string(),
            self.is_ex_customer.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl ToCsv for VisitLog {
    fn csv_headers() -> Vec<&'static str> {
        vec![
            "id",
            "storeName",
            "date",
            "visitType",
            "visitStatus",
            "potentialLevel",
            "productsPromoted",
            "notes",
            "nextSteps",
            "loggedBy",
            "accountOpenedDate",
        ]
    }

    fn csv_record(&self) -> Vec<String> {
        let statuses: Vec<String> = self.visit_status.iter().map(|s| s.to_string()).collect();
        vec![
            self.id.to_string(),
            self.store_name.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.visit_type.to_string(),
            statuses.join(";"),
            self.potential_level.to_string(),
            self.products_promoted.join(";"),
            self.notes.clone(),
            self.next_steps.clone(),
            self.user_name.clone(),
            self.account_opened_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ]
    }
}

impl ToCsv for User {
    fn csv_headers() -> Vec<&'static str> {
        vec!["id", "name", "email", "role", "joinDate"]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.role.to_string(),
            self.join_date.format("%Y-%m-%d").to_string(),
        ]
    }
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;

    let content = match args.kind {
        ExportKind::Stores => export_collection(repo.stores()),
        ExportKind::Visits => export_collection(repo.visits()),
        ExportKind::Team => export_collection(repo.users()),
        ExportKind::Products => export_registry(repo.products(), "product"),
        ExportKind::Salespersons => export_registry(repo.salespersons(), "salesperson"),
    };

    let Some(content) = content else {
        println!(
            "{} Nothing to export: no {} in the workspace",
            style("!").yellow(),
            args.kind.as_str()
        );
        return Ok(());
    };

    let to_stdout = args
        .output
        .as_ref()
        .map_or(false, |p| p.as_os_str() == "-");
    if to_stdout {
        println!("{}", content);
        return Ok(());
    }

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.csv", args.kind.as_str())));
    fs::write(&path, format!("{}\n", content)).into_diagnostic()?;

    println!(
        "{} Exported {} to {}",
        style("✓").green(),
        style(args.kind.as_str()).cyan(),
        style(path.display()).yellow()
    );
    Ok(())
}

fn export_registry(registry: &crate::entities::registry::Registry, header: &str) -> Option<String> {
    if registry.is_empty() {
        return None;
    }
    let rows: Vec<Vec<String>> = registry.iter().map(|e| vec![e.to_string()]).collect();
    Some(write_csv(&[header], &rows))
}
