//! Import reconciliation
//!
//! Takes a parsed CSV [`RowSet`] and folds it into the repository. Three row
//! shapes are supported: store-only rows, combined store-plus-visit rows,
//! and visit-update rows keyed by store name. Reconciliation is permissive:
//! malformed optional cells degrade to defaults, and only a missing store
//! name skips a row.
//!
//! Re-importing the same file is idempotent for stores: the dedup key is the
//! case-insensitive trimmed name plus category, and matches update the
//! existing record in place, preserving its id and creation date.

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::clock::Clock;
use crate::core::csvio::{split_multi, Row, RowSet};
use crate::core::repository::{Repository, RepositoryError};
use crate::entities::store::{PaymentTerms, Species, Store, StoreCategory};
use crate::entities::visit::{PotentialLevel, VisitLog, VisitStatus, VisitType};

/// The row shape an import file carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// Store rows only, no visit information
    Stores,
    /// Store rows with an embedded initial visit
    StoreVisits,
    /// Follow-up updates for existing pet stores, keyed by name
    StoreUpdates,
    /// Follow-up updates for existing vet clinics, keyed by name
    VetUpdates,
}

impl ImportKind {
    pub fn all() -> &'static [ImportKind] {
        &[
            ImportKind::Stores,
            ImportKind::StoreVisits,
            ImportKind::StoreUpdates,
            ImportKind::VetUpdates,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Stores => "stores",
            ImportKind::StoreVisits => "store-visits",
            ImportKind::StoreUpdates => "store-updates",
            ImportKind::VetUpdates => "vet-updates",
        }
    }

    /// Header template for this kind, offered by `import --template`
    pub fn template(&self) -> &'static str {
        match self {
            ImportKind::Stores => {
                "name,category,region,area,state,address,city,zipCode,phone,email,picInfo,salesperson\n"
            }
            ImportKind::StoreVisits => {
                "name,category,region,area,state,address,city,zipCode,phone,email,picInfo,salesperson,date,visitStatus,potentialLevel,productsPromoted,latestUpdate,nextSteps\n"
            }
            ImportKind::StoreUpdates | ImportKind::VetUpdates => {
                "name,date,visitStatus,potentialLevel,productsPromoted,latestUpdate,nextSteps,salesperson\n"
            }
        }
    }

    /// Category assumed when a row does not carry one
    fn default_category(&self) -> StoreCategory {
        match self {
            ImportKind::VetUpdates => StoreCategory::Vet,
            _ => StoreCategory::PetStore,
        }
    }
}

impl std::fmt::Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stores" => Ok(ImportKind::Stores),
            "store-visits" | "visits" => Ok(ImportKind::StoreVisits),
            "store-updates" | "updates" => Ok(ImportKind::StoreUpdates),
            "vet-updates" => Ok(ImportKind::VetUpdates),
            _ => Err(format!("Unknown import kind: {}", s)),
        }
    }
}

/// What happened to one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    StoreAdded,
    StoreUpdated,
    VisitCreated,
    Skipped,
}

/// Per-row result, kept for CLI reporting
#[derive(Debug, Clone)]
pub struct RowOutcome {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub action: RowAction,
    pub label: String,
    pub detail: Option<String>,
}

/// Aggregate counts for one import run
#[derive(Debug, Default, Clone)]
pub struct ImportReport {
    pub rows_processed: usize,
    pub stores_added: usize,
    pub stores_updated: usize,
    pub visits_created: usize,
    pub skipped: usize,
    pub outcomes: Vec<RowOutcome>,
}

impl ImportReport {
    fn record(&mut self, row: usize, action: RowAction, label: String, detail: Option<String>) {
        match action {
            RowAction::StoreAdded => self.stores_added += 1,
            RowAction::StoreUpdated => self.stores_updated += 1,
            RowAction::VisitCreated => self.visits_created += 1,
            RowAction::Skipped => self.skipped += 1,
        }
        self.outcomes.push(RowOutcome {
            row,
            action,
            label,
            detail,
        });
    }
}

/// Folds import rows into the repository
pub struct Reconciler<'a> {
    repo: &'a mut Repository,
    clock: &'a dyn Clock,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(repo: &'a mut Repository, clock: &'a dyn Clock) -> Self {
        Self {
            repo,
            clock,
            dry_run: false,
        }
    }

    /// Report what would happen without writing anything
    pub fn dry_run(mut self, yes: bool) -> Self {
        self.dry_run = yes;
        self
    }

    pub fn run(&mut self, kind: ImportKind, rows: &RowSet) -> Result<ImportReport, RepositoryError> {
        let mut report = ImportReport::default();
        // Stores staged within this run, so a dry run still dedups
        // across rows of the same file.
        let mut staged: Vec<Store> = Vec::new();

        for (i, row) in rows.rows().enumerate() {
            let row_no = i + 1;
            report.rows_processed += 1;

            let Some(name) = row.get_any(&["name", "storeName", "clinicName"]) else {
                report.record(
                    row_no,
                    RowAction::Skipped,
                    String::new(),
                    Some("missing store name".to_string()),
                );
                continue;
            };

            match kind {
                ImportKind::Stores => {
                    self.reconcile_store(kind, &row, &name, &mut staged, &mut report, row_no)?;
                }
                ImportKind::StoreVisits => {
                    let store_id = self
                        .reconcile_store(kind, &row, &name, &mut staged, &mut report, row_no)?;
                    let visit =
                        self.build_visit(&row, &name, store_id, VisitType::Initial);
                    if !self.dry_run {
                        self.repo.add_visit(visit)?;
                    }
                    report.record(row_no, RowAction::VisitCreated, name.clone(), None);
                }
                ImportKind::StoreUpdates | ImportKind::VetUpdates => {
                    // Name-only lookup; a miss keeps the given name with no
                    // store link rather than failing the row.
                    let store_id = self.repo.store_by_name(&name).map(|s| s.id.clone());
                    let detail = if store_id.is_none() {
                        Some("no matching store, visit kept unlinked".to_string())
                    } else {
                        None
                    };
                    let visit = self.build_visit(&row, &name, store_id, VisitType::FollowUp);
                    if !self.dry_run {
                        self.repo.add_visit(visit)?;
                    }
                    report.record(row_no, RowAction::VisitCreated, name.clone(), detail);
                }
            }
        }

        Ok(report)
    }

    /// Upsert a store row, returning the id it resolved to
    fn reconcile_store(
        &mut self,
        kind: ImportKind,
        row: &Row<'_>,
        name: &str,
        staged: &mut Vec<Store>,
        report: &mut ImportReport,
        row_no: usize,
    ) -> Result<Option<crate::core::identity::EntityId>, RepositoryError> {
        let category = row
            .get("category")
            .map(|raw| StoreCategory::from_import(&raw))
            .unwrap_or_else(|| kind.default_category());

        let key = (name.trim().to_lowercase(), category);
        let existing = self
            .repo
            .store_by_name_and_category(name, category)
            .cloned()
            .or_else(|| staged.iter().find(|s| s.dedup_key() == key).cloned());

        match existing {
            Some(mut store) => {
                // Match: refresh fields but keep id and creation date, and
                // the store is no longer new.
                apply_store_fields(&mut store, row);
                store.is_new = false;
                let id = store.id.clone();
                if let Some(slot) = staged.iter_mut().find(|s| s.id == id) {
                    *slot = store.clone();
                }
                if !self.dry_run {
                    self.repo.update_store(store)?;
                }
                report.record(row_no, RowAction::StoreUpdated, name.to_string(), None);
                Ok(Some(id))
            }
            None => {
                let mut store = Store::new(name, category, self.clock.now());
                apply_store_fields(&mut store, row);
                let id = store.id.clone();
                staged.push(store.clone());
                if !self.dry_run {
                    self.repo.add_store(store)?;
                }
                report.record(row_no, RowAction::StoreAdded, name.to_string(), None);
                Ok(Some(id))
            }
        }
    }

    fn build_visit(
        &self,
        row: &Row<'_>,
        store_name: &str,
        store_id: Option<crate::core::identity::EntityId>,
        visit_type: VisitType,
    ) -> VisitLog {
        let date = row
            .get_any(&["date", "visitDate"])
            .and_then(|raw| parse_date(&raw))
            .unwrap_or_else(|| self.clock.now());

        let mut visit = VisitLog::new(store_name, date);
        visit.store_id = store_id;
        visit.visit_type = visit_type;

        let mut statuses: Vec<VisitStatus> = row
            .get_any(&["visitStatus", "status"])
            .map(|raw| {
                split_multi(&raw)
                    .iter()
                    .filter_map(|token| normalize_status(token))
                    .collect()
            })
            .unwrap_or_default();
        if statuses.is_empty() {
            statuses.push(VisitStatus::Completed);
        }
        if statuses.contains(&VisitStatus::OpenedAccount) {
            visit.account_opened_date = Some(
                row.get("accountOpenedDate")
                    .and_then(|raw| parse_date(&raw))
                    .unwrap_or(date),
            );
        }
        visit.visit_status = statuses;

        visit.potential_level = row
            .get("potentialLevel")
            .and_then(|raw| raw.parse::<PotentialLevel>().ok())
            .unwrap_or_default();
        visit.notes = row
            .get_any(&["latestUpdate", "notes"])
            .unwrap_or_default();
        visit.next_steps = row.get("nextSteps").unwrap_or_default();
        visit.products_promoted = row
            .get_any(&["productsPromoted", "products"])
            .map(|raw| split_multi(&raw))
            .unwrap_or_default();
        visit.user_name = row
            .get_any(&["loggedBy", "salesperson"])
            .unwrap_or_default();
        visit
    }
}

/// Copy non-empty row cells onto the store, leaving absent cells untouched
fn apply_store_fields(store: &mut Store, row: &Row<'_>) {
    if let Some(v) = row.get("region") {
        store.region = v;
    }
    if let Some(v) = row.get("area") {
        store.area = v;
    }
    if let Some(v) = row.get("state") {
        store.state = v;
    }
    if let Some(v) = row.get("address") {
        store.address = v;
    }
    if let Some(v) = row.get("city") {
        store.city = v;
    }
    if let Some(v) = row.get_any(&["zipCode", "zip"]) {
        store.zip_code = v;
    }
    if let Some(v) = row.get("phone") {
        store.phone = v;
    }
    if let Some(v) = row.get("email") {
        store.email = v;
    }
    if let Some(v) = row.get_any(&["picInfo", "pic"]) {
        store.pic_info = v;
    }
    if let Some(v) = row.get("salesperson") {
        store.salesperson = v;
    }
    if let Some(v) = row.get("species") {
        store.species = v.parse::<Species>().ok();
    }
    if let Some(v) = row.get("paymentTerms") {
        store.payment_terms = v.parse::<PaymentTerms>().ok();
    }
}

/// Lenient status token parsing; unknown tokens are dropped
fn normalize_status(token: &str) -> Option<VisitStatus> {
    token
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
        .parse::<VisitStatus>()
        .ok()
}

/// Parse the date formats importer files carry in practice
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    None
}
