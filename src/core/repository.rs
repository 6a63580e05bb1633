//! Workspace-backed entity repository
//!
//! One `Repository` is constructed per command invocation (or per test) and
//! passed by reference to everything that reads or writes entities. All
//! mutations persist the corresponding YAML file immediately, so the
//! in-memory collections and the workspace never drift apart within a
//! process.
//!
//! Collections are kept in ULID order, which is creation order; list output
//! and report groupings inherit that ordering.

use std::fs;
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workspace::{Workspace, WorkspaceError};
use crate::entities::registry::{self, Registry};
use crate::entities::store::{Store, StoreCategory};
use crate::entities::user::User;
use crate::entities::visit::{VisitLog, VisitStatus};

/// Errors from repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to serialize entity: {0}")]
    Serialize(String),

    #[error("no {kind} found matching '{reference}'")]
    NotFound {
        kind: &'static str,
        reference: String,
    },

    #[error("a user with email '{0}' already exists")]
    DuplicateEmail(String),
}

/// All workspace collections, loaded once
pub struct Repository {
    workspace: Workspace,
    stores: Vec<Store>,
    visits: Vec<VisitLog>,
    users: Vec<User>,
    products: Registry,
    salespersons: Registry,
}

impl Repository {
    /// Load every collection from the workspace
    pub fn open(workspace: Workspace) -> Result<Self, RepositoryError> {
        let mut stores: Vec<Store> = load_all(&workspace, EntityPrefix::Store);
        let mut visits: Vec<VisitLog> = load_all(&workspace, EntityPrefix::Visit);
        let mut users: Vec<User> = load_all(&workspace, EntityPrefix::User);

        // ULIDs sort by creation time; this restores registration order.
        stores.sort_by(|a, b| a.id.cmp(&b.id));
        visits.sort_by(|a, b| a.id.cmp(&b.id));
        users.sort_by(|a, b| a.id.cmp(&b.id));

        let products = load_registry(&workspace, "products");
        let salespersons = load_registry(&workspace, "salespersons");

        Ok(Self {
            workspace,
            stores,
            visits,
            users,
            products,
            salespersons,
        })
    }

    /// Discover the workspace from the current directory and load it
    pub fn discover() -> Result<Self, RepositoryError> {
        Self::open(Workspace::discover()?)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    // ------------------------------------------------------------------
    // Stores
    // ------------------------------------------------------------------

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn store_by_id(&self, id: &EntityId) -> Option<&Store> {
        self.stores.iter().find(|s| &s.id == id)
    }

    /// Find a store by full ID, ID prefix, or case-insensitive name substring
    pub fn find_store(&self, reference: &str) -> Option<&Store> {
        let upper = reference.to_uppercase();
        if let Some(store) = self
            .stores
            .iter()
            .find(|s| s.id.to_string().starts_with(&upper))
        {
            return Some(store);
        }
        let lower = reference.to_lowercase();
        self.stores
            .iter()
            .find(|s| s.name.to_lowercase().contains(&lower))
    }

    /// Import dedup lookup: case-insensitive trimmed name plus category
    pub fn store_by_name_and_category(
        &self,
        name: &str,
        category: StoreCategory,
    ) -> Option<&Store> {
        let key = name.trim().to_lowercase();
        self.stores
            .iter()
            .find(|s| s.category == category && s.name.trim().to_lowercase() == key)
    }

    /// Case-insensitive name lookup, ignoring category
    pub fn store_by_name(&self, name: &str) -> Option<&Store> {
        let key = name.trim().to_lowercase();
        self.stores
            .iter()
            .find(|s| s.name.trim().to_lowercase() == key)
    }

    pub fn add_store(&mut self, store: Store) -> Result<(), RepositoryError> {
        self.persist(&store.id, &store)?;
        self.stores.push(store);
        self.stores.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(())
    }

    /// Replace the stored record with the same id
    pub fn update_store(&mut self, store: Store) -> Result<(), RepositoryError> {
        self.persist(&store.id, &store)?;
        match self.stores.iter_mut().find(|s| s.id == store.id) {
            Some(slot) => *slot = store,
            None => self.stores.push(store),
        }
        Ok(())
    }

    pub fn delete_store(&mut self, id: &EntityId) -> Result<(), RepositoryError> {
        self.remove_file(id)?;
        self.stores.retain(|s| &s.id != id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Visits
    // ------------------------------------------------------------------

    pub fn visits(&self) -> &[VisitLog] {
        &self.visits
    }

    pub fn visit_by_id(&self, id: &EntityId) -> Option<&VisitLog> {
        self.visits.iter().find(|v| &v.id == id)
    }

    pub fn visits_for_store(&self, store_id: &EntityId) -> Vec<&VisitLog> {
        self.visits
            .iter()
            .filter(|v| v.store_id.as_ref() == Some(store_id))
            .collect()
    }

    /// Whether the store already has its one-time opened-account visit
    pub fn has_opened_account(&self, store_id: &EntityId) -> bool {
        self.visits
            .iter()
            .any(|v| v.store_id.as_ref() == Some(store_id) && v.opened_account())
    }

    /// The status choices offered for a new visit to this store.
    ///
    /// `opened_account` is one-time per store; once taken, `ex_customer`
    /// replaces it. The two are never offered together.
    pub fn available_statuses(&self, store: &Store) -> Vec<VisitStatus> {
        let mut options = vec![
            VisitStatus::Visited,
            VisitStatus::Pending,
            VisitStatus::Completed,
            VisitStatus::FollowUpRequired,
            VisitStatus::NoInterest,
            VisitStatus::RejectedVisit,
            VisitStatus::ClosedDown,
        ];
        if self.has_opened_account(&store.id) {
            options.push(VisitStatus::ExCustomer);
        } else {
            options.push(VisitStatus::OpenedAccount);
        }
        options
    }

    pub fn add_visit(&mut self, visit: VisitLog) -> Result<(), RepositoryError> {
        self.persist(&visit.id, &visit)?;
        self.visits.push(visit);
        self.visits.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(())
    }

    pub fn update_visit(&mut self, visit: VisitLog) -> Result<(), RepositoryError> {
        self.persist(&visit.id, &visit)?;
        match self.visits.iter_mut().find(|v| v.id == visit.id) {
            Some(slot) => *slot = visit,
            None => self.visits.push(visit),
        }
        Ok(())
    }

    pub fn delete_visit(&mut self, id: &EntityId) -> Result<(), RepositoryError> {
        self.remove_file(id)?;
        self.visits.retain(|v| &v.id != id);
        Ok(())
    }

    /// The display name for a visit's store, degrading to a placeholder
    /// when the reference is dangling
    pub fn visit_store_label(&self, visit: &VisitLog) -> String {
        if let Some(store_id) = &visit.store_id {
            if let Some(store) = self.store_by_id(store_id) {
                return store.name.clone();
            }
        }
        if visit.store_name.trim().is_empty() {
            "Unknown Store".to_string()
        } else {
            visit.store_name.clone()
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        let key = email.trim().to_lowercase();
        self.users
            .iter()
            .find(|u| u.email.trim().to_lowercase() == key)
    }

    pub fn add_user(&mut self, user: User) -> Result<(), RepositoryError> {
        if self.user_by_email(&user.email).is_some() {
            return Err(RepositoryError::DuplicateEmail(user.email));
        }
        self.persist(&user.id, &user)?;
        self.users.push(user);
        self.users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(())
    }

    pub fn update_user(&mut self, user: User) -> Result<(), RepositoryError> {
        self.persist(&user.id, &user)?;
        match self.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => *slot = user,
            None => self.users.push(user),
        }
        Ok(())
    }

    pub fn delete_user(&mut self, id: &EntityId) -> Result<(), RepositoryError> {
        self.remove_file(id)?;
        self.users.retain(|u| &u.id != id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Registries
    // ------------------------------------------------------------------

    pub fn products(&self) -> &Registry {
        &self.products
    }

    pub fn salespersons(&self) -> &Registry {
        &self.salespersons
    }

    pub fn add_product(&mut self, name: &str) -> Result<bool, RepositoryError> {
        let added = self.products.add(name);
        if added {
            save_registry(&self.workspace, "products", &self.products)?;
        }
        Ok(added)
    }

    pub fn remove_product(&mut self, name: &str) -> Result<bool, RepositoryError> {
        let removed = self.products.remove(name);
        if removed {
            save_registry(&self.workspace, "products", &self.products)?;
        }
        Ok(removed)
    }

    pub fn add_salesperson(&mut self, name: &str) -> Result<bool, RepositoryError> {
        let added = self.salespersons.add(name);
        if added {
            save_registry(&self.workspace, "salespersons", &self.salespersons)?;
        }
        Ok(added)
    }

    pub fn remove_salesperson(&mut self, name: &str) -> Result<bool, RepositoryError> {
        let removed = self.salespersons.remove(name);
        if removed {
            save_registry(&self.workspace, "salespersons", &self.salespersons)?;
        }
        Ok(removed)
    }

    /// Seed both registries with the built-in defaults, used by `init`
    pub fn seed_registries(&mut self) -> Result<(), RepositoryError> {
        if self.products.is_empty() {
            self.products = registry::default_products();
            save_registry(&self.workspace, "products", &self.products)?;
        }
        if self.salespersons.is_empty() {
            self.salespersons = registry::default_salespersons();
            save_registry(&self.workspace, "salespersons", &self.salespersons)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence plumbing
    // ------------------------------------------------------------------

    fn persist<T: serde::Serialize>(
        &self,
        id: &EntityId,
        entity: &T,
    ) -> Result<(), RepositoryError> {
        let path = self.workspace.entity_path(id);
        let yaml =
            serde_yml::to_string(entity).map_err(|e| RepositoryError::Serialize(e.to_string()))?;
        fs::write(&path, yaml).map_err(|source| RepositoryError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    fn remove_file(&self, id: &EntityId) -> Result<(), RepositoryError> {
        let path = self.workspace.entity_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| RepositoryError::Write {
                path: path.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Load all entities of one type; files that fail to parse are skipped
fn load_all<T: serde::de::DeserializeOwned + 'static>(workspace: &Workspace, prefix: EntityPrefix) -> Vec<T> {
    let mut entities = Vec::new();
    for path in workspace.iter_entity_files(prefix) {
        if let Ok(content) = fs::read_to_string(&path) {
            if let Ok(entity) = serde_yml::from_str::<T>(&content) {
                entities.push(entity);
            }
        }
    }
    entities
}

fn load_registry(workspace: &Workspace, name: &str) -> Registry {
    let path = workspace.registry_path(name);
    if let Ok(content) = fs::read_to_string(path) {
        if let Ok(registry) = serde_yml::from_str::<Registry>(&content) {
            return registry;
        }
    }
    Registry::new()
}

fn save_registry(
    workspace: &Workspace,
    name: &str,
    registry: &Registry,
) -> Result<(), RepositoryError> {
    let path = workspace.registry_path(name);
    let yaml =
        serde_yml::to_string(registry).map_err(|e| RepositoryError::Serialize(e.to_string()))?;
    fs::write(&path, yaml).map_err(|source| RepositoryError::Write {
        path: path.display().to_string(),
        source,
    })
}
