//! Entity type definitions
//!
//! Fieldtrack tracks four kinds of records:
//!
//! - [`Store`] - pet stores and veterinary clinics in the territory
//! - [`VisitLog`] - one record per salesperson visit to a store
//! - [`User`] - team members who log visits
//! - [`Registry`] - the product and salesperson name lists

pub mod registry;
pub mod store;
pub mod user;
pub mod visit;

pub use registry::Registry;
pub use store::{PaymentTerms, Species, Store, StoreCategory};
pub use user::{Role, User};
pub use visit::{PotentialLevel, VisitLog, VisitStatus, VisitType};
