//! Core infrastructure: identity, workspace layout, persistence, import
//! reconciliation, and reporting

pub mod clock;
pub mod config;
pub mod csvio;
pub mod identity;
pub mod reconcile;
pub mod repository;
pub mod session;
pub mod shortid;
pub mod summary;
pub mod workspace;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use identity::{EntityId, EntityPrefix};
pub use repository::{Repository, RepositoryError};
pub use session::Session;
pub use shortid::ShortIdIndex;
pub use workspace::{Workspace, WorkspaceError};
