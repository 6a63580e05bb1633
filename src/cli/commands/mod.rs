pub mod completions;
pub mod export;
pub mod import;
pub mod init;
pub mod registry;
pub mod report;
pub mod store;
pub mod user;
pub mod visit;
