//! fieldtrack - sales-force visit tracking for pet stores and vet clinics
//!
//! Stores, visit logs, and team members live as plain-text YAML files in a
//! workspace directory, one file per entity. The CLI layers CSV import and
//! export, activity summaries, and universe coverage reports on top.

pub mod cli;
pub mod core;
pub mod entities;
