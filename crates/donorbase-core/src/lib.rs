//! Donorbase Core - Legacy address parsing and migration.
//!
//! This crate turns the free-text address strings stored on donor records into
//! structured addresses, and drives the batch that persists them.
//!
//! The pieces, leaves first:
//! - [`Gazetteer`]: immutable table of known region names and abbreviations
//! - [`AddressParser`]: pure mapping from a legacy string to a [`StructuredAddress`]
//! - [`EligibilitySelector`]: which stored records still need migration
//! - [`MigrationRunner`]: the sequential, failure-isolated batch
//!
//! The record store and the outcome logger are collaborators injected through the
//! [`RecordStore`] and [`MigrationLogger`] traits.

pub mod address;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod gazetteer;
pub mod logger;
pub mod parser;
pub mod runner;
pub mod store;

pub use address::{StructuredAddress, DEFAULT_COUNTRY};
pub use config::MigrationConfig;
pub use eligibility::{EligibilitySelector, EligibleRecord, RecordId};
pub use error::{Error, StoreError};
pub use gazetteer::{Gazetteer, Region, RegionMatchPolicy};
pub use logger::{
    MemoryMigrationLogger, MigrationLogger, NullMigrationLogger, RecordEvent, TracingLogger,
};
pub use parser::AddressParser;
pub use runner::{MigrationOutcome, MigrationRunner, Summary};
pub use store::{MemoryRecordStore, RecordStore};
