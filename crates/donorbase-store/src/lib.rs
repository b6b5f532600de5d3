//! Donorbase Store - Embedded document store for donor records.
//!
//! Documents are JSON objects grouped into collections. Every write appends a new
//! version; older versions stay readable, so a field update never loses what was
//! there before.
//!
//! The store implements [`donorbase_core::RecordStore`], which is all the address
//! migration needs from it.

mod config;
mod engine;
mod error;
mod id;
mod import;
mod record;
mod records;

pub mod key;

pub use config::StoreConfig;
pub use engine::{with_store, Document, DocumentStore};
pub use error::Error;
pub use id::DocumentId;
pub use key::VersionedKey;
pub use record::Record;
