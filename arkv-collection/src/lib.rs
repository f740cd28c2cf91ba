//! Collections: one evolving record batch per name.
//!
//! A collection is stored as a single Arrow IPC blob under the UTF-8 bytes of
//! its name. Every upsert decodes it, merges the new JSON rows into the
//! existing columns (adding columns for unseen fields) and rewrites the whole
//! blob.

pub mod config;
pub mod json;
pub mod store;

pub use config::IngestOptions;
pub use json::{field_for, json_to_cell, parse_rows};
pub use store::{CollectionStore, UpsertSummary};
