#![forbid(unsafe_code)]

//! Core domain model and business logic for the wodpick workout pool.
//!
//! This crate provides:
//! - Domain types (movements, functional groups, pool entries, cadences)
//! - The built-in movement catalog
//! - Pool generation from template families
//! - The selection engine
//! - Persistence (store, journal, CSV rollup, history)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod cadence;
pub mod generator;
pub mod selector;
pub mod journal;
pub mod rollup;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use store::{CadenceStore, FileStore, MemoryStore, PoolStore};
pub use cadence::CadenceDefaults;
pub use generator::generate_pool;
pub use selector::{mark_performed, SelectionPrefs, SelectionTuning, Selector};
pub use journal::{JournalSink, JsonlJournal};
pub use history::load_recent_performed;
