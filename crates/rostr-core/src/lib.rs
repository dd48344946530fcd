//! rostr-core: Core library for the rostr member-records manager
//!
//! Provides the data model, JSON file store, export formatting and the
//! application facade for a local-first member database. No SQL, no daemon -
//! just flat JSON files in a data directory, with timestamped directory
//! backups.

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod id;
pub mod member;
pub mod store;

pub use api::{Api, DialogService, Envelope, FileFilter};
pub use config::Config;
pub use error::Error;
pub use id::generate_id;
pub use member::{FieldDef, FieldType, Member, Settings};
pub use store::Store;

/// Result type for rostr operations
pub type Result<T> = std::result::Result<T, Error>;
