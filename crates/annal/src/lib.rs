//! Migration ledger core
//!
//! This crate provides:
//! - `MigrationLedger`, bookkeeping over which schema migrations are applied
//! - The `LedgerConnection` / `SchemaEditor` contract a database backend
//!   implements to host the ledger
//! - Record and key types for applied migrations
//!
//! The ledger is backend-agnostic: it holds no connection and issues no SQL
//! itself. Backends such as `annal-sqlite` supply the storage.
//!
//! # Timestamp Convention
//!
//! Applied-at timestamps are stored as `i64` (microseconds since Unix epoch).
//! Helper functions are provided to convert to/from `chrono::NaiveDateTime`
//! and ISO-8601 text.

#![forbid(unsafe_code)]

pub mod connection;
pub mod error;
pub mod ledger;
pub mod record;
pub mod table;
pub mod timestamps;

pub use connection::{LedgerConnection, SchemaEditor};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{DuplicatePolicy, MigrationLedger};
pub use record::{MAX_IDENT_CHARS, MigrationKey, MigrationRecord};
pub use table::{DEFAULT_TABLE_NAME, LedgerTable};
pub use timestamps::{iso_to_micros, micros_to_iso, micros_to_naive, naive_to_micros, now_micros};
