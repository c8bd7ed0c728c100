//! `SQLite` backend for the annal migration ledger
//!
//! Wraps a `rusqlite::Connection` in the [`annal::LedgerConnection`]
//! contract so a `MigrationLedger` can keep its bookkeeping in a `SQLite`
//! database.
//!
//! ```no_run
//! use annal::{LedgerTable, MigrationLedger};
//! use annal_sqlite::SqliteConnection;
//!
//! fn main() -> annal::LedgerResult<()> {
//!     let mut conn = SqliteConnection::open("state.db")?;
//!     let ledger = MigrationLedger::new(LedgerTable::default());
//!     ledger.record_applied(&mut conn, "blog", "0001_initial")?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod conn;

pub use conn::{SqliteConnection, SqliteSchemaEditor};

// Re-export so callers can open databases with driver-level options
// without adding their own rusqlite dependency.
pub use rusqlite;
