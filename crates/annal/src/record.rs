//! Row model for the ledger table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::timestamps::{micros_to_iso, now_micros};

/// Maximum length of `app` and `name`, in characters.
pub const MAX_IDENT_CHARS: usize = 255;

/// The (app, name) pair identifying a migration.
///
/// Orders lexicographically by app, then name, so ledger listings come
/// out deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MigrationKey {
    pub app: String,
    pub name: String,
}

impl MigrationKey {
    #[must_use]
    pub fn new(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MigrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app, self.name)
    }
}

/// One row of the ledger table: a currently-applied migration.
///
/// Presence of a row means "applied"; absence means "not applied". There
/// is no soft-delete and no application history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Owning module/namespace of the migration.
    pub app: String,
    /// Name of the migration within its app.
    pub name: String,
    /// When the migration was recorded, microseconds since Unix epoch.
    pub applied_at: i64,
}

impl MigrationRecord {
    #[must_use]
    pub fn new(app: impl Into<String>, name: impl Into<String>, applied_at: i64) -> Self {
        Self {
            app: app.into(),
            name: name.into(),
            applied_at,
        }
    }

    /// Record stamped with the current wall-clock time.
    #[must_use]
    pub fn applied_now(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(app, name, now_micros())
    }

    /// The (app, name) key of this record.
    #[must_use]
    pub fn key(&self) -> MigrationKey {
        MigrationKey::new(self.app.clone(), self.name.clone())
    }

    /// ISO-8601 rendering of the applied timestamp.
    #[must_use]
    pub fn applied_iso(&self) -> String {
        micros_to_iso(self.applied_at)
    }
}

impl fmt::Display for MigrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Migration {} for {}", self.name, self.app)
    }
}

/// Check an app or name argument before it reaches the database.
pub(crate) fn validate_ident(field: &'static str, value: &str) -> LedgerResult<()> {
    if value.is_empty() {
        return Err(LedgerError::invalid(field, "must not be empty"));
    }
    let chars = value.chars().count();
    if chars > MAX_IDENT_CHARS {
        return Err(LedgerError::invalid(
            field,
            format!("{chars} chars exceeds the maximum of {MAX_IDENT_CHARS}"),
        ));
    }
    Ok(())
}
