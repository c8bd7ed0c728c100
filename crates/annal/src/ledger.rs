//! The migration ledger: bookkeeping over the applied-migrations table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::connection::{LedgerConnection, SchemaEditor};
use crate::error::{LedgerError, LedgerResult};
use crate::record::{MigrationKey, MigrationRecord, validate_ident};
use crate::table::LedgerTable;

/// How `record_applied` treats an (app, name) that is already recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Insert unconditionally; callers are responsible for not
    /// double-applying. Double-applying leaves two rows under one key.
    #[default]
    Permissive,
    /// Reject an insert whose key already has a row.
    Strict,
}

/// Bookkeeping for applied schema migrations.
///
/// Persists one row per applied (app, name) in a dedicated table and
/// answers which migrations are currently applied. The ledger holds no
/// connection of its own: every operation takes the target connection as
/// an explicit parameter, and the table layout is injected at
/// construction. The ledger never drops its table.
#[derive(Debug, Clone, Default)]
pub struct MigrationLedger {
    table: LedgerTable,
    duplicates: DuplicatePolicy,
}

impl MigrationLedger {
    /// Ledger over the given table layout, permissive toward duplicates.
    #[must_use]
    pub fn new(table: LedgerTable) -> Self {
        Self {
            table,
            duplicates: DuplicatePolicy::Permissive,
        }
    }

    /// Builder-style override of the duplicate policy.
    #[must_use]
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// The table layout this ledger writes to.
    #[must_use]
    pub const fn table(&self) -> &LedgerTable {
        &self.table
    }

    /// The configured duplicate policy.
    #[must_use]
    pub const fn duplicates(&self) -> DuplicatePolicy {
        self.duplicates
    }

    /// Whether the ledger table exists on this connection.
    ///
    /// Pure introspection, no side effects.
    ///
    /// # Errors
    /// Introspection failures propagate unchanged.
    pub fn table_exists<C: LedgerConnection>(&self, conn: &mut C) -> LedgerResult<bool> {
        let names = conn.table_names()?;
        Ok(names.iter().any(|name| name == self.table.name()))
    }

    /// Create the ledger table if it is absent.
    ///
    /// Idempotent. Creation runs inside a scoped schema-edit session, so
    /// a failed attempt is rolled back by the backend.
    ///
    /// # Errors
    /// [`LedgerError::SchemaMissing`] wrapping the backend error if the
    /// table cannot be created; introspection errors propagate unchanged.
    pub fn ensure_schema<C: LedgerConnection>(&self, conn: &mut C) -> LedgerResult<()> {
        if self.table_exists(conn)? {
            return Ok(());
        }
        match Self::create_table(conn, &self.table) {
            Ok(()) => {
                tracing::info!(table = self.table.name(), "created migration ledger table");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    table = self.table.name(),
                    error = %err,
                    "ledger table creation failed"
                );
                Err(LedgerError::schema_missing(self.table.name(), err))
            }
        }
    }

    /// Every applied migration, keyed by (app, name).
    ///
    /// An absent ledger table reads as an empty map, never an error: a
    /// database without the table has had nothing applied. Duplicate rows
    /// under one key resolve to the latest insert, since rows are scanned
    /// in insertion order.
    ///
    /// # Errors
    /// Introspection or query failures propagate unchanged.
    pub fn applied_migrations<C: LedgerConnection>(
        &self,
        conn: &mut C,
    ) -> LedgerResult<BTreeMap<MigrationKey, MigrationRecord>> {
        if !self.table_exists(conn)? {
            return Ok(BTreeMap::new());
        }
        let mut applied = BTreeMap::new();
        for record in conn.select_all(&self.table)? {
            applied.insert(record.key(), record);
        }
        Ok(applied)
    }

    /// Record that the migration (app, name) has been applied.
    ///
    /// Ensures the table exists first, then inserts a row stamped with
    /// the current time. Under [`DuplicatePolicy::Permissive`] the insert
    /// is unconditional; under [`DuplicatePolicy::Strict`] an existing
    /// row for the key is rejected and nothing is written.
    ///
    /// # Errors
    /// [`LedgerError::InvalidArgument`] for an empty or oversized app or
    /// name (checked before any I/O), [`LedgerError::Duplicate`] in
    /// strict mode, or whatever `ensure_schema` and the insert surface.
    pub fn record_applied<C: LedgerConnection>(
        &self,
        conn: &mut C,
        app: &str,
        name: &str,
    ) -> LedgerResult<()> {
        validate_ident("app", app)?;
        validate_ident("name", name)?;
        self.ensure_schema(conn)?;
        if self.duplicates == DuplicatePolicy::Strict
            && conn.count_matching(&self.table, app, name)? > 0
        {
            return Err(LedgerError::duplicate(app, name));
        }
        conn.insert(&self.table, &MigrationRecord::applied_now(app, name))
    }

    /// Record that the migration (app, name) has been reversed.
    ///
    /// Ensures the table exists first, then deletes every row matching
    /// the key. Deleting zero rows is a success.
    ///
    /// # Errors
    /// [`LedgerError::InvalidArgument`] for an empty or oversized app or
    /// name, or whatever `ensure_schema` and the delete surface.
    pub fn record_unapplied<C: LedgerConnection>(
        &self,
        conn: &mut C,
        app: &str,
        name: &str,
    ) -> LedgerResult<()> {
        validate_ident("app", app)?;
        validate_ident("name", name)?;
        self.ensure_schema(conn)?;
        let removed = conn.delete_matching(&self.table, app, name)?;
        tracing::debug!(
            table = self.table.name(),
            app,
            name,
            removed,
            "removed applied-migration rows"
        );
        Ok(())
    }

    /// Delete every record in the ledger table.
    ///
    /// Does not create the table first: flushing a database whose ledger
    /// table is absent surfaces the backend's error.
    ///
    /// # Errors
    /// The backend's delete-all error, unchanged.
    pub fn flush<C: LedgerConnection>(&self, conn: &mut C) -> LedgerResult<()> {
        let removed = conn.delete_all(&self.table)?;
        tracing::debug!(
            table = self.table.name(),
            removed,
            "flushed migration ledger"
        );
        Ok(())
    }

    /// Run the create DDL inside one scoped session.
    fn create_table<C: LedgerConnection>(conn: &mut C, table: &LedgerTable) -> LedgerResult<()> {
        let mut editor = conn.schema_editor()?;
        editor.create_table(table)?;
        editor.commit()
    }
}
