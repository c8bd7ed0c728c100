//! Collaborator contract between the ledger and a database backend.

use crate::error::LedgerResult;
use crate::record::MigrationRecord;
use crate::table::LedgerTable;

/// A scoped schema-edit session.
///
/// DDL issued through the editor becomes permanent only on `commit`; an
/// editor dropped without committing rolls its work back. That keeps a
/// partially failed table creation from leaving debris behind.
pub trait SchemaEditor {
    /// Create the ledger table if it does not already exist.
    fn create_table(&mut self, table: &LedgerTable) -> LedgerResult<()>;

    /// Finalize the session, making its DDL permanent.
    fn commit(self) -> LedgerResult<()>;
}

/// A database connection the ledger can operate on.
///
/// Implementations provide table introspection, a scoped schema editor,
/// and row CRUD bound to a [`LedgerTable`]. Everything is synchronous and
/// blocking; each call is its own implicit unit of work under the
/// connection's autocommit behavior. Driver failures are reported through
/// the `Backend` error variant and otherwise propagate unchanged.
pub trait LedgerConnection {
    /// The scoped schema-edit session type.
    type Editor<'conn>: SchemaEditor
    where
        Self: 'conn;

    /// Names of the tables currently visible to the connection.
    fn table_names(&mut self) -> LedgerResult<Vec<String>>;

    /// Open a scoped schema-edit session.
    fn schema_editor(&mut self) -> LedgerResult<Self::Editor<'_>>;

    /// Every row of the ledger table, in insertion order.
    fn select_all(&mut self, table: &LedgerTable) -> LedgerResult<Vec<MigrationRecord>>;

    /// Number of rows matching (app, name) exactly.
    fn count_matching(
        &mut self,
        table: &LedgerTable,
        app: &str,
        name: &str,
    ) -> LedgerResult<usize>;

    /// Insert one row.
    fn insert(&mut self, table: &LedgerTable, record: &MigrationRecord) -> LedgerResult<()>;

    /// Delete all rows matching (app, name) exactly; returns the count removed.
    fn delete_matching(
        &mut self,
        table: &LedgerTable,
        app: &str,
        name: &str,
    ) -> LedgerResult<usize>;

    /// Delete every row; returns the count removed.
    fn delete_all(&mut self, table: &LedgerTable) -> LedgerResult<usize>;
}
