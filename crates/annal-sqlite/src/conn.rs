//! `rusqlite`-backed implementation of the ledger connection contract.

use std::path::Path;

use annal::{LedgerConnection, LedgerError, LedgerResult, LedgerTable, MigrationRecord, SchemaEditor};
use rusqlite::params;

fn map_sqlite_err(err: rusqlite::Error) -> LedgerError {
    LedgerError::backend(err.to_string())
}

// IF NOT EXISTS so two connections racing to create the ledger do not
// fail each other.
fn create_table_sql(table: &LedgerTable) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} ( \
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            app VARCHAR(255) NOT NULL, \
            name VARCHAR(255) NOT NULL, \
            applied INTEGER NOT NULL \
        )",
        table.name()
    )
}

/// A `SQLite` database hosting the migration ledger.
///
/// Owns a `rusqlite::Connection` and exposes it through the
/// [`LedgerConnection`] contract. All calls run synchronously on the
/// caller's thread.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// The driver's open error, as [`LedgerError::Backend`].
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let conn = rusqlite::Connection::open(path).map_err(map_sqlite_err)?;
        tracing::debug!(path = %path.display(), "opened sqlite ledger connection");
        Ok(Self { conn })
    }

    /// Open a fresh in-memory database.
    ///
    /// # Errors
    /// The driver's open error, as [`LedgerError::Backend`].
    pub fn open_in_memory() -> LedgerResult<Self> {
        let conn = rusqlite::Connection::open_in_memory().map_err(map_sqlite_err)?;
        Ok(Self { conn })
    }

    /// Wrap an already-configured driver connection.
    #[must_use]
    pub const fn from_rusqlite(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Borrow the underlying driver connection.
    #[must_use]
    pub const fn as_rusqlite(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Unwrap back into the driver connection.
    #[must_use]
    pub fn into_rusqlite(self) -> rusqlite::Connection {
        self.conn
    }
}

/// Scoped DDL session over a driver transaction.
///
/// Dropping the editor without calling `commit` rolls the session back;
/// that is the driver transaction's default drop behavior.
pub struct SqliteSchemaEditor<'conn> {
    tx: rusqlite::Transaction<'conn>,
}

impl SchemaEditor for SqliteSchemaEditor<'_> {
    fn create_table(&mut self, table: &LedgerTable) -> LedgerResult<()> {
        self.tx
            .execute_batch(&create_table_sql(table))
            .map_err(map_sqlite_err)
    }

    fn commit(self) -> LedgerResult<()> {
        self.tx.commit().map_err(map_sqlite_err)
    }
}

impl LedgerConnection for SqliteConnection {
    type Editor<'conn>
        = SqliteSchemaEditor<'conn>
    where
        Self: 'conn;

    fn table_names(&mut self) -> LedgerResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(map_sqlite_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(map_sqlite_err)?;
        let mut names = Vec::new();
        for name in rows {
            names.push(name.map_err(map_sqlite_err)?);
        }
        Ok(names)
    }

    fn schema_editor(&mut self) -> LedgerResult<Self::Editor<'_>> {
        let tx = self.conn.transaction().map_err(map_sqlite_err)?;
        Ok(SqliteSchemaEditor { tx })
    }

    fn select_all(&mut self, table: &LedgerTable) -> LedgerResult<Vec<MigrationRecord>> {
        let sql = format!("SELECT app, name, applied FROM {} ORDER BY id", table.name());
        let mut stmt = self.conn.prepare(&sql).map_err(map_sqlite_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MigrationRecord::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(map_sqlite_err)?;
        let mut records = Vec::new();
        for record in rows {
            records.push(record.map_err(map_sqlite_err)?);
        }
        Ok(records)
    }

    fn count_matching(
        &mut self,
        table: &LedgerTable,
        app: &str,
        name: &str,
    ) -> LedgerResult<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE app = ?1 AND name = ?2",
            table.name()
        );
        let count: i64 = self
            .conn
            .query_row(&sql, params![app, name], |row| row.get(0))
            .map_err(map_sqlite_err)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn insert(&mut self, table: &LedgerTable, record: &MigrationRecord) -> LedgerResult<()> {
        let sql = format!(
            "INSERT INTO {} (app, name, applied) VALUES (?1, ?2, ?3)",
            table.name()
        );
        self.conn
            .execute(&sql, params![record.app, record.name, record.applied_at])
            .map_err(map_sqlite_err)?;
        Ok(())
    }

    fn delete_matching(
        &mut self,
        table: &LedgerTable,
        app: &str,
        name: &str,
    ) -> LedgerResult<usize> {
        let sql = format!(
            "DELETE FROM {} WHERE app = ?1 AND name = ?2",
            table.name()
        );
        self.conn
            .execute(&sql, params![app, name])
            .map_err(map_sqlite_err)
    }

    fn delete_all(&mut self, table: &LedgerTable) -> LedgerResult<usize> {
        let sql = format!("DELETE FROM {}", table.name());
        self.conn.execute(&sql, []).map_err(map_sqlite_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem() -> SqliteConnection {
        SqliteConnection::open_in_memory().unwrap()
    }

    #[test]
    fn table_names_excludes_sqlite_internals() {
        let mut conn = mem();
        // The insert forces sqlite_sequence into existence.
        conn.as_rusqlite()
            .execute_batch(
                "CREATE TABLE wares (id INTEGER PRIMARY KEY AUTOINCREMENT, label TEXT);
                 INSERT INTO wares (label) VALUES ('crate');",
            )
            .unwrap();
        assert_eq!(conn.table_names().unwrap(), ["wares"]);
    }

    #[test]
    fn editor_drop_rolls_back_an_uncommitted_create() {
        let mut conn = mem();
        let table = LedgerTable::default();
        {
            let mut editor = conn.schema_editor().unwrap();
            editor.create_table(&table).unwrap();
        }
        assert!(conn.table_names().unwrap().is_empty());
    }

    #[test]
    fn editor_commit_makes_the_table_visible() {
        let mut conn = mem();
        let table = LedgerTable::default();
        let mut editor = conn.schema_editor().unwrap();
        editor.create_table(&table).unwrap();
        editor.commit().unwrap();
        assert_eq!(conn.table_names().unwrap(), [table.name()]);
    }

    #[test]
    fn create_is_reentrant_across_sessions() {
        let mut conn = mem();
        let table = LedgerTable::default();
        for _ in 0..2 {
            let mut editor = conn.schema_editor().unwrap();
            editor.create_table(&table).unwrap();
            editor.commit().unwrap();
        }
        assert_eq!(conn.table_names().unwrap(), [table.name()]);
    }

    #[test]
    fn crud_roundtrip_on_the_ledger_table() {
        let mut conn = mem();
        let table = LedgerTable::default();
        let mut editor = conn.schema_editor().unwrap();
        editor.create_table(&table).unwrap();
        editor.commit().unwrap();

        conn.insert(
            &table,
            &MigrationRecord::new("blog", "0001_initial", 1_700_000_000_000_000),
        )
        .unwrap();
        conn.insert(
            &table,
            &MigrationRecord::new("shop", "0001_initial", 1_700_000_000_000_001),
        )
        .unwrap();

        assert_eq!(conn.count_matching(&table, "blog", "0001_initial").unwrap(), 1);
        assert_eq!(conn.count_matching(&table, "blog", "missing").unwrap(), 0);

        let rows = conn.select_all(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].app, "blog");
        assert_eq!(rows[0].applied_at, 1_700_000_000_000_000);

        assert_eq!(conn.delete_matching(&table, "blog", "0001_initial").unwrap(), 1);
        assert_eq!(conn.delete_matching(&table, "blog", "0001_initial").unwrap(), 0);
        assert_eq!(conn.delete_all(&table).unwrap(), 1);
        assert!(conn.select_all(&table).unwrap().is_empty());
    }

    #[test]
    fn select_on_a_missing_table_is_a_backend_error() {
        let mut conn = mem();
        let err = conn.select_all(&LedgerTable::default()).unwrap_err();
        assert_eq!(err.error_code(), "BACKEND_ERROR");
        assert!(err.to_string().contains("no such table"), "{err}");
    }
}
