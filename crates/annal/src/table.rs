//! Layout of the ledger table.

/// Default name of the ledger table.
pub const DEFAULT_TABLE_NAME: &str = "annal_migrations";

/// The injected layout of the migration ledger table.
///
/// Only the table name varies; the column layout is fixed:
///
/// | column  | type         | constraint                         |
/// |---------|--------------|------------------------------------|
/// | id      | integer      | primary key, autoincrement         |
/// | app     | varchar(255) | not null                           |
/// | name    | varchar(255) | not null                           |
/// | applied | integer      | not null, microseconds since epoch |
///
/// A `LedgerTable` is constructed explicitly and handed to the ledger;
/// there is no process-wide default instance. The name is interpolated
/// verbatim into SQL by backends, so it must be a plain identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTable {
    name: String,
}

impl LedgerTable {
    /// Layout with a custom table name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for LedgerTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_uses_the_stock_name() {
        assert_eq!(LedgerTable::default().name(), DEFAULT_TABLE_NAME);
    }

    #[test]
    fn custom_name_is_kept_verbatim() {
        let table = LedgerTable::new("deploy_history");
        assert_eq!(table.name(), "deploy_history");
        assert_ne!(table, LedgerTable::default());
    }
}
