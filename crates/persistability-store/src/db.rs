//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;

/// Database location meaning "private in-memory database"
pub const IN_MEMORY: &str = ":memory:";

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Open the database named by `location`, which is a path or `:memory:`
pub fn open_location(location: &str) -> Result<Connection> {
    if location == IN_MEMORY {
        open_in_memory()
    } else {
        open(location)
    }
}

/// Configure a connection
///
/// Foreign-key enforcement is off by default in SQLite and must be switched
/// on per connection. WAL only applies to file databases.
pub fn configure(conn: &Connection, foreign_keys: bool, wal: bool) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", foreign_keys)
        .map_err(from_rusqlite)?;

    if wal {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(from_rusqlite)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_enables_foreign_keys() {
        let conn = open_location(IN_MEMORY).unwrap();
        configure(&conn, true, false).unwrap();

        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
