//! Applied-changeset history
//!
//! The `databasechangelog` table records every applied changeset with its
//! checksum and execution order. It is the only state the preparer keeps.

use crate::changelog::parser::ChangeSet;
use crate::errors::{from_rusqlite, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub const HISTORY_TABLE: &str = "databasechangelog";

/// One row of the history table
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedChangeSet {
    pub id: String,
    pub author: String,
    pub changelog: String,
    pub executed_at: DateTime<Utc>,
    pub order_executed: i64,
    pub checksum: String,
    pub description: String,
}

impl AppliedChangeSet {
    pub fn key(&self) -> String {
        format!("{}::{}", self.id, self.author)
    }

    /// Whether this row records `change_set`
    pub fn records(&self, change_set: &ChangeSet) -> bool {
        self.id == change_set.id
            && self.author == change_set.author
            && self.changelog == change_set.changelog
    }
}

/// Create the history table if it doesn't exist
pub fn ensure_history_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS databasechangelog (
            id TEXT NOT NULL,
            author TEXT NOT NULL,
            filename TEXT NOT NULL,
            dateexecuted INTEGER NOT NULL,
            orderexecuted INTEGER NOT NULL,
            checksum TEXT NOT NULL,
            description TEXT,
            comments TEXT,
            contexts TEXT,
            PRIMARY KEY (id, author, filename)
        )",
    )
    .map_err(from_rusqlite)
}

/// Whether the history table exists; status checks must not create it
pub fn history_table_exists(conn: &Connection) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [HISTORY_TABLE],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
    .map_err(from_rusqlite)
}

/// Applied changesets in execution order
pub fn applied_change_sets(conn: &Connection) -> Result<Vec<AppliedChangeSet>> {
    if !history_table_exists(conn)? {
        return Ok(Vec::new());
    }

    let mut stmt = conn
        .prepare(
            "SELECT id, author, filename, dateexecuted, orderexecuted, checksum, description
             FROM databasechangelog ORDER BY orderexecuted",
        )
        .map_err(from_rusqlite)?;

    let rows = stmt
        .query_map([], |row| {
            let millis: i64 = row.get(3)?;
            Ok(AppliedChangeSet {
                id: row.get(0)?,
                author: row.get(1)?,
                changelog: row.get(2)?,
                executed_at: DateTime::from_timestamp_millis(millis).unwrap_or_default(),
                order_executed: row.get(4)?,
                checksum: row.get(5)?,
                description: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(rows)
}

/// Record a changeset as applied
pub fn record_applied(conn: &Connection, change_set: &ChangeSet) -> Result<()> {
    let next_order: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(orderexecuted), 0) + 1 FROM databasechangelog",
            [],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;

    conn.execute(
        "INSERT INTO databasechangelog
            (id, author, filename, dateexecuted, orderexecuted, checksum, description, comments, contexts)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            change_set.id,
            change_set.author,
            change_set.changelog,
            Utc::now().timestamp_millis(),
            next_order,
            change_set.checksum,
            change_set.description(),
            change_set.comment,
            change_set.context,
        ],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change_set(id: &str) -> ChangeSet {
        ChangeSet {
            id: id.to_string(),
            author: "a".to_string(),
            changelog: "db-changelog.yaml".to_string(),
            context: None,
            comment: Some("note".to_string()),
            changes: Vec::new(),
            statements: Vec::new(),
            checksum: "abc".to_string(),
        }
    }

    #[test]
    fn test_no_history_without_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(applied_change_sets(&conn).unwrap().is_empty());
        assert!(!history_table_exists(&conn).unwrap());
    }

    #[test]
    fn test_record_assigns_execution_order() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_history_table(&conn).unwrap();
        record_applied(&conn, &change_set("1")).unwrap();
        record_applied(&conn, &change_set("2")).unwrap();

        let applied = applied_change_sets(&conn).unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[1].order_executed, 2);
        assert!(applied[0].records(&change_set("1")));
        assert_eq!(applied[0].key(), "1::a");
    }

    #[test]
    fn test_recording_twice_violates_identity() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_history_table(&conn).unwrap();
        record_applied(&conn, &change_set("1")).unwrap();
        assert!(record_applied(&conn, &change_set("1")).is_err());
    }
}
