// Integration tests for the schema preparer
// Covers idempotence, checksum validation, contexts, includes and rollback

use persistability_core::errors::ExErrorKind;
use persistability_store::changelog::{
    current_version, Contexts, EmbeddedResources, FileSystemResources, SchemaPreparer,
};
use rusqlite::Connection;
use std::path::PathBuf;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/changelog")
}

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

fn history_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM databasechangelog", [], |r| r.get(0))
        .unwrap()
}

const ONE_TABLE: &str = r#"
databaseChangeLog:
  - changeSet:
      id: 1
      author: qa
      changes:
        - createTable:
            tableName: widget
            columns:
              - column:
                  name: id
                  type: INTEGER
                  constraints:
                    primaryKey: true
"#;

#[test]
fn test_update_on_empty_db() {
    // Given: An empty database
    let conn = setup_test_db();
    let preparer = SchemaPreparer::new(EmbeddedResources::builtin(), "db-changelog.yaml");

    // When: The builtin changelog is applied
    let summary = preparer.update(&conn, &Contexts::all()).unwrap();

    // Then: Domain tables and the history table exist
    let tables = table_names(&conn);
    for expected in ["company", "employee", "databasechangelog"] {
        assert!(tables.contains(&expected.to_string()), "Missing table: {}", expected);
    }
    assert_eq!(summary.applied.len(), 3);
    assert_eq!(history_count(&conn), 3);

    // And: The index from the included changelog exists
    let index: String = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name = 'idx_employee_company'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(index, "idx_employee_company");
}

#[test]
fn test_update_is_idempotent() {
    // Given: A database with the changelog applied
    let conn = setup_test_db();
    let preparer = SchemaPreparer::new(EmbeddedResources::builtin(), "db-changelog.yaml");
    preparer.update(&conn, &Contexts::all()).unwrap();

    // When: The changelog is applied again
    let summary = preparer.update(&conn, &Contexts::all()).unwrap();

    // Then: Nothing runs and nothing new is recorded
    assert!(!summary.changed());
    assert_eq!(summary.skipped, 3);
    assert_eq!(history_count(&conn), 3);
}

#[test]
fn test_new_changeset_is_applied_incrementally() {
    // Given: A database prepared with one changeset
    let conn = setup_test_db();
    let v1 = EmbeddedResources::new().with("c.yaml", ONE_TABLE);
    SchemaPreparer::new(v1, "c.yaml")
        .update(&conn, &Contexts::all())
        .unwrap();

    // When: The changelog grows by one changeset
    let v2 = EmbeddedResources::new().with(
        "c.yaml",
        format!(
            "{}{}",
            ONE_TABLE,
            r#"
  - changeSet:
      id: 2
      author: qa
      changes:
        - addColumn:
            tableName: widget
            columns:
              - column:
                  name: label
                  type: TEXT
"#
        ),
    );
    let summary = SchemaPreparer::new(v2, "c.yaml")
        .update(&conn, &Contexts::all())
        .unwrap();

    // Then: Only the new changeset runs
    assert_eq!(summary.applied, vec!["2::qa"]);
    assert_eq!(summary.skipped, 1);
    assert_eq!(current_version(&conn).unwrap().unwrap().key(), "2::qa");
}

#[test]
fn test_edited_changeset_fails_checksum_validation() {
    // Given: A database with changeset 1 applied
    let conn = setup_test_db();
    SchemaPreparer::new(EmbeddedResources::new().with("c.yaml", ONE_TABLE), "c.yaml")
        .update(&conn, &Contexts::all())
        .unwrap();

    // When: Changeset 1 is edited after the fact
    let edited = EmbeddedResources::new().with("c.yaml", ONE_TABLE.replace("widget", "gadget"));
    let preparer = SchemaPreparer::new(edited, "c.yaml");
    let err = preparer.update(&conn, &Contexts::all()).unwrap_err();

    // Then: The update is refused before anything runs
    assert_eq!(err.kind(), ExErrorKind::ChecksumMismatch);
    assert_eq!(err.changeset(), Some("1::qa"));
    assert!(!table_names(&conn).contains(&"gadget".to_string()));

    // And: Status reports the changeset as modified
    let status = preparer.status(&conn).unwrap();
    assert_eq!(status.modified.len(), 1);
    assert!(!status.is_up_to_date());
}

#[test]
fn test_failing_changeset_is_retried_after_fix() {
    // Given: A changelog whose second changeset is broken
    let conn = setup_test_db();
    let broken = EmbeddedResources::new().with(
        "c.yaml",
        format!(
            "{}{}",
            ONE_TABLE,
            r#"
  - changeSet:
      id: 2
      author: qa
      changes:
        - sql:
            sql: CREATE TABLE other (x INTEGER)
        - sql:
            sql: INSERT INTO missing_table VALUES (1)
"#
        ),
    );

    // When: The update runs
    let err = SchemaPreparer::new(broken, "c.yaml")
        .update(&conn, &Contexts::all())
        .unwrap_err();

    // Then: The database error surfaces with the changeset named
    assert_eq!(err.kind(), ExErrorKind::SchemaApplication);
    assert_eq!(err.changeset(), Some("2::qa"));
    assert!(err.message().contains("missing_table"));
    assert_eq!(
        err.source_error().map(|s| s.kind()),
        Some(ExErrorKind::Persistence)
    );

    // And: Changeset 1 stays applied while changeset 2 left nothing behind
    let tables = table_names(&conn);
    assert!(tables.contains(&"widget".to_string()));
    assert!(!tables.contains(&"other".to_string()));
    assert_eq!(history_count(&conn), 1);

    // When: The changeset is fixed and the update re-run
    let fixed = EmbeddedResources::new().with(
        "c.yaml",
        format!(
            "{}{}",
            ONE_TABLE,
            r#"
  - changeSet:
      id: 2
      author: qa
      changes:
        - sql:
            sql: CREATE TABLE other (x INTEGER)
"#
        ),
    );
    let summary = SchemaPreparer::new(fixed, "c.yaml")
        .update(&conn, &Contexts::all())
        .unwrap();

    // Then: Exactly that changeset is re-attempted
    assert_eq!(summary.applied, vec!["2::qa"]);
}

#[test]
fn test_context_filtering() {
    // Given: A changelog with a test-only changeset
    let conn = setup_test_db();
    let preparer = SchemaPreparer::new(FileSystemResources::new(fixtures()), "master.yaml");

    // When: The update runs under the prod context
    let summary = preparer.update(&conn, &Contexts::parse("prod")).unwrap();

    // Then: The test changeset is filtered out and stays pending
    assert_eq!(summary.filtered, 1);
    assert_eq!(summary.applied, vec!["company-table::qa", "company-slogan::qa"]);
    let companies: i64 = conn
        .query_row("SELECT COUNT(*) FROM company", [], |r| r.get(0))
        .unwrap();
    assert_eq!(companies, 0);
    let pending = preparer.status(&conn).unwrap().pending;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "seed-test-company");

    // When: The update runs under the test context
    let summary = preparer.update(&conn, &Contexts::parse("test")).unwrap();

    // Then: The test changeset runs and picks up the later column default
    assert_eq!(summary.applied, vec!["seed-test-company::qa"]);
    let slogan: String = conn
        .query_row("SELECT slogan FROM company WHERE name = 'Fixture Corp'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(slogan, "none");
}

#[test]
fn test_included_changeset_records_its_own_file() {
    // Given: A master changelog including a file from a subdirectory
    let conn = setup_test_db();
    let preparer = SchemaPreparer::new(FileSystemResources::new(fixtures()), "master.yaml");

    // When: The changelog is applied
    preparer.update(&conn, &Contexts::all()).unwrap();

    // Then: The included changeset is identified by the included file
    let filename: String = conn
        .query_row(
            "SELECT filename FROM databasechangelog WHERE id = 'company-table'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(filename, "tables/company.yaml");
}

#[test]
fn test_changelog_directory_on_disk() {
    // Given: A changelog written to a scratch directory
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("db-changelog.yaml"), ONE_TABLE).unwrap();
    let db_path = dir.path().join("it.db");

    // When: It is applied to a file database, then re-opened
    {
        let conn = Connection::open(&db_path).unwrap();
        SchemaPreparer::new(FileSystemResources::new(dir.path()), "db-changelog.yaml")
            .update(&conn, &Contexts::all())
            .unwrap();
    }
    let conn = Connection::open(&db_path).unwrap();

    // Then: The history survives the connection
    let status = SchemaPreparer::new(FileSystemResources::new(dir.path()), "db-changelog.yaml")
        .status(&conn)
        .unwrap();
    assert!(status.is_up_to_date());
    assert_eq!(status.applied.len(), 1);
}

#[test]
fn test_missing_changelog() {
    let conn = setup_test_db();
    let err = SchemaPreparer::new(EmbeddedResources::builtin(), "nope.yaml")
        .update(&conn, &Contexts::all())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ResourceNotFound);
}
