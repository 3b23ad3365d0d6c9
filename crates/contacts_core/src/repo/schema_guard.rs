//! Connection readiness checks shared by SQLite repositories.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::contact_repo::{RepoError, RepoResult};
use rusqlite::Connection;

/// Rejects connections that are not migrated to this binary's schema.
pub(crate) fn ensure_schema_ready(
    conn: &Connection,
    required: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
