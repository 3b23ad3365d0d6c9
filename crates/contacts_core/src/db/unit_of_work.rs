//! Explicit transaction scope for one logical request.
//!
//! # Invariants
//! - The transaction commits only when the closure returns `Ok`.
//! - Every other exit path (error, early return, panic unwind) rolls back,
//!   because an uncommitted `rusqlite::Transaction` rolls back on drop.

use super::DbError;
use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `work` inside one immediate transaction on `conn`.
///
/// The closure receives the transaction handle; repositories built on it
/// (`SqliteContactRepository::try_new(&tx)`) see a single consistent
/// snapshot and all their writes land or vanish together.
///
/// # Errors
/// - Returns the closure error unchanged (after rollback).
/// - Returns a converted `DbError` when begin/commit fails.
pub fn unit_of_work<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<DbError>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|err| E::from(DbError::Sqlite(err)))?;

    match work(&tx) {
        Ok(value) => {
            tx.commit().map_err(|err| E::from(DbError::Sqlite(err)))?;
            debug!("event=unit_of_work module=db status=committed");
            Ok(value)
        }
        Err(err) => {
            warn!("event=unit_of_work module=db status=rolled_back");
            drop(tx);
            Err(err)
        }
    }
}
