//! Translation of SeaORM failures into repository errors.

use sea_orm::{DbErr, SqlErr};

use agora_core::error::RepoError;

/// PostgreSQL reports aborted transactions with SQLSTATE 40001
/// (serialization_failure) and 40P01 (deadlock_detected).
const ABORT_MARKERS: [&str; 4] = [
    "40001",
    "40P01",
    "could not serialize access",
    "deadlock detected",
];

pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    if matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_)) {
        return RepoError::Connection(err.to_string());
    }

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => return RepoError::Constraint(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            return RepoError::MissingReference(msg);
        }
        _ => {}
    }

    let msg = err.to_string();
    if ABORT_MARKERS.iter().any(|marker| msg.contains(marker)) {
        RepoError::Serialization(msg)
    } else if matches!(err, DbErr::RecordNotFound(_)) {
        RepoError::NotFound
    } else {
        RepoError::Query(msg)
    }
}
