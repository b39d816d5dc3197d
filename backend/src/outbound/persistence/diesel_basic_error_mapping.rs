//! Diesel and pool error mapping for the map store.

use tracing::debug;

use crate::domain::ports::MapStoreError;

use super::pool::PoolError;

/// Map pool failures to store connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> MapStoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    MapStoreError::connection(message)
}

/// Map Diesel failures to store query or connection errors.
///
/// Database messages are logged at debug level and replaced by generic text
/// so SQL details never reach callers.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> MapStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "map store diesel operation failed");
        }
        _ => debug!(%error, "map store diesel operation failed"),
    }

    match error {
        DieselError::NotFound => MapStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => MapStoreError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            MapStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            MapStoreError::query("referenced map does not exist")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            MapStoreError::query("concurrent update conflict; retry the operation")
        }
        DieselError::BrokenTransactionManager => {
            MapStoreError::connection("transaction manager is broken")
        }
        _ => MapStoreError::query("database error"),
    }
}
