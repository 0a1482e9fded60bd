//! Translation of pool and Diesel failures into gateway errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::UserGatewayError;

use super::pool::PoolError;

/// Pool failures mean the store is unreachable.
pub(super) fn map_pool_error(error: PoolError) -> UserGatewayError {
    UserGatewayError::connection(error.into_message())
}

/// Map a Diesel error, keeping constraint names for integrity violations.
pub(super) fn map_diesel_error(error: DieselError) -> UserGatewayError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(
            kind @ (DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation),
            info,
        ) => {
            let constraint = info
                .constraint_name()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("{kind:?}"));
            UserGatewayError::constraint(constraint, info.message())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserGatewayError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserGatewayError::query("database query error"),
        _ => UserGatewayError::query("database error"),
    }
}
