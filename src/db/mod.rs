pub mod accountdb;
pub mod db;
pub mod missiondb;
pub mod notificationdb;
pub mod paymentdb;
pub mod ratingdb;
pub mod subscriptiondb;

#[cfg(test)]
mod tests;

/// True when the store rejected a write because of a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map_or(false, |db_err| db_err.is_unique_violation())
}
