use thiserror::Error;

use crate::app_error::AppError;

/// Errors that can occur during application startup.
///
/// Display messages are safe for logs. Debug output includes the `#[source]` chain, which
/// may contain the connection string, so log with `%e`.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Database connection failed. Check DATABASE_URL and ensure the database is running.")]
    DatabaseConnection(#[source] sqlx::Error),

    #[error("Database schema bootstrap failed")]
    Schema(#[source] sqlx::Error),

    #[error("Configuration error: environment variable {var} is invalid")]
    ConfigInvalid { var: &'static str },

    #[error("Seeding the primary administrator failed")]
    AdminSeed(#[source] AppError),

    #[error("TCP bind failed")]
    TcpBind(#[source] std::io::Error),

    #[error("Server error")]
    Server(#[source] std::io::Error),
}
