use sqlx::PgPool;

use crate::app_error::AppError;

pub mod plan;
pub mod schema;
pub mod subscription;
pub mod user;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

/// Client-facing message for a violated unique constraint (names are fixed in `schema`).
fn unique_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(schema::USERS_USERNAME_KEY) => "Username already exists",
        Some(schema::USERS_EMAIL_KEY) => "Email already exists",
        Some(schema::PLANS_NAME_KEY) => "A plan with this name already exists",
        _ => "A record with this value already exists",
    }
}

fn foreign_key_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(schema::SUBSCRIPTIONS_PLAN_FKEY) => "Plan has subscriptions; deactivate it instead",
        _ => "Referenced record is missing or still in use",
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(unique_violation_message(db_err.constraint()).into())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict(foreign_key_violation_message(db_err.constraint()).into())
            }
            _ => {
                // Details stay in the log; clients only see a generic 500.
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
