use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Missing Authorization Header")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Generic 403 used for role and ownership failures.
    pub fn forbidden() -> Self {
        AppError::Forbidden("Unauthorized".into())
    }

    pub fn user_not_found() -> Self {
        AppError::NotFound("User not found".into())
    }

    pub fn plan_not_found() -> Self {
        AppError::NotFound("Plan not found".into())
    }

    pub fn subscription_not_found() -> Self {
        AppError::NotFound("Subscription not found".into())
    }

    /// Message safe to show to the client. Store and internal failures are masked.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
