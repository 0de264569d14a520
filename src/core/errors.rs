// Domain error types - no internal details reach the client

use thiserror::Error;

use crate::core::models::ItemKind;

/// Main error type for the ordering service
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or incomplete request data (HTTP 400)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Login with an email that has no account (HTTP 404)
    #[error("Unknown account")]
    UnknownAccount,

    /// Password did not match (HTTP 401)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, unknown or expired session (HTTP 401)
    #[error("Not authenticated")]
    Unauthenticated,

    /// Email already registered (HTTP 409)
    #[error("Account already exists")]
    AccountExists,

    /// Ordered item whose meal window is closed (HTTP 409)
    #[error("Meal window closed for {item}")]
    MealClosed { item: ItemKind },

    /// Datastore failure (HTTP 500)
    #[error("Store error: {0}")]
    Store(String),

    /// Password hashing failure (HTTP 500)
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::UnknownAccount => 404,
            AppError::InvalidCredentials => 401,
            AppError::Unauthenticated => 401,
            AppError::AccountExists => 409,
            AppError::MealClosed { .. } => 409,
            AppError::Store(_) => 500,
            AppError::PasswordHash(_) => 500,
            AppError::ConfigurationError(_) => 500,
        }
    }

    /// Get user-friendly error message (no sensitive information)
    ///
    /// Unknown email and wrong password share one message so the response
    /// body does not tell which half of the credentials was wrong.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(reason) => reason.clone(),
            AppError::UnknownAccount | AppError::InvalidCredentials => {
                "Invalid credentials".to_string()
            }
            AppError::Unauthenticated => "Not authenticated".to_string(),
            AppError::AccountExists => "Account already exists".to_string(),
            AppError::MealClosed { item } => format!("{} is not available right now", item),
            AppError::Store(_) => "Internal error".to_string(),
            AppError::PasswordHash(_) => "Internal error".to_string(),
            AppError::ConfigurationError(_) => "Internal error".to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(err.to_string())
    }
}
