use crate::api::ApiError;
use crate::auth::storage::StorageError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The navigation guard sent the user elsewhere.
    #[error("{}", redirect_message(.0))]
    Redirect(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("Login failed. Check your email and password.")]
    LoginFailed,

    #[error("{0}")]
    Registration(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn redirect_message(to: &str) -> String {
    match to {
        crate::routes::LOGIN_PATH => "Not logged in. Run `bugtrack login` first.".to_string(),
        _ => format!("Not available for your account (redirected to {})", to),
    }
}

impl AppError {
    /// Process exit status for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Validation(_) => 2,
            AppError::Redirect(_) | AppError::LoginFailed => 3,
            AppError::Api(e) if e.is_unauthorized() => 3,
            AppError::Forbidden(_) => 4,
            AppError::Storage(_) | AppError::Config(_) => 5,
            AppError::Api(_) | AppError::Registration(_) | AppError::Json(_) => 1,
        }
    }

    /// Text shown to the user. Store-level messages win over raw API errors
    /// so the CLI prints the same thing the list view would.
    pub fn user_message(&self, store_error: Option<&str>) -> String {
        match (self, store_error) {
            (AppError::Api(_), Some(message)) => message.to_string(),
            _ => self.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
