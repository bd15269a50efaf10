use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// The external API could not be reached (DNS, refused connection, timeout)
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The external API answered with a non-success status
    #[error("API error: {status}")]
    RequestError { status: u16 },

    /// A filter fragment, ASN selection or response body could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Host lookup or dashboard session came back empty
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from JSON serialization/deserialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from I/O operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// HTTP status the dashboard answers with when this error reaches a handler
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::NotFoundError(_) => 404,
            AppError::ParseError(_) | AppError::JsonError(_) => 400,
            AppError::TransportError(_) | AppError::RequestError { .. } => 502,
            AppError::ConfigError(_) | AppError::IoError(_) => 500,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return AppError::ParseError(err.to_string());
        }
        if let Some(status) = err.status() {
            return AppError::RequestError { status: status.as_u16() };
        }
        AppError::TransportError(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

/// Result type for application
pub type AppResult<T> = Result<T, AppError>;
