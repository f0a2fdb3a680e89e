use thiserror::Error;

#[derive(Error, Debug)]
pub enum CampusError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CampusError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CampusError::Internal(err.to_string())
    }
}

impl From<&str> for CampusError {
    fn from(err: &str) -> Self {
        CampusError::Internal(err.to_string())
    }
}

impl From<String> for CampusError {
    fn from(err: String) -> Self {
        CampusError::Internal(err)
    }
}

pub type Result<T> = std::result::Result<T, CampusError>;
