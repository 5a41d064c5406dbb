use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid coin id: {0:?}")]
    InvalidCoinId(String),

    #[error("Invalid catalog snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
