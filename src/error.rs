use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("action history is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("action history is empty")]
    Underflow,

    #[error("bucket count must be positive and allocatable")]
    InvalidBucketCount,

    #[error("history capacity must be positive")]
    InvalidCapacity,

    #[error("{field} exceeds maximum length of {max} characters (got {actual})")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("unknown item type: {0}")]
    UnknownItemType(String),

    #[error("Parsing error")]
    Serde(#[from] serde_json::Error),

    #[error("IO error")]
    IO(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
