// Error types shared by the validators, the record stores and the manager
use thiserror::Error;

use crate::validation::Field;

#[derive(Error, Debug)]
pub enum HotelManagementError {
    #[error("Invalid {field}: {reason}")]
    ValidationError { field: Field, reason: String },

    #[error("Wrong JSON format: {0}")]
    FormatError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Duplicate: {0}")]
    DuplicateError(String),

    #[error("Integrity error: {0}")]
    IntegrityError(String),

    #[error("Invalid state: {0}")]
    StateError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),
}

impl HotelManagementError {
    pub(crate) fn invalid(field: Field, reason: impl Into<String>) -> Self {
        HotelManagementError::ValidationError {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HotelManagementError>;
