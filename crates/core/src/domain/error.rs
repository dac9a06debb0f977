// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid activity action: {0}")]
    InvalidAction(String),

    #[error("Invalid activity resource: {0}")]
    InvalidResource(String),

    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error("{0}")]
    FieldValidation(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
