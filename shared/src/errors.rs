//! Shared error types for the submission platform

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SharedError {
    #[error("Invalid submission record: {message}")]
    InvalidRecord { message: String },

    #[error("Score {metric} out of range: {value}")]
    ScoreOutOfRange { metric: &'static str, value: f64 },

    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition { id: String, from: String, to: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

impl SharedError {
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord { message: message.into() }
    }

    pub fn invalid_config(field: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
