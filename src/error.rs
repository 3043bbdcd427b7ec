use thiserror::Error;

use crate::models::ServiceId;

/// Failure reported by a document store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no signed-in user; set USER_ID or pass --user")]
    Unauthenticated,

    #[error("could not reach the document store: {0}")]
    Persistence(#[from] StoreError),

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

/// Recoverable failures of a single line-item edit.
#[derive(Debug, Error, PartialEq)]
pub enum LineItemError {
    #[error("service {0} is not in the loaded catalog")]
    ServiceNotFound(ServiceId),

    #[error("line item {index} does not exist ({len} items)")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not run {program}: {source}; markdown kept at {markdown}")]
    RendererUnavailable {
        program: String,
        markdown: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed: {stderr}; markdown kept at {markdown}")]
    RenderFailed {
        program: String,
        markdown: String,
        stderr: String,
    },
}
