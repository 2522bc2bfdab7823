//! Error types for ingestion and the query surface.

use std::path::PathBuf;
use thiserror::Error;

/// Why a file, or a whole import run, could not be ingested.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The archive root is missing. Aborts the run before any file is read.
    #[error("archive directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("{filename}: file is empty")]
    EmptyFile { filename: String },

    #[error("{filename}: read failed: {source}")]
    Io {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{filename}: not valid UTF-8: {source}")]
    Decode {
        filename: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("{filename}: store write failed: {message}")]
    StoreWrite { filename: String, message: String },
}

impl IngestError {
    pub fn store_write(filename: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::StoreWrite {
            filename: filename.into(),
            message: format!("{:#}", err),
        }
    }
}

/// Errors surfaced by the article query operations (list, get, search, ask).
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0}")]
    BadRequest(String),

    #[error("article not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
