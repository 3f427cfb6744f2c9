//! @ai:module:intent Define error types for the manifest parser
//! @ai:module:layer domain
//! @ai:module:public_api Error, ScanError, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all parser and orchestration operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Not a valid puppet module structure at {0}")]
    InvalidModule(PathBuf),

    #[error("Invalid configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// @ai:intent Internal precondition violations raised by the scanner primitives
/// @ai:invariant never produced for globally balanced input walked through the grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("char at {index} is not a '{{', found: {found:?}")]
    NotAnOpenBrace { index: usize, found: Option<char> },

    #[error("unterminated span starting at {start}, depth {depth} at end of input")]
    Unterminated { start: usize, depth: usize },

    #[error("expected {target:?} before end of input")]
    Missing { target: char },
}

pub type Result<T> = std::result::Result<T, Error>;
