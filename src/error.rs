// src/error.rs
// =============================================================================
// Typed errors for the verification library.
//
// The engine itself rarely returns these to the caller: most failures are
// per-link or per-document and end up as data in the report. They surface
// where a single operation genuinely cannot continue (a file that cannot be
// read, an HTTP client that cannot be built).
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - #[from]: automatic conversion so the ? operator works
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// Reading a file from the build directory failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A link points at a file that does not exist
    #[error("target file not found: {0}")]
    MissingFile(PathBuf),

    /// A built-in CSS selector failed to parse
    #[error("invalid selector: {0}")]
    Selector(String),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Walking the build directory failed
    #[error("failed to walk build directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl VerifyError {
    /// Wraps an io::Error together with the path that caused it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VerifyError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
