use std::path::PathBuf;

use thiserror::Error;

use super::fingerprint::Fingerprint;

/// Errors that can occur when loading, saving, or mutating a baseline.
#[derive(Debug, Error)]
pub enum BaselineError {
    /// The baseline file could not be read from disk.
    #[error("failed to read baseline file '{path}': {source}")]
    Read {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The baseline file exists but is not a well-formed document.
    ///
    /// A missing file is not an error (it yields an empty baseline); a
    /// present-but-unparseable file always is.
    #[error("corrupt baseline file '{path}': {source}")]
    Corrupt {
        /// Path to the unparseable file.
        path: PathBuf,
        /// The underlying JSON parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory baseline could not be serialised.
    #[error("failed to serialise baseline: {source}")]
    Serialize {
        /// The underlying JSON serialisation error.
        #[source]
        source: serde_json::Error,
    },

    /// The baseline file could not be written to disk.
    #[error("failed to write baseline file '{path}': {source}")]
    Write {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A finding with this fingerprint is already recorded.
    #[error("finding already in baseline: {fingerprint}")]
    Duplicate {
        /// The fingerprint that already exists.
        fingerprint: Fingerprint,
    },
}
