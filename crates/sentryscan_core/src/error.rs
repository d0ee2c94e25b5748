//! Fatal errors and accumulated warnings for the scan pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::ScanResult;

/// Fatal errors from the scan engine.
///
/// Per-file problems never surface here; they accumulate as
/// [`ScanWarning`]s on the [`ScanResult`]. A `ScanError` means the run (or
/// one of its roots) could not proceed.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Configuration or rule compilation failed before the scan started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A scan root does not exist.
    #[error("scan root not found: {path}")]
    RootNotFound {
        /// The missing root path.
        path: PathBuf,
    },

    /// A non-recoverable I/O failure aborted the walk of a root.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path where the failure occurred.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A git repository could not be opened or traversed.
    #[error("git error in '{repo}': {message}")]
    Git {
        /// Path of the repository root.
        repo: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// A commit range's `from` commit is newer than its `to` commit.
    #[error("invalid commit range: '{from}' is newer than '{to}'")]
    InvalidRange {
        /// The range's starting rev.
        from: String,
        /// The range's ending rev.
        to: String,
    },

    /// The scan was cancelled; findings produced before cancellation are
    /// attached, already sorted.
    #[error("scan cancelled")]
    Cancelled {
        /// Findings and warnings collected before cancellation.
        partial: Box<ScanResult>,
    },
}

/// Kinds of recoverable per-file problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A file exceeded the configured size cap.
    Oversize,
    /// A buffer was skipped by the binary detector.
    BinarySkipped,
    /// A file could not be opened due to permissions.
    PermissionDenied,
    /// A file disappeared between enumeration and reading.
    NotFound,
    /// A path's resolution escaped the scan root.
    PathEscape,
    /// A symlink cycle or over-long symlink chain was detected.
    SymlinkLoop,
    /// A worker panicked while scanning one item.
    WorkerPanic,
    /// A provider failed fatally for one root; other roots proceeded.
    RootFailed,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Oversize => "oversize",
            Self::BinarySkipped => "binary-skipped",
            Self::PermissionDenied => "permission-denied",
            Self::NotFound => "not-found",
            Self::PathEscape => "security:path-escape",
            Self::SymlinkLoop => "symlink-loop",
            Self::WorkerPanic => "worker-panic",
            Self::RootFailed => "root-failed",
        };
        write!(f, "{label}")
    }
}

/// A recoverable problem recorded during a scan.
///
/// Warnings carry a path and a short message; they never carry matched
/// secret values.
#[derive(Debug, Clone)]
pub struct ScanWarning {
    /// What went wrong.
    pub kind: WarningKind,
    /// The path or origin the warning applies to.
    pub path: String,
    /// Human-readable detail.
    pub message: String,
}

impl ScanWarning {
    /// Creates a warning for the given path.
    #[must_use]
    pub fn new(kind: WarningKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.kind, self.path, self.message)
    }
}
