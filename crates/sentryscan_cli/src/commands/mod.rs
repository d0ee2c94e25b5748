//! CLI command handlers.

/// Baseline management for acknowledged findings.
pub mod baseline;
/// Filesystem and git-history scanning.
pub mod scan;
