//! Core scanning engine for sentryscan.
//!
//! This crate provides the finding pipeline: rule compilation, content
//! matching, filesystem and git-history source providers, the concurrent
//! scan coordinator, and the baseline suppression store. It is designed to
//! be embedded in CLIs and CI pipelines.
//!
//! # Main Types
//!
//! - [`RuleSet`] - Compiled detection rules applied to byte buffers
//! - [`Finding`] - A detected secret or vulnerability with location and metadata
//! - [`ScanConfig`] - Scanner options delivered to the engine
//! - [`Baseline`] - Persisted suppressions keyed by fingerprint
//! - [`engine::run`] - The coordinator that fans sources across workers
//!
//! # Error Handling
//!
//! This crate uses [`thiserror`] for structured, typed errors that library
//! consumers can match on:
//!
//! - [`ConfigError`] - Malformed configuration or rules; fatal before a scan
//! - [`ScanError`] - Fatal engine problems, including cancellation
//! - [`BaselineError`] - Baseline load/save failures
//!
//! Recoverable per-file problems are reported as [`ScanWarning`]s attached
//! to the [`ScanResult`], never as errors. The CLI crate uses `anyhow` for
//! propagation.

/// Baseline tracking for acknowledged findings.
pub mod baseline;
/// Binary content detection heuristics.
pub mod binary;
/// Cooperative cancellation shared by every pipeline stage.
pub mod cancel;
/// Scanner configuration and its validation errors.
pub mod config;
/// The scan coordinator: workers, channels, and result collection.
pub mod engine;
/// Fatal errors and accumulated warnings.
pub mod error;
/// Types representing detected secrets and their origins.
pub mod finding;
/// Filesystem helpers for atomic writes.
pub mod fs_util;
/// Common re-exports for embedding consumers.
pub mod prelude;
/// Source providers that enumerate byte streams from filesystems and git history.
pub mod provider;
/// Rule definitions and the compiled rule set.
pub mod rule;
/// The matching engine that applies rules to buffers.
pub mod scanner;
/// Text utilities for context extraction.
pub mod text;

pub use baseline::{BASELINE_FILENAME, Baseline, BaselineEntry, BaselineError, Fingerprint};
pub use cancel::CancelToken;
pub use config::{ConfigError, ScanConfig};
pub use engine::{ScanResult, run};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use finding::{Finding, FindingKind, Origin};
pub use rule::{Rule, RuleDef, RuleSet, Severity};

/// Default filename for sentryscan configuration.
pub const CONFIG_FILENAME: &str = ".sentryscan.toml";
