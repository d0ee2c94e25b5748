//! Baseline tracking for acknowledged findings.

mod error;
mod fingerprint;
mod store;

pub use error::BaselineError;
pub use fingerprint::Fingerprint;
pub use store::{Baseline, BaselineEntry};

/// On-disk filename of the baseline document, relative to the scan root.
pub const BASELINE_FILENAME: &str = ".sentryscan_baseline.json";
