//! Convenience re-exports of the most commonly used types.

pub use crate::baseline::{BASELINE_FILENAME, Baseline, BaselineEntry, BaselineError, Fingerprint};
pub use crate::cancel::CancelToken;
pub use crate::config::{ConfigError, ScanConfig};
pub use crate::engine::{self, ScanResult};
pub use crate::error::{ScanError, ScanWarning, WarningKind};
pub use crate::finding::{Finding, FindingKind, Origin};
pub use crate::rule::{Rule, RuleDef, RuleSet, Severity};
