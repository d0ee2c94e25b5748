//! Scanner configuration and its validation errors.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rule::{RuleDef, Severity};

/// Default number of worker threads.
pub const DEFAULT_THREADS: usize = 4;

/// Default per-file size cap in bytes (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Environment variable overriding the configured webhook URL.
pub const ENV_WEBHOOK_URL: &str = "SENTRYSCAN_WEBHOOK_URL";

/// Environment variable overriding the configured webhook secret.
pub const ENV_WEBHOOK_SECRET: &str = "SENTRYSCAN_WEBHOOK_SECRET";

/// Options delivered to the scan engine.
///
/// Precedence is file < environment < explicit flags: [`ScanConfig::load`]
/// reads the file, [`ScanConfig::apply_env`] layers the environment on top,
/// and the CLI applies flag overrides last.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of worker threads; clamped to `1..=4 × logical CPUs` by the
    /// engine.
    pub threads: usize,

    /// Files larger than this many bytes are skipped with a warning.
    pub max_file_size: u64,

    /// When non-empty, only files with these extensions (including the
    /// leading dot) are scanned.
    pub include_ext: Vec<String>,

    /// Files with these extensions are never scanned.
    pub exclude_ext: Vec<String>,

    /// Skip hidden entries unless the scan root itself is hidden.
    pub skip_hidden: bool,

    /// Git selector: scan changes in `<since>..HEAD`.
    pub since: Option<String>,

    /// Git selector: scan the tip tree of this branch.
    pub branch: Option<String>,

    /// Git selector: scan changes in a `from..to` range.
    pub commit_range: Option<String>,

    /// Skip baseline suppression entirely.
    pub no_baseline: bool,

    /// Endpoint for signed webhook notifications.
    pub webhook_url: Option<String>,

    /// Shared secret used to sign webhook payloads.
    pub webhook_secret: Option<String>,

    /// Findings below this severity are still reported but do not affect
    /// the exit code.
    pub severity_threshold: Severity,

    /// Detection rules; when empty, the built-in rule set is used.
    /// Declared last so serialised configs keep scalar values ahead of the
    /// rule tables.
    pub rules: Vec<RuleDef>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            include_ext: Vec::new(),
            exclude_ext: Vec::new(),
            skip_hidden: true,
            since: None,
            branch: None,
            commit_range: None,
            no_baseline: false,
            webhook_url: None,
            webhook_secret: None,
            severity_threshold: Severity::High,
            rules: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// Returns the default configuration if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Layers environment overrides on top of file-derived values.
    ///
    /// Empty environment values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_WEBHOOK_URL)
            && !url.is_empty()
        {
            self.webhook_url = Some(url);
        }
        if let Ok(secret) = std::env::var(ENV_WEBHOOK_SECRET)
            && !secret.is_empty()
        {
            self.webhook_secret = Some(secret);
        }
    }

    /// The rule definitions this configuration selects: its own rules, or
    /// the built-in set when none are declared.
    #[must_use]
    pub fn effective_rules(&self) -> Vec<RuleDef> {
        if self.rules.is_empty() {
            crate::rule::RuleSet::default_rules()
        } else {
            self.rules.clone()
        }
    }
}

/// Errors raised by configuration loading and rule compilation.
///
/// All of these are fatal before a scan starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("failed to read config '{path}': {source}")]
    Read {
        /// Path to the config file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid TOML or unexpected values.
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        /// Path to the config file that could not be parsed.
        path: PathBuf,
        /// The underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },

    /// A rule was declared with an empty id.
    #[error("rule with empty id")]
    EmptyRuleId,

    /// Two rules share the same id.
    #[error("duplicate rule id '{id}'")]
    DuplicateRuleId {
        /// The id that appeared more than once.
        id: String,
    },

    /// A rule declared a severity outside the known set.
    #[error("rule '{id}' has unknown severity '{severity}'")]
    UnknownSeverity {
        /// Identifier of the offending rule.
        id: String,
        /// The unrecognised severity string.
        severity: String,
    },

    /// A rule's pattern failed to compile or exceeded the size limit.
    #[error("invalid pattern in rule '{id}': {source}")]
    InvalidPattern {
        /// Identifier of the offending rule.
        id: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// A rule's pattern does not have exactly one capture group.
    #[error("rule '{id}' must have exactly one capture group, found {found}")]
    CaptureGroupCount {
        /// Identifier of the offending rule.
        id: String,
        /// Number of capture groups the pattern declared.
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = ScanConfig::default();
        assert!(config.rules.is_empty());
        assert_eq!(config.threads, 4);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert!(config.skip_hidden);
        assert!(!config.no_baseline);
        assert_eq!(config.severity_threshold, Severity::High);
    }

    #[test]
    fn load_returns_default_when_file_missing() {
        let config = ScanConfig::load(Path::new("/nonexistent/.sentryscan.toml")).unwrap();
        assert_eq!(config.threads, 4);
    }

    #[test]
    fn load_parses_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "threads = 8\nseverity_threshold = \"low\"").unwrap();

        let config = ScanConfig::load(file.path()).unwrap();
        assert_eq!(config.threads, 8);
        assert_eq!(config.severity_threshold, Severity::Low);
    }

    #[test]
    fn from_toml_parses_rules_table() {
        let config = ScanConfig::from_toml(
            r#"
            [[rules]]
            id = "custom/api"
            description = "internal API token"
            severity = "high"
            pattern = 'API_([A-Z0-9]{16})'
        "#,
        )
        .unwrap();

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].id, "custom/api");
    }

    #[test]
    fn from_toml_parses_extension_filters() {
        let config =
            ScanConfig::from_toml(r#"include_ext = [".rs", ".py"]"#).unwrap();
        assert_eq!(config.include_ext, vec![".rs", ".py"]);
    }

    #[test]
    fn from_toml_rejects_malformed_document() {
        assert!(ScanConfig::from_toml("this is { not toml").is_err());
    }

    #[test]
    fn from_toml_rejects_unknown_severity_threshold() {
        assert!(ScanConfig::from_toml(r#"severity_threshold = "extreme""#).is_err());
    }

    #[test]
    fn effective_rules_falls_back_to_builtins() {
        let config = ScanConfig::default();
        let rules = config.effective_rules();
        assert!(rules.iter().any(|r| r.id == "aws-access-key"));
    }

    #[test]
    fn effective_rules_prefers_declared_rules() {
        let config = ScanConfig::from_toml(
            r#"
            [[rules]]
            id = "only"
            severity = "low"
            pattern = 'X(Y)'
        "#,
        )
        .unwrap();

        let rules = config.effective_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "only");
    }

    #[test]
    fn config_survives_toml_roundtrip() {
        let mut original = ScanConfig::default();
        original.threads = 2;
        original.exclude_ext = vec![".min.js".to_string()];
        original.webhook_url = Some("https://example.com/hook".to_string());

        let toml = toml::to_string(&original).unwrap();
        let restored = ScanConfig::from_toml(&toml).unwrap();

        assert_eq!(restored.threads, 2);
        assert_eq!(restored.exclude_ext, original.exclude_ext);
        assert_eq!(restored.webhook_url, original.webhook_url);
    }
}
