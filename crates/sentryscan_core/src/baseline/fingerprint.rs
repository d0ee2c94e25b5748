use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::finding::Finding;

/// Byte separating the fingerprint's input fields.
const FIELD_SEPARATOR: u8 = 0x1F;

/// Stable identity for a finding, independent of the matched text.
///
/// Computed as hex `SHA-256(rule_id 0x1F canonical_path 0x1F line)`, so a
/// secret rotated at the same location keeps its fingerprint and its
/// suppression accounting. The canonical path is the scan-root-relative
/// path for file origins and `commit:path` for git blobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint {
    value: Box<str>,
}

impl Fingerprint {
    /// Computes a fingerprint from its three identity fields.
    #[must_use]
    pub fn compute(rule_id: &str, canonical_path: &str, line: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(rule_id.as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(canonical_path.as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(line.to_string().as_bytes());

        Self {
            value: hex::encode(hasher.finalize()).into(),
        }
    }

    /// Computes the fingerprint for a finding.
    #[must_use]
    pub fn for_finding(finding: &Finding) -> Self {
        Self::compute(&finding.rule_id, &finding.origin.canonical_path(), finding.line)
    }

    /// Wraps an existing fingerprint string (e.g. loaded from JSON).
    #[must_use]
    pub fn from_string(value: &str) -> Self {
        Self { value: value.into() }
    }

    /// Returns the fingerprint as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{FindingKind, Origin};
    use crate::rule::Severity;

    #[test]
    fn compute_is_deterministic() {
        let fp1 = Fingerprint::compute("aws-access-key", "src/config.py", 3);
        let fp2 = Fingerprint::compute("aws-access-key", "src/config.py", 3);
        assert_eq!(fp1, fp2);
    }

    #[test]
    fn compute_matches_manual_sha256() {
        let mut hasher = Sha256::new();
        hasher.update(b"aws-access-key");
        hasher.update([0x1F]);
        hasher.update(b"a.txt");
        hasher.update([0x1F]);
        hasher.update(b"1");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(Fingerprint::compute("aws-access-key", "a.txt", 1).as_str(), expected);
    }

    #[test]
    fn fingerprint_is_64_hex_characters() {
        let fp = Fingerprint::compute("rule", "path", 1);
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_rules_produce_different_fingerprints() {
        let fp1 = Fingerprint::compute("rule-a", "a.txt", 1);
        let fp2 = Fingerprint::compute("rule-b", "a.txt", 1);
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn different_paths_produce_different_fingerprints() {
        let fp1 = Fingerprint::compute("rule", "a.txt", 1);
        let fp2 = Fingerprint::compute("rule", "b.txt", 1);
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn different_lines_produce_different_fingerprints() {
        let fp1 = Fingerprint::compute("rule", "a.txt", 1);
        let fp2 = Fingerprint::compute("rule", "a.txt", 2);
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn separator_prevents_field_boundary_collisions() {
        // Without the separator these two would hash identical input.
        let fp1 = Fingerprint::compute("ab", "c.txt", 1);
        let fp2 = Fingerprint::compute("a", "bc.txt", 1);
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn matched_text_does_not_influence_the_fingerprint() {
        let make = |matched: &str| Finding {
            kind: FindingKind::Secret,
            rule_id: "generic-token".to_string(),
            description: String::new(),
            severity: Severity::Medium,
            origin: Origin::File { path: "env".to_string() },
            line: 7,
            column: 1,
            matched: matched.to_string(),
            context: String::new(),
            fingerprint: String::new(),
        };

        assert_eq!(
            Fingerprint::for_finding(&make("old-secret-value")),
            Fingerprint::for_finding(&make("rotated-secret-value"))
        );
    }

    #[test]
    fn git_blob_fingerprint_uses_commit_and_path() {
        let finding = Finding {
            kind: FindingKind::Secret,
            rule_id: "aws-access-key".to_string(),
            description: String::new(),
            severity: Severity::High,
            origin: Origin::GitBlob {
                repo: "/repo".to_string(),
                commit: "deadbeef".to_string(),
                path: "b.txt".to_string(),
            },
            line: 1,
            column: 1,
            matched: String::new(),
            context: String::new(),
            fingerprint: String::new(),
        };

        assert_eq!(
            Fingerprint::for_finding(&finding),
            Fingerprint::compute("aws-access-key", "deadbeef:b.txt", 1)
        );
    }

    #[test]
    fn serialises_as_plain_string() {
        let fp = Fingerprint::from_string("abc123");
        assert_eq!(serde_json::to_string(&fp).unwrap(), "\"abc123\"");
    }

    #[test]
    fn serde_roundtrip_preserves_value() {
        let original = Fingerprint::compute("rule", "path", 5);
        let json = serde_json::to_string(&original).unwrap();
        let restored: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }
}
