//! Property-based tests for the scanning pipeline's core invariants.

use proptest::prelude::*;
use sha2::{Digest, Sha256};

use sentryscan_core::baseline::{Baseline, Fingerprint};
use sentryscan_core::finding::{Finding, FindingKind, Origin};
use sentryscan_core::rule::Severity;

fn make_finding(rule_id: &str, path: &str, line: u32) -> Finding {
    Finding {
        kind: FindingKind::Secret,
        rule_id: rule_id.to_string(),
        description: format!("{rule_id} detected"),
        severity: Severity::High,
        origin: Origin::File {
            path: path.to_string(),
        },
        line,
        column: 1,
        matched: "not-part-of-identity".to_string(),
        context: String::new(),
        fingerprint: String::new(),
    }
}

proptest! {
    /// The fingerprint is exactly SHA-256 over
    /// `rule_id 0x1F path 0x1F decimal(line)`.
    #[test]
    fn fingerprint_matches_reference_formula(
        rule_id in "[a-z][a-z0-9-]{0,20}",
        path in "[a-z][a-z0-9/._-]{0,40}",
        line in 0u32..100_000,
    ) {
        let mut hasher = Sha256::new();
        hasher.update(rule_id.as_bytes());
        hasher.update([0x1Fu8]);
        hasher.update(path.as_bytes());
        hasher.update([0x1Fu8]);
        hasher.update(line.to_string().as_bytes());
        let expected = hex::encode(hasher.finalize());

        let fingerprint = Fingerprint::compute(&rule_id, &path, line);
        prop_assert_eq!(fingerprint.as_str(), expected);
    }

    /// Fingerprints never depend on the matched text.
    #[test]
    fn fingerprint_ignores_matched_text(
        path in "[a-z][a-z0-9/._-]{0,30}",
        line in 1u32..10_000,
        secret_a in "[a-zA-Z0-9]{8,40}",
        secret_b in "[a-zA-Z0-9]{8,40}",
    ) {
        let mut a = make_finding("rule", &path, line);
        a.matched = secret_a;
        let mut b = make_finding("rule", &path, line);
        b.matched = secret_b;

        prop_assert_eq!(Fingerprint::for_finding(&a), Fingerprint::for_finding(&b));
    }

    /// filter() partitions its input: kept plus suppressed equals the
    /// original count, and nothing kept is in the baseline.
    #[test]
    fn baseline_filter_partitions_disjointly(
        lines in prop::collection::btree_set(1u32..500, 0..20),
        suppress_every in 1usize..4,
    ) {
        let findings: Vec<Finding> = lines
            .iter()
            .map(|&line| make_finding("rule", "a.txt", line))
            .collect();

        let mut baseline = Baseline::new();
        for finding in findings.iter().step_by(suppress_every) {
            baseline.add(finding).unwrap();
        }
        let suppressed_expected = findings.iter().step_by(suppress_every).count();

        let total = findings.len();
        let (kept, suppressed) = baseline.filter(findings);

        prop_assert_eq!(kept.len() + suppressed, total);
        prop_assert_eq!(suppressed, suppressed_expected);
        for finding in &kept {
            prop_assert!(!baseline.contains(&Fingerprint::for_finding(finding)));
        }
    }

    /// Saving and reloading a baseline yields an equal baseline.
    #[test]
    fn baseline_roundtrips_through_disk(
        lines in prop::collection::btree_set(1u32..1000, 1..15),
    ) {
        let dir = tempfile::TempDir::new().unwrap();

        let mut baseline = Baseline::new();
        for &line in &lines {
            baseline.add(&make_finding("rule", "src/config.py", line)).unwrap();
        }
        baseline.save(dir.path()).unwrap();

        let loaded = Baseline::load(dir.path()).unwrap();

        prop_assert_eq!(loaded.version, baseline.version);
        prop_assert_eq!(loaded.findings, baseline.findings);
    }
}
