//! SARIF 2.1.0 output.

use std::collections::BTreeSet;
use std::io::Write;

use serde_json::{Value, json};

use sentryscan_core::{Finding, Severity};

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// Renders findings as a single-run SARIF report.
pub fn write(findings: &[Finding], writer: &mut dyn Write) -> anyhow::Result<()> {
    let report = json!({
        "version": SARIF_VERSION,
        "$schema": SARIF_SCHEMA,
        "runs": [{
            "tool": {
                "driver": {
                    "name": "SentryScan",
                    "informationUri": "https://github.com/sentryscan/sentryscan",
                    "rules": rules(findings),
                }
            },
            "results": results(findings),
        }],
    });

    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

/// One reporting descriptor per distinct rule id, in stable order.
fn rules(findings: &[Finding]) -> Vec<Value> {
    let mut seen = BTreeSet::new();
    let mut rules = Vec::new();

    for finding in findings {
        if seen.insert(finding.rule_id.as_str()) {
            rules.push(json!({
                "id": finding.rule_id,
                "shortDescription": { "text": finding.description },
                "defaultConfiguration": { "level": level(finding.severity) },
            }));
        }
    }

    rules
}

fn results(findings: &[Finding]) -> Vec<Value> {
    findings
        .iter()
        .map(|finding| {
            json!({
                "ruleId": finding.rule_id,
                "level": level(finding.severity),
                "message": { "text": finding.description },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": finding.origin.canonical_path() },
                        "region": {
                            "startLine": finding.line,
                            "startColumn": finding.column,
                        },
                    },
                }],
            })
        })
        .collect()
}

const fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}
