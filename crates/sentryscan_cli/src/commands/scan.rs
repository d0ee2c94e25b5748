//! Scan command: runs the engine, applies the baseline, delivers alerts,
//! renders output, and maps the outcome to an exit code.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use sentryscan_alert::{Payload, WebhookDispatcher};
use sentryscan_core::prelude::*;
use sentryscan_core::{CONFIG_FILENAME, engine};

use crate::output::write_findings;
use crate::ui::{self, exit};
use crate::ScanArgs;

/// Executes the `sentryscan scan` command.
pub fn run(args: &ScanArgs) -> anyhow::Result<i32> {
    let config = build_config(args)?;
    let cancel = CancelToken::new();

    let result = engine::run(&config, &args.paths, &cancel).context("scan failed")?;

    for warning in &result.warnings {
        ui::print_warning(&warning.to_string());
    }

    let scan_root = args
        .paths
        .first()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let (findings, suppressed) = apply_baseline(&config, &scan_root, result.findings)?;

    if let Some(url) = &config.webhook_url
        && !findings.is_empty()
    {
        send_webhook(&config, url, &scan_root, &findings, &cancel);
    }

    write_report(args, &findings)?;

    Ok(exit_code(args, &config, &findings, suppressed))
}

/// Merges file, environment, and flag configuration in that precedence
/// order.
fn build_config(args: &ScanArgs) -> anyhow::Result<ScanConfig> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    let mut config = ScanConfig::load(&config_path).context("failed to load config")?;
    config.apply_env();

    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(max) = args.max_file_size {
        config.max_file_size = max;
    }
    if !args.include_ext.is_empty() {
        config.include_ext = args.include_ext.clone();
    }
    if !args.exclude_ext.is_empty() {
        config.exclude_ext = args.exclude_ext.clone();
    }
    if args.since.is_some() {
        config.since = args.since.clone();
    }
    if args.branch.is_some() {
        config.branch = args.branch.clone();
    }
    if args.commit_range.is_some() {
        config.commit_range = args.commit_range.clone();
    }
    if args.no_baseline {
        config.no_baseline = true;
    }
    if args.webhook_url.is_some() {
        config.webhook_url = args.webhook_url.clone();
    }
    if args.webhook_secret.is_some() {
        config.webhook_secret = args.webhook_secret.clone();
    }
    if let Some(severity) = args.severity {
        config.severity_threshold = severity;
    }

    Ok(config)
}

fn apply_baseline(
    config: &ScanConfig,
    scan_root: &Path,
    findings: Vec<Finding>,
) -> anyhow::Result<(Vec<Finding>, usize)> {
    if config.no_baseline {
        return Ok((findings, 0));
    }

    let baseline = Baseline::load(scan_root).context("failed to load baseline")?;
    Ok(baseline.filter(findings))
}

/// Delivers the alert; a failed delivery is reported but never aborts a
/// scan that already produced findings.
fn send_webhook(
    config: &ScanConfig,
    url: &str,
    scan_root: &Path,
    findings: &[Finding],
    cancel: &CancelToken,
) {
    let secret = config.webhook_secret.clone().unwrap_or_default();

    let dispatcher = match WebhookDispatcher::new(url, secret) {
        Ok(dispatcher) => dispatcher,
        Err(err) => {
            ui::print_warning(&format!("webhook delivery failed: {err}"));
            return;
        }
    };

    let mut payload = Payload::new(
        format!("run-{}", chrono::Utc::now().timestamp()),
        format!("Found {} security findings", findings.len()),
        findings.to_vec(),
        scan_root.display().to_string(),
        config.branch.clone().unwrap_or_default(),
    );

    if let Err(err) = dispatcher.send(&mut payload, cancel) {
        ui::print_warning(&format!("webhook delivery failed: {err}"));
    }
}

fn write_report(args: &ScanArgs, findings: &[Finding]) -> anyhow::Result<()> {
    match &args.out {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create output file '{}'", path.display()))?;
            write_findings(findings, args.format, &mut file)
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_findings(findings, args.format, &mut lock)?;
            lock.flush().ok();
            Ok(())
        }
    }
}

fn exit_code(args: &ScanArgs, config: &ScanConfig, findings: &[Finding], suppressed: usize) -> i32 {
    if args.no_fail {
        return exit::OK;
    }

    let actionable = findings
        .iter()
        .filter(|f| f.severity >= config.severity_threshold)
        .count();

    if actionable > 0 {
        return exit::FINDINGS;
    }
    if suppressed > 0 && findings.is_empty() {
        return exit::SUPPRESSED;
    }
    exit::OK
}
