//! Baseline command: record current findings as accepted, or list what is
//! already suppressed.

use std::path::PathBuf;

use anyhow::Context as _;
use sentryscan_core::prelude::*;
use sentryscan_core::{CONFIG_FILENAME, engine};

use crate::ui::{self, colors, exit, indicators};
use crate::{BaselineAddArgs, BaselineArgs, BaselineCommand, BaselineListArgs};

/// Executes the `sentryscan baseline` command.
pub fn run(args: &BaselineArgs) -> anyhow::Result<i32> {
    match &args.command {
        BaselineCommand::Add(add_args) => add(add_args),
        BaselineCommand::List(list_args) => list(list_args),
    }
}

/// Scans the given paths and records every current finding, then saves the
/// baseline atomically into the first path.
fn add(args: &BaselineAddArgs) -> anyhow::Result<i32> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let mut config = ScanConfig::load(&config_path).context("failed to load config")?;
    config.apply_env();

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

    let mut baseline = Baseline::load(&scan_root).context("failed to load baseline")?;

    let mut added = 0usize;
    for finding in &result.findings {
        match baseline.add(finding) {
            Ok(()) => added += 1,
            Err(BaselineError::Duplicate { .. }) => {}
            Err(err) => return Err(err.into()),
        }
    }

    baseline.save(&scan_root).context("failed to save baseline")?;

    println!(
        "{} added {} {} to baseline ({} total)",
        colors::success().apply_to(indicators::SUCCESS),
        added,
        if added == 1 { "finding" } else { "findings" },
        baseline.len(),
    );

    Ok(exit::OK)
}

fn list(args: &BaselineListArgs) -> anyhow::Result<i32> {
    let baseline = Baseline::load(&args.path).context("failed to load baseline")?;

    if baseline.is_empty() {
        println!("baseline is empty");
        return Ok(exit::OK);
    }

    for entry in &baseline.findings {
        println!(
            "{}: {}:{} {}",
            entry.rule_id,
            entry.path,
            entry.line,
            colors::muted().apply_to(entry.fingerprint.as_str()),
        );
    }

    Ok(exit::OK)
}
