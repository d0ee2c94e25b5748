//! Source providers that enumerate byte streams for scanning.
//!
//! A provider walks one scan root and hands `(origin, bytes)` items to the
//! coordinator's bounded work queue; a slow matcher therefore stalls the
//! provider rather than dropping work. Recoverable per-file problems are
//! reported as [`ScanWarning`](crate::error::ScanWarning) events on the
//! same stream the workers use for findings.

mod fs;
mod git;

pub use fs::FsProvider;
pub use git::{GitProvider, RangeState};

use crossbeam_channel::Sender;

use crate::error::ScanWarning;
use crate::finding::{Finding, Origin};

/// A unit of work handed from a provider to the scan workers.
#[derive(Debug)]
pub struct SourceItem {
    /// Where the bytes came from.
    pub origin: Origin,
    /// The full content to scan, already capped by `max_file_size`.
    pub bytes: Vec<u8>,
}

/// Events flowing from providers and workers to the collector.
#[derive(Debug)]
pub enum ScanEvent {
    /// A finding produced by a worker.
    Finding(Finding),
    /// A recoverable problem recorded by a provider or worker.
    Warning(ScanWarning),
}

/// Sends a warning to the collector, ignoring a closed channel (which only
/// happens during cancellation teardown).
pub(crate) fn emit_warning(events: &Sender<ScanEvent>, warning: ScanWarning) {
    let _ = events.send(ScanEvent::Warning(warning));
}
