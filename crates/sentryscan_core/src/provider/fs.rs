//! Filesystem source provider.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use ignore::WalkBuilder;
use tracing::debug;

use super::{ScanEvent, SourceItem, emit_warning};
use crate::cancel::CancelToken;
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanWarning, WarningKind};
use crate::finding::Origin;

/// Maximum directory depth a walk may descend.
const MAX_WALK_DEPTH: usize = 256;

/// Maximum number of hops when resolving a symlink chain.
const MAX_SYMLINK_HOPS: usize = 8;

/// Identity of a resolved symlink target, used to skip repeats.
#[cfg(unix)]
type TargetId = (u64, u64);
#[cfg(not(unix))]
type TargetId = PathBuf;

/// Walks one filesystem root and feeds scannable files to the work queue.
///
/// Policy: extension include/exclude filters, hidden-entry skipping (the
/// root itself is exempt), a per-file size cap, symlinks followed at most
/// once per walk with escape and cycle guards, and per-file errors that
/// never abort the walk. Any other I/O failure aborts this root only.
#[derive(Debug)]
pub struct FsProvider<'a> {
    config: &'a ScanConfig,
    root: &'a Path,
}

impl<'a> FsProvider<'a> {
    /// Creates a provider for one scan root.
    #[must_use]
    pub fn new(config: &'a ScanConfig, root: &'a Path) -> Self {
        Self { config, root }
    }

    /// Runs the walk to completion, early return on cancellation, or a
    /// fatal error for this root.
    pub fn run(
        &self,
        work: &Sender<SourceItem>,
        events: &Sender<ScanEvent>,
        cancel: &CancelToken,
    ) -> Result<(), ScanError> {
        let canonical_root = self.root.canonicalize().map_err(|_| ScanError::RootNotFound {
            path: self.root.to_path_buf(),
        })?;

        let walker = WalkBuilder::new(self.root)
            .standard_filters(false)
            .hidden(self.config.skip_hidden)
            .follow_links(true)
            .max_depth(Some(MAX_WALK_DEPTH))
            .build();

        let mut visited_targets: HashSet<TargetId> = HashSet::new();

        for entry in walker {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.report_walk_error(&err, events)?;
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if !self.extension_allowed(path) {
                continue;
            }

            if entry.path_is_symlink() {
                match self.resolve_symlink(path, &canonical_root, &mut visited_targets, events) {
                    SymlinkVerdict::Scan => {}
                    SymlinkVerdict::Skip => continue,
                }
            }

            self.read_and_send(path, &canonical_root, work, events)?;
        }

        Ok(())
    }

    /// Emits a warning for recoverable walk errors; anything else is fatal
    /// for this root.
    fn report_walk_error(
        &self,
        err: &ignore::Error,
        events: &Sender<ScanEvent>,
    ) -> Result<(), ScanError> {
        let path = walk_error_path(err)
            .unwrap_or(self.root)
            .display()
            .to_string();

        // `std::io::ErrorKind::FilesystemLoop` is unstable; ELOOP is its stable,
        // platform-specific equivalent (errno 40 on Linux, 62 on macOS/BSD).
        if is_loop_error(err)
            || err
                .io_error()
                .and_then(std::io::Error::raw_os_error)
                .is_some_and(|code| code == 40 || code == 62)
        {
            emit_warning(
                events,
                ScanWarning::new(WarningKind::SymlinkLoop, path, "symlink cycle detected"),
            );
            return Ok(());
        }

        match err.io_error().map(std::io::Error::kind) {
            Some(std::io::ErrorKind::PermissionDenied) => {
                emit_warning(
                    events,
                    ScanWarning::new(WarningKind::PermissionDenied, path, "permission denied"),
                );
                Ok(())
            }
            Some(std::io::ErrorKind::NotFound) => {
                emit_warning(
                    events,
                    ScanWarning::new(WarningKind::NotFound, path, "entry disappeared during walk"),
                );
                Ok(())
            }
            _ => Err(ScanError::Io {
                path: PathBuf::from(path),
                source: std::io::Error::other(err.to_string()),
            }),
        }
    }

    fn extension_allowed(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        if !self.config.include_ext.is_empty() && !self.config.include_ext.contains(&ext) {
            return false;
        }
        !self.config.exclude_ext.contains(&ext)
    }

    /// Checks a symlinked file's chain length, resolution target, and
    /// visited state.
    fn resolve_symlink(
        &self,
        path: &Path,
        canonical_root: &Path,
        visited: &mut HashSet<TargetId>,
        events: &Sender<ScanEvent>,
    ) -> SymlinkVerdict {
        if chain_length(path) > MAX_SYMLINK_HOPS {
            emit_warning(
                events,
                ScanWarning::new(
                    WarningKind::SymlinkLoop,
                    path.display().to_string(),
                    "symlink chain exceeds 8 hops",
                ),
            );
            return SymlinkVerdict::Skip;
        }

        let Ok(resolved) = path.canonicalize() else {
            emit_warning(
                events,
                ScanWarning::new(
                    WarningKind::NotFound,
                    path.display().to_string(),
                    "broken symlink",
                ),
            );
            return SymlinkVerdict::Skip;
        };

        if !resolved.starts_with(canonical_root) {
            emit_warning(
                events,
                ScanWarning::new(
                    WarningKind::PathEscape,
                    path.display().to_string(),
                    "resolved target leaves the scan root",
                ),
            );
            return SymlinkVerdict::Skip;
        }

        match target_id(&resolved) {
            Some(id) if !visited.insert(id) => {
                debug!(path = %path.display(), "skipping already-visited symlink target");
                SymlinkVerdict::Skip
            }
            _ => SymlinkVerdict::Scan,
        }
    }

    fn read_and_send(
        &self,
        path: &Path,
        canonical_root: &Path,
        work: &Sender<SourceItem>,
        events: &Sender<ScanEvent>,
    ) -> Result<(), ScanError> {
        let display = path.display().to_string();

        let len = match path.metadata() {
            Ok(meta) => meta.len(),
            Err(err) => return self.report_read_error(path, &err, events),
        };

        if len > self.config.max_file_size {
            emit_warning(
                events,
                ScanWarning::new(
                    WarningKind::Oversize,
                    display,
                    format!("{len} bytes exceeds cap of {}", self.config.max_file_size),
                ),
            );
            return Ok(());
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => return self.report_read_error(path, &err, events),
        };

        let origin = Origin::File {
            path: self.relative_path(path, canonical_root),
        };

        // A closed work queue means the scan is tearing down.
        let _ = work.send(SourceItem { origin, bytes });
        Ok(())
    }

    fn report_read_error(
        &self,
        path: &Path,
        err: &std::io::Error,
        events: &Sender<ScanEvent>,
    ) -> Result<(), ScanError> {
        // `std::io::ErrorKind::FilesystemLoop` is unstable; ELOOP is its stable,
        // platform-specific equivalent (errno 40 on Linux, 62 on macOS/BSD).
        if matches!(err.raw_os_error(), Some(40) | Some(62)) {
            emit_warning(
                events,
                ScanWarning::new(WarningKind::SymlinkLoop, path.display().to_string(), "symlink cycle detected"),
            );
            return Ok(());
        }

        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                emit_warning(
                    events,
                    ScanWarning::new(
                        WarningKind::PermissionDenied,
                        path.display().to_string(),
                        "permission denied",
                    ),
                );
                Ok(())
            }
            std::io::ErrorKind::NotFound => {
                emit_warning(
                    events,
                    ScanWarning::new(
                        WarningKind::NotFound,
                        path.display().to_string(),
                        "file disappeared before reading",
                    ),
                );
                Ok(())
            }
            _ => Err(ScanError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(err.kind(), err.to_string()),
            }),
        }
    }

    /// Root-relative forward-slash path used for origins and fingerprints.
    fn relative_path(&self, path: &Path, canonical_root: &Path) -> String {
        let relative = path
            .strip_prefix(self.root)
            .map(Path::to_path_buf)
            .or_else(|_| {
                path.canonicalize()
                    .unwrap_or_else(|_| path.to_path_buf())
                    .strip_prefix(canonical_root)
                    .map(Path::to_path_buf)
            })
            .unwrap_or_else(|_| path.to_path_buf());

        if relative.as_os_str().is_empty() {
            // The root itself was a file.
            return path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

enum SymlinkVerdict {
    Scan,
    Skip,
}

/// Number of read_link hops from `path` to a non-symlink, capped just past
/// the allowed maximum.
fn chain_length(path: &Path) -> usize {
    let mut current = path.to_path_buf();
    let mut hops = 0;

    while hops <= MAX_SYMLINK_HOPS {
        match std::fs::read_link(&current) {
            Ok(target) => {
                hops += 1;
                current = if target.is_absolute() {
                    target
                } else {
                    current.parent().map_or(target.clone(), |p| p.join(target))
                };
            }
            Err(_) => break,
        }
    }

    hops
}

#[cfg(unix)]
fn target_id(resolved: &Path) -> Option<TargetId> {
    use std::os::unix::fs::MetadataExt;
    resolved.metadata().ok().map(|m| (m.dev(), m.ino()))
}

#[cfg(not(unix))]
fn target_id(resolved: &Path) -> Option<TargetId> {
    Some(resolved.to_path_buf())
}

fn is_loop_error(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithPath { err, .. } | ignore::Error::WithDepth { err, .. } => {
            is_loop_error(err)
        }
        _ => false,
    }
}

fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } => walk_error_path(err),
        _ => None,
    }
}
