//! Git-history source provider.

use std::collections::HashSet;
use std::path::Path;

use crossbeam_channel::Sender;
use gix::bstr::ByteSlice as _;
use tracing::debug;

use super::{ScanEvent, SourceItem, emit_warning};
use crate::cancel::CancelToken;
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanWarning, WarningKind};
use crate::finding::Origin;

/// Progress of a history walk.
///
/// `Unresolved → Resolved → Iterating → Done` on success; any failure or
/// cancellation lands in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeState {
    /// Selectors have not been resolved to commits yet.
    Unresolved,
    /// Endpoints resolved and validated.
    Resolved,
    /// Blobs are being yielded.
    Iterating,
    /// The walk finished.
    Done,
    /// The walk aborted, through an error or cancellation.
    Failed,
}

/// A file added, modified, or rewritten in a commit.
struct ChangedFile {
    path: String,
    blob_id: gix::ObjectId,
}

enum Completion {
    Finished,
    Cancelled,
}

/// Enumerates blobs from a repository's history according to the configured
/// selectors.
///
/// `commit_range` walks `from..to` (rejecting inverted ranges by committer
/// time), `since` walks `since..HEAD`, `branch` yields the tip tree of the
/// named ref, and with no selector the HEAD tree is yielded once. Each
/// `(commit, path, blob)` is emitted at most once, deduped by blob object
/// id. Binary blobs are emitted; the matcher skips them.
#[derive(Debug)]
pub struct GitProvider<'a> {
    config: &'a ScanConfig,
    root: &'a Path,
    state: RangeState,
}

impl<'a> GitProvider<'a> {
    /// Creates a provider for one repository root.
    #[must_use]
    pub fn new(config: &'a ScanConfig, root: &'a Path) -> Self {
        Self {
            config,
            root,
            state: RangeState::Unresolved,
        }
    }

    /// The current walk state; `Done` or `Failed` after [`run`](Self::run).
    #[must_use]
    pub const fn state(&self) -> RangeState {
        self.state
    }

    /// Runs the walk to completion, early return on cancellation, or a
    /// fatal error for this root.
    pub fn run(
        &mut self,
        work: &Sender<SourceItem>,
        events: &Sender<ScanEvent>,
        cancel: &CancelToken,
    ) -> Result<(), ScanError> {
        match self.walk(work, events, cancel) {
            Ok(Completion::Finished) => {
                self.state = RangeState::Done;
                Ok(())
            }
            Ok(Completion::Cancelled) => {
                self.state = RangeState::Failed;
                Ok(())
            }
            Err(err) => {
                self.state = RangeState::Failed;
                Err(err)
            }
        }
    }

    fn walk(
        &mut self,
        work: &Sender<SourceItem>,
        events: &Sender<ScanEvent>,
        cancel: &CancelToken,
    ) -> Result<Completion, ScanError> {
        let repo = gix::open(self.root).map_err(|err| self.git_error(err.to_string()))?;

        if let Some(range) = self.config.commit_range.clone() {
            let Some((from, to)) = range.split_once("..") else {
                return Err(self.git_error(format!("invalid commit range '{range}', expected from..to")));
            };

            let from_id = self.resolve_rev(&repo, from)?;
            let to_id = self.resolve_rev(&repo, to)?;

            if self.committer_time(&repo, from_id)? > self.committer_time(&repo, to_id)? {
                return Err(ScanError::InvalidRange {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            self.state = RangeState::Resolved;

            let commits = self.collect_commits(&repo, to_id, Some(from_id))?;
            self.emit_commit_changes(&repo, &commits, work, events, cancel)
        } else if let Some(since) = &self.config.since {
            let from_id = self.resolve_rev(&repo, since)?;
            let head = self.head_id(&repo)?;
            self.state = RangeState::Resolved;

            let commits = self.collect_commits(&repo, head, Some(from_id))?;
            self.emit_commit_changes(&repo, &commits, work, events, cancel)
        } else if let Some(branch) = &self.config.branch {
            let tip = self.resolve_branch(&repo, branch)?;
            self.state = RangeState::Resolved;

            self.emit_tree_files(&repo, tip, work, events, cancel)
        } else {
            let head = self.head_id(&repo)?;
            self.state = RangeState::Resolved;

            self.emit_tree_files(&repo, head, work, events, cancel)
        }
    }

    /// Yields the changed files of each commit, newest first, deduped by
    /// blob id.
    fn emit_commit_changes(
        &mut self,
        repo: &gix::Repository,
        commits: &[gix::ObjectId],
        work: &Sender<SourceItem>,
        events: &Sender<ScanEvent>,
        cancel: &CancelToken,
    ) -> Result<Completion, ScanError> {
        self.state = RangeState::Iterating;
        let mut seen_blobs: HashSet<gix::ObjectId> = HashSet::new();

        for &commit_id in commits {
            if cancel.is_cancelled() {
                return Ok(Completion::Cancelled);
            }

            for file in self.commit_changes(repo, commit_id) {
                if cancel.is_cancelled() {
                    return Ok(Completion::Cancelled);
                }
                if !seen_blobs.insert(file.blob_id) {
                    continue;
                }
                self.emit_blob(repo, commit_id, &file, work, events);
            }
        }

        Ok(Completion::Finished)
    }

    /// Yields every file of the commit's tree once, via a diff against the
    /// empty tree.
    fn emit_tree_files(
        &mut self,
        repo: &gix::Repository,
        commit_id: gix::ObjectId,
        work: &Sender<SourceItem>,
        events: &Sender<ScanEvent>,
        cancel: &CancelToken,
    ) -> Result<Completion, ScanError> {
        let commit = repo
            .find_commit(commit_id)
            .map_err(|err| self.git_error(err.to_string()))?;
        let tree = commit.tree().map_err(|err| self.git_error(err.to_string()))?;
        let empty = repo.empty_tree();

        self.state = RangeState::Iterating;
        let mut seen_blobs: HashSet<gix::ObjectId> = HashSet::new();

        for file in Self::diff_trees(&empty, &tree) {
            if cancel.is_cancelled() {
                return Ok(Completion::Cancelled);
            }
            if !seen_blobs.insert(file.blob_id) {
                continue;
            }
            self.emit_blob(repo, commit_id, &file, work, events);
        }

        Ok(Completion::Finished)
    }

    fn emit_blob(
        &self,
        repo: &gix::Repository,
        commit_id: gix::ObjectId,
        file: &ChangedFile,
        work: &Sender<SourceItem>,
        events: &Sender<ScanEvent>,
    ) {
        let Ok(blob) = repo.find_blob(file.blob_id) else {
            debug!(path = %file.path, "blob not readable, skipping");
            return;
        };

        let len = blob.data.len() as u64;
        if len > self.config.max_file_size {
            emit_warning(
                events,
                ScanWarning::new(
                    WarningKind::Oversize,
                    file.path.clone(),
                    format!("{len} bytes exceeds cap of {}", self.config.max_file_size),
                ),
            );
            return;
        }

        let origin = Origin::GitBlob {
            repo: self.root.display().to_string(),
            commit: commit_id.to_string(),
            path: file.path.clone(),
        };

        // A closed work queue means the scan is tearing down.
        let _ = work.send(SourceItem {
            origin,
            bytes: blob.data.clone(),
        });
    }

    /// Walks the commit graph from `tip`, stopping before `stop_at`.
    fn collect_commits(
        &self,
        repo: &gix::Repository,
        tip: gix::ObjectId,
        stop_at: Option<gix::ObjectId>,
    ) -> Result<Vec<gix::ObjectId>, ScanError> {
        let walk = repo
            .rev_walk([tip])
            .sorting(gix::traverse::commit::simple::Sorting::ByCommitTimeNewestFirst);

        let mut commits = Vec::new();
        for info in walk
            .all()
            .map_err(|err| self.git_error(format!("failed to start revision walk: {err}")))?
            .flatten()
        {
            if stop_at.is_some_and(|id| info.id == id) {
                break;
            }
            commits.push(info.id);
        }

        Ok(commits)
    }

    /// Files added or modified in the commit, by diffing against its first
    /// parent tree (the empty tree for root commits).
    fn commit_changes(&self, repo: &gix::Repository, commit_id: gix::ObjectId) -> Vec<ChangedFile> {
        let Ok(commit) = repo.find_commit(commit_id) else {
            return Vec::new();
        };
        let Ok(tree) = commit.tree() else {
            return Vec::new();
        };

        let parent_tree = commit
            .parent_ids()
            .next()
            .and_then(|pid| repo.find_commit(pid).ok())
            .and_then(|parent| parent.tree().ok());
        let from_tree = parent_tree.unwrap_or_else(|| repo.empty_tree());

        Self::diff_trees(&from_tree, &tree)
    }

    fn diff_trees(from: &gix::Tree<'_>, to: &gix::Tree<'_>) -> Vec<ChangedFile> {
        let Ok(mut changes) = from.changes() else {
            return Vec::new();
        };
        changes.track_path();

        let mut entries = Vec::new();

        let _ = changes.for_each_to_obtain_tree(to, |change| {
            use gix::object::tree::diff::change::Event;

            let location = change.location;
            match change.event {
                Event::Addition { id, .. } | Event::Modification { id, .. } | Event::Rewrite { id, .. } => {
                    entries.push(ChangedFile {
                        path: location.to_str_lossy().into_owned(),
                        blob_id: id.detach(),
                    });
                }
                Event::Deletion { .. } => {}
            }

            Ok::<_, std::convert::Infallible>(gix::object::tree::diff::Action::Continue)
        });

        entries
    }

    fn resolve_rev(&self, repo: &gix::Repository, rev: &str) -> Result<gix::ObjectId, ScanError> {
        repo.rev_parse_single(rev)
            .map(gix::Id::detach)
            .map_err(|_| self.git_error(format!("cannot resolve '{rev}'")))
    }

    fn resolve_branch(&self, repo: &gix::Repository, branch: &str) -> Result<gix::ObjectId, ScanError> {
        let refname = format!("refs/heads/{branch}");
        let reference = repo
            .find_reference(&refname)
            .map_err(|_| self.git_error(format!("branch '{branch}' not found")))?;
        Ok(reference.id().detach())
    }

    fn head_id(&self, repo: &gix::Repository) -> Result<gix::ObjectId, ScanError> {
        repo.head_id()
            .map(gix::Id::detach)
            .map_err(|err| self.git_error(format!("no HEAD: {err}")))
    }

    fn committer_time(&self, repo: &gix::Repository, id: gix::ObjectId) -> Result<i64, ScanError> {
        let commit = repo
            .find_commit(id)
            .map_err(|err| self.git_error(err.to_string()))?;
        let time = commit
            .time()
            .map_err(|err| self.git_error(err.to_string()))?;
        Ok(time.seconds)
    }

    fn git_error(&self, message: String) -> ScanError {
        ScanError::Git {
            repo: self.root.to_path_buf(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_starts_unresolved() {
        let config = ScanConfig::default();
        let provider = GitProvider::new(&config, Path::new("."));
        assert_eq!(provider.state(), RangeState::Unresolved);
    }

    #[test]
    fn run_against_a_non_repository_fails_with_git_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ScanConfig::default();
        let mut provider = GitProvider::new(&config, dir.path());

        let (work_tx, _work_rx) = crossbeam_channel::unbounded();
        let (event_tx, _event_rx) = crossbeam_channel::unbounded();

        let result = provider.run(&work_tx, &event_tx, &CancelToken::new());

        assert!(matches!(result, Err(ScanError::Git { .. })));
        assert_eq!(provider.state(), RangeState::Failed);
    }
}
