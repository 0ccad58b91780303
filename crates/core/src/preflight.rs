//! Local checks run before a pull request is opened.
//!
//! A [`Preflight`] check walks the same steps as the pull-request creation
//! flow up to, but not including, the call to the forge:
//!
//! 1. Resolve the directory to its repository and fork relationship.
//! 2. Pick the head branch (the checked-out one unless given).
//! 3. Verify both branches exist locally.
//! 4. Count the commits the head branch would contribute.
//! 5. Check that the head branch is not behind the base branch.
//! 6. Predict merge conflicts.
//!
//! Every failed check is recorded as a [`Blocker`]; checks after a missing
//! branch are skipped since they cannot run.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::conflict::{ConflictAnalyzer, ConflictReport};
use crate::errors::CoreError;
use crate::git::{resolve_with_fork_info, BranchInspector, ForkInfo, GitRunner, RepoSlug, RepositoryResolution};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why a pull request should not be opened yet.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Blocker {
    /// A branch does not exist locally.
    MissingBranch { branch: String },
    /// The head branch has no commits that the base lacks.
    NoNewCommits,
    /// The head branch is an ancestor of the base branch.
    HeadBehindBase,
    /// Merging would conflict.
    Conflicts { files: usize },
}

impl std::fmt::Display for Blocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBranch { branch } => write!(f, "branch '{branch}' does not exist"),
            Self::NoNewCommits => write!(f, "head branch has no commits ahead of base"),
            Self::HeadBehindBase => write!(f, "head branch is behind base branch"),
            Self::Conflicts { files } => write!(f, "merge would conflict in {files} file(s)"),
        }
    }
}

/// Result of a preflight check.
#[derive(Debug, Clone, Serialize)]
pub struct PreflightReport {
    pub resolution: RepositoryResolution,
    pub fork: ForkInfo,
    pub base: String,
    pub head: String,
    /// `None` when a branch was missing.
    pub commits_ahead: Option<u64>,
    pub head_behind_base: Option<bool>,
    pub conflicts: Option<ConflictReport>,
    pub blockers: Vec<Blocker>,
}

impl PreflightReport {
    pub fn is_ready(&self) -> bool {
        self.blockers.is_empty()
    }

    /// The repository a pull request should target: the upstream repository
    /// (`fork_owner/name`) when working from a fork, the resolved one otherwise.
    pub fn target_repository(&self) -> RepoSlug {
        self.fork
            .counterpart(&self.resolution.repository)
            .unwrap_or_else(|| self.resolution.repository.clone())
    }
}

// ---------------------------------------------------------------------------
// Checker
// ---------------------------------------------------------------------------

/// Runs the preflight steps with a shared [`GitRunner`] configuration.
#[derive(Debug, Clone, Default)]
pub struct Preflight {
    branches: BranchInspector,
    conflicts: ConflictAnalyzer,
}

impl Preflight {
    pub fn new(runner: GitRunner) -> Self {
        Self {
            branches: BranchInspector::new(runner.clone()),
            conflicts: ConflictAnalyzer::new(runner),
        }
    }

    #[instrument(skip(self, directory), fields(directory = %directory.display()))]
    pub async fn check(
        &self,
        directory: &Path,
        base: &str,
        head: Option<&str>,
    ) -> Result<PreflightReport, CoreError> {
        let (resolution, fork) = resolve_with_fork_info(directory)?;

        let head = match head {
            Some(h) => h.to_string(),
            None => self.branches.current_branch(directory).await?,
        };

        let mut report = PreflightReport {
            resolution,
            fork,
            base: base.to_string(),
            head,
            commits_ahead: None,
            head_behind_base: None,
            conflicts: None,
            blockers: Vec::new(),
        };

        for branch in [report.base.clone(), report.head.clone()] {
            if !self.branches.branch_exists(directory, &branch).await? {
                report.blockers.push(Blocker::MissingBranch { branch });
            }
        }
        if !report.blockers.is_empty() {
            warn!(blockers = report.blockers.len(), "preflight stopped: missing branch");
            return Ok(report);
        }

        let ahead = self
            .branches
            .commit_count(directory, &report.base, &report.head)
            .await?;
        if ahead == 0 {
            report.blockers.push(Blocker::NoNewCommits);
        }
        report.commits_ahead = Some(ahead);

        let behind = self
            .branches
            .is_branch_behind(directory, &report.base, &report.head)
            .await?;
        if behind {
            report.blockers.push(Blocker::HeadBehindBase);
        }
        report.head_behind_base = Some(behind);

        let conflicts = self
            .conflicts
            .report(directory, &report.base, &report.head)
            .await?;
        if conflicts.has_conflicts {
            report.blockers.push(Blocker::Conflicts {
                files: conflicts.conflict_files.len(),
            });
        }
        report.conflicts = Some(conflicts);

        info!(
            repository = %report.resolution.repository,
            base = %report.base,
            head = %report.head,
            ready = report.is_ready(),
            "preflight complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_for(directory: &Path) -> PreflightReport {
        let (resolution, fork) = resolve_with_fork_info(directory).unwrap();
        PreflightReport {
            resolution,
            fork,
            base: "main".into(),
            head: "feature".into(),
            commits_ahead: Some(2),
            head_behind_base: Some(false),
            conflicts: Some(ConflictReport::clean()),
            blockers: Vec::new(),
        }
    }

    fn repo_with_config(config: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git").join("config"), config).unwrap();
        dir
    }

    #[test]
    fn test_target_repository_of_fork() {
        let dir = repo_with_config(
            "[remote \"origin\"]\n\turl = git@h:acme/widgets.git\n[remote \"upstream\"]\n\turl = https://h/upstream-owner/widgets.git\n",
        );
        let report = report_for(dir.path());
        assert!(report.fork.is_fork);
        assert_eq!(report.resolution.repository.to_string(), "acme/widgets");
        assert_eq!(report.target_repository().to_string(), "upstream-owner/widgets");
    }

    #[test]
    fn test_target_repository_without_fork() {
        let dir = repo_with_config("[remote \"origin\"]\n\turl = git@h:acme/widgets.git\n");
        let report = report_for(dir.path());
        assert_eq!(report.target_repository().to_string(), "acme/widgets");
        assert!(report.is_ready());
    }

    #[test]
    fn test_blocker_display_and_json() {
        let blocker = Blocker::MissingBranch {
            branch: "feature".into(),
        };
        assert_eq!(blocker.to_string(), "branch 'feature' does not exist");
        let json = serde_json::to_value(&blocker).unwrap();
        assert_eq!(json["kind"], "missing_branch");
        assert_eq!(json["branch"], "feature");
    }
}
