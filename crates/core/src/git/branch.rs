//! Branch state queries over the `git` CLI.

use std::path::Path;

use tracing::{debug, instrument};

use super::classify::{classify, GitCommand, Outcome};
use super::runner::{command_failed, GitRunner};
use crate::errors::GitError;

/// Read-only branch queries: current branch, existence, ahead/behind.
#[derive(Debug, Clone, Default)]
pub struct BranchInspector {
    runner: GitRunner,
}

impl BranchInspector {
    pub fn new(runner: GitRunner) -> Self {
        Self { runner }
    }

    /// Name of the checked-out branch (`HEAD` when detached).
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn current_branch(&self, dir: &Path) -> Result<String, GitError> {
        let args = ["rev-parse", "--abbrev-ref", "HEAD"];
        let stdout = self.runner.run_checked(dir, &args).await?;
        let branch = stdout.trim();
        if branch.is_empty() {
            return Err(GitError::EmptyOutput {
                args: args.join(" "),
            });
        }
        debug!(branch, "current branch");
        Ok(branch.to_string())
    }

    /// Whether a local branch named `branch` exists.
    ///
    /// A missing branch is `Ok(false)`, not an error.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn branch_exists(&self, dir: &Path, branch: &str) -> Result<bool, GitError> {
        let refname = format!("refs/heads/{branch}");
        let args = ["rev-parse", "--verify", refname.as_str()];
        let output = self.runner.run(dir, &args).await?;

        match classify(GitCommand::RevParseVerify, &output) {
            Outcome::Completed => Ok(true),
            Outcome::MissingRef => {
                debug!(branch, "branch does not exist");
                Ok(false)
            }
            _ => Err(command_failed(&args, &output)),
        }
    }

    /// Number of commits reachable from `head` but not from `base`.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn commit_count(&self, dir: &Path, base: &str, head: &str) -> Result<u64, GitError> {
        let range = format!("{base}..{head}");
        let args = ["rev-list", "--count", range.as_str()];
        let stdout = self.runner.run_checked(dir, &args).await?;
        stdout
            .trim()
            .parse::<u64>()
            .map_err(|e| GitError::UnexpectedOutput {
                args: args.join(" "),
                detail: format!("expected a commit count, got '{}': {e}", stdout.trim()),
            })
    }

    /// Whether `head` is strictly behind `base`: `head` is an ancestor of
    /// `base` and `base` is not an ancestor of `head`.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn is_branch_behind(
        &self,
        dir: &Path,
        base: &str,
        head: &str,
    ) -> Result<bool, GitError> {
        if self.is_ancestor(dir, base, head).await? {
            return Ok(false);
        }
        let behind = self.is_ancestor(dir, head, base).await?;
        debug!(behind, "ancestry checked");
        Ok(behind)
    }

    async fn is_ancestor(&self, dir: &Path, ancestor: &str, descendant: &str) -> Result<bool, GitError> {
        let args = ["merge-base", "--is-ancestor", ancestor, descendant];
        let output = self.runner.run(dir, &args).await?;

        match classify(GitCommand::MergeBaseIsAncestor, &output) {
            Outcome::Completed => Ok(true),
            Outcome::NotAncestor => Ok(false),
            _ => Err(command_failed(&args, &output)),
        }
    }
}
