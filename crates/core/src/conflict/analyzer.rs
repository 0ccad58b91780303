//! Merge conflict prediction with `git merge-tree`.
//!
//! The merge is computed entirely in the object database; neither the
//! working tree nor the index is touched.

use std::path::Path;

use tracing::{debug, info, instrument};

use super::parser::{analyze_conflict_output, parse_write_tree_output, scan_markers};
use super::report::{create_conflict_detail, ConflictDetail, ConflictReport};
use crate::errors::GitError;
use crate::git::classify::{classify, GitCommand, Outcome};
use crate::git::runner::{command_failed, GitRunner};

/// Predicts whether merging `head` into `base` would conflict.
#[derive(Debug, Clone, Default)]
pub struct ConflictAnalyzer {
    runner: GitRunner,
}

impl ConflictAnalyzer {
    pub fn new(runner: GitRunner) -> Self {
        Self { runner }
    }

    /// Dry-run the merge of `base` and `head` and report any conflicts.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn report(&self, dir: &Path, base: &str, head: &str) -> Result<ConflictReport, GitError> {
        // Unquoted non-ASCII paths, so they can be looked up in the merged tree.
        let args = ["-c", "core.quotePath=false", "merge-tree", base, head];
        let output = self.runner.run(dir, &args).await?;

        match classify(GitCommand::MergeTree, &output) {
            Outcome::Completed => {
                debug!("merge applies cleanly");
                Ok(ConflictReport::clean())
            }
            Outcome::Conflicts => {
                let details = self.analyze(dir, &output.stdout).await?;
                if details.is_empty() {
                    return Err(GitError::UnexpectedOutput {
                        args: args.join(" "),
                        detail: "merge reported conflicts but no conflicted files could be identified"
                            .into(),
                    });
                }
                let report = ConflictReport::from_details(details);
                info!(
                    files = report.conflict_files.len(),
                    total = report.total_conflicts,
                    "merge conflicts predicted"
                );
                Ok(report)
            }
            _ => Err(command_failed(&args, &output)),
        }
    }

    /// `(has_conflicts, conflict_files)` of [`ConflictAnalyzer::report`].
    pub async fn has_conflicts(
        &self,
        dir: &Path,
        base: &str,
        head: &str,
    ) -> Result<(bool, Vec<String>), GitError> {
        let report = self.report(dir, base, head).await?;
        Ok((report.has_conflicts, report.conflict_files))
    }

    async fn analyze(&self, dir: &Path, stdout: &str) -> Result<Vec<ConflictDetail>, GitError> {
        let details = analyze_conflict_output(stdout);
        if !details.is_empty() {
            return Ok(details);
        }

        let Some(parsed) = parse_write_tree_output(stdout) else {
            return Ok(Vec::new());
        };

        let mut details = Vec::with_capacity(parsed.files.len());
        for file in parsed.files {
            let (lines, markers) = self.merged_markers(dir, &parsed.tree, &file.path).await?;
            details.push(create_conflict_detail(file.path, lines, markers, file.conflict_type));
        }
        Ok(details)
    }

    /// Marker lines of `path` inside the merged tree.
    async fn merged_markers(
        &self,
        dir: &Path,
        tree: &str,
        path: &str,
    ) -> Result<(Vec<usize>, Vec<String>), GitError> {
        let object = format!("{tree}:{path}");
        let output = self.runner.run(dir, &["cat-file", "-p", &object]).await?;
        if !output.success {
            // Deleted on one side: nothing was left in the merged tree.
            debug!(path, "no merged blob for conflicted path");
            return Ok((Vec::new(), Vec::new()));
        }
        Ok(scan_markers(&output.stdout))
    }
}
