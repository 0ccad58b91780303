//! Classification of `git` exit status and messages.
//!
//! All knowledge of which git failures carry meaning lives in [`RULES`]. The
//! first rule matching the command, exit status and output wins. Patterns are
//! compared case-insensitively and must be written in lower case.

use super::runner::GitOutput;

/// The git commands whose failures can carry meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitCommand {
    /// `rev-parse --verify <ref>`
    RevParseVerify,
    /// `merge-base --is-ancestor <a> <b>`
    MergeBaseIsAncestor,
    /// `merge-tree <base> <head>`
    MergeTree,
    /// Anything else: only success or failure.
    Other,
}

/// What a finished git command means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The requested ref does not exist.
    MissingRef,
    /// The first commit is not an ancestor of the second.
    NotAncestor,
    /// The merge would conflict.
    Conflicts,
    /// An unrecognised failure.
    Failed,
}

#[derive(Debug, Clone, Copy)]
enum Exit {
    Success,
    Failure,
    Code(i32),
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    StderrEmpty,
    StderrContains(&'static str),
    StdoutContains(&'static str),
}

#[derive(Debug)]
struct Rule {
    command: GitCommand,
    exit: Exit,
    pattern: Pattern,
    outcome: Outcome,
}

const fn rule(command: GitCommand, exit: Exit, pattern: Pattern, outcome: Outcome) -> Rule {
    Rule {
        command,
        exit,
        pattern,
        outcome,
    }
}

/// Conflict markers as written by a three-way merge.
pub const CONFLICT_MARKERS: [&str; 3] = ["<<<<<<<", "=======", ">>>>>>>"];

static RULES: &[Rule] = &[
    // `rev-parse --verify` reports a missing ref in two wordings depending on
    // whether the argument looked like a path.
    rule(
        GitCommand::RevParseVerify,
        Exit::Failure,
        Pattern::StderrContains("unknown revision or path"),
        Outcome::MissingRef,
    ),
    rule(
        GitCommand::RevParseVerify,
        Exit::Failure,
        Pattern::StderrContains("needed a single revision"),
        Outcome::MissingRef,
    ),
    // `merge-base --is-ancestor` exits 1 silently when the answer is no.
    rule(
        GitCommand::MergeBaseIsAncestor,
        Exit::Code(1),
        Pattern::StderrEmpty,
        Outcome::NotAncestor,
    ),
    rule(
        GitCommand::MergeBaseIsAncestor,
        Exit::Failure,
        Pattern::StderrContains("is not an ancestor"),
        Outcome::NotAncestor,
    ),
    // Some git versions exit 0 and leave markers in the output.
    rule(
        GitCommand::MergeTree,
        Exit::Success,
        Pattern::StdoutContains(CONFLICT_MARKERS[0]),
        Outcome::Conflicts,
    ),
    rule(
        GitCommand::MergeTree,
        Exit::Success,
        Pattern::StdoutContains(CONFLICT_MARKERS[1]),
        Outcome::Conflicts,
    ),
    rule(
        GitCommand::MergeTree,
        Exit::Success,
        Pattern::StdoutContains(CONFLICT_MARKERS[2]),
        Outcome::Conflicts,
    ),
    rule(
        GitCommand::MergeTree,
        Exit::Failure,
        Pattern::StderrContains("merge conflict"),
        Outcome::Conflicts,
    ),
    rule(
        GitCommand::MergeTree,
        Exit::Failure,
        Pattern::StdoutContains(CONFLICT_MARKERS[0]),
        Outcome::Conflicts,
    ),
    rule(
        GitCommand::MergeTree,
        Exit::Failure,
        Pattern::StdoutContains(CONFLICT_MARKERS[1]),
        Outcome::Conflicts,
    ),
    rule(
        GitCommand::MergeTree,
        Exit::Failure,
        Pattern::StdoutContains(CONFLICT_MARKERS[2]),
        Outcome::Conflicts,
    ),
    // `--write-tree` mode (git 2.38+) exits 1 and lists CONFLICT messages.
    rule(
        GitCommand::MergeTree,
        Exit::Code(1),
        Pattern::StdoutContains("conflict ("),
        Outcome::Conflicts,
    ),
];

impl Exit {
    fn matches(self, output: &GitOutput) -> bool {
        match self {
            Exit::Success => output.success,
            Exit::Failure => !output.success,
            Exit::Code(code) => !output.success && output.exit_code == Some(code),
        }
    }
}

impl Pattern {
    fn matches(self, output: &GitOutput) -> bool {
        match self {
            Pattern::StderrEmpty => output.stderr.trim().is_empty(),
            Pattern::StderrContains(needle) => output.stderr.to_lowercase().contains(needle),
            Pattern::StdoutContains(needle) => output.stdout.to_lowercase().contains(needle),
        }
    }
}

/// Classify the output of `command`.
pub fn classify(command: GitCommand, output: &GitOutput) -> Outcome {
    RULES
        .iter()
        .filter(|r| r.command == command)
        .find(|r| r.exit.matches(output) && r.pattern.matches(output))
        .map(|r| r.outcome)
        .unwrap_or(if output.success {
            Outcome::Completed
        } else {
            Outcome::Failed
        })
}

/// Whether `text` contains any conflict marker.
pub fn contains_conflict_marker(text: &str) -> bool {
    CONFLICT_MARKERS.iter().any(|m| text.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(code: i32, stdout: &str, stderr: &str) -> GitOutput {
        GitOutput {
            exit_code: Some(code),
            success: code == 0,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    #[test]
    fn test_missing_ref_both_wordings() {
        let verify = out(128, "", "fatal: Needed a single revision\n");
        assert_eq!(classify(GitCommand::RevParseVerify, &verify), Outcome::MissingRef);

        let ambiguous = out(
            128,
            "",
            "fatal: ambiguous argument 'nope': unknown revision or path not in the working tree.\n",
        );
        assert_eq!(classify(GitCommand::RevParseVerify, &ambiguous), Outcome::MissingRef);
    }

    #[test]
    fn test_rev_parse_other_failure() {
        let output = out(128, "", "fatal: not a git repository (or any of the parent directories): .git\n");
        assert_eq!(classify(GitCommand::RevParseVerify, &output), Outcome::Failed);
    }

    #[test]
    fn test_is_ancestor_silent_exit_one() {
        assert_eq!(
            classify(GitCommand::MergeBaseIsAncestor, &out(1, "", "")),
            Outcome::NotAncestor
        );
        assert_eq!(
            classify(GitCommand::MergeBaseIsAncestor, &out(0, "", "")),
            Outcome::Completed
        );
    }

    #[test]
    fn test_is_ancestor_bad_revision_fails() {
        let output = out(128, "", "fatal: Not a valid object name nope\n");
        assert_eq!(classify(GitCommand::MergeBaseIsAncestor, &output), Outcome::Failed);
    }

    #[test]
    fn test_merge_tree_zero_exit_with_markers() {
        let output = out(0, "  <<<<<<< .our\n", "");
        assert_eq!(classify(GitCommand::MergeTree, &output), Outcome::Conflicts);
    }

    #[test]
    fn test_merge_tree_clean() {
        let output = out(0, "4b825dc642cb6eb9a060e54bf8d69288fbee4904\n", "");
        assert_eq!(classify(GitCommand::MergeTree, &output), Outcome::Completed);
    }

    #[test]
    fn test_merge_tree_write_tree_conflict() {
        let output = out(
            1,
            "abc\n100644 1111111111111111111111111111111111111111 1\tf.txt\n\nAuto-merging f.txt\nCONFLICT (content): Merge conflict in f.txt\n",
            "",
        );
        assert_eq!(classify(GitCommand::MergeTree, &output), Outcome::Conflicts);
    }

    #[test]
    fn test_merge_tree_stderr_conflict() {
        let output = out(1, "", "error: Merge conflict in src/lib.rs\n");
        assert_eq!(classify(GitCommand::MergeTree, &output), Outcome::Conflicts);
    }

    #[test]
    fn test_merge_tree_usage_error_fails() {
        let output = out(129, "", "usage: git merge-tree [--write-tree] [<options>] <branch1> <branch2>\n");
        assert_eq!(classify(GitCommand::MergeTree, &output), Outcome::Failed);
    }

    #[test]
    fn test_other_command() {
        assert_eq!(classify(GitCommand::Other, &out(0, "x", "")), Outcome::Completed);
        assert_eq!(classify(GitCommand::Other, &out(1, "", "")), Outcome::Failed);
    }

    #[test]
    fn test_contains_conflict_marker() {
        assert!(contains_conflict_marker("++<<<<<<< HEAD"));
        assert!(contains_conflict_marker("======="));
        assert!(!contains_conflict_marker("====== six"));
    }
}
