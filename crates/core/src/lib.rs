//! forgescope core library.
//!
//! This crate inspects a local git working tree on behalf of a forge
//! pull-request workflow: it resolves the hosted repository a directory
//! belongs to, detects fork relationships between remotes, answers branch
//! questions, and predicts merge conflicts, all by reading `.git/config` and
//! driving the `git` executable.

pub mod config;
pub mod conflict;
pub mod errors;
pub mod git;
pub mod preflight;

// Re-exports for convenience.
pub use config::ForgescopeConfig;
pub use conflict::{ConflictAnalyzer, ConflictReport};
pub use errors::{ConfigError, CoreError, GitError, RepositoryError};
pub use git::{BranchInspector, ForkInfo, GitRunner, RepoSlug, RepositoryResolution};
pub use preflight::{Preflight, PreflightReport};
