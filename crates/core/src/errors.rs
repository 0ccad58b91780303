//! Error types for the forgescope core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Repository resolution errors
// ---------------------------------------------------------------------------

/// Errors from inspecting a directory and its `.git/config`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The directory does not exist.
    #[error("directory not found: '{0}'")]
    DirectoryNotFound(String),

    /// The path exists but is not the root of a git working tree.
    #[error("'{path}' is not a git repository: {reason}")]
    NotGitRepository { path: String, reason: String },

    /// No `[remote]` section in the config carries a URL.
    #[error("no git remotes with a URL are configured in '{0}'")]
    NoRemotesConfigured(String),

    /// A remote URL did not match any supported form.
    #[error("unsupported remote URL '{0}': expected https://host/owner/repo, git@host:owner/repo or git://host/owner/repo")]
    InvalidRemoteUrl(String),

    /// A repository identifier was not in `owner/repo` form.
    #[error("invalid repository identifier '{0}': expected 'owner/repo'")]
    InvalidRepositoryId(String),

    /// An OS-level failure while reading repository metadata.
    #[error("failed to {operation} '{}': {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Git CLI errors
// ---------------------------------------------------------------------------

/// Errors from running the `git` executable.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` binary was not found on `$PATH`.
    #[error("git binary not found: {0}")]
    BinaryNotFound(String),

    /// A `git` command exited unsuccessfully for an unrecognised reason.
    #[error("`git {args}` failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        args: String,
        exit_code: i32,
        stderr: String,
    },

    /// A `git` command did not finish within the configured timeout and was killed.
    #[error("`git {args}` timed out after {timeout_ms}ms")]
    Timeout { args: String, timeout_ms: u64 },

    /// A command that must print something printed nothing.
    #[error("`git {args}` produced no output")]
    EmptyOutput { args: String },

    /// The command output could not be interpreted.
    #[error("unexpected output from `git {args}`: {detail}")]
    UnexpectedOutput { args: String, detail: String },

    /// Generic I/O wrapper (spawning, pipes).
    #[error("git I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
