//! Asynchronous `git` CLI runner.
//!
//! Every call spawns one `git` process in the target directory and waits for
//! it under a per-call timeout. A process that outlives the timeout is killed.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::GitError;

/// Timeout applied to each `git` invocation unless configured otherwise.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured result of a finished `git` process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `git` subprocesses with fixed settings.
#[derive(Debug, Clone)]
pub struct GitRunner {
    binary: String,
    timeout: Duration,
    pin_locale: bool,
}

impl Default for GitRunner {
    fn default() -> Self {
        Self {
            binary: "git".into(),
            timeout: DEFAULT_GIT_TIMEOUT,
            pin_locale: true,
        }
    }
}

impl GitRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `git` executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether to force `LC_ALL=C` so that git's messages are not translated.
    pub fn with_pinned_locale(mut self, pin: bool) -> Self {
        self.pin_locale = pin;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Run `git <args>` in `dir` and capture its output.
    ///
    /// A non-zero exit is not an error here; callers classify it. Errors are
    /// reserved for spawn failures and timeouts.
    pub async fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if self.pin_locale {
            cmd.env("LC_ALL", "C");
        }

        debug!(dir = %dir.display(), cmd = %format!("git {}", args.join(" ")), "running git command");

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GitError::BinaryNotFound(self.binary.clone())
                } else {
                    GitError::IoError(e)
                }
            })?,
            Err(_) => {
                warn!(
                    dir = %dir.display(),
                    timeout_ms = self.timeout_ms(),
                    "git command timed out, process killed"
                );
                return Err(GitError::Timeout {
                    args: args.join(" "),
                    timeout_ms: self.timeout_ms(),
                });
            }
        };

        let result = GitOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success {
            debug!(exit_code = ?result.exit_code, stderr = %result.stderr.trim(), "git command exited unsuccessfully");
        }
        Ok(result)
    }

    /// Run `git <args>` and require a successful exit, returning stdout.
    pub async fn run_checked(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = self.run(dir, args).await?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(command_failed(args, &output))
        }
    }
}

/// Wrap an unsuccessful `git` run in [`GitError::CommandFailed`].
pub(crate) fn command_failed(args: &[&str], output: &GitOutput) -> GitError {
    let exit_code = output.exit_code.unwrap_or(-1);
    let stderr = output.stderr.trim().to_string();
    warn!(exit_code, %stderr, "git command failed");
    GitError::CommandFailed {
        args: args.join(" "),
        exit_code,
        stderr,
    }
}
