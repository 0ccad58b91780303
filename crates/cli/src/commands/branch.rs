//! `branch` subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use forgescope_core::git::{BranchInspector, GitRunner};

use super::print_json;
use crate::style;

pub async fn run_current(runner: GitRunner, dir: &Path, json: bool) -> Result<()> {
    let branch = BranchInspector::new(runner)
        .current_branch(dir)
        .await
        .context("failed to read current branch")?;

    if json {
        return print_json(&json!({ "branch": branch }));
    }
    println!("{}", branch);
    Ok(())
}

pub async fn run_exists(runner: GitRunner, dir: &Path, branch: &str, json: bool) -> Result<()> {
    let exists = BranchInspector::new(runner)
        .branch_exists(dir, branch)
        .await
        .with_context(|| format!("failed to look up branch '{}'", branch))?;

    if json {
        return print_json(&json!({ "branch": branch, "exists": exists }));
    }
    if exists {
        println!("{}", style::success(&format!("Branch '{}' exists", branch)));
    } else {
        println!("{}", style::error(&format!("Branch '{}' does not exist", branch)));
    }
    Ok(())
}

pub async fn run_count(
    runner: GitRunner,
    dir: &Path,
    base: &str,
    head: &str,
    json: bool,
) -> Result<()> {
    let count = BranchInspector::new(runner)
        .commit_count(dir, base, head)
        .await
        .with_context(|| format!("failed to count commits in {}..{}", base, head))?;

    if json {
        return print_json(&json!({ "base": base, "head": head, "commits": count }));
    }
    println!("{}", count);
    Ok(())
}

pub async fn run_behind(
    runner: GitRunner,
    dir: &Path,
    base: &str,
    head: &str,
    json: bool,
) -> Result<()> {
    let behind = BranchInspector::new(runner)
        .is_branch_behind(dir, base, head)
        .await
        .with_context(|| format!("failed to compare '{}' with '{}'", head, base))?;

    if json {
        return print_json(&json!({ "base": base, "head": head, "behind": behind }));
    }
    if behind {
        println!("{}", style::warn(&format!("'{}' is behind '{}'", head, base)));
    } else {
        println!("{}", style::success(&format!("'{}' is not behind '{}'", head, base)));
    }
    Ok(())
}
