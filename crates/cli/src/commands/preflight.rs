//! `preflight`: every local check a pull request needs.

use std::path::Path;

use anyhow::{Context, Result};

use forgescope_core::git::GitRunner;
use forgescope_core::preflight::Preflight;

use super::conflicts::print_report;
use super::print_json;
use crate::style;

/// Run the checks and print the outcome. Returns whether the branch is ready.
pub async fn run_preflight(
    runner: GitRunner,
    dir: &Path,
    base: &str,
    head: Option<&str>,
    json: bool,
) -> Result<bool> {
    let report = Preflight::new(runner)
        .check(dir, base, head)
        .await
        .context("preflight failed")?;

    if json {
        print_json(&report)?;
        return Ok(report.is_ready());
    }

    println!();
    println!(
        "{}",
        style::header(&format!(
            "{} → {}:{}",
            report.head,
            report.target_repository(),
            report.base
        ))
    );
    println!();
    println!("  Repository : {}", report.resolution.repository);
    if report.fork.is_fork {
        println!(
            "  Fork of    : {} (remote '{}')",
            report.target_repository(),
            report.fork.fork_remote.as_deref().unwrap_or("?")
        );
    }
    if let Some(ahead) = report.commits_ahead {
        println!("  Commits    : {}", ahead);
    }
    if let Some(behind) = report.head_behind_base {
        println!("  Behind base: {}", style::yes_no(behind));
    }

    if let Some(conflicts) = &report.conflicts {
        print_report(conflicts);
    } else {
        println!();
    }

    if report.is_ready() {
        println!("{}", style::success("Ready to open a pull request"));
    } else {
        for blocker in &report.blockers {
            println!("{}", style::error(&blocker.to_string()));
        }
    }
    println!();

    Ok(report.is_ready())
}
