//! `resolve` and `remotes`.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;

use forgescope_core::git::{
    extract_all_remotes, parse_remote_url, resolve_repository, resolve_with_fork_info,
    validate_directory, ForkInfo, RepositoryResolution,
};

use super::print_json;
use crate::style;

#[derive(Serialize)]
struct ResolveOutput {
    #[serde(flatten)]
    resolution: RepositoryResolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    fork: Option<ForkInfo>,
}

#[derive(Serialize)]
struct RemoteRow {
    name: String,
    url: String,
    repository: Option<String>,
}

/// Resolve a directory to its hosted repository.
pub fn run_resolve(dir: &Path, forks: bool, json: bool) -> Result<()> {
    let output = if forks {
        let (resolution, fork) =
            resolve_with_fork_info(dir).context("failed to resolve repository")?;
        ResolveOutput {
            resolution,
            fork: Some(fork),
        }
    } else {
        ResolveOutput {
            resolution: resolve_repository(dir).context("failed to resolve repository")?,
            fork: None,
        }
    };

    if json {
        return print_json(&output);
    }

    let r = &output.resolution;
    println!();
    println!("{}", style::header(&r.repository.to_string()));
    println!();
    println!("  Directory : {}", r.directory.display());
    println!("  Remote    : {}", r.remote_name);
    println!("  URL       : {}", r.remote_url);

    if let Some(fork) = &output.fork {
        println!("  Fork      : {}", style::yes_no(fork.is_fork));
        if let Some(upstream) = fork.counterpart(&r.repository) {
            println!(
                "  Upstream  : {} (remote '{}')",
                upstream,
                fork.fork_remote.as_deref().unwrap_or("?")
            );
        }
    }
    println!();
    Ok(())
}

/// List every remote in config-file order.
pub fn run_remotes(dir: &Path, json: bool) -> Result<()> {
    validate_directory(dir).context("not a usable repository")?;
    let remotes = extract_all_remotes(dir).context("failed to read remotes")?;

    let rows: Vec<RemoteRow> = remotes
        .into_iter()
        .map(|remote| RemoteRow {
            repository: parse_remote_url(&remote.url).ok().map(|s| s.to_string()),
            name: remote.name,
            url: remote.url,
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("{}", style::warn("No remotes configured"));
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Remote", "URL", "Repository"]);

    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(&row.url),
            Cell::new(row.repository.as_deref().unwrap_or("—")),
        ]);
    }

    println!("{}", table);
    Ok(())
}
