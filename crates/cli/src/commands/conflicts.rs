//! Merge conflict prediction.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use forgescope_core::conflict::{ConflictAnalyzer, ConflictReport};
use forgescope_core::git::GitRunner;

use super::print_json;
use crate::style;

/// Predict conflicts between two branches and print the report.
pub async fn run_conflicts(
    runner: GitRunner,
    dir: &Path,
    base: &str,
    head: &str,
    json: bool,
) -> Result<()> {
    let report = ConflictAnalyzer::new(runner)
        .report(dir, base, head)
        .await
        .with_context(|| format!("failed to check '{}' against '{}'", head, base))?;

    if json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

/// Human-readable rendering shared with `preflight`.
pub fn print_report(report: &ConflictReport) {
    if !report.has_conflicts {
        println!();
        println!("{}", style::success("No conflicts detected"));
        println!();
        return;
    }

    println!();
    println!(
        "{}",
        style::header(&format!(
            "Conflicts ({} file(s), {} total)",
            report.conflict_files.len(),
            report.total_conflicts
        ))
    );
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["File", "Type", "Markers", "Severity"]);

    for d in &report.conflict_details {
        let lines = d
            .lines
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&d.file),
            Cell::new(d.conflict_type.to_string()),
            Cell::new(if lines.is_empty() { "—".to_string() } else { lines }),
            Cell::new(style::severity(&d.severity.to_string())),
        ]);
    }

    println!("{}", table);
    println!();
    for action in &report.suggested_actions {
        println!("  {}", style::dim(&format!("• {}", action)));
    }
    println!();
}
