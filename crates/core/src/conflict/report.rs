//! Conflict report types, severity ranking and remediation suggestions.

use serde::Serialize;

/// Message carried by every report without conflicts.
pub const READY_TO_MERGE: &str = "No conflicts detected - branches are ready for merge";

/// Marker lines above which a file's conflicts rank as high severity.
const HIGH_SEVERITY_LINES: usize = 10;
/// Marker lines at or below which a file's conflicts rank as low severity.
const LOW_SEVERITY_LINES: usize = 3;

/// Suggest rebasing once a merge has more conflicts than this.
const REBASE_SUGGESTION_THRESHOLD: usize = 5;

/// Categorisation of a conflicted file, as annotated by git.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Both sides changed overlapping content.
    Content,
    /// Both sides added a file at the same path.
    AddAdd,
    /// One side modified the file, the other deleted it.
    DeleteModify,
    /// A rename on one side collides with the other side.
    Rename,
    /// Any other kind git reports.
    Other,
}

impl ConflictType {
    /// Map the `<kind>` of a `CONFLICT (<kind>)` message.
    pub fn from_git_kind(kind: &str) -> Self {
        match kind.trim() {
            "content" => Self::Content,
            "add/add" => Self::AddAdd,
            "modify/delete" | "delete/modify" => Self::DeleteModify,
            k if k.starts_with("rename") => Self::Rename,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for ConflictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::AddAdd => write!(f, "add_add"),
            Self::DeleteModify => write!(f, "delete_modify"),
            Self::Rename => write!(f, "rename"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Rank by the number of conflict marker lines in a file.
    pub fn from_line_count(lines: usize) -> Self {
        if lines > HIGH_SEVERITY_LINES {
            Self::High
        } else if lines <= LOW_SEVERITY_LINES {
            Self::Low
        } else {
            Self::Medium
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Conflicts found in one file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConflictDetail {
    pub file: String,
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    /// 1-based line numbers of the marker lines.
    pub lines: Vec<usize>,
    /// Trimmed text of each marker line.
    pub markers: Vec<String>,
    pub severity: Severity,
}

/// Predicted outcome of merging two branches.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub conflict_files: Vec<String>,
    pub conflict_details: Vec<ConflictDetail>,
    pub total_conflicts: usize,
    pub suggested_actions: Vec<String>,
}

impl ConflictReport {
    /// A report for a merge that applies cleanly.
    pub fn clean() -> Self {
        Self {
            has_conflicts: false,
            conflict_files: Vec::new(),
            conflict_details: Vec::new(),
            total_conflicts: 0,
            suggested_actions: generate_conflict_suggestions(0, 0),
        }
    }

    /// Build a report from per-file details.
    pub fn from_details(details: Vec<ConflictDetail>) -> Self {
        if details.is_empty() {
            return Self::clean();
        }
        let conflict_files: Vec<String> = details.iter().map(|d| d.file.clone()).collect();
        // Marker-less conflicts (e.g. delete/modify) still count once.
        let total_conflicts = details.iter().map(|d| d.lines.len().max(1)).sum();
        let suggested_actions = generate_conflict_suggestions(total_conflicts, conflict_files.len());

        Self {
            has_conflicts: true,
            conflict_files,
            conflict_details: details,
            total_conflicts,
            suggested_actions,
        }
    }
}

pub fn create_conflict_detail(
    file: impl Into<String>,
    lines: Vec<usize>,
    markers: Vec<String>,
    conflict_type: ConflictType,
) -> ConflictDetail {
    let severity = Severity::from_line_count(lines.len());
    ConflictDetail {
        file: file.into(),
        conflict_type,
        lines,
        markers,
        severity,
    }
}

/// Remediation advice for a merge with `total_conflicts` conflicts across
/// `file_count` files.
pub fn generate_conflict_suggestions(total_conflicts: usize, file_count: usize) -> Vec<String> {
    if total_conflicts == 0 {
        return vec![READY_TO_MERGE.to_string()];
    }

    let mut suggestions = Vec::new();
    if file_count == 1 {
        suggestions.push("Review and resolve the conflicting changes in the affected file manually".to_string());
    } else if file_count > 1 {
        suggestions.push(format!(
            "Resolve conflicts in each of the {file_count} affected files individually"
        ));
    }
    suggestions.push(
        "Use 'git merge-base' to find the common ancestor and understand both sides of each change"
            .to_string(),
    );
    suggestions.push("Run the test suite after resolving conflicts".to_string());
    if total_conflicts > REBASE_SUGGESTION_THRESHOLD {
        suggestions.push(
            "Consider rebasing the head branch onto the base branch to resolve conflicts commit by commit"
                .to_string(),
        );
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(Severity::from_line_count(0), Severity::Low);
        assert_eq!(Severity::from_line_count(2), Severity::Low);
        assert_eq!(Severity::from_line_count(3), Severity::Low);
        assert_eq!(Severity::from_line_count(4), Severity::Medium);
        assert_eq!(Severity::from_line_count(10), Severity::Medium);
        assert_eq!(Severity::from_line_count(11), Severity::High);
    }

    #[test]
    fn test_clean_report_has_single_suggestion() {
        let report = ConflictReport::clean();
        assert!(!report.has_conflicts);
        assert_eq!(report.suggested_actions, vec![READY_TO_MERGE.to_string()]);
        assert!(report.suggested_actions[0].ends_with("ready for merge"));
    }

    #[test]
    fn test_from_empty_details_is_clean() {
        assert_eq!(ConflictReport::from_details(Vec::new()), ConflictReport::clean());
    }

    #[test]
    fn test_single_file_suggestions() {
        let suggestions = generate_conflict_suggestions(3, 1);
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[0].contains("manually"));
        assert!(suggestions.iter().any(|s| s.contains("merge-base")));
        assert!(!suggestions.iter().any(|s| s.contains("rebasing")));
    }

    #[test]
    fn test_many_conflicts_suggest_rebase() {
        let suggestions = generate_conflict_suggestions(9, 3);
        assert!(suggestions[0].contains("3 affected files"));
        assert!(suggestions.last().unwrap().contains("rebasing"));
    }

    #[test]
    fn test_report_totals() {
        let report = ConflictReport::from_details(vec![
            create_conflict_detail("a.rs", vec![1, 3, 5], vec!["<<<<<<<".to_string(); 3], ConflictType::Content),
            create_conflict_detail("b.rs", Vec::new(), Vec::new(), ConflictType::DeleteModify),
        ]);
        assert!(report.has_conflicts);
        assert_eq!(report.conflict_files, vec!["a.rs", "b.rs"]);
        assert_eq!(report.total_conflicts, 4);
        assert_eq!(report.conflict_details[0].severity, Severity::Low);
    }

    #[test]
    fn test_conflict_type_from_git_kind() {
        assert_eq!(ConflictType::from_git_kind("content"), ConflictType::Content);
        assert_eq!(ConflictType::from_git_kind("add/add"), ConflictType::AddAdd);
        assert_eq!(ConflictType::from_git_kind("modify/delete"), ConflictType::DeleteModify);
        assert_eq!(ConflictType::from_git_kind("rename/delete"), ConflictType::Rename);
        assert_eq!(ConflictType::from_git_kind("file/directory"), ConflictType::Other);
        assert_eq!(ConflictType::DeleteModify.to_string(), "delete_modify");
    }

    #[test]
    fn test_detail_serializes_type_field() {
        let detail = create_conflict_detail("a.rs", vec![2, 4], vec!["<<<<<<< main".into(), "=======".into()], ConflictType::Content);
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["type"], "content");
        assert_eq!(json["severity"], "low");
        assert_eq!(json["lines"], serde_json::json!([2, 4]));
    }
}
