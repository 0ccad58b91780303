//! Parsing `git merge-tree` output.
//!
//! Two shapes are understood. Combined-diff output carries the conflict
//! markers inline, one `diff --cc` section per file. Write-tree output (git
//! 2.38+) names the merged tree, lists conflicted index entries and ends with
//! `CONFLICT (<kind>)` messages; the markers then live in the merged blobs.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::report::{create_conflict_detail, ConflictDetail, ConflictType};
use crate::git::classify::contains_conflict_marker;

static CONFLICT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^CONFLICT \(([^)]+)\): (.*)$").expect("invalid conflict message regex")
});

/// A conflicted path reported by write-tree output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictedFile {
    pub path: String,
    pub conflict_type: ConflictType,
}

/// Parsed write-tree output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTreeOutput {
    /// Object id of the merged tree, conflict markers included.
    pub tree: String,
    pub files: Vec<ConflictedFile>,
}

/// Extract per-file conflict details from combined-diff output.
///
/// A line containing `diff --cc` opens a file section whose path is the
/// fourth whitespace-separated token (the last token on shorter lines). Every
/// marker line up to the next section is recorded with its 1-based line
/// number in `output`. Files without markers are omitted.
pub fn analyze_conflict_output(output: &str) -> Vec<ConflictDetail> {
    let mut details = Vec::new();
    let mut section: Option<(String, Vec<usize>, Vec<String>)> = None;

    for (idx, line) in output.lines().enumerate() {
        if line.contains("diff --cc") {
            if let Some((file, lines, markers)) = section.take() {
                push_detail(&mut details, file, lines, markers);
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let file = tokens.get(3).or(tokens.last()).copied().unwrap_or_default();
            section = Some((file.to_string(), Vec::new(), Vec::new()));
            continue;
        }

        if let Some((_, lines, markers)) = section.as_mut() {
            if contains_conflict_marker(line) {
                lines.push(idx + 1);
                markers.push(line.trim().to_string());
            }
        }
    }

    if let Some((file, lines, markers)) = section {
        push_detail(&mut details, file, lines, markers);
    }
    details
}

fn push_detail(details: &mut Vec<ConflictDetail>, file: String, lines: Vec<usize>, markers: Vec<String>) {
    if !lines.is_empty() {
        details.push(create_conflict_detail(file, lines, markers, ConflictType::Content));
    }
}

/// 1-based line numbers and trimmed text of every marker line in `text`.
pub fn scan_markers(text: &str) -> (Vec<usize>, Vec<String>) {
    text.lines()
        .enumerate()
        .filter(|(_, line)| contains_conflict_marker(line))
        .map(|(idx, line)| (idx + 1, line.trim().to_string()))
        .unzip()
}

/// Parse write-tree output; `None` if `output` is not in that shape.
pub fn parse_write_tree_output(output: &str) -> Option<WriteTreeOutput> {
    let mut lines = output.lines();
    let tree = lines.next()?.trim();
    if !is_object_id(tree) {
        return None;
    }

    let mut paths: Vec<String> = Vec::new();
    let mut messages: Vec<(String, String)> = Vec::new();
    let mut in_file_info = true;

    for line in lines {
        if in_file_info {
            if line.is_empty() {
                in_file_info = false;
                continue;
            }
            // <mode> <object> <stage>\t<path>
            if let Some((entry, raw_path)) = line.split_once('\t') {
                let path = unquote_path(raw_path);
                if entry.split_whitespace().count() == 3 && !paths.contains(&path) {
                    paths.push(path);
                }
                continue;
            }
            in_file_info = false;
        }

        if let Some(caps) = CONFLICT_MESSAGE.captures(line) {
            messages.push((caps[1].to_string(), caps[2].to_string()));
        }
    }

    let files = paths
        .into_iter()
        .map(|path| {
            let conflict_type = messages
                .iter()
                .find(|(_, text)| mentions_path(text, &path))
                .map(|(kind, _)| ConflictType::from_git_kind(kind))
                .unwrap_or(ConflictType::Content);
            ConflictedFile {
                path,
                conflict_type,
            }
        })
        .collect();

    Some(WriteTreeOutput {
        tree: tree.to_string(),
        files,
    })
}

fn is_object_id(s: &str) -> bool {
    matches!(s.len(), 40 | 64) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Whether `text` names `path` as a whole word: preceded by the start or
/// whitespace, followed by the end, whitespace, or sentence punctuation.
fn mentions_path(text: &str, path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    text.match_indices(path).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let mut after = text[start + path.len()..].chars();
        let starts_word = before.map_or(true, char::is_whitespace);
        let ends_word = match after.next() {
            None => true,
            Some(c) if c.is_whitespace() => true,
            Some('.' | ',' | ':' | ';') => after.next().map_or(true, char::is_whitespace),
            Some(_) => false,
        };
        starts_word && ends_word
    })
}

/// Undo git's C-style quoting of a path (`"caf\303\251.txt"` → `café.txt`).
/// Unquoted input is returned as is.
pub fn unquote_path(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match iter.next() {
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&o @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(o - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b't') => bytes.push(b'\t'),
            Some(b'n') => bytes.push(b'\n'),
            Some(b'v') => bytes.push(0x0b),
            Some(b'f') => bytes.push(0x0c),
            Some(b'r') => bytes.push(b'\r'),
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::report::Severity;

    const COMBINED: &str = "\
diff --cc src/lib.rs
index 1111111,2222222..0000000
--- a/src/lib.rs
+++ b/src/lib.rs
@@@ -1,3 -1,3 +1,7 @@@
++<<<<<<< main
 +fn a() {}
++=======
+ fn b() {}
++>>>>>>> feature
diff --cc README.md
index 3333333,4444444..0000000
@@@ -1 -1 +1,5 @@@
 +unchanged
diff --cc docs/guide.md
++<<<<<<< main
++=======
";

    #[test]
    fn test_combined_diff_sections() {
        let details = analyze_conflict_output(COMBINED);
        assert_eq!(details.len(), 2);

        assert_eq!(details[0].file, "src/lib.rs");
        assert_eq!(details[0].lines, vec![6, 8, 10]);
        assert_eq!(details[0].markers[0], "++<<<<<<< main");
        assert_eq!(details[0].conflict_type, ConflictType::Content);
        assert_eq!(details[0].severity, Severity::Low);

        assert_eq!(details[1].file, "docs/guide.md");
        assert_eq!(details[1].lines.len(), 2);
        assert_eq!(details[1].severity, Severity::Low);
    }

    #[test]
    fn test_fourth_token_is_path() {
        let output = "x diff --cc lib.rs\n<<<<<<< a\n";
        let details = analyze_conflict_output(output);
        assert_eq!(details[0].file, "lib.rs");
        assert_eq!(details[0].lines, vec![2]);
    }

    #[test]
    fn test_markers_outside_sections_ignored() {
        assert!(analyze_conflict_output("<<<<<<< a\n=======\n>>>>>>> b\n").is_empty());
    }

    #[test]
    fn test_many_markers_rank_high() {
        let mut output = String::from("diff --cc big.txt\n");
        for _ in 0..4 {
            output.push_str("<<<<<<< main\nours\n=======\ntheirs\n>>>>>>> feature\n");
        }
        let details = analyze_conflict_output(&output);
        assert_eq!(details[0].lines.len(), 12);
        assert_eq!(details[0].severity, Severity::High);
    }

    #[test]
    fn test_scan_markers() {
        let (lines, markers) = scan_markers("a\n<<<<<<< main\nb\n=======\nc\n>>>>>>> feature\n");
        assert_eq!(lines, vec![2, 4, 6]);
        assert_eq!(markers, vec!["<<<<<<< main", "=======", ">>>>>>> feature"]);
    }

    const WRITE_TREE: &str = "\
3f4b2c0c8b2f6a1d1a0e6c9e2d3b4a5f6e7d8c9b
100644 e69de29bb2d1d6434b8b29ae775ad8c2e48c5391 1\tnotes.txt
100644 8ab686eafeb1f44702738c8b0f24f2567c36da6d 2\tnotes.txt
100644 9daeafb9864cf43055ae93beb0afd6c7d144bfa4 3\tnotes.txt
100644 8ab686eafeb1f44702738c8b0f24f2567c36da6d 2\tgone.txt
100644 e69de29bb2d1d6434b8b29ae775ad8c2e48c5391 1\tgone.txt

Auto-merging notes.txt
CONFLICT (content): Merge conflict in notes.txt
CONFLICT (modify/delete): gone.txt deleted in feature and modified in main.  Version main of gone.txt left in tree.
";

    #[test]
    fn test_write_tree_output() {
        let parsed = parse_write_tree_output(WRITE_TREE).unwrap();
        assert_eq!(parsed.tree, "3f4b2c0c8b2f6a1d1a0e6c9e2d3b4a5f6e7d8c9b");
        assert_eq!(
            parsed.files,
            vec![
                ConflictedFile {
                    path: "notes.txt".into(),
                    conflict_type: ConflictType::Content,
                },
                ConflictedFile {
                    path: "gone.txt".into(),
                    conflict_type: ConflictType::DeleteModify,
                },
            ]
        );
    }

    #[test]
    fn test_conflict_kind_matches_whole_path_only() {
        let output = "\
3f4b2c0c8b2f6a1d1a0e6c9e2d3b4a5f6e7d8c9b
100644 8ab686eafeb1f44702738c8b0f24f2567c36da6d 2\tab.txt
100644 e69de29bb2d1d6434b8b29ae775ad8c2e48c5391 1\tab.txt
100644 e69de29bb2d1d6434b8b29ae775ad8c2e48c5391 1\tb.txt
100644 8ab686eafeb1f44702738c8b0f24f2567c36da6d 2\tb.txt
100644 9daeafb9864cf43055ae93beb0afd6c7d144bfa4 3\tb.txt

CONFLICT (modify/delete): ab.txt deleted in feature and modified in main.  Version main of ab.txt left in tree.
Auto-merging b.txt
CONFLICT (content): Merge conflict in b.txt
";
        let parsed = parse_write_tree_output(output).unwrap();
        assert_eq!(parsed.files[0].path, "ab.txt");
        assert_eq!(parsed.files[0].conflict_type, ConflictType::DeleteModify);
        assert_eq!(parsed.files[1].path, "b.txt");
        assert_eq!(parsed.files[1].conflict_type, ConflictType::Content);
    }

    #[test]
    fn test_mentions_path_boundaries() {
        assert!(mentions_path("Merge conflict in b.txt", "b.txt"));
        assert!(mentions_path("b.txt deleted in x. Version y of b.txt left in tree.", "b.txt"));
        assert!(!mentions_path("Merge conflict in ab.txt", "b.txt"));
        assert!(!mentions_path("Merge conflict in b.txt.orig", "b.txt"));
    }

    #[test]
    fn test_quoted_paths_are_decoded() {
        let output = "\
3f4b2c0c8b2f6a1d1a0e6c9e2d3b4a5f6e7d8c9b
100644 8ab686eafeb1f44702738c8b0f24f2567c36da6d 2\t\"caf\\303\\251.txt\"
100644 9daeafb9864cf43055ae93beb0afd6c7d144bfa4 3\t\"caf\\303\\251.txt\"

CONFLICT (content): Merge conflict in caf\u{e9}.txt
";
        let parsed = parse_write_tree_output(output).unwrap();
        assert_eq!(parsed.files.len(), 1);
        assert_eq!(parsed.files[0].path, "caf\u{e9}.txt");
        assert_eq!(parsed.files[0].conflict_type, ConflictType::Content);
    }

    #[test]
    fn test_unquote_path() {
        assert_eq!(unquote_path("plain.txt"), "plain.txt");
        assert_eq!(unquote_path(r#""tab\there.txt""#), "tab\there.txt");
        assert_eq!(unquote_path(r#""say \"hi\".txt""#), "say \"hi\".txt");
        assert_eq!(unquote_path(r#""\346\227\245.md""#), "\u{65e5}.md");
    }

    #[test]
    fn test_write_tree_clean_output() {
        let parsed = parse_write_tree_output("3f4b2c0c8b2f6a1d1a0e6c9e2d3b4a5f6e7d8c9b\n").unwrap();
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn test_not_write_tree_output() {
        assert!(parse_write_tree_output(COMBINED).is_none());
        assert!(parse_write_tree_output("").is_none());
    }
}
