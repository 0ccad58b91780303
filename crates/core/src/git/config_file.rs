//! Reading remotes out of `.git/config`.
//!
//! Only the `[remote "<name>"]` sections are of interest. A remote section is
//! opened by its header and closed by the next section header of any kind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::RepositoryError;

static REMOTE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    // Section names are case-insensitive, subsection names are not.
    Regex::new(r#"^\[(?i:remote)\s+"([^"]+)"\]$"#).expect("invalid remote header regex")
});

/// A named remote and the URL it fetches from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

/// Path of the git config file for a working tree rooted at `directory`.
pub fn config_path(directory: &Path) -> PathBuf {
    directory.join(".git").join("config")
}

/// Check that `directory` exists and has a `.git` directory inside it.
pub fn validate_directory(directory: &Path) -> Result<(), RepositoryError> {
    let display = directory.display().to_string();

    let meta = match std::fs::metadata(directory) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RepositoryError::DirectoryNotFound(display));
        }
        Err(source) => {
            return Err(RepositoryError::Io {
                operation: "stat",
                path: directory.to_path_buf(),
                source,
            });
        }
    };

    if !meta.is_dir() {
        return Err(RepositoryError::NotGitRepository {
            path: display,
            reason: "path is not a directory".into(),
        });
    }

    let git_dir = directory.join(".git");
    match std::fs::metadata(&git_dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(RepositoryError::NotGitRepository {
            path: display,
            reason: ".git exists but is not a directory".into(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RepositoryError::NotGitRepository {
                path: display,
                reason: ".git directory not found".into(),
            })
        }
        Err(source) => Err(RepositoryError::Io {
            operation: "stat",
            path: git_dir,
            source,
        }),
    }
}

/// Read every remote that has a URL from `<directory>/.git/config`, in file order.
pub fn extract_all_remotes(directory: &Path) -> Result<Vec<Remote>, RepositoryError> {
    let path = config_path(directory);
    let contents = std::fs::read_to_string(&path).map_err(|source| RepositoryError::Io {
        operation: "read",
        path: path.clone(),
        source,
    })?;

    let remotes = parse_remotes(&contents);
    debug!(path = %path.display(), count = remotes.len(), "parsed git remotes");
    Ok(remotes)
}

/// Scan git config text for remote URLs.
///
/// When a remote lists several `url` lines only the first is kept, matching
/// the URL git itself fetches from.
pub fn parse_remotes(contents: &str) -> Vec<Remote> {
    let mut remotes: Vec<Remote> = Vec::new();
    let mut current: Option<String> = None;

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') {
            current = REMOTE_HEADER
                .captures(line)
                .map(|caps| caps[1].to_string());
            continue;
        }

        let Some(name) = current.as_deref() else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("url") {
            continue;
        }

        let url = config_value(value);
        if url.is_empty() || remotes.iter().any(|r| r.name == name) {
            continue;
        }
        remotes.push(Remote {
            name: name.to_string(),
            url,
        });
    }

    remotes
}

/// The name → URL view of a remote list.
pub fn remote_map(remotes: &[Remote]) -> BTreeMap<String, String> {
    remotes
        .iter()
        .map(|r| (r.name.clone(), r.url.clone()))
        .collect()
}

/// Decode a config value: double quotes are dropped, an unquoted `#` or `;`
/// starts a comment, and `\"`, `\\`, `\t`, `\n` escapes are honoured.
fn config_value(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut quoted = false;
    let mut chars = raw.trim().chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => quoted = !quoted,
            '#' | ';' if !quoted => break,
            '\\' => match chars.next() {
                Some('t') => value.push('\t'),
                Some('n') => value.push('\n'),
                Some(other) => value.push(other),
                None => {}
            },
            _ => value.push(c),
        }
    }
    value.trim().to_string()
}
