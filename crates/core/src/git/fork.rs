//! Fork detection across the configured remotes.
//!
//! A remote is a fork candidate when it points at a repository with the same
//! name as the resolved one but under a different owner. Remotes are examined
//! in config-file order and the first candidate wins.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::config_file::{extract_all_remotes, validate_directory, Remote};
use super::remote_url::{parse_remote_url, RepoSlug};
use super::resolver::{resolve_from_remotes, RepositoryResolution};
use crate::errors::RepositoryError;

/// Fork relationship between the resolved repository and the other remotes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForkInfo {
    pub is_fork: bool,
    /// Owner of the qualifying remote's repository.
    pub fork_owner: Option<String>,
    /// Owner of the resolved repository.
    pub original_owner: Option<String>,
    /// Name of the qualifying remote.
    pub fork_remote: Option<String>,
}

impl ForkInfo {
    pub fn not_a_fork() -> Self {
        Self::default()
    }

    /// The repository the qualifying remote points at, i.e. `repository`
    /// under `fork_owner`. `None` when no fork relationship was found.
    pub fn counterpart(&self, repository: &RepoSlug) -> Option<RepoSlug> {
        match (self.is_fork, &self.fork_owner) {
            (true, Some(owner)) => Some(repository.with_owner(owner.clone())),
            _ => None,
        }
    }
}

/// Compare every remote against `target` (`owner/repo`).
///
/// Remotes whose URL cannot be parsed are ignored.
pub fn detect_fork_relationship(
    remotes: &[Remote],
    target: &str,
) -> Result<ForkInfo, RepositoryError> {
    let target: RepoSlug = target.parse()?;

    for remote in remotes {
        let slug = match parse_remote_url(&remote.url) {
            Ok(slug) => slug,
            Err(_) => {
                debug!(remote = %remote.name, url = %remote.url, "skipping unparsable remote");
                continue;
            }
        };

        if slug.owner != target.owner && slug.name == target.name {
            info!(
                remote = %remote.name,
                fork_owner = %slug.owner,
                original_owner = %target.owner,
                "fork relationship detected"
            );
            return Ok(ForkInfo {
                is_fork: true,
                fork_owner: Some(slug.owner),
                original_owner: Some(target.owner),
                fork_remote: Some(remote.name.clone()),
            });
        }
    }

    Ok(ForkInfo::not_a_fork())
}

/// Resolve `directory` and detect fork relationships among its remotes.
#[instrument(skip_all, fields(directory = %directory.display()))]
pub fn resolve_with_fork_info(
    directory: &Path,
) -> Result<(RepositoryResolution, ForkInfo), RepositoryError> {
    validate_directory(directory)?;
    let remotes = extract_all_remotes(directory)?;
    let resolution = resolve_from_remotes(directory, &remotes)?;
    let fork = detect_fork_relationship(&remotes, &resolution.repository.to_string())?;
    Ok((resolution, fork))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(name: &str, url: &str) -> Remote {
        Remote {
            name: name.into(),
            url: url.into(),
        }
    }

    #[test]
    fn test_upstream_under_other_owner_is_fork() {
        let remotes = vec![
            remote("origin", "https://forgejo.example.com/acme/widgets.git"),
            remote("upstream", "https://forgejo.example.com/other-org/widgets.git"),
        ];
        let info = detect_fork_relationship(&remotes, "acme/widgets").unwrap();
        assert_eq!(
            info,
            ForkInfo {
                is_fork: true,
                fork_owner: Some("other-org".into()),
                original_owner: Some("acme".into()),
                fork_remote: Some("upstream".into()),
            }
        );
    }

    #[test]
    fn test_single_remote_is_not_fork() {
        let remotes = vec![remote("origin", "git@h:acme/widgets.git")];
        let info = detect_fork_relationship(&remotes, "acme/widgets").unwrap();
        assert!(!info.is_fork);
        assert_eq!(info, ForkInfo::not_a_fork());
    }

    #[test]
    fn test_different_repo_name_is_not_fork() {
        let remotes = vec![
            remote("origin", "git@h:acme/widgets.git"),
            remote("tools", "git@h:other-org/gadgets.git"),
        ];
        assert!(!detect_fork_relationship(&remotes, "acme/widgets").unwrap().is_fork);
    }

    #[test]
    fn test_unparsable_remote_skipped() {
        let remotes = vec![
            remote("local", "/srv/git/widgets.git"),
            remote("upstream", "git://h/other-org/widgets"),
        ];
        let info = detect_fork_relationship(&remotes, "acme/widgets").unwrap();
        assert_eq!(info.fork_remote.as_deref(), Some("upstream"));
    }

    #[test]
    fn test_first_candidate_in_file_order_wins() {
        let remotes = vec![
            remote("origin", "git@h:acme/widgets.git"),
            remote("zeta", "git@h:zeta-org/widgets.git"),
            remote("alpha", "git@h:alpha-org/widgets.git"),
        ];
        let info = detect_fork_relationship(&remotes, "acme/widgets").unwrap();
        assert_eq!(info.fork_remote.as_deref(), Some("zeta"));
        assert_eq!(info.fork_owner.as_deref(), Some("zeta-org"));
    }

    #[test]
    fn test_invalid_target() {
        let err = detect_fork_relationship(&[], "widgets").unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRepositoryId(_)));
    }

    #[test]
    fn test_resolve_with_fork_info() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(
            dir.path().join(".git").join("config"),
            "[remote \"origin\"]\n\turl = https://forgejo.example.com/acme/widgets.git\n[remote \"upstream\"]\n\turl = https://forgejo.example.com/other-org/widgets.git\n",
        )
        .unwrap();

        let (resolution, fork) = resolve_with_fork_info(dir.path()).unwrap();
        assert_eq!(resolution.repository.to_string(), "acme/widgets");
        assert!(fork.is_fork);
        assert_eq!(fork.original_owner.as_deref(), Some("acme"));
        assert_eq!(
            fork.counterpart(&resolution.repository).map(|s| s.to_string()).as_deref(),
            Some("other-org/widgets")
        );
    }

    #[test]
    fn test_counterpart_without_fork() {
        let slug = RepoSlug::new("acme", "widgets");
        assert_eq!(ForkInfo::not_a_fork().counterpart(&slug), None);
    }
}
