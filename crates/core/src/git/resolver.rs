//! Mapping a working directory to the hosted repository it belongs to.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::config_file::{extract_all_remotes, validate_directory, Remote};
use super::remote_url::{parse_remote_url, RepoSlug};
use crate::errors::RepositoryError;

/// The outcome of resolving a directory to a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryResolution {
    /// The directory that was resolved.
    pub directory: PathBuf,
    /// Canonical `owner/repo` of the repository.
    pub repository: RepoSlug,
    /// URL of the remote the repository was derived from.
    pub remote_url: String,
    /// Name of that remote.
    pub remote_name: String,
}

/// Resolve `directory` into the hosted repository named by its remotes.
///
/// The first remote URL in config-file order decides the repository; the
/// first remote whose URL parses to that repository is reported alongside it.
#[instrument(skip_all, fields(directory = %directory.display()))]
pub fn resolve_repository(directory: &Path) -> Result<RepositoryResolution, RepositoryError> {
    validate_directory(directory)?;
    let remotes = extract_all_remotes(directory)?;
    resolve_from_remotes(directory, &remotes)
}

/// Resolution over an already-extracted remote list.
pub(crate) fn resolve_from_remotes(
    directory: &Path,
    remotes: &[Remote],
) -> Result<RepositoryResolution, RepositoryError> {
    let first = remotes
        .first()
        .ok_or_else(|| RepositoryError::NoRemotesConfigured(directory.display().to_string()))?;
    let repository = parse_remote_url(&first.url)?;

    let selected = remotes
        .iter()
        .find(|r| parse_remote_url(&r.url).is_ok_and(|slug| slug == repository))
        .unwrap_or(first);

    debug!(remote = %selected.name, url = %selected.url, "selected remote");
    info!(repository = %repository, "resolved repository");

    Ok(RepositoryResolution {
        directory: directory.to_path_buf(),
        repository,
        remote_url: selected.url.clone(),
        remote_name: selected.name.clone(),
    })
}
