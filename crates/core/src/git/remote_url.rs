//! Remote URL parsing.
//!
//! Normalizes the URL of a git remote into the `owner/repo` identifier the
//! forge uses. Three URL shapes are recognised, tried in this order:
//!
//! - `http(s)://host/owner/repo[.git]`
//! - `git@host:owner/repo[.git]`
//! - `git://host/owner/repo[.git]`

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::RepositoryError;

static HTTPS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^/]+/([^/]+)/([^/]+?)(?:\.git)?/?$").expect("invalid https remote regex")
});

static SCP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@[^:]+:([^/]+)/([^/]+?)(?:\.git)?$").expect("invalid scp remote regex")
});

static GIT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git://[^/]+/([^/]+)/([^/]+?)(?:\.git)?$").expect("invalid git remote regex")
});

/// A hosted repository identifier: `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// The same repository name under a different owner.
    pub fn with_owner(&self, owner: impl Into<String>) -> Self {
        Self::new(owner, self.name.clone())
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(RepositoryError::InvalidRepositoryId(s.to_string())),
        }
    }
}

/// Parse a remote URL into its `owner/repo` identifier.
///
/// The first matching form wins and an optional `.git` suffix is stripped.
/// Anything else is rejected with [`RepositoryError::InvalidRemoteUrl`].
pub fn parse_remote_url(url: &str) -> Result<RepoSlug, RepositoryError> {
    let trimmed = url.trim();

    for pattern in [&*HTTPS_URL, &*SCP_URL, &*GIT_URL] {
        if let Some(caps) = pattern.captures(trimmed) {
            return Ok(RepoSlug::new(&caps[1], &caps[2]));
        }
    }

    Err(RepositoryError::InvalidRemoteUrl(url.to_string()))
}
