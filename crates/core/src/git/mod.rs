//! Local git repository introspection.

pub mod branch;
pub mod classify;
pub mod config_file;
pub mod fork;
pub mod remote_url;
pub mod resolver;
pub mod runner;

pub use branch::BranchInspector;
pub use config_file::{extract_all_remotes, remote_map, validate_directory, Remote};
pub use fork::{detect_fork_relationship, resolve_with_fork_info, ForkInfo};
pub use remote_url::{parse_remote_url, RepoSlug};
pub use resolver::{resolve_repository, RepositoryResolution};
pub use runner::{GitOutput, GitRunner, DEFAULT_GIT_TIMEOUT};
