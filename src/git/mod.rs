pub mod base;
pub mod log;
pub mod repository;
pub mod squash;
pub mod squashable;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::Path;

use crate::config::Config;
use crate::error::GitSquashError;
use crate::git::repository::Repository;

/// Open the repository for the current working directory.
pub fn find_repository(config: &Config) -> Result<Repository, GitSquashError> {
    let cwd = std::env::current_dir()?;
    find_repository_in_path(&cwd, config)
}

pub fn find_repository_in_path(path: &Path, config: &Config) -> Result<Repository, GitSquashError> {
    Repository::discover(path, config)
}
