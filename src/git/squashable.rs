use crate::error::GitSquashError;
use crate::git::base::{BaseCommitResolver, BaseRef};
use crate::git::log::{CommitRecord, LogSelector, fetch_log};
use crate::git::repository::GitOps;
use crate::utils::debug_log;

/// Composes base resolution and log fetching into the candidate list.
pub struct SquashableRangeSelector<'a, G: GitOps + ?Sized> {
    git: &'a G,
    default_branches: &'a [String],
    fallback_window: usize,
}

impl<'a, G: GitOps + ?Sized> SquashableRangeSelector<'a, G> {
    pub fn new(git: &'a G, default_branches: &'a [String], fallback_window: usize) -> Self {
        Self {
            git,
            default_branches,
            fallback_window,
        }
    }

    /// Commits that have not been pushed, newest first.
    ///
    /// Without any known remote boundary the oldest commit of the recent
    /// window is assumed to be shared and left out.
    pub fn get_squashable_commits(&self) -> Result<Vec<CommitRecord>, GitSquashError> {
        let base = BaseCommitResolver::new(self.git, self.default_branches)
            .resolve_base()
            .map_err(|e| match e {
                GitSquashError::Resolution(_) => e,
                other => {
                    GitSquashError::Resolution(format!("could not find base commit: {}", other))
                }
            })?;

        match base {
            BaseRef::Upstream(name) | BaseRef::DefaultBranch(name) => {
                fetch_log(self.git, &LogSelector::Range { base: name })
            }
            BaseRef::NotFound => self.commits_from_fallback_window(),
        }
    }

    fn commits_from_fallback_window(&self) -> Result<Vec<CommitRecord>, GitSquashError> {
        let mut commits = fetch_log(self.git, &LogSelector::Limit(self.fallback_window))
            .map_err(|e| {
                GitSquashError::Resolution(format!("fallback failed to get git log: {}", e))
            })?;

        if commits.len() <= 1 {
            return Ok(Vec::new());
        }

        let dropped = commits.pop();
        if let Some(oldest) = dropped {
            debug_log(&format!(
                "Fallback window: excluding oldest commit {}",
                oldest.short_hash
            ));
        }
        Ok(commits)
    }
}
