use crate::error::GitSquashError;
use crate::git::repository::GitOps;
use crate::utils::debug_log;

/// Where the unpushed range starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseRef {
    /// The branch's configured upstream.
    Upstream(String),
    /// The first conventional remote branch that exists.
    DefaultBranch(String),
    /// No remote boundary could be found.
    NotFound,
}

impl BaseRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            BaseRef::Upstream(name) | BaseRef::DefaultBranch(name) => Some(name),
            BaseRef::NotFound => None,
        }
    }
}

/// Finds the ref that marks the boundary between shared and local history.
pub struct BaseCommitResolver<'a, G: GitOps + ?Sized> {
    git: &'a G,
    default_branches: &'a [String],
}

impl<'a, G: GitOps + ?Sized> BaseCommitResolver<'a, G> {
    pub fn new(git: &'a G, default_branches: &'a [String]) -> Self {
        Self {
            git,
            default_branches,
        }
    }

    /// Upstream first, then each default branch in order; first hit wins.
    pub fn resolve_base(&self) -> Result<BaseRef, GitSquashError> {
        if let Some(upstream) = self.git.upstream_ref()? {
            debug_log(&format!("Using upstream {} as base", upstream));
            return Ok(BaseRef::Upstream(upstream));
        }

        for branch in self.default_branches {
            if self.git.ref_exists(branch)? {
                debug_log(&format!("No upstream, using default branch {} as base", branch));
                return Ok(BaseRef::DefaultBranch(branch.clone()));
            }
        }

        debug_log("No upstream or default remote branch found");
        Ok(BaseRef::NotFound)
    }
}
