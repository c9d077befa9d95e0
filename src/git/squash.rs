use crate::error::{GitSquashError, ValidationError};
use crate::git::repository::GitOps;

/// Soft-reset to the parent of `commit_hash` and re-commit everything staged.
///
/// There is no rollback: if the commit step fails the branch stays reset with
/// all changes staged, and the error carries git's output so the user can
/// finish by hand.
pub fn squash_commits<G: GitOps + ?Sized>(
    git: &G,
    commit_hash: &str,
    message: &str,
) -> Result<(), GitSquashError> {
    if !git.object_exists(commit_hash)? {
        return Err(ValidationError::CommitNotFound(commit_hash.to_string()).into());
    }

    let target = format!("{}^", commit_hash);
    tracing::info!("resetting (soft) to {}", target);
    let reset = git.soft_reset(&target)?;
    if !reset.success {
        return Err(GitSquashError::SquashFailed {
            step: "git reset",
            args: vec!["reset".to_string(), "--soft".to_string(), target],
            output: reset.combined(),
        });
    }

    tracing::info!("creating squashed commit");
    let commit = git.commit(message)?;
    if !commit.success {
        return Err(GitSquashError::SquashFailed {
            step: "create squashed commit",
            args: vec!["commit".to_string(), "-m".to_string(), message.to_string()],
            output: commit.combined(),
        });
    }

    Ok(())
}
