use crate::error::{GitSquashError, ValidationError};
use crate::git::log::CommitRecord;
use crate::git::repository::GitOps;

/// Check that `selected` names an existing commit inside `candidates` and
/// return how many commits (HEAD through `selected`, inclusive) get squashed.
pub fn validate_selected_commit<G: GitOps + ?Sized>(
    git: &G,
    candidates: &[CommitRecord],
    selected: &str,
) -> Result<usize, GitSquashError> {
    if selected.len() != 7 && selected.len() != 40 {
        return Err(ValidationError::InvalidHashLength(selected.len()).into());
    }

    if !git.object_exists(selected)? {
        return Err(ValidationError::CommitNotFound(selected.to_string()).into());
    }

    let index = candidates
        .iter()
        .position(|c| c.matches(selected))
        .ok_or_else(|| ValidationError::NotSquashable(selected.to_string()))?;

    if index == 0 {
        return Err(ValidationError::NotEnoughCommits.into());
    }

    Ok(index + 1)
}
