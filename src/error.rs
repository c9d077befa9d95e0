use std::fmt;

/// Reasons a selected commit cannot be squashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidHashLength(usize),
    CommitNotFound(String),
    NotSquashable(String),
    NotEnoughCommits,
    NoCommitSelected,
    EmptyMessage,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidHashLength(len) => {
                write!(f, "invalid commit hash length ({} characters)", len)
            }
            ValidationError::CommitNotFound(hash) => {
                write!(f, "selected commit does not exist: {}", hash)
            }
            ValidationError::NotSquashable(hash) => write!(
                f,
                "selected commit is not in the list of squashable commits: {}",
                hash
            ),
            ValidationError::NotEnoughCommits => write!(f, "not enough commits selected"),
            ValidationError::NoCommitSelected => write!(f, "no commit selected"),
            ValidationError::EmptyMessage => write!(f, "commit message cannot be empty"),
        }
    }
}

#[derive(Debug)]
pub enum GitSquashError {
    IoError(std::io::Error),
    FromUtf8Error(std::string::FromUtf8Error),
    /// Errors from invoking the git CLI that exited with a non-zero status
    GitCliError {
        code: Option<i32>,
        stderr: String,
        args: Vec<String>,
    },
    /// Could not determine the base ref or read the commit range
    Resolution(String),
    Validation(ValidationError),
    /// The user backed out of a prompt (Esc, Ctrl-C, Ctrl-D, empty input)
    AbortedByUser,
    /// The process received an external interrupt
    Cancelled,
    /// Terminal capture was lost or keyboard input failed
    Interaction(String),
    /// A step of the squash itself failed; `output` is git's combined output
    SquashFailed {
        step: &'static str,
        args: Vec<String>,
        output: String,
    },
}

impl GitSquashError {
    /// True for the clean-abort family: user cancellation or external interrupt.
    pub fn is_user_abort(&self) -> bool {
        matches!(self, GitSquashError::AbortedByUser | GitSquashError::Cancelled)
    }
}

impl fmt::Display for GitSquashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitSquashError::IoError(e) => write!(f, "IO error: {}", e),
            GitSquashError::FromUtf8Error(e) => write!(f, "From UTF-8 error: {}", e),
            GitSquashError::GitCliError { code, stderr, args } => match code {
                Some(c) => write!(
                    f,
                    "Git CLI ({}) failed with exit code {}: {}",
                    args.join(" "),
                    c,
                    stderr
                ),
                None => write!(f, "Git CLI ({}) failed: {}", args.join(" "), stderr),
            },
            GitSquashError::Resolution(e) => write!(f, "failed to get squashable commits: {}", e),
            GitSquashError::Validation(e) => write!(f, "{}", e),
            GitSquashError::AbortedByUser => write!(f, "aborted by user"),
            GitSquashError::Cancelled => write!(f, "operation cancelled"),
            GitSquashError::Interaction(e) => write!(f, "terminal error: {}", e),
            GitSquashError::SquashFailed { step, args, output } => write!(
                f,
                "failed to {} (git {}):\n{}",
                step,
                args.join(" "),
                output.trim_end()
            ),
        }
    }
}

impl std::error::Error for GitSquashError {}

impl From<std::io::Error> for GitSquashError {
    fn from(err: std::io::Error) -> Self {
        GitSquashError::IoError(err)
    }
}

impl From<std::string::FromUtf8Error> for GitSquashError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        GitSquashError::FromUtf8Error(err)
    }
}

impl From<ValidationError> for GitSquashError {
    fn from(err: ValidationError) -> Self {
        GitSquashError::Validation(err)
    }
}
