use std::fmt;

use crate::error::GitSquashError;
use crate::git::repository::GitOps;
use crate::utils::debug_log;

/// ASCII unit separator; cannot appear in names, dates or one-line subjects.
pub const FIELD_SEPARATOR: char = '\u{1f}';

const LOG_FORMAT: &str = "--pretty=format:%H%x1f%h%x1f%an%x1f%ar%x1f%s";

/// One commit as listed by `git log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub short_hash: String,
    pub author: String,
    pub relative_time: String,
    pub subject: String,
}

impl CommitRecord {
    /// True when `hash` names this commit in its full or short form.
    pub fn matches(&self, hash: &str) -> bool {
        self.hash == hash || self.short_hash == hash
    }
}

impl fmt::Display for CommitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.short_hash,
            self.author,
            self.relative_time,
            truncate_subject(&self.subject, 50)
        )
    }
}

/// Which commits to list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogSelector {
    /// The most recent `n` commits reachable from HEAD.
    Limit(usize),
    /// Commits in `base..HEAD`.
    Range { base: String },
}

impl LogSelector {
    pub fn to_log_args(&self) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            "--abbrev=7".to_string(),
            LOG_FORMAT.to_string(),
        ];
        match self {
            LogSelector::Limit(n) => args.push(format!("-{}", n)),
            LogSelector::Range { base } => args.push(format!("{}..HEAD", base)),
        }
        args
    }
}

impl fmt::Display for LogSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSelector::Limit(n) => write!(f, "last {} commits", n),
            LogSelector::Range { base } => write!(f, "{}..HEAD", base),
        }
    }
}

/// Fetch and parse the commits named by `selector`, newest first.
///
/// A failing `git log` that printed nothing means there are no commits to list
/// (an unborn branch, an empty range); one that printed something is an error.
pub fn fetch_log<G: GitOps + ?Sized>(
    git: &G,
    selector: &LogSelector,
) -> Result<Vec<CommitRecord>, GitSquashError> {
    let output = git.log(selector)?;
    if !output.success {
        if output.stdout.is_empty() {
            debug_log(&format!(
                "git log for {} failed without output, treating as empty",
                selector
            ));
            return Ok(Vec::new());
        }
        return Err(GitSquashError::Resolution(format!(
            "git log failed for {} (exit code {:?}): {}",
            selector,
            output.code,
            output.stderr.trim()
        )));
    }

    let commits = parse_log_output(&output.stdout);
    debug_log(&format!("{} commits in {}", commits.len(), selector));
    Ok(commits)
}

/// Parse log records, skipping any line without all five fields.
pub fn parse_log_output(stdout: &str) -> Vec<CommitRecord> {
    stdout
        .trim()
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(5, FIELD_SEPARATOR);
            let hash = parts.next()?;
            let short_hash = parts.next()?;
            let author = parts.next()?;
            let relative_time = parts.next()?;
            let subject = parts.next()?;
            Some(CommitRecord {
                hash: hash.to_string(),
                short_hash: short_hash.to_string(),
                author: author.to_string(),
                relative_time: relative_time.to_string(),
                subject: subject.to_string(),
            })
        })
        .collect()
}

/// Single-line subject, cut to `width` chars with a trailing `...` when longer.
pub fn truncate_subject(subject: &str, width: usize) -> String {
    let single_line = subject.trim().replace(['\n', '\r'], " ");
    if single_line.chars().count() > width {
        let cut: String = single_line.chars().take(width).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}
