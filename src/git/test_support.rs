//! In-memory `GitOps` used by unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::error::GitSquashError;
use crate::git::log::{CommitRecord, FIELD_SEPARATOR, LogSelector};
use crate::git::repository::{GitOps, GitOutput};

#[derive(Default)]
pub struct FakeGit {
    /// Newest first, like `git log`.
    history: Vec<CommitRecord>,
    upstream: Option<String>,
    refs: HashSet<String>,
    /// base ref -> number of commits in `base..HEAD`
    ranges: HashMap<String, usize>,
    forced_log: Option<GitOutput>,
    failing_reset: Option<GitOutput>,
    failing_commit: Option<GitOutput>,
    pub calls: RefCell<Vec<String>>,
}

pub fn commit(n: usize) -> CommitRecord {
    let hash = format!("{:07x}{}", n, "a".repeat(33));
    CommitRecord {
        short_hash: hash[..7].to_string(),
        hash,
        author: "Test User".to_string(),
        relative_time: format!("{} minutes ago", n),
        subject: format!("commit {}", n),
    }
}

/// `count` commits, newest first: commit(count) .. commit(1).
pub fn history(count: usize) -> Vec<CommitRecord> {
    (1..=count).rev().map(commit).collect()
}

fn render(commits: &[CommitRecord]) -> String {
    commits
        .iter()
        .map(|c| {
            [
                c.hash.as_str(),
                c.short_hash.as_str(),
                c.author.as_str(),
                c.relative_time.as_str(),
                c.subject.as_str(),
            ]
            .join(&FIELD_SEPARATOR.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn ok(stdout: String) -> GitOutput {
    GitOutput {
        success: true,
        code: Some(0),
        stdout,
        stderr: String::new(),
    }
}

fn failed(stderr: &str) -> GitOutput {
    GitOutput {
        success: false,
        code: Some(128),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

impl FakeGit {
    pub fn with_history(mut self, history: Vec<CommitRecord>) -> Self {
        self.history = history;
        self
    }

    pub fn with_upstream(mut self, upstream: &str) -> Self {
        self.upstream = Some(upstream.to_string());
        self
    }

    pub fn with_ref(mut self, name: &str) -> Self {
        self.refs.insert(name.to_string());
        self
    }

    /// Declare `name` as an existing ref with `ahead` commits between it and HEAD.
    pub fn with_range(mut self, name: &str, ahead: usize) -> Self {
        self.refs.insert(name.to_string());
        self.ranges.insert(name.to_string(), ahead);
        self
    }

    pub fn with_log_output(mut self, output: GitOutput) -> Self {
        self.forced_log = Some(output);
        self
    }

    pub fn with_failing_reset(mut self, stderr: &str) -> Self {
        self.failing_reset = Some(failed(stderr));
        self
    }

    pub fn with_failing_commit(mut self, stdout: &str) -> Self {
        self.failing_commit = Some(GitOutput {
            success: false,
            code: Some(1),
            stdout: stdout.to_string(),
            stderr: String::new(),
        });
        self
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("reset") || c.starts_with("commit"))
            .cloned()
            .collect()
    }
}

impl GitOps for FakeGit {
    fn log(&self, selector: &LogSelector) -> Result<GitOutput, GitSquashError> {
        self.record(format!("log {}", selector));
        if let Some(forced) = &self.forced_log {
            return Ok(forced.clone());
        }
        match selector {
            LogSelector::Limit(n) => {
                let end = (*n).min(self.history.len());
                Ok(ok(render(&self.history[..end])))
            }
            LogSelector::Range { base } => match self.ranges.get(base) {
                Some(ahead) => {
                    let end = (*ahead).min(self.history.len());
                    Ok(ok(render(&self.history[..end])))
                }
                None => Ok(failed("fatal: ambiguous argument")),
            },
        }
    }

    fn upstream_ref(&self) -> Result<Option<String>, GitSquashError> {
        self.record("upstream".to_string());
        Ok(self.upstream.clone())
    }

    fn ref_exists(&self, ref_name: &str) -> Result<bool, GitSquashError> {
        self.record(format!("verify {}", ref_name));
        Ok(self.refs.contains(ref_name))
    }

    fn object_exists(&self, hash: &str) -> Result<bool, GitSquashError> {
        self.record(format!("cat-file {}", hash));
        Ok(self.history.iter().any(|c| c.matches(hash)))
    }

    fn soft_reset(&self, target: &str) -> Result<GitOutput, GitSquashError> {
        self.record(format!("reset {}", target));
        Ok(self.failing_reset.clone().unwrap_or_else(|| ok(String::new())))
    }

    fn commit(&self, message: &str) -> Result<GitOutput, GitSquashError> {
        self.record(format!("commit {}", message));
        Ok(self
            .failing_commit
            .clone()
            .unwrap_or_else(|| ok(String::new())))
    }
}
