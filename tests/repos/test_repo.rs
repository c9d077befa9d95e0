use std::fs;
use std::path::Path;
use std::process::Command;

use git_squash::config::Config;
use git_squash::git::find_repository_in_path;
use git_squash::git::repository::Repository;
use tempfile::TempDir;

/// A throwaway git repository driven through the git CLI.
pub struct TestRepo {
    dir: TempDir,
    counter: std::cell::Cell<usize>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let repo = TestRepo {
            dir,
            counter: std::cell::Cell::new(0),
        };
        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "core.hooksPath", "/dev/null"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git in the repository, panicking on failure. Returns trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args(args)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .expect("failed to spawn git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    pub fn write_file(&self, name: &str, contents: &str) {
        fs::write(self.path().join(name), contents).expect("failed to write file");
    }

    pub fn read_file(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).expect("failed to read file")
    }

    pub fn stage_all_and_commit(&self, message: &str) -> String {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
        self.head()
    }

    /// Commit a new file with `subject` as the message; returns the new HEAD.
    pub fn commit(&self, subject: &str) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        self.write_file(&format!("file_{}.txt", n), &format!("{}\n", subject));
        self.stage_all_and_commit(subject)
    }

    /// `count` commits named `commit 1` .. `commit N`; returns their shas oldest first.
    pub fn commits(&self, count: usize) -> Vec<String> {
        (1..=count)
            .map(|i| self.commit(&format!("commit {}", i)))
            .collect()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// Subjects from HEAD backwards.
    pub fn log_subjects(&self) -> Vec<String> {
        self.git(&["log", "--format=%s"])
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    fn ensure_origin(&self) {
        let remotes = self.git(&["remote"]);
        if !remotes.lines().any(|r| r == "origin") {
            self.git(&["remote", "add", "origin", "https://example.com/repo.git"]);
        }
    }

    /// Make `origin/<branch>` exist and point at `sha`, as if fetched.
    pub fn set_remote_branch(&self, branch: &str, sha: &str) {
        self.ensure_origin();
        self.git(&["update-ref", &format!("refs/remotes/origin/{}", branch), sha]);
    }

    /// Track `origin/<branch>` from `main`.
    pub fn set_upstream(&self, branch: &str, sha: &str) {
        self.set_remote_branch(branch, sha);
        self.git(&["config", "branch.main.remote", "origin"]);
        self.git(&[
            "config",
            "branch.main.merge",
            &format!("refs/heads/{}", branch),
        ]);
    }

    pub fn repository(&self) -> Repository {
        find_repository_in_path(self.path(), &Config::default())
            .expect("failed to open repository")
    }
}
