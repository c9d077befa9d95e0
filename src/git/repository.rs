use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::config::Config;
use crate::error::GitSquashError;
use crate::git::log::LogSelector;
use crate::utils::debug_log;

/// Raw result of a git invocation that is allowed to exit non-zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: Output) -> Result<Self, GitSquashError> {
        Ok(GitOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8(output.stdout)?,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// stdout followed by stderr, the way a terminal would show them.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Everything the squash flow needs from git.
///
/// `Repository` implements it by spawning the git CLI; tests substitute an
/// in-memory history.
pub trait GitOps {
    /// Run `git log` in the fixed record format for `selector`.
    fn log(&self, selector: &LogSelector) -> Result<GitOutput, GitSquashError>;

    /// The upstream tracking ref of the current branch, if one resolves.
    fn upstream_ref(&self) -> Result<Option<String>, GitSquashError>;

    fn ref_exists(&self, ref_name: &str) -> Result<bool, GitSquashError>;

    fn object_exists(&self, hash: &str) -> Result<bool, GitSquashError>;

    /// `git reset --soft <target>`
    fn soft_reset(&self, target: &str) -> Result<GitOutput, GitSquashError>;

    /// `git commit -m <message>`
    fn commit(&self, message: &str) -> Result<GitOutput, GitSquashError>;
}

#[derive(Debug, Clone)]
pub struct Repository {
    git_cmd: String,
    workdir: PathBuf,
}

impl Repository {
    /// Open the repository containing `path`, failing when it is not inside a work tree.
    pub fn discover(path: &Path, config: &Config) -> Result<Repository, GitSquashError> {
        let probe = Repository {
            git_cmd: config.git_cmd().to_string(),
            workdir: path.to_path_buf(),
        };
        let output = probe
            .exec(&["rev-parse", "--show-toplevel"])
            .map_err(|e| match e {
                GitSquashError::GitCliError { stderr, .. } => GitSquashError::Resolution(format!(
                    "{} is not inside a git work tree: {}",
                    path.display(),
                    stderr.trim()
                )),
                other => other,
            })?;
        let toplevel = String::from_utf8(output.stdout)?.trim().to_string();
        debug_log(&format!("Discovered repository at {}", toplevel));
        Ok(Repository {
            git_cmd: probe.git_cmd,
            workdir: PathBuf::from(toplevel),
        })
    }

    /// Global args that pin every invocation to this repository.
    pub fn global_args_for_exec(&self) -> Vec<String> {
        vec!["-C".to_string(), self.workdir.to_string_lossy().to_string()]
    }

    fn exec(&self, args: &[&str]) -> Result<Output, GitSquashError> {
        let mut full = self.global_args_for_exec();
        full.extend(args.iter().map(|a| a.to_string()));
        exec_git(&self.git_cmd, &full)
    }

    fn exec_raw(&self, args: &[&str]) -> Result<GitOutput, GitSquashError> {
        let mut full = self.global_args_for_exec();
        full.extend(args.iter().map(|a| a.to_string()));
        exec_git_raw(&self.git_cmd, &full)
    }
}

impl GitOps for Repository {
    fn log(&self, selector: &LogSelector) -> Result<GitOutput, GitSquashError> {
        let args = selector.to_log_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.exec_raw(&args)
    }

    fn upstream_ref(&self) -> Result<Option<String>, GitSquashError> {
        let output =
            self.exec_raw(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])?;
        if !output.success {
            return Ok(None);
        }
        let upstream = output.stdout.trim();
        Ok((!upstream.is_empty()).then(|| upstream.to_string()))
    }

    fn ref_exists(&self, ref_name: &str) -> Result<bool, GitSquashError> {
        let output = self.exec_raw(&["rev-parse", "--verify", "--quiet", ref_name])?;
        Ok(output.success)
    }

    fn object_exists(&self, hash: &str) -> Result<bool, GitSquashError> {
        let output = self.exec_raw(&["cat-file", "-e", hash])?;
        Ok(output.success)
    }

    fn soft_reset(&self, target: &str) -> Result<GitOutput, GitSquashError> {
        self.exec_raw(&["reset", "--soft", target])
    }

    fn commit(&self, message: &str) -> Result<GitOutput, GitSquashError> {
        self.exec_raw(&["commit", "-m", message])
    }
}

/// Run git and fail with `GitCliError` on a non-zero exit.
pub fn exec_git(git_cmd: &str, args: &[String]) -> Result<Output, GitSquashError> {
    debug_log(&format!("exec: {} {}", git_cmd, args.join(" ")));
    let output = Command::new(git_cmd).args(args).output()?;
    if !output.status.success() {
        return Err(GitSquashError::GitCliError {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            args: args.to_vec(),
        });
    }
    Ok(output)
}

/// Run git and hand back the exit status along with its output.
pub fn exec_git_raw(git_cmd: &str, args: &[String]) -> Result<GitOutput, GitSquashError> {
    debug_log(&format!("exec: {} {}", git_cmd, args.join(" ")));
    let output = Command::new(git_cmd).args(args).output()?;
    GitOutput::from_output(output)
}
