use std::io::Write;

use crossterm::style::Stylize;

use crate::commands::commit_picker;
use crate::commands::message_prompt;
use crate::commands::validate::validate_selected_commit;
use crate::config::Config;
use crate::error::{GitSquashError, ValidationError};
use crate::git::find_repository;
use crate::git::log::CommitRecord;
use crate::git::repository::GitOps;
use crate::git::squash::squash_commits;
use crate::git::squashable::SquashableRangeSelector;
use crate::utils::{Cancellation, debug_log};

/// Command-line choices for one squash run.
#[derive(Debug, Clone, Default)]
pub struct SquashOptions {
    /// Oldest commit to include; skips the picker.
    pub hash: Option<String>,
    /// Message for the squashed commit; skips the prompt.
    pub message: Option<String>,
    /// Pick the oldest squashable commit without asking.
    pub max: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquashOutcome {
    NothingToSquash,
    Squashed { count: usize, hash: String },
}

/// The interactive parts of a squash run.
pub trait Prompter {
    fn pick_commit(&mut self, commits: &[CommitRecord]) -> Result<CommitRecord, GitSquashError>;

    fn commit_message(
        &mut self,
        selected: Option<&CommitRecord>,
    ) -> Result<String, GitSquashError>;
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter<'a> {
    config: &'a Config,
    cancel: Cancellation,
}

impl<'a> TerminalPrompter<'a> {
    pub fn new(config: &'a Config, cancel: Cancellation) -> Self {
        Self { config, cancel }
    }
}

impl Prompter for TerminalPrompter<'_> {
    fn pick_commit(&mut self, commits: &[CommitRecord]) -> Result<CommitRecord, GitSquashError> {
        commit_picker::pick_commit(commits, self.config.subject_width(), &self.cancel)
    }

    fn commit_message(
        &mut self,
        selected: Option<&CommitRecord>,
    ) -> Result<String, GitSquashError> {
        message_prompt::prompt_commit_message(selected, &self.cancel)
    }
}

/// Entry point for the binary: squash in the repository of the current directory.
pub fn handle_squash(
    options: &SquashOptions,
    cancel: Cancellation,
) -> Result<SquashOutcome, GitSquashError> {
    let config = Config::get();
    let mut stdout = std::io::stdout();

    let cwd = std::env::current_dir()?;
    writeln!(stdout, "{}", cwd.display().to_string().dark_cyan())?;

    let repo = find_repository(config)?;
    let mut prompter = TerminalPrompter::new(config, cancel.clone());
    run_squash(&repo, config, options, &mut prompter, &cancel, &mut stdout)
}

/// Resolve candidates, select and validate the oldest included commit, obtain
/// a message and squash.
pub fn run_squash<G, P, W>(
    git: &G,
    config: &Config,
    options: &SquashOptions,
    prompter: &mut P,
    cancel: &Cancellation,
    out: &mut W,
) -> Result<SquashOutcome, GitSquashError>
where
    G: GitOps + ?Sized,
    P: Prompter + ?Sized,
    W: Write,
{
    let commits = SquashableRangeSelector::new(
        git,
        config.base_branches(),
        config.fallback_window(),
    )
    .get_squashable_commits()?;

    if commits.len() <= 1 {
        writeln!(out, "{}", "No squashable commits found".dark_yellow())?;
        return Ok(SquashOutcome::NothingToSquash);
    }

    let selected = select_commit(&commits, options, prompter, out)?;
    let count = validate_selected_commit(git, &commits, &selected)?;
    writeln!(
        out,
        "\n{} {} {}",
        count.to_string().dark_yellow(),
        "commits selected including:".dark_green(),
        selected
    )?;

    let selected_record = commits.iter().find(|c| c.matches(&selected));
    let message = match options.message.as_deref() {
        Some(message) => message.to_string(),
        None => prompter.commit_message(selected_record)?,
    };
    let message = message.trim();
    if message.is_empty() {
        return Err(ValidationError::EmptyMessage.into());
    }

    if cancel.is_cancelled() {
        return Err(GitSquashError::Cancelled);
    }

    debug_log(&format!("Squashing {} commits down to {}", count, selected));
    squash_commits(git, &selected, message)?;

    writeln!(
        out,
        "{} {}",
        count,
        "commits successfully squashed".green().bold()
    )?;

    Ok(SquashOutcome::Squashed {
        count,
        hash: selected,
    })
}

fn select_commit<P, W>(
    commits: &[CommitRecord],
    options: &SquashOptions,
    prompter: &mut P,
    out: &mut W,
) -> Result<String, GitSquashError>
where
    P: Prompter + ?Sized,
    W: Write,
{
    let selected = match options.hash.as_deref().map(str::trim) {
        Some(hash) if !hash.is_empty() => hash.to_string(),
        _ if options.max => commits
            .last()
            .map(|c| c.hash.clone())
            .unwrap_or_default(),
        _ => {
            writeln!(out, "\n{}", "Squashable commits:".blue().bold())?;
            out.flush()?;
            prompter.pick_commit(commits)?.hash
        }
    };

    if selected.is_empty() {
        return Err(ValidationError::NoCommitSelected.into());
    }
    Ok(selected)
}
