//! End-to-end squash runs against real repositories.

mod repos;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use git_squash::commands::commit_picker::{PickerLayout, drive_picker};
use git_squash::commands::squash::{
    Prompter, SquashOptions, SquashOutcome, handle_squash, run_squash,
};
use git_squash::commands::terminal::KeyInput;
use git_squash::config::Config;
use git_squash::error::GitSquashError;
use git_squash::git::log::CommitRecord;
use git_squash::utils::Cancellation;
use repos::test_repo::TestRepo;
use serial_test::serial;

/// Drives the real picker with a fixed key sequence and answers the message
/// prompt with a fixed string.
struct KeyScript {
    keys: Vec<KeyCode>,
    message: &'static str,
}

impl Prompter for KeyScript {
    fn pick_commit(&mut self, commits: &[CommitRecord]) -> Result<CommitRecord, GitSquashError> {
        let (key_tx, key_rx) = smol::channel::bounded(1);
        let (_err_tx, err_rx) = smol::channel::bounded(1);
        let keys = self.keys.clone();
        // feed through the single-slot channel from another thread, like the reader does
        let feeder = std::thread::spawn(move || {
            for code in keys {
                if key_tx
                    .send_blocking(KeyEvent::new(code, KeyModifiers::empty()))
                    .is_err()
                {
                    break;
                }
            }
        });
        let input = KeyInput::from_channels(key_rx, err_rx);
        let mut screen = Vec::new();
        let result = smol::block_on(drive_picker(
            commits,
            PickerLayout::new(3, 50),
            &input,
            &Cancellation::new(),
            &mut screen,
        ));
        drop(input);
        feeder.join().unwrap();
        result
    }

    fn commit_message(&mut self, _selected: Option<&CommitRecord>) -> Result<String, GitSquashError> {
        Ok(self.message.to_string())
    }
}

fn squash(
    repo: &TestRepo,
    options: &SquashOptions,
    keys: Vec<KeyCode>,
) -> Result<SquashOutcome, GitSquashError> {
    let git = repo.repository();
    let mut prompter = KeyScript {
        keys,
        message: "Squashed from picker",
    };
    let mut out = Vec::new();
    run_squash(
        &git,
        &Config::default(),
        options,
        &mut prompter,
        &Cancellation::new(),
        &mut out,
    )
}

#[test]
fn test_picker_selection_squashes_into_one_commit() {
    let repo = TestRepo::new();
    let shas = repo.commits(6);
    repo.set_remote_branch("main", &shas[0]);

    let outcome = squash(
        &repo,
        &SquashOptions::default(),
        vec![KeyCode::Down, KeyCode::Down, KeyCode::Enter],
    )
    .unwrap();

    assert_eq!(
        outcome,
        SquashOutcome::Squashed {
            count: 3,
            hash: shas[3].clone()
        }
    );
    assert_eq!(
        repo.log_subjects(),
        vec!["Squashed from picker", "commit 3", "commit 2", "commit 1"]
    );
    // the squashed commit keeps every change from the range
    assert_eq!(repo.read_file("file_4.txt"), "commit 4\n");
    assert_eq!(repo.read_file("file_6.txt"), "commit 6\n");
    assert_eq!(repo.git(&["rev-parse", "HEAD^"]), shas[2]);
}

#[test]
fn test_hash_and_message_flags_skip_prompts() {
    let repo = TestRepo::new();
    let shas = repo.commits(4);
    repo.set_upstream("main", &shas[0]);

    let options = SquashOptions {
        hash: Some(shas[1][..7].to_string()),
        message: Some("Feature complete".to_string()),
        max: false,
    };
    let outcome = squash(&repo, &options, vec![]).unwrap();
    assert!(matches!(outcome, SquashOutcome::Squashed { count: 3, .. }));
    assert_eq!(repo.log_subjects(), vec!["Feature complete", "commit 1"]);
}

#[test]
fn test_head_hash_leaves_history_untouched() {
    let repo = TestRepo::new();
    let shas = repo.commits(4);
    repo.set_remote_branch("main", &shas[0]);
    let head_before = repo.head();

    let options = SquashOptions {
        hash: Some(shas[3].clone()),
        message: Some("nope".to_string()),
        max: false,
    };
    let err = squash(&repo, &options, vec![]).unwrap_err();
    assert_eq!(err.to_string(), "not enough commits selected");
    assert_eq!(repo.head(), head_before);
}

#[test]
fn test_escape_in_picker_leaves_history_untouched() {
    let repo = TestRepo::new();
    repo.commits(5);
    let head_before = repo.head();

    let err = squash(
        &repo,
        &SquashOptions::default(),
        vec![KeyCode::Down, KeyCode::Esc],
    )
    .unwrap_err();
    assert!(err.is_user_abort());
    assert_eq!(repo.head(), head_before);
}

#[test]
fn test_max_without_remote_keeps_oldest_commit() {
    let repo = TestRepo::new();
    let shas = repo.commits(5);

    let options = SquashOptions {
        max: true,
        message: Some("All local work".to_string()),
        ..Default::default()
    };
    let outcome = squash(&repo, &options, vec![]).unwrap();
    assert_eq!(
        outcome,
        SquashOutcome::Squashed {
            count: 4,
            hash: shas[1].clone()
        }
    );
    assert_eq!(repo.log_subjects(), vec!["All local work", "commit 1"]);
}

#[test]
#[serial]
fn test_handle_squash_uses_current_directory() {
    let repo = TestRepo::new();
    let shas = repo.commits(3);
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(repo.path()).unwrap();

    let options = SquashOptions {
        hash: Some(shas[1].clone()),
        message: Some("From cwd".to_string()),
        max: false,
    };
    let result = handle_squash(&options, Cancellation::new());
    std::env::set_current_dir(previous).unwrap();

    assert_eq!(
        result.unwrap(),
        SquashOutcome::Squashed {
            count: 2,
            hash: shas[1].clone()
        }
    );
    assert_eq!(repo.log_subjects(), vec!["From cwd", "commit 1"]);
}
