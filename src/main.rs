use clap::Parser;
use git_squash::commands::squash::{SquashOptions, handle_squash};
use git_squash::utils::{Cancellation, init_logging};

/// Exit status for a run the user backed out of.
const EXIT_ABORTED: i32 = 130;

#[derive(Parser)]
#[command(name = "git-squash", version)]
#[command(about = "Squash unpushed commits into a single commit")]
#[command(
    long_about = "git-squash lets you pick a commit from your unpushed history and squashes \
                  everything from that commit up to HEAD into a single commit."
)]
struct Cli {
    /// Optional commit hash to squash from
    #[arg(short = 'a', long)]
    hash: Option<String>,

    /// Optional commit message for the squashed commit
    #[arg(short = 'm', long)]
    message: Option<String>,

    /// Auto-select the oldest selectable commit
    #[arg(long)]
    max: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let cancel = Cancellation::new();
    let handler_cancel = cancel.clone();
    // SIGINT, SIGTERM and SIGHUP all unwind through the token so raw mode is released
    if let Err(e) = ctrlc::set_handler(move || handler_cancel.cancel()) {
        tracing::warn!("could not install interrupt handler: {}", e);
    }

    let options = SquashOptions {
        hash: cli.hash,
        message: cli.message,
        max: cli.max,
    };

    match handle_squash(&options, cancel) {
        Ok(_) => {}
        Err(e) if e.is_user_abort() => {
            eprintln!("Aborted by user.");
            std::process::exit(EXIT_ABORTED);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
