//! Interactive yes/no questions on the terminal.

use std::io::{self, BufRead, Write};

use spacetime_gmaps::Confirm;

/// A confirmation was declined.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct Cancelled(pub(crate) String);

/// Asks on stdout and reads the answer from stdin. Only `y`/`yes` accepts.
pub(crate) struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        ask(prompt)
    }
}

/// Always accepts; used for `--yes`.
pub(crate) struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::info!(prompt, "confirmation skipped (--yes)");
        true
    }
}

pub(crate) fn ask(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(e) => {
            tracing::warn!(error = %e, "could not read confirmation; treating as no");
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
