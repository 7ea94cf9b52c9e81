use azops_core::confirm::{Prompter, Response, StatusSink};
use dialoguer::Select;
use std::io::{self, IsTerminal};

const CHOICES: [&str; 4] = ["[Y] Yes", "[A] Yes to All", "[N] No", "[L] No to All"];
const DEFAULT_CHOICE: usize = 2;

/// Asks on the controlling terminal via stderr.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal() && io::stderr().is_terminal()
    }

    fn prompt(&mut self, message: &str, target: &str) -> io::Result<Response> {
        eprintln!("Confirm");
        eprintln!("{message}");
        let choice = Select::new()
            .with_prompt(format!("Performing the operation on target \"{target}\""))
            .items(&CHOICES)
            .default(DEFAULT_CHOICE)
            .interact()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(response_for(choice))
    }
}

fn response_for(choice: usize) -> Response {
    match choice {
        0 => Response::Yes,
        1 => Response::YesToAll,
        3 => Response::NoToAll,
        _ => Response::No,
    }
}

/// What-if messages go to stderr so stdout stays parseable under `--json`.
pub struct StderrStatus;

impl StatusSink for StderrStatus {
    fn status(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
