pub mod automation;
pub mod config;
pub mod keyvault;

use crate::output::print_json;
use crate::prompt::{StderrStatus, TerminalPrompter};
use azops_core::client::ManagementClient;
use azops_core::config::Config;
use azops_core::confirm::{Confirmer, ExecutionOutcome, Impact, Session, SkipReason};

pub type CliConfirmer = Confirmer<TerminalPrompter, StderrStatus>;

/// Build the confirmer for one invocation. `--confirm` lowers the threshold so
/// every mutating action prompts.
pub fn confirmer(config: &Config, what_if: bool, confirm_all: bool) -> CliConfirmer {
    let threshold = if confirm_all {
        Impact::Low
    } else {
        config.confirm.threshold
    };
    Confirmer::new(TerminalPrompter, StderrStatus, Session::new(what_if, threshold))
}

/// Built inside actions so previews and skips never need a token.
pub fn management_client(config: &Config) -> anyhow::Result<ManagementClient> {
    Ok(ManagementClient::new(config.auth.token()?)?)
}

pub fn non_empty(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(s.to_string())
}

/// Report every outcome except a successful execution, which the command
/// prints itself.
pub fn report_outcome<T>(target: &str, outcome: &ExecutionOutcome<T>, json: bool) -> anyhow::Result<()> {
    let (label, reason) = match outcome {
        ExecutionOutcome::Executed(_) => ("executed", None),
        ExecutionOutcome::PreviewedOnly => ("previewed", None),
        ExecutionOutcome::Skipped(reason) => ("skipped", Some(*reason)),
    };

    if json {
        return print_json(&serde_json::json!({
            "target": target,
            "outcome": label,
            "reason": reason,
        }));
    }

    if let Some(line) = skip_line(target, reason) {
        eprintln!("{line}");
    }
    Ok(())
}

/// Human-readable skip notice. Printed whatever the log filter is, so a skip
/// is never silent.
fn skip_line(target: &str, reason: Option<SkipReason>) -> Option<String> {
    match reason? {
        SkipReason::Declined | SkipReason::DeclinedAll => Some(format!("Skipped '{target}'.")),
        reason @ (SkipReason::NonInteractive | SkipReason::PromptFailed) => {
            Some(format!("Skipped '{target}': {reason}"))
        }
    }
}
