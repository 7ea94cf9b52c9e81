//! Confirm-then-act gate shared by every mutating command.
//!
//! A command builds an [`ActionRequest`] around the closure that performs the
//! mutation and hands it to [`Confirmer::execute`]. The confirmer decides,
//! from the session flags and the user's answer, whether the closure runs.
//!
//! Decision order:
//!   1. what-if        -> status message, `PreviewedOnly`
//!   2. force          -> run
//!   3. impact below the session threshold -> run
//!   4. yes-to-all / no-to-all answered earlier in the session
//!   5. no terminal    -> warn, `Skipped(NonInteractive)`
//!   6. prompt         -> run or skip per the answer

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Impact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Impact {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Impact::Low),
            "medium" => Ok(Impact::Medium),
            "high" => Ok(Impact::High),
            other => Err(format!("unknown impact '{other}': expected low, medium or high")),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt / status seams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Yes,
    YesToAll,
    No,
    NoToAll,
}

/// Interactive yes/no channel.
pub trait Prompter {
    /// False when no user can answer (stdin or stderr is not a terminal).
    fn is_interactive(&self) -> bool;

    /// Block until the user answers `message` about `target`.
    fn prompt(&mut self, message: &str, target: &str) -> std::io::Result<Response>;
}

/// One-way sink for what-if messages.
pub trait StatusSink {
    fn status(&mut self, message: &str);
}

// ---------------------------------------------------------------------------
// ActionRequest
// ---------------------------------------------------------------------------

/// A pending mutation plus everything needed to confirm or preview it.
pub struct ActionRequest<F> {
    target: String,
    confirm_message: String,
    preview_message: String,
    force: bool,
    impact: Impact,
    action: F,
}

impl<F> ActionRequest<F> {
    pub fn new(target: impl Into<String>, action: F) -> Self {
        let target = target.into();
        Self {
            confirm_message: format!("Are you sure you want to perform this action on '{target}'?"),
            preview_message: format!("Performing the operation on target '{target}'"),
            target,
            force: false,
            impact: Impact::High,
            action,
        }
    }

    pub fn confirm_message(mut self, message: impl Into<String>) -> Self {
        self.confirm_message = message.into();
        self
    }

    pub fn preview_message(mut self, message: impl Into<String>) -> Self {
        self.preview_message = message.into();
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

// ---------------------------------------------------------------------------
// ExecutionOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The user answered no.
    Declined,
    /// The user answered "no to all" now or earlier in the session.
    DeclinedAll,
    /// No terminal to ask and no force flag.
    NonInteractive,
    /// The prompt itself failed (closed stdin, terminal error).
    PromptFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Declined => "declined",
            SkipReason::DeclinedAll => "declined (no to all)",
            SkipReason::NonInteractive => "confirmation required but no terminal is attached; use --force",
            SkipReason::PromptFailed => "confirmation prompt failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome<T> {
    Executed(T),
    Skipped(SkipReason),
    PreviewedOnly,
}

impl<T> ExecutionOutcome<T> {
    pub fn is_executed(&self) -> bool {
        matches!(self, ExecutionOutcome::Executed(_))
    }

    pub fn executed(self) -> Option<T> {
        match self {
            ExecutionOutcome::Executed(v) => Some(v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Per-invocation state. A new session starts with both "to all" flags clear.
#[derive(Debug, Clone)]
pub struct Session {
    what_if: bool,
    confirm_threshold: Impact,
    yes_to_all: bool,
    no_to_all: bool,
}

impl Session {
    pub fn new(what_if: bool, confirm_threshold: Impact) -> Self {
        Self {
            what_if,
            confirm_threshold,
            yes_to_all: false,
            no_to_all: false,
        }
    }

    pub fn what_if(&self) -> bool {
        self.what_if
    }

    pub fn confirm_threshold(&self) -> Impact {
        self.confirm_threshold
    }

    pub fn yes_to_all(&self) -> bool {
        self.yes_to_all
    }

    pub fn no_to_all(&self) -> bool {
        self.no_to_all
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(false, Impact::High)
    }
}

// ---------------------------------------------------------------------------
// Confirmer
// ---------------------------------------------------------------------------

enum Decision {
    Preview,
    Execute,
    Skip(SkipReason),
}

pub struct Confirmer<P, S> {
    prompter: P,
    status: S,
    session: Session,
}

impl<P: Prompter, S: StatusSink> Confirmer<P, S> {
    pub fn new(prompter: P, status: S, session: Session) -> Self {
        Self {
            prompter,
            status,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    /// Decide whether to run `request`'s action, and run it at most once.
    ///
    /// Errors from the action are returned as-is. Declining, previewing and
    /// lacking a terminal are all `Ok` outcomes.
    pub fn execute<T, E, F>(&mut self, request: ActionRequest<F>) -> Result<ExecutionOutcome<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let ActionRequest {
            target,
            confirm_message,
            preview_message,
            force,
            impact,
            action,
        } = request;

        match self.decide(&target, &confirm_message, &preview_message, force, impact) {
            Decision::Preview => Ok(ExecutionOutcome::PreviewedOnly),
            Decision::Skip(reason) => {
                tracing::debug!(name = %target, %reason, "action skipped");
                Ok(ExecutionOutcome::Skipped(reason))
            }
            Decision::Execute => {
                tracing::debug!(name = %target, %impact, "executing action");
                action().map(ExecutionOutcome::Executed)
            }
        }
    }

    fn decide(
        &mut self,
        target: &str,
        confirm_message: &str,
        preview_message: &str,
        force: bool,
        impact: Impact,
    ) -> Decision {
        if self.session.what_if {
            self.status.status(&format!("What if: {preview_message}"));
            return Decision::Preview;
        }
        if force {
            return Decision::Execute;
        }
        if impact < self.session.confirm_threshold {
            return Decision::Execute;
        }
        if self.session.yes_to_all {
            return Decision::Execute;
        }
        if self.session.no_to_all {
            return Decision::Skip(SkipReason::DeclinedAll);
        }
        if !self.prompter.is_interactive() {
            tracing::warn!(
                "cannot confirm '{target}': no terminal attached; re-run with --force to proceed"
            );
            return Decision::Skip(SkipReason::NonInteractive);
        }

        match self.prompter.prompt(confirm_message, target) {
            Ok(Response::Yes) => Decision::Execute,
            Ok(Response::YesToAll) => {
                self.session.yes_to_all = true;
                Decision::Execute
            }
            Ok(Response::No) => Decision::Skip(SkipReason::Declined),
            Ok(Response::NoToAll) => {
                self.session.no_to_all = true;
                Decision::Skip(SkipReason::DeclinedAll)
            }
            Err(e) => {
                tracing::warn!("cannot confirm '{target}': {e}");
                Decision::Skip(SkipReason::PromptFailed)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
