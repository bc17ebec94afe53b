//! Parse traces: the step-by-step record every driver produces.
//!
//! A trace is pure data. Each step snapshots the driver's stack and the
//! remaining input *before* the recorded action is applied, so a failed
//! parse still yields the complete history up to and including the terminal
//! error step.

use compact_str::CompactString;
use std::fmt;

use crate::tree::TreeNode;

/// The action a driver took at one step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StepAction {
    /// Shift the current token and enter `state` (shift-reduce driver).
    Shift {
        /// The state pushed after the shift.
        state: usize,
    },
    /// Reduce by the production with the given id (shift-reduce driver).
    Reduce {
        /// Production id in the augmented grammar.
        production: usize,
    },
    /// Match the terminal on top of the stack (predictive driver).
    Match {
        /// The matched terminal.
        terminal: CompactString,
    },
    /// Expand the nonterminal on top of the stack by a production
    /// (predictive driver).
    Expand {
        /// Production id in the driver's grammar.
        production: usize,
    },
    /// Input accepted.
    Accept,
    /// Parse failed; the message names the offending state/symbol pair.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift { state } => write!(f, "shift {state}"),
            Self::Reduce { production } => write!(f, "reduce {production}"),
            Self::Match { terminal } => write!(f, "match {terminal}"),
            Self::Expand { production } => write!(f, "expand {production}"),
            Self::Accept => f.write_str("accept"),
            Self::Error { message } => write!(f, "error: {message}"),
        }
    }
}

/// One step of a parse: stack and input snapshots plus the action taken.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseStep {
    /// 1-based step number.
    pub step: usize,
    /// Stack snapshot, bottom first. The shift-reduce driver interleaves
    /// state ids and symbols; the predictive driver holds symbols only.
    pub stack: Vec<CompactString>,
    /// Unconsumed input, including the implicit `$`.
    pub remaining: Vec<CompactString>,
    /// The action applied at this step.
    pub action: StepAction,
    /// Optional elaboration, e.g. the text of the production reduced by.
    pub note: Option<String>,
}

/// The complete result of one driver run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseOutcome {
    /// Whether the input was accepted.
    pub accepted: bool,
    /// Every step taken, including the terminal accept or error step.
    pub steps: Vec<ParseStep>,
    /// The parse tree; present only on acceptance.
    pub tree: Option<TreeNode>,
}

impl ParseOutcome {
    /// The step that ended the parse.
    #[must_use]
    pub fn final_step(&self) -> Option<&ParseStep> {
        self.steps.last()
    }
}
