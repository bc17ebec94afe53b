//! # Parser Backends
//!
//! Backend implementations for the four parser flavors:
//!
//! - **LL(1)** ([`ll`]): top-down predictive parsing over a FIRST⁺ table.
//! - **SLR(1) / CLR(1) / LALR(1)** ([`lr`]): bottom-up shift-reduce parsing
//!   over ACTION/GOTO tables built from LR(0) or LR(1) automata.
//!
//! Every backend implements [`ParserBackend`], the capability-style
//! interface the comparator drives: build once from a grammar, then expose
//! conflicts, summary statistics, and a parse operation that yields a full
//! trace and parse tree.
//!
//! Conflicts are data, not errors. A conflicted table stays usable under a
//! deterministic tie-break (shift beats reduce, lower production id beats
//! higher), and the conflict records report exactly what the tie-break
//! decided.

use compact_str::CompactString;
use std::fmt;
use std::str::FromStr;

use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::trace::ParseOutcome;

#[cfg(feature = "backend-ll")]
pub mod ll;

#[cfg(feature = "backend-lr")]
pub mod lr;

/// The four parser flavors this toolkit builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParserFlavor {
    /// Top-down predictive LL(1).
    Ll1,
    /// Simple LR: LR(0) automaton with FOLLOW-set reductions.
    Slr1,
    /// Canonical LR(1): full lookahead items.
    Clr1,
    /// Lookahead LR: LR(1) states merged by core.
    Lalr1,
}

impl ParserFlavor {
    /// The conventional display name, e.g. `"LALR(1)"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ll1 => "LL(1)",
            Self::Slr1 => "SLR(1)",
            Self::Clr1 => "CLR(1)",
            Self::Lalr1 => "LALR(1)",
        }
    }

    /// Look up a flavor by name, case-insensitively; the `(1)` suffix is
    /// optional (`"slr"`, `"SLR(1)"`, `"lalr"` all resolve).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase();
        let base = normalized.strip_suffix("(1)").unwrap_or(&normalized);
        match base {
            "LL" | "LL1" => Some(Self::Ll1),
            "SLR" | "SLR1" => Some(Self::Slr1),
            "CLR" | "CLR1" | "LR" | "LR1" => Some(Self::Clr1),
            "LALR" | "LALR1" => Some(Self::Lalr1),
            _ => None,
        }
    }
}

impl fmt::Display for ParserFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a flavor name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFlavor(pub String);

impl fmt::Display for UnknownFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parser flavor {:?}; use LL, SLR, CLR or LALR", self.0)
    }
}

impl std::error::Error for UnknownFlavor {}

impl FromStr for ParserFlavor {
    type Err = UnknownFlavor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownFlavor(s.to_string()))
    }
}

/// Parsing discipline of a flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Discipline {
    /// Predictive, leftmost-derivation parsing.
    TopDown,
    /// Shift-reduce, rightmost-derivation-in-reverse parsing.
    BottomUp,
}

/// Static capabilities of a backend flavor.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BackendCapabilities {
    /// Display name of the flavor.
    pub name: &'static str,
    /// The flavor itself.
    pub flavor: ParserFlavor,
    /// Top-down or bottom-up.
    pub discipline: Discipline,
    /// Whether the flavor tolerates left-recursive grammars.
    pub supports_left_recursion: bool,
    /// Lookahead depth; always 1 for this toolkit.
    pub lookahead: usize,
}

impl BackendCapabilities {
    /// Capabilities of the given flavor.
    #[must_use]
    pub const fn of(flavor: ParserFlavor) -> Self {
        let (discipline, supports_left_recursion) = match flavor {
            ParserFlavor::Ll1 => (Discipline::TopDown, false),
            ParserFlavor::Slr1 | ParserFlavor::Clr1 | ParserFlavor::Lalr1 => {
                (Discipline::BottomUp, true)
            }
        };
        Self {
            name: flavor.name(),
            flavor,
            discipline,
            supports_left_recursion,
            lookahead: 1,
        }
    }
}

/// A parsing-table conflict: a cell that two incompatible entries were
/// written to. The record names the entry the tie-break kept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Conflict {
    /// ACTION cell holding both a shift and a reduce; shift wins.
    ShiftReduce {
        /// State of the ACTION cell.
        state: usize,
        /// Triggering terminal.
        terminal: CompactString,
        /// Target state of the winning shift.
        shift_state: usize,
        /// Production id of the losing reduce.
        production: usize,
    },
    /// ACTION cell holding two reduces; the lower production id wins.
    ReduceReduce {
        /// State of the ACTION cell.
        state: usize,
        /// Triggering terminal.
        terminal: CompactString,
        /// Production id kept in the table.
        kept: usize,
        /// Production id recorded but not kept.
        discarded: usize,
    },
    /// LL(1) cell with multiple productions; the lower id wins.
    Predict {
        /// Row nonterminal.
        nonterminal: CompactString,
        /// Column terminal.
        terminal: CompactString,
        /// Production id kept in the table.
        kept: usize,
        /// Production id recorded but not kept.
        discarded: usize,
    },
}

impl Conflict {
    /// Whether this is a shift/reduce conflict.
    #[must_use]
    pub const fn is_shift_reduce(&self) -> bool {
        matches!(self, Self::ShiftReduce { .. })
    }

    /// Whether this is a reduce/reduce conflict.
    #[must_use]
    pub const fn is_reduce_reduce(&self) -> bool {
        matches!(self, Self::ReduceReduce { .. })
    }

    /// The terminal that triggers the conflict.
    #[must_use]
    pub fn terminal(&self) -> &str {
        match self {
            Self::ShiftReduce { terminal, .. }
            | Self::ReduceReduce { terminal, .. }
            | Self::Predict { terminal, .. } => terminal,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShiftReduce {
                state,
                terminal,
                shift_state,
                production,
            } => write!(
                f,
                "shift/reduce conflict in state {state} on {terminal:?}: \
                 shift {shift_state} kept, reduce {production} dropped"
            ),
            Self::ReduceReduce {
                state,
                terminal,
                kept,
                discarded,
            } => write!(
                f,
                "reduce/reduce conflict in state {state} on {terminal:?}: \
                 reduce {kept} kept, reduce {discarded} dropped"
            ),
            Self::Predict {
                nonterminal,
                terminal,
                kept,
                discarded,
            } => write!(
                f,
                "multiple predictions for ({nonterminal}, {terminal:?}): \
                 production {kept} kept, production {discarded} dropped"
            ),
        }
    }
}

/// Per-flavor statistics for the comparator report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlavorSummary {
    /// The summarized flavor.
    pub flavor: ParserFlavor,
    /// Whether the table has no conflicts.
    pub conflict_free: bool,
    /// Number of recorded conflicts.
    pub conflict_count: usize,
    /// Automaton state count; `None` for the table-only LL(1) backend.
    pub state_count: Option<usize>,
    /// Automaton transition count; `None` for LL(1).
    pub transition_count: Option<usize>,
    /// ACTION entries (LR) or predictive table entries (LL).
    pub action_entries: usize,
    /// GOTO entries; 0 for LL(1).
    pub goto_entries: usize,
    /// Terminals of the grammar the tables were built from.
    pub terminal_count: usize,
    /// Nonterminals of the grammar the tables were built from.
    pub nonterminal_count: usize,
}

impl FlavorSummary {
    /// Total table cardinality.
    #[must_use]
    pub const fn table_entries(&self) -> usize {
        self.action_entries + self.goto_entries
    }
}

/// The capability interface every parser flavor exposes: build once, then
/// report conflicts and statistics, and simulate parses.
pub trait ParserBackend {
    /// The flavor this backend implements.
    fn flavor(&self) -> ParserFlavor;

    /// The grammar the driver consumes tokens against (for LR backends,
    /// the augmented grammar).
    fn grammar(&self) -> &Grammar;

    /// Conflicts recorded while building the tables.
    fn conflicts(&self) -> &[Conflict];

    /// Whether the tables are conflict-free.
    fn is_conflict_free(&self) -> bool {
        self.conflicts().is_empty()
    }

    /// Static capabilities of this backend's flavor.
    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::of(self.flavor())
    }

    /// Summary statistics for comparison reports.
    fn summary(&self) -> FlavorSummary;

    /// Simulate a parse of the given token stream (without the implicit
    /// `$`). Returns the full trace even on failure.
    fn parse_tokens(&self, tokens: &[CompactString]) -> ParseOutcome;

    /// Tokenize whitespace-separated input and parse it.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::UnknownToken`] if the input mentions a name
    /// that is not a terminal of the grammar.
    fn parse_text(&self, input: &str) -> Result<ParseOutcome, GrammarError> {
        let tokens = self.grammar().tokenize(input)?;
        Ok(self.parse_tokens(&tokens))
    }
}
