//! # LR Backend
//!
//! Bottom-up shift-reduce parsing in three flavors:
//!
//! - **SLR(1)** — LR(0) automaton, FOLLOW-set reductions.
//! - **CLR(1)** — canonical LR(1) automaton, per-item lookahead reductions.
//! - **LALR(1)** — the CLR(1) automaton merged by core, then filled like
//!   CLR(1).
//!
//! [`LrParser::new`] augments the grammar, builds the flavor's automaton and
//! tables, and records conflicts; [`crate::backend::ParserBackend::parse_tokens`]
//! then simulates parses with full traces and parse trees.

pub mod automaton;
pub mod item;
mod parser;
pub mod table;

use compact_str::CompactString;
use std::fmt;
use std::str::FromStr;

use crate::backend::lr::automaton::{Automaton, build_lr0, build_lr1, merge_by_core};
use crate::backend::lr::item::{Lr0Item, Lr1Item};
use crate::backend::lr::table::ParseTable;
use crate::backend::{Conflict, FlavorSummary, ParserBackend, ParserFlavor, UnknownFlavor};
use crate::error::TableError;
use crate::grammar::analysis::FirstFollow;
use crate::grammar::{Grammar, Symbol};
use crate::trace::ParseOutcome;

/// The three shift-reduce table flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LrFlavor {
    /// Simple LR(1).
    Slr1,
    /// Canonical LR(1).
    Clr1,
    /// Lookahead LR(1).
    Lalr1,
}

impl From<LrFlavor> for ParserFlavor {
    fn from(flavor: LrFlavor) -> Self {
        match flavor {
            LrFlavor::Slr1 => Self::Slr1,
            LrFlavor::Clr1 => Self::Clr1,
            LrFlavor::Lalr1 => Self::Lalr1,
        }
    }
}

impl fmt::Display for LrFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ParserFlavor::from(*self).fmt(f)
    }
}

impl FromStr for LrFlavor {
    type Err = UnknownFlavor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ParserFlavor::from_name(s) {
            Some(ParserFlavor::Slr1) => Ok(Self::Slr1),
            Some(ParserFlavor::Clr1) => Ok(Self::Clr1),
            Some(ParserFlavor::Lalr1) => Ok(Self::Lalr1),
            _ => Err(UnknownFlavor(s.to_string())),
        }
    }
}

/// The automaton behind a built parser: LR(0) items for SLR(1), LR(1) items
/// for CLR(1) and (after the core-merge) LALR(1).
#[derive(Debug, Clone)]
pub enum LrAutomaton {
    /// LR(0) collection (SLR).
    Lr0(Automaton<Lr0Item>),
    /// LR(1) collection (CLR, or merged for LALR).
    Lr1(Automaton<Lr1Item>),
}

impl LrAutomaton {
    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        match self {
            Self::Lr0(a) => a.state_count(),
            Self::Lr1(a) => a.state_count(),
        }
    }

    /// Number of transitions.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        match self {
            Self::Lr0(a) => a.transition_count(),
            Self::Lr1(a) => a.transition_count(),
        }
    }

    /// All transitions as sorted `(from, symbol, to)` triples.
    #[must_use]
    pub fn transition_triples(&self) -> Vec<(usize, Symbol, usize)> {
        match self {
            Self::Lr0(a) => a.transition_triples(),
            Self::Lr1(a) => a.transition_triples(),
        }
    }

    /// Every state rendered for display: id plus stringified dotted items.
    #[must_use]
    pub fn render_states(&self, grammar: &Grammar) -> Vec<StateView> {
        match self {
            Self::Lr0(a) => a
                .states()
                .iter()
                .enumerate()
                .map(|(id, state)| StateView {
                    id,
                    items: state.items().iter().map(|i| i.render(grammar)).collect(),
                })
                .collect(),
            Self::Lr1(a) => a
                .states()
                .iter()
                .enumerate()
                .map(|(id, state)| StateView {
                    id,
                    items: state.items().iter().map(|i| i.render(grammar)).collect(),
                })
                .collect(),
        }
    }
}

/// A display-ready automaton state: its id and dotted items.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StateView {
    /// The state's id.
    pub id: usize,
    /// Items rendered as `A -> α · β` (with lookahead for LR(1)).
    pub items: Vec<String>,
}

/// A built shift-reduce parser: augmented grammar, automaton, tables and
/// conflicts for one flavor.
#[derive(Debug, Clone)]
pub struct LrParser {
    flavor: LrFlavor,
    augmented: Grammar,
    first_follow: FirstFollow,
    automaton: LrAutomaton,
    table: ParseTable,
}

impl LrParser {
    /// Build the parser for `flavor` from an (unaugmented) grammar.
    ///
    /// Conflicts do not fail the build; inspect
    /// [`ParserBackend::conflicts`].
    ///
    /// # Errors
    ///
    /// Returns [`TableError::EmptyGrammar`] if the grammar has no
    /// productions.
    pub fn new(grammar: &Grammar, flavor: LrFlavor) -> Result<Self, TableError> {
        if grammar.productions().is_empty() {
            return Err(TableError::EmptyGrammar);
        }

        let augmented = grammar.augment();
        let first_follow = FirstFollow::compute(&augmented);

        let (automaton, table) = match flavor {
            LrFlavor::Slr1 => {
                let automaton = build_lr0(&augmented);
                let table = table::build_slr(&augmented, &automaton, &first_follow);
                (LrAutomaton::Lr0(automaton), table)
            }
            LrFlavor::Clr1 => {
                let automaton = build_lr1(&augmented, &first_follow);
                let table = table::build_lr1_table(flavor, &augmented, &automaton);
                (LrAutomaton::Lr1(automaton), table)
            }
            LrFlavor::Lalr1 => {
                let canonical = build_lr1(&augmented, &first_follow);
                let merged = merge_by_core(&canonical);
                let table = table::build_lr1_table(flavor, &augmented, &merged);
                (LrAutomaton::Lr1(merged), table)
            }
        };

        Ok(Self {
            flavor,
            augmented,
            first_follow,
            automaton,
            table,
        })
    }

    /// The flavor this parser was built for.
    #[must_use]
    pub const fn lr_flavor(&self) -> LrFlavor {
        self.flavor
    }

    /// The augmented grammar the automaton and tables are defined over.
    #[must_use]
    pub const fn augmented_grammar(&self) -> &Grammar {
        &self.augmented
    }

    /// FIRST/FOLLOW sets of the augmented grammar.
    #[must_use]
    pub const fn first_follow(&self) -> &FirstFollow {
        &self.first_follow
    }

    /// The flavor's automaton.
    #[must_use]
    pub const fn automaton(&self) -> &LrAutomaton {
        &self.automaton
    }

    /// The assembled ACTION/GOTO table.
    #[must_use]
    pub const fn table(&self) -> &ParseTable {
        &self.table
    }
}

impl ParserBackend for LrParser {
    fn flavor(&self) -> ParserFlavor {
        self.flavor.into()
    }

    fn grammar(&self) -> &Grammar {
        &self.augmented
    }

    fn conflicts(&self) -> &[Conflict] {
        self.table.conflicts()
    }

    fn summary(&self) -> FlavorSummary {
        FlavorSummary {
            flavor: self.flavor.into(),
            conflict_free: self.table.is_conflict_free(),
            conflict_count: self.table.conflicts().len(),
            state_count: Some(self.automaton.state_count()),
            transition_count: Some(self.automaton.transition_count()),
            action_entries: self.table.action_entries(),
            goto_entries: self.table.goto_entries(),
            terminal_count: self.augmented.terminals().len(),
            nonterminal_count: self.augmented.nonterminals().len(),
        }
    }

    fn parse_tokens(&self, tokens: &[CompactString]) -> ParseOutcome {
        parser::parse(&self.augmented, &self.table, tokens)
    }
}
