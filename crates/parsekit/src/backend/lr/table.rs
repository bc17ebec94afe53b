//! ACTION/GOTO table assembly for the three shift-reduce flavors.
//!
//! All three builders share the same skeleton: shift and goto entries come
//! straight from the automaton's transitions, reduce entries from complete
//! items — FOLLOW-driven for SLR(1), lookahead-driven for CLR(1) and
//! LALR(1) — and the accept entry sits at the complete start item on `$`.
//!
//! A cell written twice with incompatible entries records a [`Conflict`] and
//! keeps a deterministic winner (shift over reduce, lower production id over
//! higher) so callers that choose to proceed still get forward progress.
//! Nothing is silently dropped: every losing entry appears in the conflict
//! list.

use compact_str::CompactString;
use hashbrown::HashMap;

use crate::backend::Conflict;
use crate::backend::lr::LrFlavor;
use crate::backend::lr::automaton::Automaton;
use crate::backend::lr::item::{Lr0Item, Lr1Item};
use crate::grammar::analysis::FirstFollow;
use crate::grammar::{END_MARKER, Grammar, Symbol};

/// A shift-reduce parsing action. Absence from the table is the error
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Action {
    /// Shift the lookahead and enter the given state.
    Shift(usize),
    /// Reduce by the production with the given id.
    Reduce(usize),
    /// Accept the input.
    Accept,
}

type ActionMap = HashMap<(usize, CompactString), Action, ahash::RandomState>;
type GotoMap = HashMap<(usize, CompactString), usize, ahash::RandomState>;

/// An assembled ACTION/GOTO table for one LR flavor.
#[derive(Debug, Clone)]
pub struct ParseTable {
    flavor: LrFlavor,
    action: ActionMap,
    goto: GotoMap,
    conflicts: Vec<Conflict>,
}

impl ParseTable {
    /// The flavor this table was built for.
    #[must_use]
    pub const fn flavor(&self) -> LrFlavor {
        self.flavor
    }

    /// ACTION lookup; `None` is the error action.
    #[must_use]
    pub fn action(&self, state: usize, terminal: &str) -> Option<Action> {
        self.action
            .get(&(state, CompactString::from(terminal)))
            .copied()
    }

    /// GOTO lookup for a nonterminal.
    #[must_use]
    pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.goto
            .get(&(state, CompactString::from(nonterminal)))
            .copied()
    }

    /// Conflicts recorded during assembly, in discovery order.
    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Whether the table has no conflicts.
    #[must_use]
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Number of ACTION entries.
    #[must_use]
    pub fn action_entries(&self) -> usize {
        self.action.len()
    }

    /// Number of GOTO entries.
    #[must_use]
    pub fn goto_entries(&self) -> usize {
        self.goto.len()
    }

    /// ACTION entries as sorted `(state, terminal, action)` triples.
    #[must_use]
    pub fn action_triples(&self) -> Vec<(usize, CompactString, Action)> {
        let mut triples: Vec<_> = self
            .action
            .iter()
            .map(|(key, &action)| (key.0, key.1.clone(), action))
            .collect();
        triples.sort_unstable_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        triples
    }

    /// GOTO entries as sorted `(state, nonterminal, state)` triples.
    #[must_use]
    pub fn goto_triples(&self) -> Vec<(usize, CompactString, usize)> {
        let mut triples: Vec<_> = self
            .goto
            .iter()
            .map(|(key, &to)| (key.0, key.1.clone(), to))
            .collect();
        triples.sort_unstable();
        triples
    }
}

/// Build the SLR(1) table over the LR(0) automaton: reduce entries use
/// FOLLOW sets of the augmented grammar.
#[must_use]
pub(crate) fn build_slr(
    grammar: &Grammar,
    automaton: &Automaton<Lr0Item>,
    first_follow: &FirstFollow,
) -> ParseTable {
    let mut builder = TableBuilder::new(LrFlavor::Slr1);
    builder.fill_transitions(grammar, automaton.transition_triples());

    for (state_id, state) in automaton.states().iter().enumerate() {
        for item in state.items() {
            if !item.is_complete(grammar) {
                continue;
            }
            if item.production == 0 {
                builder.set_action(state_id, CompactString::from(END_MARKER), Action::Accept);
            } else {
                let lhs = grammar.production(item.production).lhs();
                for terminal in first_follow.follow_sorted(lhs) {
                    builder.set_action(state_id, terminal, Action::Reduce(item.production));
                }
            }
        }
    }

    builder.finish()
}

/// Build a CLR(1) or LALR(1) table over an LR(1) automaton (canonical or
/// core-merged): reduce entries use each complete item's own lookahead.
#[must_use]
pub(crate) fn build_lr1_table(
    flavor: LrFlavor,
    grammar: &Grammar,
    automaton: &Automaton<Lr1Item>,
) -> ParseTable {
    let mut builder = TableBuilder::new(flavor);
    builder.fill_transitions(grammar, automaton.transition_triples());

    for (state_id, state) in automaton.states().iter().enumerate() {
        for item in state.items() {
            if !item.is_complete(grammar) {
                continue;
            }
            if item.production == 0 {
                builder.set_action(state_id, CompactString::from(END_MARKER), Action::Accept);
            } else {
                builder.set_action(
                    state_id,
                    item.lookahead.clone(),
                    Action::Reduce(item.production),
                );
            }
        }
    }

    builder.finish()
}

struct TableBuilder {
    flavor: LrFlavor,
    action: ActionMap,
    goto: GotoMap,
    conflicts: Vec<Conflict>,
}

impl TableBuilder {
    fn new(flavor: LrFlavor) -> Self {
        Self {
            flavor,
            action: ActionMap::with_hasher(ahash::RandomState::new()),
            goto: GotoMap::with_hasher(ahash::RandomState::new()),
            conflicts: Vec::new(),
        }
    }

    /// Shift entries for terminal transitions, GOTO entries for nonterminal
    /// ones. The triples arrive sorted, so entry order is deterministic.
    fn fill_transitions(&mut self, grammar: &Grammar, triples: Vec<(usize, Symbol, usize)>) {
        for (from, symbol, to) in triples {
            if grammar.is_nonterminal(symbol.name()) {
                self.goto.insert((from, CompactString::from(symbol.name())), to);
            } else {
                self.set_action(from, CompactString::from(symbol.name()), Action::Shift(to));
            }
        }
    }

    /// Write an ACTION cell, recording a conflict and applying the
    /// tie-break if the cell already holds an incompatible entry.
    fn set_action(&mut self, state: usize, terminal: CompactString, new: Action) {
        let slot = self
            .action
            .entry((state, terminal.clone()))
            .or_insert(new);
        let existing = *slot;
        if existing == new {
            return;
        }
        let (winner, conflict) = resolve_conflict(state, &terminal, existing, new);
        *slot = winner;
        self.conflicts.push(conflict);
    }

    fn finish(self) -> ParseTable {
        ParseTable {
            flavor: self.flavor,
            action: self.action,
            goto: self.goto,
            conflicts: self.conflicts,
        }
    }
}

/// The documented tie-break: shift beats reduce; the lower production id
/// beats the higher in reduce/reduce. Accept is the reduce of production 0
/// and wins any reduce/reduce by the same rule.
fn resolve_conflict(
    state: usize,
    terminal: &CompactString,
    existing: Action,
    new: Action,
) -> (Action, Conflict) {
    match (existing, new) {
        (Action::Shift(target), Action::Reduce(production))
        | (Action::Reduce(production), Action::Shift(target)) => (
            Action::Shift(target),
            Conflict::ShiftReduce {
                state,
                terminal: terminal.clone(),
                shift_state: target,
                production,
            },
        ),
        (Action::Reduce(a), Action::Reduce(b)) => {
            let (kept, discarded) = if a <= b { (a, b) } else { (b, a) };
            (
                Action::Reduce(kept),
                Conflict::ReduceReduce {
                    state,
                    terminal: terminal.clone(),
                    kept,
                    discarded,
                },
            )
        }
        (Action::Accept, Action::Reduce(production))
        | (Action::Reduce(production), Action::Accept) => (
            Action::Accept,
            Conflict::ReduceReduce {
                state,
                terminal: terminal.clone(),
                kept: 0,
                discarded: production,
            },
        ),
        // Shift/shift and shift/accept cannot arise from a deterministic
        // automaton; keep the existing entry if they somehow do.
        (existing, _) => (
            existing,
            Conflict::ReduceReduce {
                state,
                terminal: terminal.clone(),
                kept: 0,
                discarded: 0,
            },
        ),
    }
}
