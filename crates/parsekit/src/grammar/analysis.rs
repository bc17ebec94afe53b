//! # FIRST / FOLLOW Analysis
//!
//! Fixed-point computation of the classical FIRST and FOLLOW sets.
//!
//! FIRST is computed per symbol (terminals map to themselves) and extended to
//! symbol strings via [`FirstFollow::first_of_sequence`]. FOLLOW is computed
//! per nonterminal, with `$` seeded into the start symbol's set. Both
//! iterations are monotone over a finite universe and therefore terminate;
//! re-running the computation yields identical sets.
//!
//! Nullability is carried as an explicit flag on [`FirstSet`] rather than an
//! ε sentinel inside the terminal set.

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};

use crate::grammar::{END_MARKER, Grammar, Symbol};

/// A set of terminal names.
pub type TerminalSet = HashSet<CompactString, ahash::RandomState>;
type SetMap<V> = HashMap<CompactString, V, ahash::RandomState>;

/// FIRST of a symbol or symbol string: the terminals that can begin a
/// derived string, plus whether the string derives ε.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    /// Terminals that can appear first.
    pub terminals: TerminalSet,
    /// Whether ε is derivable.
    pub nullable: bool,
}

impl FirstSet {
    fn empty() -> Self {
        Self {
            terminals: TerminalSet::with_hasher(ahash::RandomState::new()),
            nullable: false,
        }
    }

    fn singleton(name: &str) -> Self {
        let mut set = Self::empty();
        set.terminals.insert(CompactString::from(name));
        set
    }

    /// Terminal names in sorted order, for deterministic iteration.
    #[must_use]
    pub fn sorted(&self) -> Vec<CompactString> {
        let mut names: Vec<_> = self.terminals.iter().cloned().collect();
        names.sort_unstable();
        names
    }
}

/// FIRST and FOLLOW sets for a grammar, computed once at construction.
#[derive(Debug, Clone)]
pub struct FirstFollow {
    first: SetMap<FirstSet>,
    follow: SetMap<TerminalSet>,
}

impl FirstFollow {
    /// Compute FIRST and FOLLOW for `grammar` by fixed-point iteration.
    #[must_use]
    pub fn compute(grammar: &Grammar) -> Self {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        Self { first, follow }
    }

    /// FIRST of a single symbol name. Terminals map to themselves.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&FirstSet> {
        self.first.get(name)
    }

    /// FOLLOW of a nonterminal name.
    #[must_use]
    pub fn follow(&self, name: &str) -> Option<&TerminalSet> {
        self.follow.get(name)
    }

    /// FOLLOW of a nonterminal in sorted order, for deterministic iteration.
    #[must_use]
    pub fn follow_sorted(&self, name: &str) -> Vec<CompactString> {
        let mut names: Vec<_> = self
            .follow
            .get(name)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// FIRST of a symbol string: accumulate `FIRST(Xᵢ) \ {ε}` while every
    /// prefix symbol is nullable; the string is nullable iff all symbols are.
    /// `FIRST(ε) = {}` with `nullable = true`.
    #[must_use]
    pub fn first_of_sequence(&self, sequence: &[Symbol]) -> FirstSet {
        sequence_first(&self.first, sequence)
    }

    /// Every FIRST set as `(symbol, set)` pairs sorted by symbol name;
    /// terminals are included and map to themselves.
    #[must_use]
    pub fn all_first(&self) -> Vec<(&str, &FirstSet)> {
        let mut pairs: Vec<(&str, &FirstSet)> = self
            .first
            .iter()
            .map(|(name, set)| (name.as_str(), set))
            .collect();
        pairs.sort_unstable_by_key(|&(name, _)| name);
        pairs
    }

    /// Every FOLLOW set as `(nonterminal, set)` pairs sorted by name.
    #[must_use]
    pub fn all_follow(&self) -> Vec<(&str, &TerminalSet)> {
        let mut pairs: Vec<(&str, &TerminalSet)> = self
            .follow
            .iter()
            .map(|(name, set)| (name.as_str(), set))
            .collect();
        pairs.sort_unstable_by_key(|&(name, _)| name);
        pairs
    }
}

fn sequence_first(first: &SetMap<FirstSet>, sequence: &[Symbol]) -> FirstSet {
    let mut result = FirstSet::empty();
    for sym in sequence {
        match first.get(sym.name()) {
            Some(sym_first) => {
                result.terminals.extend(sym_first.terminals.iter().cloned());
                if !sym_first.nullable {
                    return result;
                }
            }
            // A symbol outside the grammar stands for itself.
            None => {
                result.terminals.insert(CompactString::from(sym.name()));
                return result;
            }
        }
    }
    result.nullable = true;
    result
}

fn compute_first(grammar: &Grammar) -> SetMap<FirstSet> {
    let mut first = SetMap::with_hasher(ahash::RandomState::new());

    for terminal in grammar.terminals() {
        first.insert(terminal.clone(), FirstSet::singleton(terminal));
    }
    first.insert(CompactString::from(END_MARKER), FirstSet::singleton(END_MARKER));
    for nonterminal in grammar.nonterminals() {
        first.insert(nonterminal.clone(), FirstSet::empty());
    }

    let mut changed = true;
    while changed {
        changed = false;
        for prod in grammar.productions() {
            let mut all_nullable = true;
            let mut gained: Vec<CompactString> = Vec::new();
            for sym in prod.rhs() {
                let sym_first = &first[sym.name()];
                for t in &sym_first.terminals {
                    if !first[prod.lhs()].terminals.contains(t) {
                        gained.push(t.clone());
                    }
                }
                if !sym_first.nullable {
                    all_nullable = false;
                    break;
                }
            }

            let lhs_first = first.get_mut(prod.lhs()).expect("lhs is a nonterminal");
            for t in gained {
                if lhs_first.terminals.insert(t) {
                    changed = true;
                }
            }
            if all_nullable && !lhs_first.nullable {
                lhs_first.nullable = true;
                changed = true;
            }
        }
    }

    first
}

fn compute_follow(grammar: &Grammar, first: &SetMap<FirstSet>) -> SetMap<TerminalSet> {
    let mut follow = SetMap::with_hasher(ahash::RandomState::new());
    for nonterminal in grammar.nonterminals() {
        follow.insert(
            nonterminal.clone(),
            TerminalSet::with_hasher(ahash::RandomState::new()),
        );
    }
    follow
        .get_mut(grammar.start())
        .expect("start symbol is a nonterminal")
        .insert(CompactString::from(END_MARKER));

    let mut changed = true;
    while changed {
        changed = false;
        for prod in grammar.productions() {
            for (i, sym) in prod.rhs().iter().enumerate() {
                if !sym.is_nonterminal() {
                    continue;
                }
                let beta = &prod.rhs()[i + 1..];
                let first_beta = sequence_first(first, beta);

                let mut gained: Vec<CompactString> =
                    first_beta.terminals.into_iter().collect();
                if first_beta.nullable {
                    gained.extend(follow[prod.lhs()].iter().cloned());
                }

                let target = follow.get_mut(sym.name()).expect("rhs nonterminal");
                for t in gained {
                    if target.insert(t) {
                        changed = true;
                    }
                }
            }
        }
    }

    follow
}
