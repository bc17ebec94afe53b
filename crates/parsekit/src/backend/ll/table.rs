//! LL(1) predictive table construction via FIRST⁺ selector sets.

use compact_str::CompactString;
use hashbrown::HashMap;
use std::collections::BTreeSet;

use crate::backend::Conflict;
use crate::grammar::Grammar;
use crate::grammar::analysis::FirstFollow;

type EntryMap = HashMap<(CompactString, CompactString), usize, ahash::RandomState>;

/// The predictive table `M[A, a] → production id`.
///
/// Cells written twice record a [`Conflict::Predict`]; the lower production
/// id stays in the table, so a conflicted table still drives the predictive
/// parser deterministically.
#[derive(Debug, Clone)]
pub struct Ll1Table {
    entries: EntryMap,
    conflicts: Vec<Conflict>,
}

impl Ll1Table {
    /// Build the table: for each production `A → α`, enter it at every
    /// terminal of `FIRST⁺(A → α) = FIRST(α) \ {ε} ∪ (FOLLOW(A) if ε ∈
    /// FIRST(α))`.
    #[must_use]
    pub fn build(grammar: &Grammar, first_follow: &FirstFollow) -> Self {
        let mut entries = EntryMap::with_hasher(ahash::RandomState::new());
        let mut conflicts = Vec::new();

        for prod in grammar.productions() {
            for terminal in first_plus(grammar, first_follow, prod.id()) {
                let key = (CompactString::from(prod.lhs()), terminal.clone());
                match entries.get(&key) {
                    None => {
                        entries.insert(key, prod.id());
                    }
                    // Productions are visited in id order, so the existing
                    // entry always carries the lower id and stays.
                    Some(&existing) => conflicts.push(Conflict::Predict {
                        nonterminal: key.0,
                        terminal,
                        kept: existing,
                        discarded: prod.id(),
                    }),
                }
            }
        }

        Self { entries, conflicts }
    }

    /// The production to expand for `(nonterminal, terminal)`, if any.
    #[must_use]
    pub fn production_for(&self, nonterminal: &str, terminal: &str) -> Option<usize> {
        self.entries
            .get(&(
                CompactString::from(nonterminal),
                CompactString::from(terminal),
            ))
            .copied()
    }

    /// Number of filled cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Conflicts recorded during construction, in discovery order.
    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Whether the source grammar is LL(1).
    #[must_use]
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// All cells as sorted `(nonterminal, terminal, production id)` triples.
    #[must_use]
    pub fn triples(&self) -> Vec<(CompactString, CompactString, usize)> {
        let mut triples: Vec<_> = self
            .entries
            .iter()
            .map(|(key, &pid)| (key.0.clone(), key.1.clone(), pid))
            .collect();
        triples.sort_unstable();
        triples
    }
}

/// FIRST⁺ of one production, in sorted order for deterministic table fills.
fn first_plus(
    grammar: &Grammar,
    first_follow: &FirstFollow,
    production: usize,
) -> Vec<CompactString> {
    let prod = grammar.production(production);
    let first = first_follow.first_of_sequence(prod.rhs());

    let mut selector: BTreeSet<CompactString> = first.terminals.into_iter().collect();
    if first.nullable {
        selector.extend(first_follow.follow_sorted(prod.lhs()));
    }
    selector.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_for(text: &str) -> (Grammar, Ll1Table) {
        let grammar = Grammar::parse(text).unwrap();
        let first_follow = FirstFollow::compute(&grammar);
        let table = Ll1Table::build(&grammar, &first_follow);
        (grammar, table)
    }

    #[test]
    fn ll1_grammar_builds_without_conflicts() {
        // The left-recursion-free expression grammar.
        let (_, table) = table_for(
            "E -> T E'\nE' -> + T E' | ε\nT -> F T'\nT' -> * F T' | ε\nF -> ( E ) | id",
        );
        assert!(table.is_conflict_free());
        // E expands the same way on ( and id.
        assert_eq!(table.production_for("E", "("), Some(0));
        assert_eq!(table.production_for("E", "id"), Some(0));
        // ε-production of E' selected via FOLLOW(E') = { ), $ }.
        assert_eq!(table.production_for("E'", ")"), Some(2));
        assert_eq!(table.production_for("E'", "$"), Some(2));
        assert_eq!(table.production_for("E'", "id"), None);
    }

    #[test]
    fn common_prefix_grammar_conflicts() {
        let (_, table) = table_for("A -> a b | a c");
        assert!(!table.is_conflict_free());
        assert_eq!(table.conflicts().len(), 1);
        match &table.conflicts()[0] {
            Conflict::Predict {
                nonterminal,
                terminal,
                kept,
                discarded,
            } => {
                assert_eq!(nonterminal.as_str(), "A");
                assert_eq!(terminal.as_str(), "a");
                assert_eq!((*kept, *discarded), (0, 1));
            }
            other => panic!("unexpected conflict {other:?}"),
        }
        // The tie-break keeps the lower id.
        assert_eq!(table.production_for("A", "a"), Some(0));
    }

    #[test]
    fn nullable_overlap_with_follow_conflicts() {
        // S -> A a; A -> a | ε: both A-productions select on a.
        let (_, table) = table_for("S -> A a\nA -> a | ε");
        assert!(!table.is_conflict_free());
    }
}
