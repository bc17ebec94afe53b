//! # LL Backend
//!
//! Top-down predictive parsing over a FIRST⁺ table.
//!
//! [`Ll1Parser::new`] takes the grammar as given — callers that want the
//! left-recursion elimination and left-factoring pipeline apply
//! [`crate::grammar::transform::transform_for_ll1`] first and build the
//! parser from the transformed grammar.

mod parser;
pub mod table;

use compact_str::CompactString;

use crate::backend::ll::table::Ll1Table;
use crate::backend::{Conflict, FlavorSummary, ParserBackend, ParserFlavor};
use crate::error::TableError;
use crate::grammar::Grammar;
use crate::grammar::analysis::FirstFollow;
use crate::trace::ParseOutcome;

/// Fill statistics of a predictive table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ll1TableSummary {
    /// Nonterminal (row) count.
    pub nonterminals: usize,
    /// Terminal (column) count, including the `$` column.
    pub terminals: usize,
    /// Total cells = rows × columns.
    pub total_cells: usize,
    /// Cells holding a production.
    pub filled_cells: usize,
    /// Conflicted cells.
    pub conflicts: usize,
}

/// A built predictive parser: grammar, FIRST/FOLLOW sets and the LL(1)
/// table.
#[derive(Debug, Clone)]
pub struct Ll1Parser {
    grammar: Grammar,
    first_follow: FirstFollow,
    table: Ll1Table,
}

impl Ll1Parser {
    /// Build the predictive parser for a grammar.
    ///
    /// Conflicts do not fail the build; the table keeps the lower-id
    /// production per cell and the parser stays usable.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::EmptyGrammar`] if the grammar has no
    /// productions.
    pub fn new(grammar: &Grammar) -> Result<Self, TableError> {
        if grammar.productions().is_empty() {
            return Err(TableError::EmptyGrammar);
        }
        let first_follow = FirstFollow::compute(grammar);
        let table = Ll1Table::build(grammar, &first_follow);
        Ok(Self {
            grammar: grammar.clone(),
            first_follow,
            table,
        })
    }

    /// Whether the grammar is LL(1): the table built without conflicts.
    #[must_use]
    pub fn is_ll1(&self) -> bool {
        self.table.is_conflict_free()
    }

    /// FIRST/FOLLOW sets of the parser's grammar.
    #[must_use]
    pub const fn first_follow(&self) -> &FirstFollow {
        &self.first_follow
    }

    /// The predictive table.
    #[must_use]
    pub const fn table(&self) -> &Ll1Table {
        &self.table
    }

    /// Fill statistics for reporting. The `$` column counts as a terminal
    /// column since ε-productions select on FOLLOW sets that contain `$`.
    #[must_use]
    pub fn table_summary(&self) -> Ll1TableSummary {
        let nonterminals = self.grammar.nonterminals().len();
        let terminals = self.grammar.terminals().len() + 1;
        Ll1TableSummary {
            nonterminals,
            terminals,
            total_cells: nonterminals * terminals,
            filled_cells: self.table.len(),
            conflicts: self.table.conflicts().len(),
        }
    }
}

impl ParserBackend for Ll1Parser {
    fn flavor(&self) -> ParserFlavor {
        ParserFlavor::Ll1
    }

    fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn conflicts(&self) -> &[Conflict] {
        self.table.conflicts()
    }

    fn summary(&self) -> FlavorSummary {
        FlavorSummary {
            flavor: ParserFlavor::Ll1,
            conflict_free: self.table.is_conflict_free(),
            conflict_count: self.table.conflicts().len(),
            state_count: None,
            transition_count: None,
            action_entries: self.table.len(),
            goto_entries: 0,
            terminal_count: self.grammar.terminals().len(),
            nonterminal_count: self.grammar.nonterminals().len(),
        }
    }

    fn parse_tokens(&self, tokens: &[CompactString]) -> ParseOutcome {
        parser::parse(&self.grammar, &self.table, tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::transform::transform_for_ll1;
    use crate::trace::StepAction;

    const LL_EXPR: &str =
        "E -> T E'\nE' -> + T E' | ε\nT -> F T'\nT' -> * F T' | ε\nF -> ( E ) | id";

    #[test]
    fn predictive_parse_accepts_and_builds_tree() {
        let grammar = Grammar::parse(LL_EXPR).unwrap();
        let parser = Ll1Parser::new(&grammar).unwrap();
        assert!(parser.is_ll1());

        let outcome = parser.parse_text("id + id").unwrap();
        assert!(outcome.accepted);
        assert!(matches!(
            outcome.final_step().unwrap().action,
            StepAction::Accept
        ));
        let tree = outcome.tree.expect("accepted parse yields a tree");
        assert_eq!(tree.symbol.name(), "E");
        assert_eq!(tree.frontier(), ["id", "+", "id"]);
    }

    #[test]
    fn transformed_left_recursive_grammar_parses() {
        let grammar = Grammar::parse("E -> E + T | T\nT -> id").unwrap();
        let outcome = transform_for_ll1(&grammar);
        let parser = Ll1Parser::new(&outcome.grammar).unwrap();
        assert!(parser.is_ll1());
        assert!(parser.parse_text("id + id + id").unwrap().accepted);
    }

    #[test]
    fn mismatch_produces_error_step() {
        let grammar = Grammar::parse(LL_EXPR).unwrap();
        let parser = Ll1Parser::new(&grammar).unwrap();
        let outcome = parser.parse_text("id +").unwrap();
        assert!(!outcome.accepted);
        assert!(outcome.tree.is_none());
        assert!(matches!(
            outcome.final_step().unwrap().action,
            StepAction::Error { .. }
        ));
    }

    #[test]
    fn trailing_input_is_rejected_at_the_end_marker() {
        let grammar = Grammar::parse("S -> a").unwrap();
        let parser = Ll1Parser::new(&grammar).unwrap();
        let outcome = parser.parse_text("a a").unwrap();
        assert!(!outcome.accepted);
        let last = outcome.final_step().unwrap();
        assert_eq!(last.stack, ["$"]);
    }

    #[test]
    fn epsilon_expansion_leaves_childless_node() {
        let grammar = Grammar::parse("S -> a B\nB -> b | ε").unwrap();
        let parser = Ll1Parser::new(&grammar).unwrap();
        let outcome = parser.parse_text("a").unwrap();
        assert!(outcome.accepted);
        let tree = outcome.tree.unwrap();
        assert_eq!(tree.children.len(), 2);
        let b_node = &tree.children[1];
        assert_eq!(b_node.symbol.name(), "B");
        assert!(b_node.children.is_empty());
        assert_eq!(tree.frontier(), ["a"]);
    }

    #[test]
    fn table_summary_counts_cells() {
        let grammar = Grammar::parse("S -> a").unwrap();
        let parser = Ll1Parser::new(&grammar).unwrap();
        let summary = parser.table_summary();
        assert_eq!(summary.nonterminals, 1);
        assert_eq!(summary.terminals, 2); // a and $
        assert_eq!(summary.filled_cells, 1);
        assert_eq!(summary.conflicts, 0);
    }
}
