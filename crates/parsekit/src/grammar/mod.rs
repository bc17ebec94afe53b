//! # Grammar Module
//!
//! Context-free grammar representation: symbols, productions, text parsing
//! and augmentation.
//!
//! ## Text format
//!
//! One rule per line, alternatives separated by `|`, symbols separated by
//! whitespace. Accepted arrows: `->`, `→`, `::=`. Empty lines and lines
//! starting with `#` are ignored. An empty right-hand side (or the markers
//! `ε` / `epsilon`) denotes an ε-production.
//!
//! ```text
//! E -> E + T | T
//! T -> T * F | F
//! F -> ( E ) | id
//! ```
//!
//! The first left-hand side in source order is the start symbol. A name is a
//! nonterminal iff it appears as some left-hand side; every other name is a
//! terminal.

pub mod analysis;
pub mod transform;

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::fmt;

use crate::error::{GrammarError, GrammarWarning};

/// The end-of-input terminal, implicitly appended to every token stream.
pub const END_MARKER: &str = "$";

/// Textual markers accepted for an ε right-hand side.
const EPSILON_MARKERS: [&str; 2] = ["ε", "epsilon"];

/// Whether a symbol name stands for a terminal or a nonterminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
}

/// A grammar symbol: a name paired with its kind.
///
/// ε is never a symbol; an empty production right-hand side encodes it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Symbol {
    name: CompactString,
    kind: SymbolKind,
}

impl Symbol {
    /// Create a terminal symbol.
    #[must_use]
    pub fn terminal(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Terminal,
        }
    }

    /// Create a nonterminal symbol.
    #[must_use]
    pub fn nonterminal(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Nonterminal,
        }
    }

    /// The end-of-input terminal `$`.
    #[must_use]
    pub fn end_marker() -> Self {
        Self::terminal(END_MARKER)
    }

    /// The symbol's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol's kind.
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Whether this symbol is a terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal)
    }

    /// Whether this symbol is a nonterminal.
    #[must_use]
    pub const fn is_nonterminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Nonterminal)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A production rule `A → X₁ … Xₖ` with a stable, dense id.
///
/// An empty `rhs` is the ε-production `A → ε`. In an augmented grammar the
/// production with id 0 is always `S' → S`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Production {
    id: usize,
    lhs: CompactString,
    rhs: SmallVec<[Symbol; 4]>,
}

impl Production {
    /// The production's id, its index in [`Grammar::productions`].
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// The left-hand-side nonterminal name.
    #[must_use]
    pub fn lhs(&self) -> &str {
        &self.lhs
    }

    /// The right-hand-side symbol sequence; empty for an ε-production.
    #[must_use]
    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    /// Whether this is an ε-production.
    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        if self.rhs.is_empty() {
            return write!(f, " ε");
        }
        for sym in &self.rhs {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

/// A raw rule before symbol classification: a left-hand side plus one
/// alternative's symbol names (empty for ε).
pub type RawRule = (CompactString, Vec<CompactString>);

type NameSet = HashSet<CompactString, ahash::RandomState>;
type LhsIndex = HashMap<CompactString, Vec<usize>, ahash::RandomState>;

/// An immutable context-free grammar.
///
/// Terminals and nonterminals are kept in first-appearance order alongside
/// membership sets, so every construction that iterates over symbols
/// (automata, transformations) is deterministic.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Grammar {
    productions: Vec<Production>,
    start: CompactString,
    nonterminals: Vec<CompactString>,
    terminals: Vec<CompactString>,
    warnings: Vec<GrammarWarning>,
    #[cfg_attr(feature = "serde", serde(skip))]
    nonterminal_set: NameSet,
    #[cfg_attr(feature = "serde", serde(skip))]
    terminal_set: NameSet,
    #[cfg_attr(feature = "serde", serde(skip))]
    by_lhs: LhsIndex,
}

impl Grammar {
    /// Build a grammar from raw rules. Each entry is one production; symbol
    /// kinds are derived from left-hand-side membership.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::Empty`] if `rules` is empty, or
    /// [`GrammarError::UndefinedStart`] if `start` is not the left-hand side
    /// of any rule.
    pub fn new(rules: Vec<RawRule>, start: CompactString) -> Result<Self, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut nonterminal_set = NameSet::with_hasher(ahash::RandomState::new());
        let mut nonterminals = Vec::new();
        for (lhs, _) in &rules {
            if nonterminal_set.insert(lhs.clone()) {
                nonterminals.push(lhs.clone());
            }
        }
        if !nonterminal_set.contains(&start) {
            return Err(GrammarError::UndefinedStart {
                name: start.to_string(),
            });
        }

        let mut terminal_set = NameSet::with_hasher(ahash::RandomState::new());
        let mut terminals = Vec::new();
        let mut warnings = Vec::new();
        let mut productions = Vec::with_capacity(rules.len());
        let mut by_lhs = LhsIndex::with_hasher(ahash::RandomState::new());

        for (id, (lhs, rhs_names)) in rules.into_iter().enumerate() {
            let mut rhs: SmallVec<[Symbol; 4]> = SmallVec::with_capacity(rhs_names.len());
            for name in rhs_names {
                if nonterminal_set.contains(&name) {
                    rhs.push(Symbol::nonterminal(name));
                } else {
                    if terminal_set.insert(name.clone()) {
                        // Names written like nonterminals but never defined are
                        // demoted to terminals (the classical convention); the
                        // demotion is worth flagging.
                        if name.chars().next().is_some_and(char::is_uppercase) {
                            warnings.push(GrammarWarning::UndefinedNonterminal {
                                name: name.to_string(),
                            });
                        }
                        terminals.push(name.clone());
                    }
                    rhs.push(Symbol::terminal(name));
                }
            }
            by_lhs.entry(lhs.clone()).or_default().push(id);
            productions.push(Production { id, lhs, rhs });
        }

        Ok(Self {
            productions,
            start,
            nonterminals,
            terminals,
            warnings,
            nonterminal_set,
            terminal_set,
            by_lhs,
        })
    }

    /// Parse a grammar from its text format.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::Empty`] if no rule survives comment and blank
    /// stripping, [`GrammarError::MissingArrow`] for a rule line without an
    /// arrow, or [`GrammarError::MissingLhs`] for a rule with an empty
    /// left-hand side.
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        let mut rules: Vec<RawRule> = Vec::new();
        let mut start: Option<CompactString> = None;

        for (line_no, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (lhs_part, rhs_part) = split_arrow(line).ok_or_else(|| {
                GrammarError::MissingArrow {
                    line: line_no + 1,
                    text: line.to_string(),
                }
            })?;

            let lhs = lhs_part.trim();
            if lhs.is_empty() {
                return Err(GrammarError::MissingLhs { line: line_no + 1 });
            }
            let lhs = CompactString::from(lhs);
            if start.is_none() {
                start = Some(lhs.clone());
            }

            for alternative in rhs_part.split('|') {
                let alternative = alternative.trim();
                let rhs = if alternative.is_empty() || EPSILON_MARKERS.contains(&alternative) {
                    Vec::new()
                } else {
                    alternative
                        .split_whitespace()
                        .map(CompactString::from)
                        .collect()
                };
                rules.push((lhs.clone(), rhs));
            }
        }

        let start = start.ok_or(GrammarError::Empty)?;
        Self::new(rules, start)
    }

    /// Create the augmented grammar: a fresh start symbol `S'` with the
    /// single production `S' → S` at id 0. The original grammar is
    /// unaffected; the new grammar has its own id space.
    #[must_use]
    pub fn augment(&self) -> Self {
        let mut new_start = CompactString::from(format!("{}'", self.start));
        while self.nonterminal_set.contains(&new_start) || self.terminal_set.contains(&new_start) {
            new_start.push('\'');
        }

        let mut rules: Vec<RawRule> = Vec::with_capacity(self.productions.len() + 1);
        rules.push((new_start.clone(), vec![self.start.clone()]));
        for prod in &self.productions {
            rules.push((
                prod.lhs.clone(),
                prod.rhs.iter().map(|s| s.name.clone()).collect(),
            ));
        }

        // The source rules are non-empty by construction.
        Self::new(rules, new_start).expect("augmenting a non-empty grammar cannot fail")
    }

    /// All productions, ordered by id.
    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The production with the given id.
    #[must_use]
    pub fn production(&self, id: usize) -> &Production {
        &self.productions[id]
    }

    /// Ids of the productions whose left-hand side is `lhs`, in id order.
    #[must_use]
    pub fn productions_of(&self, lhs: &str) -> &[usize] {
        self.by_lhs.get(lhs).map_or(&[], Vec::as_slice)
    }

    /// The start symbol's name.
    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Nonterminal names in first-appearance (left-hand-side) order.
    #[must_use]
    pub fn nonterminals(&self) -> &[CompactString] {
        &self.nonterminals
    }

    /// Terminal names in first-appearance order. `$` is not included; it
    /// never occurs on a right-hand side.
    #[must_use]
    pub fn terminals(&self) -> &[CompactString] {
        &self.terminals
    }

    /// Warnings recorded while classifying symbols.
    #[must_use]
    pub fn warnings(&self) -> &[GrammarWarning] {
        &self.warnings
    }

    /// Whether `name` is a terminal of this grammar.
    #[must_use]
    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminal_set.contains(name)
    }

    /// Whether `name` is a nonterminal of this grammar.
    #[must_use]
    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.nonterminal_set.contains(name)
    }

    /// All grammar symbols — terminals first, then nonterminals, each in
    /// first-appearance order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.terminals
            .iter()
            .map(|t| Symbol::terminal(t.clone()))
            .chain(
                self.nonterminals
                    .iter()
                    .map(|n| Symbol::nonterminal(n.clone())),
            )
    }

    /// Split whitespace-separated input into tokens, validating each against
    /// the terminal set.
    ///
    /// The implicit `$` is *not* appended here; the drivers do that.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::UnknownToken`] for any token that is not a
    /// terminal of this grammar (including an explicit `$`).
    pub fn tokenize(&self, input: &str) -> Result<Vec<CompactString>, GrammarError> {
        let mut tokens = Vec::new();
        for (position, word) in input.split_whitespace().enumerate() {
            if !self.is_terminal(word) {
                return Err(GrammarError::UnknownToken {
                    token: word.to_string(),
                    position,
                });
            }
            tokens.push(CompactString::from(word));
        }
        Ok(tokens)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        for prod in &self.productions {
            writeln!(f, "{:>3}: {}", prod.id, prod)?;
        }
        Ok(())
    }
}

/// Split a rule line at the first accepted arrow token.
fn split_arrow(line: &str) -> Option<(&str, &str)> {
    for arrow in ["->", "→", "::="] {
        if let Some(idx) = line.find(arrow) {
            return Some((&line[..idx], &line[idx + arrow.len()..]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPR: &str = "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id";

    #[test]
    fn parses_expression_grammar() {
        let grammar = Grammar::parse(EXPR).unwrap();
        assert_eq!(grammar.start(), "E");
        assert_eq!(grammar.productions().len(), 6);
        assert_eq!(grammar.nonterminals(), ["E", "T", "F"]);
        assert_eq!(grammar.terminals(), ["+", "*", "(", ")", "id"]);
        assert!(grammar.is_terminal("id"));
        assert!(grammar.is_nonterminal("E"));
        assert!(grammar.warnings().is_empty());
    }

    #[test]
    fn accepts_alternate_arrows_and_comments() {
        let grammar = Grammar::parse("# a comment\nS ::= a S\nS → b\n\n").unwrap();
        assert_eq!(grammar.productions().len(), 2);
        assert_eq!(grammar.production(1).rhs().len(), 1);
    }

    #[test]
    fn epsilon_markers_yield_empty_rhs() {
        let grammar = Grammar::parse("S -> a S | ε\nA -> epsilon\nB ->").unwrap();
        assert!(grammar.production(1).is_epsilon());
        assert!(grammar.production(2).is_epsilon());
        assert!(grammar.production(3).is_epsilon());
    }

    #[test]
    fn missing_arrow_is_reported_with_line() {
        let err = Grammar::parse("S -> a\nnot a rule").unwrap_err();
        assert_eq!(
            err,
            GrammarError::MissingArrow {
                line: 2,
                text: "not a rule".to_string()
            }
        );
    }

    #[test]
    fn empty_text_is_an_error() {
        assert_eq!(
            Grammar::parse("# only comments\n").unwrap_err(),
            GrammarError::Empty
        );
    }

    #[test]
    fn augmentation_adds_fresh_start_at_id_zero() {
        let grammar = Grammar::parse(EXPR).unwrap();
        let augmented = grammar.augment();
        assert_eq!(augmented.start(), "E'");
        let start_prod = augmented.production(0);
        assert_eq!(start_prod.lhs(), "E'");
        assert_eq!(start_prod.rhs().len(), 1);
        assert_eq!(start_prod.rhs()[0].name(), "E");
        // Exactly one production has the augmented start as its LHS.
        assert_eq!(augmented.productions_of("E'"), [0]);
        // The original grammar is untouched.
        assert_eq!(grammar.start(), "E");
        assert_eq!(grammar.productions().len(), 6);
    }

    #[test]
    fn augmentation_primes_past_collisions() {
        let grammar = Grammar::parse("S -> S' a\nS' -> b").unwrap();
        let augmented = grammar.augment();
        assert_eq!(augmented.start(), "S''");
    }

    #[test]
    fn undefined_uppercase_name_is_demoted_with_warning() {
        let grammar = Grammar::parse("S -> A b").unwrap();
        assert!(grammar.is_terminal("A"));
        assert_eq!(
            grammar.warnings(),
            [GrammarWarning::UndefinedNonterminal {
                name: "A".to_string()
            }]
        );
    }

    #[test]
    fn tokenize_validates_terminals() {
        let grammar = Grammar::parse(EXPR).unwrap();
        let tokens = grammar.tokenize("id + id * id").unwrap();
        assert_eq!(tokens.len(), 5);
        let err = grammar.tokenize("id plus id").unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnknownToken {
                token: "plus".to_string(),
                position: 1
            }
        );
    }

    #[test]
    fn display_round_trips_epsilon() {
        let grammar = Grammar::parse("S -> a | ε").unwrap();
        assert_eq!(grammar.production(1).to_string(), "S -> ε");
        assert_eq!(grammar.production(0).to_string(), "S -> a");
    }
}
