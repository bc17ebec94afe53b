//! # Error Types
//!
//! Typed errors and warnings for grammar construction and parser building.
//!
//! Three categories are kept deliberately separate:
//!
//! - **User-input errors** ([`GrammarError`]): malformed grammar text or a
//!   token stream mentioning a symbol the grammar does not know. Only the
//!   caller can recover from these.
//! - **Build-time conflicts**: *not* errors. Table builders always return a
//!   usable table and report conflicts as [`crate::Conflict`] records.
//! - **Parse-time failures**: the drivers terminate with an error step in the
//!   trace and `accepted = false`; no error value crosses the driver boundary.

use thiserror::Error;

/// Errors raised while reading grammar text or validating token input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The grammar text contained no productions.
    #[error("grammar contains no productions")]
    Empty,

    /// A rule line had no recognized arrow (`->`, `→` or `::=`).
    #[error("line {line}: missing arrow in production rule: {text:?}")]
    MissingArrow {
        /// 1-based line number in the grammar text.
        line: usize,
        /// The offending line, verbatim.
        text: String,
    },

    /// A rule line had an empty left-hand side.
    #[error("line {line}: production rule has no left-hand side")]
    MissingLhs {
        /// 1-based line number in the grammar text.
        line: usize,
    },

    /// The designated start symbol never appears as a left-hand side.
    #[error("start symbol {name:?} has no productions")]
    UndefinedStart {
        /// The offending start symbol.
        name: String,
    },

    /// A token in the input stream is not a terminal of the grammar.
    #[error("unknown token {token:?} at position {position}")]
    UnknownToken {
        /// The unrecognized token.
        token: String,
        /// 0-based index of the token in the input stream.
        position: usize,
    },
}

/// Non-fatal observations recorded while building or transforming a grammar.
///
/// Warnings never stop construction; they are attached to the produced
/// grammar (or transformation outcome) for the caller to inspect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GrammarWarning {
    /// A right-hand-side name written like a nonterminal never appears as a
    /// left-hand side and was demoted to a terminal.
    #[error("symbol {name:?} never appears as a left-hand side; treated as a terminal")]
    UndefinedNonterminal {
        /// The demoted name.
        name: String,
    },

    /// Every production of a nonterminal is left-recursive, so the
    /// nonterminal derives no terminal string. The transformation is still
    /// emitted.
    #[error("nonterminal {name:?} has only left-recursive productions and derives no string")]
    UnproductiveLeftRecursion {
        /// The affected nonterminal.
        name: String,
    },
}

/// Structural failures while assembling a parsing table.
///
/// Conflicts are not represented here; a conflicted table is still returned
/// together with its [`crate::Conflict`] records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The grammar has no productions to build a table from.
    #[error("cannot build a parsing table for an empty grammar")]
    EmptyGrammar,
}
