//! # Parsekit
//!
//! A parser-generator toolkit for context-free grammars. Given a grammar in
//! a simple text format, it constructs parsers of four flavors — one
//! top-down (LL(1)) and three bottom-up (SLR(1), CLR(1), LALR(1)) — detects
//! table conflicts, and simulates parses of token streams with step-by-step
//! traces and parse trees.
//!
//! ## Overview
//!
//! - **Grammar** ([`grammar`]): text parsing, augmentation, FIRST/FOLLOW
//!   analysis, and the LL(1)-suitability transformations (left-recursion
//!   elimination, left factoring).
//! - **Backends** ([`backend`]): the LL and LR table builders and drivers,
//!   unified behind [`backend::ParserBackend`].
//! - **Comparator** ([`compare`]): builds all four flavors in parallel and
//!   recommends one.
//!
//! Everything the builders and drivers produce — tables, conflicts, traces,
//! trees, reports — is pure data for a presentation layer to render.
//! Conflicts are never errors: a conflicted table stays usable under a
//! documented tie-break and carries its conflict records.
//!
//! ## Quick start
//!
//! ```rust
//! use parsekit::backend::ParserBackend;
//! use parsekit::backend::lr::{LrFlavor, LrParser};
//! use parsekit::grammar::Grammar;
//!
//! let grammar = Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id")?;
//! let parser = LrParser::new(&grammar, LrFlavor::Lalr1)?;
//! assert!(parser.is_conflict_free());
//!
//! let outcome = parser.parse_text("id + id * id")?;
//! assert!(outcome.accepted);
//! let tree = outcome.tree.expect("accepted parses carry a tree");
//! assert_eq!(tree.frontier(), ["id", "+", "id", "*", "id"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Left-recursive grammars work with the LR flavors as written; for LL(1),
//! transform first:
//!
//! ```rust
//! use parsekit::backend::ParserBackend;
//! use parsekit::backend::ll::Ll1Parser;
//! use parsekit::grammar::Grammar;
//! use parsekit::grammar::transform::transform_for_ll1;
//!
//! let grammar = Grammar::parse("E -> E + T | T\nT -> id")?;
//! let transformed = transform_for_ll1(&grammar);
//! assert!(transformed.left_recursion_removed);
//!
//! let parser = Ll1Parser::new(&transformed.grammar)?;
//! assert!(parser.is_ll1());
//! assert!(parser.parse_text("id + id + id")?.accepted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod error;
pub mod grammar;
pub mod trace;
pub mod tree;

#[cfg(all(feature = "backend-ll", feature = "backend-lr"))]
pub mod compare;

pub use crate::backend::{
    BackendCapabilities, Conflict, FlavorSummary, ParserBackend, ParserFlavor,
};
pub use crate::error::{GrammarError, GrammarWarning, TableError};
pub use crate::grammar::{Grammar, Production, Symbol, SymbolKind};
pub use crate::trace::{ParseOutcome, ParseStep, StepAction};
pub use crate::tree::TreeNode;
