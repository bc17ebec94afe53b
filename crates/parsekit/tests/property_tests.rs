//! Property-based tests: round-trip parsing and structural invariants over
//! generated inputs.

#![cfg(all(feature = "backend-ll", feature = "backend-lr"))]

use proptest::prelude::*;

use parsekit::backend::ParserBackend;
use parsekit::backend::ll::Ll1Parser;
use parsekit::backend::lr::{LrFlavor, LrParser};
use parsekit::grammar::Grammar;
use parsekit::grammar::analysis::FirstFollow;
use parsekit::grammar::transform::transform_for_ll1;

const EXPR: &str = "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id";

/// Strings of L(EXPR), generated bottom-up from the grammar itself.
fn arb_expression() -> impl Strategy<Value = String> {
    let leaf = Just("id".to_string());
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} + {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} * {b}")),
            inner.prop_map(|a| format!("( {a} )")),
        ]
    })
}

proptest! {
    #[test]
    fn every_flavor_accepts_generated_sentences(input in arb_expression()) {
        let grammar = Grammar::parse(EXPR).unwrap();
        let expected: Vec<&str> = input.split_whitespace().collect();

        for flavor in [LrFlavor::Slr1, LrFlavor::Clr1, LrFlavor::Lalr1] {
            let parser = LrParser::new(&grammar, flavor).unwrap();
            let outcome = parser.parse_text(&input).unwrap();
            prop_assert!(outcome.accepted, "{flavor} rejected {input:?}");
            // Round-trip: the parse tree's yield equals the input.
            let tree = outcome.tree.unwrap();
            prop_assert_eq!(&tree.frontier(), &expected);
        }

        let transformed = transform_for_ll1(&grammar);
        let ll = Ll1Parser::new(&transformed.grammar).unwrap();
        let outcome = ll.parse_text(&input).unwrap();
        prop_assert!(outcome.accepted, "LL(1) rejected {input:?}");
        prop_assert_eq!(&outcome.tree.unwrap().frontier(), &expected);
    }

    #[test]
    fn traces_grow_linearly_with_input(input in arb_expression()) {
        let grammar = Grammar::parse(EXPR).unwrap();
        let parser = LrParser::new(&grammar, LrFlavor::Lalr1).unwrap();
        let outcome = parser.parse_text(&input).unwrap();

        let token_count = input.split_whitespace().count();
        // Steps = shifts + reductions + accept; reductions are bounded by
        // the derivation length, itself linear in the token count for this
        // grammar.
        prop_assert!(outcome.steps.len() <= 4 * token_count + 2);
    }
}

#[test]
fn first_follow_is_idempotent_across_grammars() {
    let grammars = [
        EXPR,
        "S -> A B\nA -> a A | ε\nB -> b | ε",
        "S -> if E then S | if E then S else S | a\nE -> b",
        "S -> C C\nC -> c C | d",
    ];
    for text in grammars {
        let grammar = Grammar::parse(text).unwrap();
        let a = FirstFollow::compute(&grammar);
        let b = FirstFollow::compute(&grammar);
        for nt in grammar.nonterminals() {
            assert_eq!(a.first(nt), b.first(nt), "FIRST differs for {nt}");
            assert_eq!(a.follow(nt), b.follow(nt), "FOLLOW differs for {nt}");
        }
    }
}

#[test]
fn lalr_is_never_larger_than_clr() {
    let grammars = [
        EXPR,
        "S -> C C\nC -> c C | d",
        "S -> a S | b",
        "S -> if E then S | if E then S else S | a\nE -> b",
    ];
    for text in grammars {
        let grammar = Grammar::parse(text).unwrap();
        let clr = LrParser::new(&grammar, LrFlavor::Clr1).unwrap();
        let lalr = LrParser::new(&grammar, LrFlavor::Lalr1).unwrap();
        assert!(
            lalr.automaton().state_count() <= clr.automaton().state_count(),
            "LALR grew past CLR for {text:?}"
        );
    }
}
