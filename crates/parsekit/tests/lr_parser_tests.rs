//! Integration tests for the shift-reduce backends.

#![cfg(feature = "backend-lr")]

use parsekit::backend::ParserBackend;
use parsekit::backend::lr::{LrFlavor, LrParser};
use parsekit::grammar::Grammar;
use parsekit::trace::StepAction;

const EXPR: &str = "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id";
const DANGLING_ELSE: &str = "S -> if E then S | if E then S else S | a\nE -> b";

fn parser(text: &str, flavor: LrFlavor) -> LrParser {
    let grammar = Grammar::parse(text).expect("grammar parses");
    LrParser::new(&grammar, flavor).expect("parser builds")
}

#[test]
fn expression_grammar_accepts_and_yields_input() {
    for flavor in [LrFlavor::Slr1, LrFlavor::Clr1, LrFlavor::Lalr1] {
        let parser = parser(EXPR, flavor);
        assert!(parser.is_conflict_free());

        let outcome = parser.parse_text("id + id * id").unwrap();
        assert!(outcome.accepted);
        assert!(matches!(
            outcome.final_step().unwrap().action,
            StepAction::Accept
        ));

        let tree = outcome.tree.expect("accepted parse has a tree");
        assert_eq!(tree.symbol.name(), "E");
        assert_eq!(tree.frontier(), ["id", "+", "id", "*", "id"]);
    }
}

#[test]
fn clr_builds_at_least_as_many_states_as_lalr() {
    let clr = parser(EXPR, LrFlavor::Clr1);
    let lalr = parser(EXPR, LrFlavor::Lalr1);
    assert!(clr.automaton().state_count() >= lalr.automaton().state_count());
}

#[test]
fn malformed_input_is_rejected_at_the_second_plus() {
    for flavor in [LrFlavor::Slr1, LrFlavor::Clr1, LrFlavor::Lalr1] {
        let parser = parser(EXPR, flavor);
        let outcome = parser.parse_text("id + + id").unwrap();
        assert!(!outcome.accepted);
        assert!(outcome.tree.is_none());

        let last = outcome.final_step().unwrap();
        assert!(matches!(last.action, StepAction::Error { .. }));
        // The offending token is the second +, still at the front of the
        // remaining input, with "+ id $" left unconsumed.
        assert_eq!(last.remaining, ["+", "id", "$"]);
    }
}

#[test]
fn dangling_else_conflicts_in_every_flavor() {
    for flavor in [LrFlavor::Slr1, LrFlavor::Clr1, LrFlavor::Lalr1] {
        let parser = parser(DANGLING_ELSE, flavor);
        assert!(!parser.is_conflict_free(), "{flavor} reported no conflicts");
        assert!(
            parser
                .conflicts()
                .iter()
                .any(|c| c.is_shift_reduce() && c.terminal() == "else"),
            "{flavor} lacks a shift/reduce conflict on else"
        );
    }
}

#[test]
fn conflicted_table_still_parses_with_shift_preference() {
    // Shift-over-reduce binds the else to the nearest if; the parse
    // succeeds despite the recorded conflict.
    let parser = parser(DANGLING_ELSE, LrFlavor::Lalr1);
    let outcome = parser.parse_text("if b then if b then a else a").unwrap();
    assert!(outcome.accepted);
}

#[test]
fn epsilon_reductions_parse_and_leave_empty_nodes() {
    let parser = parser("S -> a B\nB -> b | ε", LrFlavor::Slr1);
    assert!(parser.is_conflict_free());

    let outcome = parser.parse_text("a").unwrap();
    assert!(outcome.accepted);
    let tree = outcome.tree.unwrap();
    assert_eq!(tree.frontier(), ["a"]);
    // The ε-reduction produced a childless B node.
    let b = &tree.children[1];
    assert_eq!(b.symbol.name(), "B");
    assert!(b.children.is_empty());
}

#[test]
fn empty_input_accepts_iff_grammar_derives_epsilon() {
    let nullable = parser("S -> a S | ε", LrFlavor::Lalr1);
    assert!(nullable.parse_tokens(&[]).accepted);

    let non_nullable = parser("S -> a", LrFlavor::Lalr1);
    assert!(!non_nullable.parse_tokens(&[]).accepted);
}

#[test]
fn unknown_token_is_a_typed_error_not_a_trace() {
    let parser = parser(EXPR, LrFlavor::Lalr1);
    let err = parser.parse_text("id + x").unwrap_err();
    assert_eq!(
        err,
        parsekit::GrammarError::UnknownToken {
            token: "x".to_string(),
            position: 2
        }
    );
}

#[test]
fn trace_steps_are_numbered_from_one() {
    let parser = parser(EXPR, LrFlavor::Slr1);
    let outcome = parser.parse_text("id").unwrap();
    for (i, step) in outcome.steps.iter().enumerate() {
        assert_eq!(step.step, i + 1);
    }
    // id: shift, F -> id, T -> F, E -> T, accept.
    assert_eq!(outcome.steps.len(), 5);
}

#[test]
fn every_lr0_state_is_reachable_and_deterministic() {
    let parser = parser(EXPR, LrFlavor::Slr1);
    let automaton = parser.automaton();

    let triples = automaton.transition_triples();
    // Determinism: no duplicate (from, symbol).
    for window in triples.windows(2) {
        assert!(!(window[0].0 == window[1].0 && window[0].1 == window[1].1));
    }

    // Reachability from state 0.
    let mut reached = vec![false; automaton.state_count()];
    reached[0] = true;
    let mut frontier = vec![0];
    while let Some(id) = frontier.pop() {
        for (from, _, to) in &triples {
            if *from == id && !reached[*to] {
                reached[*to] = true;
                frontier.push(*to);
            }
        }
    }
    assert!(reached.iter().all(|&r| r));
}
