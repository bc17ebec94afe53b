//! The predictive driver: simulates a table-driven LL(1) parse, recording a
//! step per iteration and wiring the parse tree through placeholder nodes.

use compact_str::CompactString;

use crate::backend::ll::table::Ll1Table;
use crate::grammar::{END_MARKER, Grammar, Symbol};
use crate::trace::{ParseOutcome, ParseStep, StepAction};
use crate::tree::TreeArena;

/// Run the predictive loop over `tokens` (without the implicit `$`).
///
/// The stack starts as `[$, S]`. A terminal on top must match the lookahead;
/// a nonterminal is expanded via the table. Tree construction parallels the
/// stack: every pushed symbol carries the arena index of its (initially
/// childless) node, created when its parent was expanded, so children are
/// filled in exactly as the driver consumes or expands them.
pub(crate) fn parse(grammar: &Grammar, table: &Ll1Table, tokens: &[CompactString]) -> ParseOutcome {
    let mut input: Vec<CompactString> = tokens.to_vec();
    input.push(CompactString::from(END_MARKER));

    let mut arena = TreeArena::new();
    let root = arena.push(Symbol::nonterminal(grammar.start()));

    let mut stack: Vec<CompactString> =
        vec![CompactString::from(END_MARKER), CompactString::from(grammar.start())];
    let mut node_stack: Vec<Option<usize>> = vec![None, Some(root)];

    let mut steps: Vec<ParseStep> = Vec::new();
    let mut position = 0;

    loop {
        let top = stack.last().expect("stack holds $ until acceptance").clone();
        let lookahead = input[position].clone();
        let snapshot = stack.clone();
        let remaining = input[position..].to_vec();
        let step = steps.len() + 1;

        if top.as_str() == END_MARKER {
            if lookahead.as_str() == END_MARKER {
                steps.push(ParseStep {
                    step,
                    stack: snapshot,
                    remaining,
                    action: StepAction::Accept,
                    note: None,
                });
                return ParseOutcome {
                    accepted: true,
                    steps,
                    tree: Some(arena.build(root)),
                };
            }
            steps.push(ParseStep {
                step,
                stack: snapshot,
                remaining,
                action: StepAction::Error {
                    message: format!("unexpected input {lookahead:?} after the grammar's yield"),
                },
                note: None,
            });
            return ParseOutcome {
                accepted: false,
                steps,
                tree: None,
            };
        }

        if grammar.is_terminal(&top) {
            if top == lookahead {
                steps.push(ParseStep {
                    step,
                    stack: snapshot,
                    remaining,
                    action: StepAction::Match { terminal: top },
                    note: None,
                });
                stack.pop();
                node_stack.pop();
                position += 1;
            } else {
                steps.push(ParseStep {
                    step,
                    stack: snapshot,
                    remaining,
                    action: StepAction::Error {
                        message: format!("expected {top:?}, found {lookahead:?}"),
                    },
                    note: None,
                });
                return ParseOutcome {
                    accepted: false,
                    steps,
                    tree: None,
                };
            }
            continue;
        }

        // Nonterminal on top: consult the table.
        let Some(production) = table.production_for(&top, &lookahead) else {
            steps.push(ParseStep {
                step,
                stack: snapshot,
                remaining,
                action: StepAction::Error {
                    message: format!("no table entry for ({top}, {lookahead:?})"),
                },
                note: None,
            });
            return ParseOutcome {
                accepted: false,
                steps,
                tree: None,
            };
        };

        let prod = grammar.production(production);
        steps.push(ParseStep {
            step,
            stack: snapshot,
            remaining,
            action: StepAction::Expand { production },
            note: Some(prod.to_string()),
        });

        stack.pop();
        let parent = node_stack
            .pop()
            .flatten()
            .expect("nonterminal stack entries carry a node");

        // One placeholder child per RHS symbol, attached left to right; the
        // reversed push puts the leftmost symbol on top of the stack.
        let children: Vec<usize> = prod
            .rhs()
            .iter()
            .map(|sym| {
                let child = arena.push(sym.clone());
                arena.attach(parent, child);
                child
            })
            .collect();
        for (sym, &child) in prod.rhs().iter().zip(children.iter()).rev() {
            stack.push(CompactString::from(sym.name()));
            node_stack.push(Some(child));
        }
    }
}
