//! The shift-reduce driver: simulates a parse over an assembled
//! ACTION/GOTO table, recording a step per iteration and growing the parse
//! tree on every reduction.

use compact_str::CompactString;

use crate::backend::lr::table::{Action, ParseTable};
use crate::grammar::{END_MARKER, Grammar, Symbol};
use crate::trace::{ParseOutcome, ParseStep, StepAction};
use crate::tree::TreeNode;

/// Run the shift-reduce loop over `tokens` (without the implicit `$`).
///
/// `grammar` must be the augmented grammar the table was built from; reduce
/// actions index into its productions. The trace is complete even on
/// failure, ending in the error step.
pub(crate) fn parse(grammar: &Grammar, table: &ParseTable, tokens: &[CompactString]) -> ParseOutcome {
    let mut input: Vec<CompactString> = tokens.to_vec();
    input.push(CompactString::from(END_MARKER));

    let mut state_stack: Vec<usize> = vec![0];
    let mut symbol_stack: Vec<CompactString> = Vec::new();
    let mut tree_stack: Vec<TreeNode> = Vec::new();
    let mut steps: Vec<ParseStep> = Vec::new();
    let mut position = 0;

    loop {
        let state = *state_stack.last().expect("state stack never empties");
        let lookahead = input[position].clone();
        let stack = render_stack(&state_stack, &symbol_stack);
        let remaining = input[position..].to_vec();
        let step = steps.len() + 1;

        match table.action(state, &lookahead) {
            None => {
                steps.push(ParseStep {
                    step,
                    stack,
                    remaining,
                    action: StepAction::Error {
                        message: format!("no action in state {state} on {lookahead:?}"),
                    },
                    note: None,
                });
                return ParseOutcome {
                    accepted: false,
                    steps,
                    tree: None,
                };
            }
            Some(Action::Shift(next)) => {
                steps.push(ParseStep {
                    step,
                    stack,
                    remaining,
                    action: StepAction::Shift { state: next },
                    note: None,
                });
                symbol_stack.push(lookahead.clone());
                tree_stack.push(TreeNode::leaf(Symbol::terminal(lookahead)));
                state_stack.push(next);
                position += 1;
            }
            Some(Action::Reduce(production)) => {
                let prod = grammar.production(production);
                steps.push(ParseStep {
                    step,
                    stack,
                    remaining,
                    action: StepAction::Reduce { production },
                    note: Some(prod.to_string()),
                });

                let popped = prod.rhs().len();
                state_stack.truncate(state_stack.len() - popped);
                symbol_stack.truncate(symbol_stack.len() - popped);
                let children = tree_stack.split_off(tree_stack.len() - popped);
                tree_stack.push(TreeNode::branch(Symbol::nonterminal(prod.lhs()), children));
                symbol_stack.push(CompactString::from(prod.lhs()));

                let top = *state_stack.last().expect("state stack never empties");
                match table.goto(top, prod.lhs()) {
                    Some(next) => state_stack.push(next),
                    None => {
                        // Unreachable for tables built by this crate; kept as
                        // a terminal error step rather than a panic.
                        let stack = render_stack(&state_stack, &symbol_stack);
                        steps.push(ParseStep {
                            step: steps.len() + 1,
                            stack,
                            remaining: input[position..].to_vec(),
                            action: StepAction::Error {
                                message: format!(
                                    "no goto in state {top} on {:?}",
                                    prod.lhs()
                                ),
                            },
                            note: None,
                        });
                        return ParseOutcome {
                            accepted: false,
                            steps,
                            tree: None,
                        };
                    }
                }
            }
            Some(Action::Accept) => {
                steps.push(ParseStep {
                    step,
                    stack,
                    remaining,
                    action: StepAction::Accept,
                    note: None,
                });
                return ParseOutcome {
                    accepted: true,
                    steps,
                    tree: tree_stack.pop(),
                };
            }
        }
    }
}

/// Interleave state ids and symbols, bottom first: `0 id 5 + 6`.
fn render_stack(states: &[usize], symbols: &[CompactString]) -> Vec<CompactString> {
    let mut rendered = Vec::with_capacity(states.len() + symbols.len());
    rendered.push(CompactString::from(states[0].to_string()));
    for (state, symbol) in states[1..].iter().zip(symbols) {
        rendered.push(symbol.clone());
        rendered.push(CompactString::from(state.to_string()));
    }
    rendered
}
