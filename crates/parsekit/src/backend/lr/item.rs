//! LR(0) and LR(1) items with their closure and goto operations.
//!
//! Items are small ordered records so that item sets canonicalize as sorted
//! vectors: state equality and hashing then fall out of slice equality.

use compact_str::CompactString;
use hashbrown::HashSet;
use std::collections::VecDeque;
use std::fmt::Write as _;

use crate::grammar::analysis::FirstFollow;
use crate::grammar::{Grammar, Symbol};

/// An LR(0) item: a production with a dot position in `0..=|rhs|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lr0Item {
    /// Production id in the augmented grammar.
    pub production: usize,
    /// Dot position within the right-hand side.
    pub dot: usize,
}

impl Lr0Item {
    /// Create an item.
    #[must_use]
    pub const fn new(production: usize, dot: usize) -> Self {
        Self { production, dot }
    }

    /// The symbol immediately after the dot, or `None` for a complete item.
    #[must_use]
    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g Symbol> {
        grammar.production(self.production).rhs().get(self.dot)
    }

    /// The item with the dot advanced one position.
    #[must_use]
    pub const fn advance(self) -> Self {
        Self {
            production: self.production,
            dot: self.dot + 1,
        }
    }

    /// Whether the dot is at the end of the right-hand side.
    #[must_use]
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.production(self.production).rhs().len()
    }

    /// Whether this is a kernel item: the dot has moved, or it is the
    /// initial item of the augmented start production.
    #[must_use]
    pub const fn is_kernel(&self) -> bool {
        self.dot > 0 || self.production == 0
    }

    /// Render as `A -> α · β`.
    #[must_use]
    pub fn render(&self, grammar: &Grammar) -> String {
        render_dotted(grammar, self.production, self.dot)
    }
}

/// An LR(1) item: an LR(0) item plus a single lookahead terminal
/// (possibly `$`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lr1Item {
    /// Production id in the augmented grammar.
    pub production: usize,
    /// Dot position within the right-hand side.
    pub dot: usize,
    /// The lookahead terminal.
    pub lookahead: CompactString,
}

impl Lr1Item {
    /// Create an item.
    #[must_use]
    pub fn new(production: usize, dot: usize, lookahead: impl Into<CompactString>) -> Self {
        Self {
            production,
            dot,
            lookahead: lookahead.into(),
        }
    }

    /// The underlying LR(0) item, the LALR merge key.
    #[must_use]
    pub const fn core(&self) -> Lr0Item {
        Lr0Item {
            production: self.production,
            dot: self.dot,
        }
    }

    /// The symbol immediately after the dot, or `None` for a complete item.
    #[must_use]
    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g Symbol> {
        grammar.production(self.production).rhs().get(self.dot)
    }

    /// The item with the dot advanced one position.
    #[must_use]
    pub fn advance(&self) -> Self {
        Self {
            production: self.production,
            dot: self.dot + 1,
            lookahead: self.lookahead.clone(),
        }
    }

    /// Whether the dot is at the end of the right-hand side.
    #[must_use]
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.production(self.production).rhs().len()
    }

    /// Render as `[A -> α · β, a]`.
    #[must_use]
    pub fn render(&self, grammar: &Grammar) -> String {
        format!(
            "[{}, {}]",
            render_dotted(grammar, self.production, self.dot),
            self.lookahead
        )
    }
}

fn render_dotted(grammar: &Grammar, production: usize, dot: usize) -> String {
    let prod = grammar.production(production);
    let mut out = format!("{} ->", prod.lhs());
    for (i, sym) in prod.rhs().iter().enumerate() {
        if i == dot {
            out.push_str(" ·");
        }
        let _ = write!(out, " {sym}");
    }
    if dot >= prod.rhs().len() {
        out.push_str(" ·");
    }
    out
}

/// LR(0) closure: saturate under "a dot before a nonterminal admits all of
/// its productions with the dot at 0". Returns a sorted, deduplicated set.
#[must_use]
pub fn closure_lr0(seed: &[Lr0Item], grammar: &Grammar) -> Vec<Lr0Item> {
    let mut set: HashSet<Lr0Item, ahash::RandomState> =
        HashSet::with_hasher(ahash::RandomState::new());
    let mut queue: VecDeque<Lr0Item> = VecDeque::new();
    for &item in seed {
        if set.insert(item) {
            queue.push_back(item);
        }
    }

    while let Some(item) = queue.pop_front() {
        let Some(sym) = item.next_symbol(grammar) else {
            continue;
        };
        if !sym.is_nonterminal() {
            continue;
        }
        for &pid in grammar.productions_of(sym.name()) {
            let new_item = Lr0Item::new(pid, 0);
            if set.insert(new_item) {
                queue.push_back(new_item);
            }
        }
    }

    let mut items: Vec<Lr0Item> = set.into_iter().collect();
    items.sort_unstable();
    items
}

/// LR(0) goto: advance the dot over `symbol` and close. Empty if no item in
/// `state` has `symbol` after its dot.
#[must_use]
pub fn goto_lr0(state: &[Lr0Item], symbol: &Symbol, grammar: &Grammar) -> Vec<Lr0Item> {
    let moved: Vec<Lr0Item> = state
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(|item| item.advance())
        .collect();
    if moved.is_empty() {
        return Vec::new();
    }
    closure_lr0(&moved, grammar)
}

/// LR(1) closure: for `[A → α · B β, a]` and each production `B → γ`, add
/// `[B → · γ, b]` for every `b ∈ FIRST(β a)`. Returns a sorted,
/// deduplicated set.
#[must_use]
pub fn closure_lr1(seed: &[Lr1Item], grammar: &Grammar, first_follow: &FirstFollow) -> Vec<Lr1Item> {
    let mut set: HashSet<Lr1Item, ahash::RandomState> =
        HashSet::with_hasher(ahash::RandomState::new());
    let mut queue: VecDeque<Lr1Item> = VecDeque::new();
    for item in seed {
        if set.insert(item.clone()) {
            queue.push_back(item.clone());
        }
    }

    while let Some(item) = queue.pop_front() {
        let Some(sym) = item.next_symbol(grammar) else {
            continue;
        };
        if !sym.is_nonterminal() {
            continue;
        }

        // FIRST(β a): FIRST of the suffix after the dot, falling back to the
        // item's own lookahead when the suffix is nullable.
        let beta = &grammar.production(item.production).rhs()[item.dot + 1..];
        let first_beta = first_follow.first_of_sequence(beta);
        let mut lookaheads = first_beta.sorted();
        if first_beta.nullable {
            lookaheads.push(item.lookahead.clone());
        }

        for &pid in grammar.productions_of(sym.name()) {
            for lookahead in &lookaheads {
                let new_item = Lr1Item::new(pid, 0, lookahead.clone());
                if set.insert(new_item.clone()) {
                    queue.push_back(new_item);
                }
            }
        }
    }

    let mut items: Vec<Lr1Item> = set.into_iter().collect();
    items.sort_unstable();
    items
}

/// LR(1) goto: advance the dot over `symbol` (lookaheads ride along) and
/// close.
#[must_use]
pub fn goto_lr1(
    state: &[Lr1Item],
    symbol: &Symbol,
    grammar: &Grammar,
    first_follow: &FirstFollow,
) -> Vec<Lr1Item> {
    let moved: Vec<Lr1Item> = state
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(Lr1Item::advance)
        .collect();
    if moved.is_empty() {
        return Vec::new();
    }
    closure_lr1(&moved, grammar, first_follow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::END_MARKER;

    fn augmented_expr() -> Grammar {
        Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id")
            .unwrap()
            .augment()
    }

    #[test]
    fn lr0_closure_of_start_item() {
        let grammar = augmented_expr();
        let closure = closure_lr0(&[Lr0Item::new(0, 0)], &grammar);
        // S' -> · E plus every production of E, T, F with the dot at 0.
        assert_eq!(closure.len(), 7);
        assert!(closure.contains(&Lr0Item::new(0, 0)));
        for pid in 1..7 {
            assert!(closure.contains(&Lr0Item::new(pid, 0)));
        }
    }

    #[test]
    fn lr0_goto_advances_and_closes() {
        let grammar = augmented_expr();
        let start = closure_lr0(&[Lr0Item::new(0, 0)], &grammar);
        let after_e = goto_lr0(&start, &Symbol::nonterminal("E"), &grammar);
        // S' -> E · and E -> E · + T.
        assert_eq!(after_e.len(), 2);
        assert!(after_e.contains(&Lr0Item::new(0, 1)));
        assert!(after_e.contains(&Lr0Item::new(1, 1)));

        let on_unknown = goto_lr0(&start, &Symbol::terminal(")"), &grammar);
        assert!(on_unknown.is_empty());
    }

    #[test]
    fn lr1_closure_propagates_lookaheads() {
        let grammar = augmented_expr();
        let first_follow = FirstFollow::compute(&grammar);
        let closure = closure_lr1(&[Lr1Item::new(0, 0, END_MARKER)], &grammar, &first_follow);

        // [E -> · E + T, $] and [E -> · E + T, +] both appear: + from
        // FIRST(+ T ...), $ from the nullable-suffix fallback.
        assert!(closure.contains(&Lr1Item::new(1, 0, END_MARKER)));
        assert!(closure.contains(&Lr1Item::new(1, 0, "+")));
        // Lookaheads for F come through T: *, +, $ all possible.
        assert!(closure.contains(&Lr1Item::new(5, 0, "*")));
        assert!(closure.contains(&Lr1Item::new(5, 0, "+")));
        assert!(closure.contains(&Lr1Item::new(5, 0, END_MARKER)));
    }

    #[test]
    fn core_projection_drops_lookahead() {
        let item = Lr1Item::new(3, 1, "+");
        assert_eq!(item.core(), Lr0Item::new(3, 1));
    }

    #[test]
    fn rendering_places_the_dot() {
        let grammar = augmented_expr();
        assert_eq!(Lr0Item::new(1, 1).render(&grammar), "E -> E · + T");
        assert_eq!(Lr0Item::new(1, 3).render(&grammar), "E -> E + T ·");
        assert_eq!(
            Lr1Item::new(0, 0, END_MARKER).render(&grammar),
            "[E' -> · E, $]"
        );
    }

    #[test]
    fn kernel_items() {
        assert!(Lr0Item::new(0, 0).is_kernel());
        assert!(Lr0Item::new(3, 2).is_kernel());
        assert!(!Lr0Item::new(3, 0).is_kernel());
    }
}
