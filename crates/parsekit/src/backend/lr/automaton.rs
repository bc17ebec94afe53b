//! Canonical LR state collections and the LALR core-merge.
//!
//! States are canonicalized item sets (sorted, deduplicated vectors), so two
//! states are equal exactly when their item sets are. Construction is a
//! breadth-first worklist over the grammar's ordered symbol list, which makes
//! state numbering reproducible run to run.

use hashbrown::HashMap;
use std::collections::VecDeque;
use std::hash::Hash;

use crate::backend::lr::item::{
    Lr0Item, Lr1Item, closure_lr0, closure_lr1, goto_lr0, goto_lr1,
};
use crate::grammar::analysis::FirstFollow;
use crate::grammar::{END_MARKER, Grammar, Symbol};

/// A canonicalized set of items with a stable identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State<I> {
    items: Vec<I>,
}

impl<I: Ord> State<I> {
    /// Canonicalize an item set: sort and deduplicate.
    #[must_use]
    pub fn new(mut items: Vec<I>) -> Self {
        items.sort_unstable();
        items.dedup();
        Self { items }
    }

    /// The items, in canonical order.
    #[must_use]
    pub fn items(&self) -> &[I] {
        &self.items
    }
}

type TransitionMap = HashMap<(usize, Symbol), usize, ahash::RandomState>;

/// A deterministic LR automaton: states with dense ids (state 0 initial)
/// and a partial transition function over grammar symbols.
#[derive(Debug, Clone)]
pub struct Automaton<I> {
    states: Vec<State<I>>,
    transitions: TransitionMap,
}

impl<I> Automaton<I> {
    /// The states, indexed by id.
    #[must_use]
    pub fn states(&self) -> &[State<I>] {
        &self.states
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of transitions.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// The successor of `from` on `symbol`, if defined.
    #[must_use]
    pub fn transition(&self, from: usize, symbol: &Symbol) -> Option<usize> {
        self.transitions.get(&(from, symbol.clone())).copied()
    }

    /// All transitions as sorted `(from, symbol, to)` triples.
    #[must_use]
    pub fn transition_triples(&self) -> Vec<(usize, Symbol, usize)> {
        let mut triples: Vec<(usize, Symbol, usize)> = self
            .transitions
            .iter()
            .map(|(key, &to)| (key.0, key.1.clone(), to))
            .collect();
        triples.sort_unstable();
        triples
    }
}

/// Build the canonical LR(0) collection for an augmented grammar.
#[must_use]
pub fn build_lr0(grammar: &Grammar) -> Automaton<Lr0Item> {
    let start = closure_lr0(&[Lr0Item::new(0, 0)], grammar);
    build_collection(grammar, start, |items, symbol| {
        goto_lr0(items, symbol, grammar)
    })
}

/// Build the canonical LR(1) collection for an augmented grammar. The
/// initial state is the closure of `[S' → · S, $]`.
#[must_use]
pub fn build_lr1(grammar: &Grammar, first_follow: &FirstFollow) -> Automaton<Lr1Item> {
    let start = closure_lr1(&[Lr1Item::new(0, 0, END_MARKER)], grammar, first_follow);
    build_collection(grammar, start, |items, symbol| {
        goto_lr1(items, symbol, grammar, first_follow)
    })
}

/// Worklist construction shared by both item families. `goto` must return a
/// closed item set (or empty when the transition is undefined).
fn build_collection<I, G>(grammar: &Grammar, start: Vec<I>, goto: G) -> Automaton<I>
where
    I: Clone + Ord + Eq + Hash,
    G: Fn(&[I], &Symbol) -> Vec<I>,
{
    let symbols: Vec<Symbol> = grammar.symbols().collect();

    let initial = State::new(start);
    let mut states = vec![initial.clone()];
    let mut index: HashMap<State<I>, usize, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    index.insert(initial, 0);

    let mut transitions = TransitionMap::with_hasher(ahash::RandomState::new());
    let mut queue: VecDeque<usize> = VecDeque::from([0]);

    while let Some(from) = queue.pop_front() {
        for symbol in &symbols {
            let target_items = goto(states[from].items(), symbol);
            if target_items.is_empty() {
                continue;
            }
            let target = State::new(target_items);
            let to = match index.get(&target) {
                Some(&existing) => existing,
                None => {
                    let id = states.len();
                    states.push(target.clone());
                    index.insert(target, id);
                    queue.push_back(id);
                    id
                }
            };
            transitions.insert((from, symbol.clone()), to);
        }
    }

    Automaton {
        states,
        transitions,
    }
}

/// Merge an LR(1) automaton into its LALR form: states are grouped by core
/// (their item sets with lookaheads stripped) and each group becomes one
/// state whose items are the union of the group's. Transitions remap through
/// the merge; cores are isomorphic across merged members, so the remapped
/// function stays deterministic.
#[must_use]
pub fn merge_by_core(lr1: &Automaton<Lr1Item>) -> Automaton<Lr1Item> {
    let mut core_index: HashMap<Vec<Lr0Item>, usize, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    let mut merged_items: Vec<Vec<Lr1Item>> = Vec::new();
    let mut remap: Vec<usize> = Vec::with_capacity(lr1.state_count());

    for state in lr1.states() {
        let mut core: Vec<Lr0Item> = state.items().iter().map(Lr1Item::core).collect();
        core.sort_unstable();
        core.dedup();

        let slot = match core_index.get(&core) {
            Some(&existing) => existing,
            None => {
                let id = merged_items.len();
                merged_items.push(Vec::new());
                core_index.insert(core, id);
                id
            }
        };
        merged_items[slot].extend(state.items().iter().cloned());
        remap.push(slot);
    }

    let states: Vec<State<Lr1Item>> = merged_items.into_iter().map(State::new).collect();

    let mut transitions = TransitionMap::with_hasher(ahash::RandomState::new());
    for (from, symbol, to) in lr1.transition_triples() {
        transitions.insert((remap[from], symbol), remap[to]);
    }

    Automaton {
        states,
        transitions,
    }
}
