//! # Grammar Transformations
//!
//! Rewrites that make a grammar suitable for top-down predictive parsing:
//!
//! 1. **Left-recursion elimination** — direct (`A → A α | β` becomes
//!    `A → β A'`, `A' → α A' | ε`) and indirect, via the ordered-substitution
//!    algorithm over the grammar's nonterminal order.
//! 2. **Left factoring** — alternatives sharing a common prefix
//!    `A → α β₁ | α β₂` become `A → α A'`, `A' → β₁ | β₂`, iterated until no
//!    two alternatives of any nonterminal share a prefix.
//!
//! Each transformation produces a fresh [`Grammar`]; the input grammar is
//! never mutated. Fresh nonterminal names are primed (`A'`, `A''`, …) until
//! they collide with nothing.

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};

use crate::error::GrammarWarning;
use crate::grammar::{Grammar, RawRule};

/// Result of a grammar transformation: the rewritten grammar plus a record
/// of what was done.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransformOutcome {
    /// The transformed grammar, with its own production-id space.
    pub grammar: Grammar,
    /// Human-readable descriptions of the applied rewrites, in order.
    pub applied: Vec<String>,
    /// Whether any left recursion was eliminated.
    pub left_recursion_removed: bool,
    /// Whether any alternatives were left-factored.
    pub left_factored: bool,
    /// Nonterminals introduced by the transformation, in creation order.
    pub new_nonterminals: Vec<CompactString>,
    /// Warnings recorded during transformation.
    pub warnings: Vec<GrammarWarning>,
}

/// Eliminate direct and indirect left recursion.
#[must_use]
pub fn eliminate_left_recursion(grammar: &Grammar) -> TransformOutcome {
    let mut ws = Workspace::new(grammar);
    ws.eliminate_left_recursion();
    ws.finish()
}

/// Left-factor common prefixes, iterating until stable.
#[must_use]
pub fn left_factor(grammar: &Grammar) -> TransformOutcome {
    let mut ws = Workspace::new(grammar);
    ws.left_factor();
    ws.finish()
}

/// Apply the full LL(1)-suitability pipeline: left-recursion elimination
/// followed by left factoring.
#[must_use]
pub fn transform_for_ll1(grammar: &Grammar) -> TransformOutcome {
    let mut ws = Workspace::new(grammar);
    ws.eliminate_left_recursion();
    ws.left_factor();
    ws.finish()
}

type Rhs = Vec<CompactString>;

/// Mutable rule set the rewrites operate on. Nonterminal order is kept
/// explicit; fresh primes are inserted right after their base nonterminal so
/// the output reads naturally.
struct Workspace {
    start: CompactString,
    order: Vec<CompactString>,
    rules: HashMap<CompactString, Vec<Rhs>, ahash::RandomState>,
    taken: HashSet<CompactString, ahash::RandomState>,
    new_nonterminals: Vec<CompactString>,
    applied: Vec<String>,
    warnings: Vec<GrammarWarning>,
    recursion_rewrites: usize,
    factoring_rewrites: usize,
}

impl Workspace {
    fn new(grammar: &Grammar) -> Self {
        let order: Vec<CompactString> = grammar.nonterminals().to_vec();
        let mut rules: HashMap<CompactString, Vec<Rhs>, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        for prod in grammar.productions() {
            rules
                .entry(CompactString::from(prod.lhs()))
                .or_default()
                .push(prod.rhs().iter().map(|s| CompactString::from(s.name())).collect());
        }

        let mut taken = HashSet::with_hasher(ahash::RandomState::new());
        taken.extend(grammar.nonterminals().iter().cloned());
        taken.extend(grammar.terminals().iter().cloned());

        Self {
            start: CompactString::from(grammar.start()),
            order,
            rules,
            taken,
            new_nonterminals: Vec::new(),
            applied: Vec::new(),
            warnings: Vec::new(),
            recursion_rewrites: 0,
            factoring_rewrites: 0,
        }
    }

    /// Generate a fresh primed name and register it after `base` in the
    /// nonterminal order.
    fn fresh_nonterminal(&mut self, base: &str) -> CompactString {
        let mut name = CompactString::from(format!("{base}'"));
        while self.taken.contains(&name) {
            name.push('\'');
        }
        self.taken.insert(name.clone());
        self.new_nonterminals.push(name.clone());

        let base_pos = self
            .order
            .iter()
            .position(|n| n.as_str() == base)
            .unwrap_or(self.order.len().saturating_sub(1));
        self.order.insert(base_pos + 1, name.clone());
        name
    }

    fn eliminate_left_recursion(&mut self) {
        // Ordered substitution over the original nonterminals only; the
        // primes introduced along the way appear exclusively at tail
        // positions and cannot participate in left recursion.
        let originals: Vec<CompactString> = self.order.clone();
        for i in 0..originals.len() {
            for a_j in &originals[..i] {
                self.substitute_leading(&originals[i], a_j);
            }
            self.eliminate_direct(&originals[i]);
        }
    }

    /// Replace every `A_i → A_j γ` by `A_i → δ γ` for each `A_j → δ`.
    fn substitute_leading(&mut self, a_i: &CompactString, a_j: &CompactString) {
        let Some(j_rules) = self.rules.get(a_j).cloned() else {
            return;
        };
        let Some(i_rules) = self.rules.get(a_i) else {
            return;
        };
        if !i_rules.iter().any(|rhs| rhs.first() == Some(a_j)) {
            return;
        }

        let mut rewritten = Vec::new();
        for rhs in self.rules.remove(a_i).unwrap_or_default() {
            if rhs.first() == Some(a_j) {
                let gamma = &rhs[1..];
                for delta in &j_rules {
                    let mut expanded = delta.clone();
                    expanded.extend_from_slice(gamma);
                    rewritten.push(expanded);
                }
            } else {
                rewritten.push(rhs);
            }
        }
        self.rules.insert(a_i.clone(), rewritten);
        self.applied
            .push(format!("substituted {a_j} into the productions of {a_i}"));
    }

    /// Remove direct left recursion on one nonterminal, if present.
    fn eliminate_direct(&mut self, nt: &CompactString) {
        let Some(alternatives) = self.rules.get(nt) else {
            return;
        };
        let (recursive, mut non_recursive): (Vec<Rhs>, Vec<Rhs>) = alternatives
            .iter()
            .cloned()
            .partition(|rhs| rhs.first() == Some(nt));
        if recursive.is_empty() {
            return;
        }
        if non_recursive.is_empty() {
            // The nonterminal derives no terminal string; emit the rewrite
            // anyway with an ε seed so the result is well formed.
            self.warnings.push(GrammarWarning::UnproductiveLeftRecursion {
                name: nt.to_string(),
            });
            non_recursive.push(Rhs::new());
        }

        let prime = self.fresh_nonterminal(nt);

        let mut base_rules = Vec::with_capacity(non_recursive.len());
        for mut beta in non_recursive {
            beta.push(prime.clone());
            base_rules.push(beta);
        }

        let mut prime_rules = Vec::with_capacity(recursive.len() + 1);
        for rhs in recursive {
            let mut alpha: Rhs = rhs[1..].to_vec();
            alpha.push(prime.clone());
            prime_rules.push(alpha);
        }
        prime_rules.push(Rhs::new());

        self.rules.insert(nt.clone(), base_rules);
        self.rules.insert(prime.clone(), prime_rules);
        self.applied.push(format!(
            "eliminated direct left recursion in {nt}, introducing {prime}"
        ));
        self.recursion_rewrites += 1;
    }

    fn left_factor(&mut self) {
        loop {
            let mut changed = false;
            for nt in self.order.clone() {
                if self.factor_once(&nt) {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Factor the first group of ≥2 alternatives of `nt` sharing a prefix.
    /// Returns true if a rewrite happened; callers loop until quiescent.
    fn factor_once(&mut self, nt: &CompactString) -> bool {
        let Some(alternatives) = self.rules.get_mut(nt) else {
            return false;
        };
        dedup_preserving_order(alternatives);

        // Group alternative indices by leading symbol, in appearance order.
        let mut group_order: Vec<CompactString> = Vec::new();
        let mut groups: HashMap<CompactString, Vec<usize>, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        for (idx, rhs) in alternatives.iter().enumerate() {
            if let Some(head) = rhs.first() {
                let slot = groups.entry(head.clone()).or_default();
                if slot.is_empty() {
                    group_order.push(head.clone());
                }
                slot.push(idx);
            }
        }

        let Some((_, members)) = group_order
            .into_iter()
            .map(|head| {
                let members = groups.remove(&head).unwrap_or_default();
                (head, members)
            })
            .find(|(_, members)| members.len() >= 2)
        else {
            return false;
        };

        let prefix = longest_common_prefix(alternatives, &members);
        debug_assert!(!prefix.is_empty());

        let suffixes: Vec<Rhs> = members
            .iter()
            .map(|&idx| alternatives[idx][prefix.len()..].to_vec())
            .collect();

        // Replace the first grouped alternative with `α A'` and drop the rest.
        let prime = self.fresh_nonterminal(nt);
        let alternatives = self.rules.get_mut(nt).expect("nonterminal present");
        let mut factored = prefix.clone();
        factored.push(prime.clone());
        alternatives[members[0]] = factored;
        for &idx in members[1..].iter().rev() {
            alternatives.remove(idx);
        }

        self.rules.insert(prime.clone(), suffixes);
        self.applied.push(format!(
            "left factored {nt} on prefix \"{}\", introducing {prime}",
            prefix.join(" ")
        ));
        self.factoring_rewrites += 1;
        true
    }

    fn finish(self) -> TransformOutcome {
        let mut raw: Vec<RawRule> = Vec::new();
        for nt in &self.order {
            if let Some(alternatives) = self.rules.get(nt) {
                for rhs in alternatives {
                    raw.push((nt.clone(), rhs.clone()));
                }
            }
        }
        let grammar =
            Grammar::new(raw, self.start).expect("transformation preserves non-emptiness");

        TransformOutcome {
            grammar,
            applied: self.applied,
            left_recursion_removed: self.recursion_rewrites > 0,
            left_factored: self.factoring_rewrites > 0,
            new_nonterminals: self.new_nonterminals,
            warnings: self.warnings,
        }
    }
}

/// Longest common prefix of the selected alternatives.
fn longest_common_prefix(alternatives: &[Rhs], members: &[usize]) -> Rhs {
    let first = &alternatives[members[0]];
    let mut len = first.len();
    for &idx in &members[1..] {
        let other = &alternatives[idx];
        let common = first
            .iter()
            .zip(other.iter())
            .take_while(|(a, b)| a == b)
            .count();
        len = len.min(common);
    }
    first[..len].to_vec()
}

fn dedup_preserving_order(alternatives: &mut Vec<Rhs>) {
    let mut seen: HashSet<Rhs, ahash::RandomState> =
        HashSet::with_hasher(ahash::RandomState::new());
    alternatives.retain(|rhs| seen.insert(rhs.clone()));
}
