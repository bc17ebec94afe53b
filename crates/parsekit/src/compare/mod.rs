//! # Parser Comparator
//!
//! Builds all four parser flavors for one grammar — LL(1) after the
//! transformation pipeline, SLR(1), CLR(1) and LALR(1) on the grammar as
//! written — and produces a unified report with per-flavor statistics,
//! conflicts, and a recommendation.
//!
//! The four builds are independent pure functions of shared immutable
//! inputs, so they run in parallel.

use rayon::join;

use crate::backend::ll::Ll1Parser;
use crate::backend::lr::{LrFlavor, LrParser};
use crate::backend::{Conflict, FlavorSummary, ParserBackend, ParserFlavor};
use crate::error::TableError;
use crate::grammar::Grammar;
use crate::grammar::transform::{TransformOutcome, transform_for_ll1};

/// Which flavor the comparator recommends first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RecommendationPolicy {
    /// Prefer LR flavors: they parse the grammar as written. Order:
    /// LALR(1), SLR(1), CLR(1), LL(1).
    #[default]
    PreferLr,
    /// Prefer the predictive parser when it works (the grammar is
    /// transformed up front anyway). Order: LL(1), SLR(1), LALR(1), CLR(1).
    PreferLl,
}

impl RecommendationPolicy {
    const fn order(self) -> [ParserFlavor; 4] {
        match self {
            Self::PreferLr => [
                ParserFlavor::Lalr1,
                ParserFlavor::Slr1,
                ParserFlavor::Clr1,
                ParserFlavor::Ll1,
            ],
            Self::PreferLl => [
                ParserFlavor::Ll1,
                ParserFlavor::Slr1,
                ParserFlavor::Lalr1,
                ParserFlavor::Clr1,
            ],
        }
    }
}

/// Options for a comparison run.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Apply left-recursion elimination and left factoring before building
    /// the LL(1) parser. The LR flavors always use the grammar as written.
    pub transform_for_ll1: bool,
    /// Recommendation order.
    pub policy: RecommendationPolicy,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            transform_for_ll1: true,
            policy: RecommendationPolicy::default(),
        }
    }
}

/// One flavor's contribution to the comparison.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlavorReport {
    /// The flavor.
    pub flavor: ParserFlavor,
    /// Summary statistics; absent if the build failed structurally.
    pub summary: Option<FlavorSummary>,
    /// Conflicts recorded by the builder.
    pub conflicts: Vec<Conflict>,
    /// Structural build failure, if any.
    pub error: Option<String>,
}

impl FlavorReport {
    /// Whether the flavor built cleanly with zero conflicts.
    #[must_use]
    pub fn is_conflict_free(&self) -> bool {
        self.error.is_none() && self.conflicts.is_empty()
    }
}

/// The unified comparison result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComparisonReport {
    /// Per-flavor reports, in LL(1), SLR(1), CLR(1), LALR(1) order.
    pub flavors: Vec<FlavorReport>,
    /// The transformation applied before the LL(1) build, if enabled.
    pub transform: Option<TransformOutcome>,
    /// Flavors that built conflict-free, in report order.
    pub conflict_free: Vec<ParserFlavor>,
    /// The recommended flavor under the chosen policy, if any.
    pub recommended: Option<ParserFlavor>,
    /// Human-readable recommendation.
    pub recommendation: String,
    /// Whether the grammar looks ambiguous: reduce/reduce conflicts in the
    /// canonical LR(1) table are a strong indicator.
    pub likely_ambiguous: bool,
    /// Explanation of the ambiguity verdict, when set.
    pub ambiguity_reason: Option<String>,
}

impl ComparisonReport {
    /// The report for one flavor.
    #[must_use]
    pub fn flavor(&self, flavor: ParserFlavor) -> Option<&FlavorReport> {
        self.flavors.iter().find(|r| r.flavor == flavor)
    }
}

/// Build all four flavors and assemble the comparison report.
#[must_use]
pub fn compare(grammar: &Grammar, options: &CompareOptions) -> ComparisonReport {
    let ((slr, clr), (lalr, (transform, ll))) = join(
        || {
            join(
                || LrParser::new(grammar, LrFlavor::Slr1),
                || LrParser::new(grammar, LrFlavor::Clr1),
            )
        },
        || {
            join(
                || LrParser::new(grammar, LrFlavor::Lalr1),
                || {
                    if options.transform_for_ll1 {
                        let outcome = transform_for_ll1(grammar);
                        let parser = Ll1Parser::new(&outcome.grammar);
                        (Some(outcome), parser)
                    } else {
                        (None, Ll1Parser::new(grammar))
                    }
                },
            )
        },
    );

    let flavors = vec![
        report_of(ParserFlavor::Ll1, &ll),
        report_of(ParserFlavor::Slr1, &slr),
        report_of(ParserFlavor::Clr1, &clr),
        report_of(ParserFlavor::Lalr1, &lalr),
    ];

    let conflict_free: Vec<ParserFlavor> = flavors
        .iter()
        .filter(|r| r.is_conflict_free())
        .map(|r| r.flavor)
        .collect();

    let recommended = options
        .policy
        .order()
        .into_iter()
        .find(|flavor| conflict_free.contains(flavor));
    let recommendation = recommendation_text(recommended, &conflict_free);

    let (likely_ambiguous, ambiguity_reason) = ambiguity_verdict(&flavors);

    ComparisonReport {
        flavors,
        transform,
        conflict_free,
        recommended,
        recommendation,
        likely_ambiguous,
        ambiguity_reason,
    }
}

fn report_of<P: ParserBackend>(
    flavor: ParserFlavor,
    result: &Result<P, TableError>,
) -> FlavorReport {
    match result {
        Ok(parser) => FlavorReport {
            flavor,
            summary: Some(parser.summary()),
            conflicts: parser.conflicts().to_vec(),
            error: None,
        },
        Err(err) => FlavorReport {
            flavor,
            summary: None,
            conflicts: Vec::new(),
            error: Some(err.to_string()),
        },
    }
}

fn recommendation_text(recommended: Option<ParserFlavor>, conflict_free: &[ParserFlavor]) -> String {
    let Some(best) = recommended else {
        return "No tested flavor is conflict-free. The grammar likely needs rewriting; \
                see the per-flavor conflict lists."
            .to_string();
    };

    let mut text = match best {
        ParserFlavor::Lalr1 => {
            "Use LALR(1): conflict-free with merged-core tables, the standard \
             parser-generator choice."
        }
        ParserFlavor::Slr1 => {
            "Use SLR(1): conflict-free with the smallest construction for this grammar."
        }
        ParserFlavor::Clr1 => {
            "Use CLR(1): the grammar needs full canonical lookahead; expect larger tables."
        }
        ParserFlavor::Ll1 => {
            "Use LL(1) predictive parsing on the transformed grammar."
        }
    }
    .to_string();

    let others: Vec<&str> = conflict_free
        .iter()
        .filter(|&&f| f != best)
        .map(|f| f.name())
        .collect();
    if !others.is_empty() {
        text.push_str(&format!(" Also conflict-free: {}.", others.join(", ")));
    }
    text
}

fn ambiguity_verdict(flavors: &[FlavorReport]) -> (bool, Option<String>) {
    let Some(clr) = flavors.iter().find(|r| r.flavor == ParserFlavor::Clr1) else {
        return (false, None);
    };
    let reduce_reduce = clr
        .conflicts
        .iter()
        .filter(|c| c.is_reduce_reduce())
        .count();
    if reduce_reduce == 0 {
        return (false, None);
    }
    (
        true,
        Some(format!(
            "the canonical LR(1) table has {reduce_reduce} reduce/reduce conflict(s), \
             which typically indicates an ambiguous grammar"
        )),
    )
}
