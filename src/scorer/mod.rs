// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scorers: doc id iterators that can also say how well the current doc matches.
//!
//! A query compiles, per segment, into a tree of scorers. Leaves read postings;
//! inner nodes combine their children's iteration and scores:
//!
//! ```text
//!                 ReqExcl
//!                /       \
//!           ReqOpt        Term(spam)        +title:rust +body:async -body:spam
//!          /      \                          body:tokio
//!   Conjunction    Term(tokio)
//!    /       \
//! Term(rust) Term(async)
//! ```
//!
//! | Scorer         | Matches                        | Score                          |
//! |----------------|--------------------------------|--------------------------------|
//! | `Conjunction`  | docs in every child            | sum × coord                    |
//! | `Disjunction`  | docs in any child              | sum × coord[matchers]          |
//! | `ReqExcl`      | required minus excluded        | required                       |
//! | `ReqOpt`       | required                       | required + optional if on doc  |
//! | `Scaled`       | child                          | child × factor                 |
//! | `ExactPhrase`  | docs with the terms adjacent   | tf(phrase freq)                |
//! | `SloppyPhrase` | docs with the terms within slop| tf(Σ sloppy freq)              |
//!
//! The tree is a closed enum, [`ScorerNode`], so walking it for summaries or
//! explanations is an exhaustive `match`. `Leaf` admits anything else that
//! implements [`Scorer`].
//!
//! Every scorer follows the [`DocIdIterator`] contract: doc ids strictly
//! increase and end at [`NO_MORE_DOCS`](crate::docset::NO_MORE_DOCS).
//! `score()` and `freq()` are only meaningful on a real doc.

mod conjunction;
mod constant;
mod disjunction;
mod phrase;
mod req_excl;
mod req_opt;
mod scaled;
mod similarity;
mod term;

pub use conjunction::ConjunctionScorer;
pub use constant::ConstantScorer;
pub use disjunction::DisjunctionSumScorer;
pub use phrase::{ExactPhraseScorer, PhrasePositions, SloppyPhraseScorer};
pub use req_excl::ReqExclScorer;
pub use req_opt::{OptionalCoord, ReqOptScorer};
pub use scaled::ScaledScorer;
pub use similarity::{ClassicSimilarity, SimScorer, SimWeight, Similarity};
pub use term::TermScorer;

use std::fmt::Write as _;

use crate::docset::{DocId, DocIdIterator};
use crate::error::Result;

/// A [`DocIdIterator`] that scores the doc it is on.
pub trait Scorer: DocIdIterator {
    fn score(&mut self) -> Result<f32>;

    /// How many times the current doc matched; meaning depends on the scorer.
    fn freq(&mut self) -> Result<u32>;
}

impl<T: Scorer + ?Sized> Scorer for Box<T> {
    fn score(&mut self) -> Result<f32> {
        (**self).score()
    }

    fn freq(&mut self) -> Result<u32> {
        (**self).freq()
    }
}

/// A node of a compiled scorer tree.
#[derive(Debug)]
pub enum ScorerNode {
    Term(TermScorer),
    Constant(ConstantScorer),
    Conjunction(ConjunctionScorer),
    Disjunction(DisjunctionSumScorer),
    ReqExcl(ReqExclScorer),
    ReqOpt(ReqOptScorer),
    Scaled(ScaledScorer),
    ExactPhrase(ExactPhraseScorer),
    SloppyPhrase(SloppyPhraseScorer),
    Leaf(Box<dyn DebugScorer>),
}

/// Object-safe bound for [`ScorerNode::Leaf`].
pub trait DebugScorer: Scorer + std::fmt::Debug {}

impl<T: Scorer + std::fmt::Debug> DebugScorer for T {}

macro_rules! dispatch {
    ($node:expr, $s:ident => $body:expr) => {
        match $node {
            ScorerNode::Term($s) => $body,
            ScorerNode::Constant($s) => $body,
            ScorerNode::Conjunction($s) => $body,
            ScorerNode::Disjunction($s) => $body,
            ScorerNode::ReqExcl($s) => $body,
            ScorerNode::ReqOpt($s) => $body,
            ScorerNode::Scaled($s) => $body,
            ScorerNode::ExactPhrase($s) => $body,
            ScorerNode::SloppyPhrase($s) => $body,
            ScorerNode::Leaf($s) => $body,
        }
    };
}

impl DocIdIterator for ScorerNode {
    fn doc(&self) -> DocId {
        dispatch!(self, s => s.doc())
    }

    fn next_doc(&mut self) -> Result<DocId> {
        dispatch!(self, s => s.next_doc())
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        dispatch!(self, s => s.advance(target))
    }

    fn cost(&self) -> u64 {
        dispatch!(self, s => s.cost())
    }
}

impl Scorer for ScorerNode {
    fn score(&mut self) -> Result<f32> {
        dispatch!(self, s => s.score())
    }

    fn freq(&mut self) -> Result<u32> {
        dispatch!(self, s => s.freq())
    }
}

impl ScorerNode {
    pub fn name(&self) -> &'static str {
        match self {
            ScorerNode::Term(_) => "Term",
            ScorerNode::Constant(_) => "Constant",
            ScorerNode::Conjunction(_) => "Conjunction",
            ScorerNode::Disjunction(_) => "Disjunction",
            ScorerNode::ReqExcl(_) => "ReqExcl",
            ScorerNode::ReqOpt(_) => "ReqOpt",
            ScorerNode::Scaled(_) => "Scaled",
            ScorerNode::ExactPhrase(_) => "ExactPhrase",
            ScorerNode::SloppyPhrase(_) => "SloppyPhrase",
            ScorerNode::Leaf(_) => "Leaf",
        }
    }

    pub fn children(&self) -> Vec<&ScorerNode> {
        match self {
            ScorerNode::Conjunction(s) => s.children().iter().collect(),
            ScorerNode::Disjunction(s) => s.children().iter().collect(),
            ScorerNode::ReqExcl(s) => std::iter::once(s.required()).chain(s.excluded()).collect(),
            ScorerNode::ReqOpt(s) => std::iter::once(s.required()).chain(s.optional()).collect(),
            ScorerNode::Scaled(s) => vec![s.inner()],
            ScorerNode::Term(_)
            | ScorerNode::Constant(_)
            | ScorerNode::ExactPhrase(_)
            | ScorerNode::SloppyPhrase(_)
            | ScorerNode::Leaf(_) => Vec::new(),
        }
    }

    /// Indented outline of the tree with each node's cost.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        self.write_summary(&mut out, 0);
        out
    }

    fn write_summary(&self, out: &mut String, depth: usize) {
        let _ = writeln!(out, "{:indent$}{} (cost {})", "", self.name(), self.cost(), indent = depth * 2);
        for child in self.children() {
            child.write_summary(out, depth + 1);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::docs;
    use super::*;

    #[test]
    fn test_summary_walks_the_tree() {
        let conj = ConjunctionScorer::new(vec![docs(&[1, 2, 3], 1.0), docs(&[2], 1.0)], 1.0).unwrap();
        let node = ScorerNode::ReqExcl(ReqExclScorer::new(
            ScorerNode::Conjunction(conj),
            Some(docs(&[3], 1.0)),
        ));
        let summary = node.summary();
        assert_eq!(
            summary,
            "ReqExcl (cost 1)\n  Conjunction (cost 1)\n    Constant (cost 1)\n    Constant (cost 3)\n  Constant (cost 1)\n"
        );
    }
}
