// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Boolean compilation: how `must`, `should` and `must_not` clauses become
//! one scorer per segment.
//!
//! # Shapes
//!
//! | Clauses present           | Scorer                                        |
//! |---------------------------|-----------------------------------------------|
//! | must only                 | `Conjunction` (or the one clause, scaled)     |
//! | should only               | `Disjunction` with `min_should_match`         |
//! | must + should             | `ReqOpt`, or `Conjunction` when a minimum applies |
//! | any + must_not            | the above wrapped in `ReqExcl`                |
//!
//! Before choosing, clauses with no scorer in the segment are dropped; a
//! missing required clause drops the whole boolean. When exactly
//! `min_should_match` optional clauses are left, they are all required.
//!
//! # Coordination
//!
//! `coord(overlap, max_coord)` rewards docs matching more of the
//! `max_coord` non-prohibited clauses. The factors come from the
//! [`Similarity`]; `disable_coord` pins them to 1.

use std::sync::Arc;

use super::query::{BooleanQuery, Occur};
use super::weight::Weight;
use super::{Explanation, Searcher};
use crate::docset::{Bits, DocId};
use crate::error::Result;
use crate::index::LeafContext;
use crate::scorer::{
    ConjunctionScorer, DisjunctionSumScorer, OptionalCoord, ReqExclScorer, ReqOptScorer,
    ScaledScorer, ScorerNode, Similarity,
};

#[derive(Debug)]
struct Clause {
    weight: Weight,
    occur: Occur,
    description: String,
}

#[derive(Debug)]
pub struct BooleanWeight {
    clauses: Vec<Clause>,
    similarity: Arc<dyn Similarity>,
    /// Non-prohibited clauses.
    max_coord: usize,
    min_should_match: usize,
    disable_coord: bool,
    boost: f32,
}

impl BooleanWeight {
    pub(crate) fn new(query: &BooleanQuery, searcher: &Searcher<'_>) -> Result<Self> {
        let mut clauses = Vec::with_capacity(query.clause_count());
        for (clause, occur) in query.clauses() {
            clauses.push(Clause {
                weight: Weight::create(clause, searcher)?,
                occur,
                description: clause.to_string(),
            });
        }
        let max_coord = clauses.iter().filter(|c| c.occur != Occur::MustNot).count();
        Ok(Self {
            clauses,
            similarity: Arc::clone(searcher.similarity()),
            max_coord,
            min_should_match: query.min_should_match,
            disable_coord: query.disable_coord,
            boost: query.boost,
        })
    }

    pub(crate) fn value_for_normalization(&self) -> f32 {
        let sum: f32 = self
            .clauses
            .iter()
            .filter(|c| c.occur != Occur::MustNot)
            .map(|c| c.weight.value_for_normalization())
            .sum();
        sum * self.boost * self.boost
    }

    pub(crate) fn normalize(&mut self, query_norm: f32, top_level_boost: f32) {
        let boost = top_level_boost * self.boost;
        for clause in &mut self.clauses {
            clause.weight.normalize(query_norm, boost);
        }
    }

    /// Coordination factor for `overlap` matching clauses out of `max`.
    pub fn coord(&self, overlap: usize, max: usize) -> f32 {
        if overlap == 0 {
            0.0
        } else if max == 1 {
            1.0
        } else {
            self.similarity.coord(overlap, max)
        }
    }

    /// `coords()[n]` is the factor for `n` matching clauses.
    fn coords(&self) -> Arc<[f32]> {
        (0..=self.max_coord)
            .map(|n| self.coord(n, self.max_coord))
            .collect::<Vec<_>>()
            .into()
    }

    pub(crate) fn scorer(
        &self,
        leaf: LeafContext<'_>,
        accept_docs: Option<Arc<dyn Bits>>,
    ) -> Result<Option<ScorerNode>> {
        let mut required = Vec::new();
        let mut optional = Vec::new();
        let mut prohibited = Vec::new();
        for clause in &self.clauses {
            match (clause.weight.scorer(leaf, accept_docs.clone())?, clause.occur) {
                (None, Occur::Must) => return Ok(None),
                (None, _) => {}
                (Some(s), Occur::Must) => required.push(s),
                (Some(s), Occur::Should) => optional.push(s),
                (Some(s), Occur::MustNot) => prohibited.push(s),
            }
        }

        let mut min_should_match = self.min_should_match;
        if optional.len() == min_should_match {
            required.append(&mut optional);
            min_should_match = 0;
        }
        if required.is_empty() && optional.is_empty() {
            return Ok(None);
        }
        if optional.len() < min_should_match {
            return Ok(None);
        }

        if optional.is_empty() {
            let req = self.req(required, self.disable_coord)?;
            return Ok(Some(excl(req, prohibited)?));
        }
        if required.is_empty() {
            let opt = self.opt(optional, min_should_match, self.disable_coord)?;
            return Ok(Some(excl(opt, prohibited)?));
        }

        let required_count = required.len();
        let optional_count = optional.len();
        let req = excl(self.req(required, true)?, prohibited)?;
        let opt = self.opt(optional, min_should_match, true)?;
        Ok(Some(if self.disable_coord {
            if min_should_match > 0 {
                ScorerNode::Conjunction(ConjunctionScorer::new(vec![req, opt], 1.0)?)
            } else {
                ScorerNode::ReqOpt(ReqOptScorer::new(req, opt))
            }
        } else if optional_count == 1 {
            if min_should_match > 0 {
                let coord = self.coord(required_count + 1, self.max_coord);
                ScorerNode::Conjunction(ConjunctionScorer::new(vec![req, opt], coord)?)
            } else {
                ScorerNode::ReqOpt(ReqOptScorer::new(req, opt).with_coord(OptionalCoord::Table {
                    coords: self.coords(),
                    required: required_count,
                    counted: false,
                }))
            }
        } else if min_should_match > 0 {
            ScorerNode::Conjunction(ConjunctionScorer::coordinating(req, required_count, opt, self.coords())?)
        } else {
            ScorerNode::ReqOpt(ReqOptScorer::new(req, opt).with_coord(OptionalCoord::Table {
                coords: self.coords(),
                required: required_count,
                counted: true,
            }))
        }))
    }

    fn req(&self, mut required: Vec<ScorerNode>, disable_coord: bool) -> Result<ScorerNode> {
        if required.len() == 1 {
            if let Some(only) = required.pop() {
                return Ok(if disable_coord || self.max_coord == 1 {
                    only
                } else {
                    ScorerNode::Scaled(ScaledScorer::new(only, self.coord(1, self.max_coord)))
                });
            }
        }
        let coord = if disable_coord {
            1.0
        } else {
            self.coord(required.len(), self.max_coord)
        };
        Ok(ScorerNode::Conjunction(ConjunctionScorer::new(required, coord)?))
    }

    fn opt(&self, mut optional: Vec<ScorerNode>, min_should_match: usize, disable_coord: bool) -> Result<ScorerNode> {
        if optional.len() == 1 {
            if let Some(only) = optional.pop() {
                return Ok(if !disable_coord && self.max_coord > 1 {
                    ScorerNode::Scaled(ScaledScorer::new(only, self.coord(1, self.max_coord)))
                } else {
                    only
                });
            }
        }
        let coords = if disable_coord {
            vec![1.0; optional.len() + 1].into()
        } else {
            self.coords()
        };
        Ok(ScorerNode::Disjunction(
            DisjunctionSumScorer::new(optional, coords)?.with_min_should_match(min_should_match),
        ))
    }

    pub(crate) fn explain(&self, leaf: LeafContext<'_>, doc: DocId) -> Result<Explanation> {
        let mut details = Vec::new();
        let mut sum = 0.0f32;
        let mut coord = 0;
        let mut fail = false;
        let mut should_matched = 0;
        for clause in &self.clauses {
            let e = clause.weight.explain(leaf, doc)?;
            if e.is_match() {
                if clause.occur == Occur::MustNot {
                    details.push(Explanation::no_match(
                        format!("match on prohibited clause ({})", clause.description),
                        vec![e],
                    ));
                    fail = true;
                } else {
                    sum += e.value;
                    coord += 1;
                    details.push(e);
                }
                if clause.occur == Occur::Should {
                    should_matched += 1;
                }
            } else if clause.occur == Occur::Must {
                details.push(Explanation::no_match(
                    format!("no match on required clause ({})", clause.description),
                    vec![e],
                ));
                fail = true;
            }
        }
        if fail {
            return Ok(Explanation::no_match(
                "Failure to meet condition(s) of required/prohibited clause(s)",
                details,
            ));
        }
        if should_matched < self.min_should_match {
            return Ok(Explanation::no_match(
                format!(
                    "Failure to match minimum number of optional clauses: {}",
                    self.min_should_match
                ),
                details,
            ));
        }
        let sum_explain = Explanation {
            matched: coord > 0,
            value: sum,
            description: "sum of:".to_string(),
            details,
        };
        let factor = if self.disable_coord {
            1.0
        } else {
            self.coord(coord, self.max_coord)
        };
        if factor == 1.0 || coord == 0 {
            return Ok(sum_explain);
        }
        Ok(Explanation::matched(
            sum * factor,
            "product of:",
            vec![
                sum_explain,
                Explanation::matched(factor, format!("coord({}/{})", coord, self.max_coord), Vec::new()),
            ],
        ))
    }
}

/// Wrap `main` so docs any prohibited scorer matches are skipped.
fn excl(main: ScorerNode, mut prohibited: Vec<ScorerNode>) -> Result<ScorerNode> {
    let excluded = match prohibited.len() {
        0 => return Ok(main),
        1 => prohibited.pop(),
        n => Some(ScorerNode::Disjunction(DisjunctionSumScorer::new(
            prohibited,
            vec![1.0; n + 1].into(),
        )?)),
    };
    Ok(ScorerNode::ReqExcl(ReqExclScorer::new(main, excluded)))
}
