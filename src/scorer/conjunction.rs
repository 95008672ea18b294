// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! AND: docs every child matches.
//!
//! Children are sorted by cost once. The cheapest one leads; every other
//! child is only ever advanced to a candidate the lead produced, and a child
//! that overshoots drags the lead forward (leapfrog). The number of calls is
//! bounded by the sparsest child, not the densest.
//!
//! # Coordination
//!
//! A plain conjunction multiplies its sum by one fixed `coord`. When a
//! boolean has required clauses and a `min_should_match` over its optional
//! ones, the optional disjunction becomes one more child and the factor
//! depends on how many optional clauses matched the doc:
//! `coords[required + optional.freq()]`.

use std::sync::Arc;

use crate::docset::{DocId, DocIdIterator, NO_MORE_DOCS};
use crate::error::{Error, Result};

use super::{Scorer, ScorerNode};

#[derive(Debug)]
enum Coord {
    Fixed(f32),
    /// `optional` indexes into `children` after the cost sort.
    Table {
        coords: Arc<[f32]>,
        required: usize,
        optional: usize,
    },
}

#[derive(Debug)]
pub struct ConjunctionScorer {
    /// Sorted by ascending cost; `children[0]` leads.
    children: Vec<ScorerNode>,
    coord: Coord,
}

impl ConjunctionScorer {
    pub fn new(children: Vec<ScorerNode>, coord: f32) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::InvalidArgument("conjunction needs at least one child".into()));
        }
        let mut children = children;
        children.sort_by_key(|c| c.cost());
        Ok(Self {
            children,
            coord: Coord::Fixed(coord),
        })
    }

    /// A required scorer standing for `required_count` clauses plus a
    /// disjunction of optional ones, scored with
    /// `coords[required_count + optional.freq()]`.
    pub fn coordinating(
        required: ScorerNode,
        required_count: usize,
        optional: ScorerNode,
        coords: Arc<[f32]>,
    ) -> Result<Self> {
        if coords.is_empty() {
            return Err(Error::InvalidArgument("coordination table is empty".into()));
        }
        let optional_first = optional.cost() < required.cost();
        let children = if optional_first {
            vec![optional, required]
        } else {
            vec![required, optional]
        };
        Ok(Self {
            children,
            coord: Coord::Table {
                coords,
                required: required_count,
                optional: usize::from(!optional_first),
            },
        })
    }

    pub fn children(&self) -> &[ScorerNode] {
        &self.children
    }

    fn do_next(&mut self, mut doc: DocId) -> Result<DocId> {
        let Some((lead, others)) = self.children.split_first_mut() else {
            return Ok(NO_MORE_DOCS);
        };
        'candidate: loop {
            if doc == NO_MORE_DOCS {
                return Ok(doc);
            }
            for other in others.iter_mut() {
                if other.doc() < doc {
                    let next = other.advance(doc)?;
                    if next > doc {
                        doc = lead.advance(next)?;
                        continue 'candidate;
                    }
                }
            }
            crate::contracts::check_conjunction_agreement(doc, others.iter().map(|o| o.doc()));
            return Ok(doc);
        }
    }
}

impl DocIdIterator for ConjunctionScorer {
    fn doc(&self) -> DocId {
        self.children[0].doc()
    }

    fn next_doc(&mut self) -> Result<DocId> {
        let doc = self.children[0].next_doc()?;
        self.do_next(doc)
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let doc = self.children[0].advance(target)?;
        self.do_next(doc)
    }

    fn cost(&self) -> u64 {
        self.children[0].cost()
    }
}

impl Scorer for ConjunctionScorer {
    fn score(&mut self) -> Result<f32> {
        let mut sum = 0.0f64;
        for child in &mut self.children {
            sum += child.score()? as f64;
        }
        let factor = match &self.coord {
            Coord::Fixed(coord) => *coord,
            Coord::Table {
                coords,
                required,
                optional,
            } => {
                let matched = *required + self.children[*optional].freq()? as usize;
                coords[matched.min(coords.len() - 1)]
            }
        };
        Ok((sum * factor as f64) as f32)
    }

    fn freq(&mut self) -> Result<u32> {
        Ok(self.children.len() as u32)
    }
}
