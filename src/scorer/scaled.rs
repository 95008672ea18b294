// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A child scorer multiplied by a constant factor.
//!
//! A boolean query that compiles to a single clause still owes that clause
//! its coordination factor, `coord(1, max_coord)`. Wrapping is cheaper than
//! a one-child conjunction.

use crate::docset::{DocId, DocIdIterator};
use crate::error::Result;

use super::{Scorer, ScorerNode};

#[derive(Debug)]
pub struct ScaledScorer {
    inner: Box<ScorerNode>,
    factor: f32,
}

impl ScaledScorer {
    pub fn new(inner: ScorerNode, factor: f32) -> Self {
        Self {
            inner: Box::new(inner),
            factor,
        }
    }

    pub fn inner(&self) -> &ScorerNode {
        &self.inner
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }
}

impl DocIdIterator for ScaledScorer {
    fn doc(&self) -> DocId {
        self.inner.doc()
    }

    fn next_doc(&mut self) -> Result<DocId> {
        self.inner.next_doc()
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        self.inner.advance(target)
    }

    fn cost(&self) -> u64 {
        self.inner.cost()
    }
}

impl Scorer for ScaledScorer {
    fn score(&mut self) -> Result<f32> {
        Ok(self.inner.score()? * self.factor)
    }

    fn freq(&mut self) -> Result<u32> {
        self.inner.freq()
    }
}
