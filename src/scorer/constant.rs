// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Every match scores the same.

use std::fmt;

use crate::docset::{DocId, DocIdIterator};
use crate::error::Result;

use super::Scorer;

/// Wraps any doc id cursor with a fixed score and a freq of 1.
pub struct ConstantScorer {
    inner: Box<dyn DocIdIterator>,
    score: f32,
}

impl ConstantScorer {
    pub fn new(inner: Box<dyn DocIdIterator>, score: f32) -> Self {
        Self { inner, score }
    }
}

impl fmt::Debug for ConstantScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantScorer")
            .field("doc", &self.inner.doc())
            .field("score", &self.score)
            .finish()
    }
}

impl DocIdIterator for ConstantScorer {
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

impl Scorer for ConstantScorer {
    fn score(&mut self) -> Result<f32> {
        Ok(self.score)
    }

    fn freq(&mut self) -> Result<u32> {
        Ok(1)
    }
}
