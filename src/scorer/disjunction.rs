// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! OR: docs any child matches, scored by how many did.
//!
//! Children live in a binary min-heap keyed by their current doc. Moving on
//! from doc `d` advances every child sitting on `d` and re-sifts it; a child
//! that runs dry leaves the heap. The matchers of the new top doc are found
//! by walking only the heap nodes that share it.
//!
//! ```text
//!          [3: b]              top doc 3, matchers {b, c}
//!         /      \
//!     [3: c]    [7: a]         a is not visited below 7
//! ```
//!
//! Score is `sum(matcher scores) × coord[matchers]`. With
//! `min_should_match > 1`, docs with fewer matchers are skipped.

use std::sync::Arc;

use crate::docset::{DocId, DocIdIterator, NOT_STARTED, NO_MORE_DOCS};
use crate::error::{Error, Result};

use super::{Scorer, ScorerNode};

#[derive(Debug)]
pub struct DisjunctionSumScorer {
    children: Vec<ScorerNode>,
    /// Indices into `children`, heap-ordered by `children[i].doc()`.
    heap: Vec<usize>,
    /// Children positioned on `doc`, filled by `count_matches`.
    matching: Vec<usize>,
    doc: DocId,
    coords: Arc<[f32]>,
    min_should_match: usize,
}

impl DisjunctionSumScorer {
    /// `coords[n]` scales a doc matched by `n` children.
    pub fn new(children: Vec<ScorerNode>, coords: Arc<[f32]>) -> Result<Self> {
        if children.len() < 2 {
            return Err(Error::TooFewClauses(children.len()));
        }
        let heap = (0..children.len()).collect();
        let mut scorer = Self {
            children,
            heap,
            matching: Vec::new(),
            doc: NOT_STARTED,
            coords,
            min_should_match: 1,
        };
        for i in (0..scorer.heap.len() / 2).rev() {
            scorer.sift_down(i);
        }
        Ok(scorer)
    }

    /// Skip docs matched by fewer than `n` children.
    pub fn with_min_should_match(mut self, n: usize) -> Self {
        self.min_should_match = n.max(1);
        self
    }

    pub fn children(&self) -> &[ScorerNode] {
        &self.children
    }

    /// Number of children on the current doc.
    pub fn nr_matchers(&self) -> usize {
        self.matching.len()
    }

    fn top_doc(&self) -> DocId {
        self.heap.first().map_or(NO_MORE_DOCS, |&i| self.children[i].doc())
    }

    fn key(&self, slot: usize) -> DocId {
        self.children[self.heap[slot]].doc()
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            if left >= len {
                return;
            }
            let right = left + 1;
            let smallest = if right < len && self.key(right) < self.key(left) {
                right
            } else {
                left
            };
            if self.key(smallest) >= self.key(slot) {
                return;
            }
            self.heap.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn remove_root(&mut self) {
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        self.heap.pop();
        self.sift_down(0);
    }

    /// Re-sift the root after its child moved; drop it if exhausted.
    fn adjust_root(&mut self, doc: DocId) {
        if doc == NO_MORE_DOCS {
            self.remove_root();
        } else {
            self.sift_down(0);
        }
    }

    fn count_matches(&mut self) {
        self.matching.clear();
        let mut stack = vec![0];
        while let Some(slot) = stack.pop() {
            if slot < self.heap.len() && self.key(slot) == self.doc {
                self.matching.push(self.heap[slot]);
                stack.push(2 * slot + 1);
                stack.push(2 * slot + 2);
            }
        }
    }

    /// Settle on the heap's top doc, or move past it when too few match.
    fn settle(&mut self) -> Result<DocId> {
        loop {
            self.doc = self.top_doc();
            if self.doc == NO_MORE_DOCS {
                self.matching.clear();
                return Ok(self.doc);
            }
            self.count_matches();
            if self.matching.len() >= self.min_should_match {
                return Ok(self.doc);
            }
            self.step_past_current()?;
        }
    }

    fn step_past_current(&mut self) -> Result<()> {
        while !self.heap.is_empty() && self.top_doc() == self.doc {
            let next = self.children[self.heap[0]].next_doc()?;
            self.adjust_root(next);
        }
        Ok(())
    }
}

impl DocIdIterator for DisjunctionSumScorer {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next_doc(&mut self) -> Result<DocId> {
        if self.doc == NO_MORE_DOCS {
            return Ok(self.doc);
        }
        if self.doc == NOT_STARTED {
            // every child is still unpositioned
            while !self.heap.is_empty() && self.top_doc() == NOT_STARTED {
                let next = self.children[self.heap[0]].next_doc()?;
                self.adjust_root(next);
            }
        } else {
            self.step_past_current()?;
        }
        self.settle()
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        while !self.heap.is_empty() && self.top_doc() < target {
            let next = self.children[self.heap[0]].advance(target)?;
            self.adjust_root(next);
        }
        self.settle()
    }

    fn cost(&self) -> u64 {
        self.children.iter().map(|c| c.cost()).sum()
    }
}

impl Scorer for DisjunctionSumScorer {
    fn score(&mut self) -> Result<f32> {
        let mut sum = 0.0f64;
        for &i in &self.matching {
            sum += self.children[i].score()? as f64;
        }
        let n = self.matching.len();
        let coord = self
            .coords
            .get(n)
            .or_else(|| self.coords.last())
            .copied()
            .unwrap_or(1.0);
        Ok((sum * coord as f64) as f32)
    }

    fn freq(&mut self) -> Result<u32> {
        Ok(self.matching.len() as u32)
    }
}
