// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Document id cursors: the one abstraction everything else stands on.
//!
//! A [`DocIdIterator`] walks a strictly increasing sequence of document ids.
//! It starts unpositioned at `-1`, and once it runs dry it parks on
//! [`NO_MORE_DOCS`] forever. Scorers, postings and filters are all cursors of
//! this kind, which is what lets the combinators in [`crate::scorer`] treat a
//! term, a phrase and a nested boolean uniformly.
//!
//! # Contract
//!
//! | Call             | Returns                                  | Undefined when           |
//! |------------------|------------------------------------------|--------------------------|
//! | `doc()`          | current id, `-1`, or `NO_MORE_DOCS`      | never                    |
//! | `next_doc()`     | next strictly larger id                  | after `NO_MORE_DOCS`     |
//! | `advance(t)`     | first id `>= t` beyond the current one   | `t <= doc()`, exhausted  |
//! | `cost()`         | estimate of remaining matches            | never (heuristic only)   |
//!
//! Moving the cursor returns `Result` because a postings source may have to
//! read from storage, and those failures abort the query.

mod bits;
mod sorted;

pub use bits::{AcceptDocsIterator, Bits, BitSetIterator, FixedBitSet, MatchAllBits};
pub use sorted::SortedDocs;

use crate::error::Result;

/// Segment-local document id.
pub type DocId = i32;

/// Sentinel for an exhausted cursor.
pub const NO_MORE_DOCS: DocId = i32::MAX;

/// Sentinel for a cursor that has not moved yet.
pub const NOT_STARTED: DocId = -1;

/// A forward-only cursor over increasing document ids.
pub trait DocIdIterator {
    /// Current id: `-1` before the first move, `NO_MORE_DOCS` at the end.
    fn doc(&self) -> DocId;

    /// Move to the next id.
    fn next_doc(&mut self) -> Result<DocId>;

    /// Move to the first id at or beyond `target`.
    fn advance(&mut self, target: DocId) -> Result<DocId>;

    /// Upper-bound estimate of how many ids remain.
    fn cost(&self) -> u64;
}

impl<T: DocIdIterator + ?Sized> DocIdIterator for Box<T> {
    fn doc(&self) -> DocId {
        (**self).doc()
    }

    fn next_doc(&mut self) -> Result<DocId> {
        (**self).next_doc()
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        (**self).advance(target)
    }

    fn cost(&self) -> u64 {
        (**self).cost()
    }
}

/// `advance` in terms of `next_doc`, for cursors with nothing smarter to do.
pub fn slow_advance<I: DocIdIterator + ?Sized>(iter: &mut I, target: DocId) -> Result<DocId> {
    let mut doc = iter.doc();
    while doc < target {
        doc = iter.next_doc()?;
    }
    Ok(doc)
}

/// Drain a cursor into a vector. Mostly for tests and the CLI.
pub fn collect_docs<I: DocIdIterator + ?Sized>(iter: &mut I) -> Result<Vec<DocId>> {
    let mut docs = Vec::new();
    loop {
        let doc = iter.next_doc()?;
        if doc == NO_MORE_DOCS {
            return Ok(docs);
        }
        docs.push(doc);
    }
}

/// A cursor that matches nothing.
#[derive(Debug, Clone)]
pub struct EmptyIterator {
    doc: DocId,
}

impl EmptyIterator {
    pub fn new() -> Self {
        Self { doc: NOT_STARTED }
    }
}

impl Default for EmptyIterator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocIdIterator for EmptyIterator {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next_doc(&mut self) -> Result<DocId> {
        self.doc = NO_MORE_DOCS;
        Ok(self.doc)
    }

    fn advance(&mut self, _target: DocId) -> Result<DocId> {
        self.doc = NO_MORE_DOCS;
        Ok(self.doc)
    }

    fn cost(&self) -> u64 {
        0
    }
}

/// Every id in `0..max_doc`.
#[derive(Debug, Clone)]
pub struct AllDocsIterator {
    doc: DocId,
    max_doc: DocId,
}

impl AllDocsIterator {
    pub fn new(max_doc: DocId) -> Self {
        Self {
            doc: NOT_STARTED,
            max_doc,
        }
    }
}

impl DocIdIterator for AllDocsIterator {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next_doc(&mut self) -> Result<DocId> {
        self.advance(self.doc.saturating_add(1))
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        self.doc = if target >= self.max_doc { NO_MORE_DOCS } else { target };
        Ok(self.doc)
    }

    fn cost(&self) -> u64 {
        self.max_doc.max(0) as u64
    }
}
