// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Cursor over a sorted, shared id list with galloping `advance`.

use std::sync::Arc;

use super::{DocId, DocIdIterator, NOT_STARTED, NO_MORE_DOCS};
use crate::error::Result;

/// Doc ids held in a sorted vector.
///
/// `advance` gallops (1, 2, 4, ... steps) and then binary searches the
/// bracketed window, so short skips stay cheap and long skips are logarithmic.
#[derive(Debug, Clone)]
pub struct SortedDocs {
    docs: Arc<[DocId]>,
    /// Index of the current doc; `None` before the first move.
    pos: Option<usize>,
}

impl SortedDocs {
    /// Build from ids that are already strictly increasing.
    pub fn new(docs: impl Into<Arc<[DocId]>>) -> Self {
        let docs = docs.into();
        crate::contracts::check_strictly_increasing(&docs);
        Self { docs, pos: None }
    }

    /// Build from arbitrary ids: sorts and deduplicates first.
    pub fn from_unsorted(mut docs: Vec<DocId>) -> Self {
        docs.sort_unstable();
        docs.dedup();
        Self::new(docs)
    }

    fn doc_at(&self, pos: usize) -> DocId {
        self.docs.get(pos).copied().unwrap_or(NO_MORE_DOCS)
    }
}

impl DocIdIterator for SortedDocs {
    fn doc(&self) -> DocId {
        match self.pos {
            None => NOT_STARTED,
            Some(pos) => self.doc_at(pos),
        }
    }

    fn next_doc(&mut self) -> Result<DocId> {
        let next = self.pos.map_or(0, |p| (p + 1).min(self.docs.len()));
        self.pos = Some(next);
        Ok(self.doc_at(next))
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let start = self.pos.map_or(0, |p| (p + 1).min(self.docs.len()));
        let remaining = &self.docs[start..];

        // Gallop to bracket the target, then binary search inside the bracket.
        let mut bound = 1;
        while bound < remaining.len() && remaining[bound] < target {
            bound *= 2;
        }
        let lo = bound / 2;
        let hi = (bound + 1).min(remaining.len());
        let offset = match remaining[lo..hi].binary_search(&target) {
            Ok(i) | Err(i) => lo + i,
        };

        self.pos = Some(start + offset);
        Ok(self.doc_at(start + offset))
    }

    fn cost(&self) -> u64 {
        self.docs.len() as u64
    }
}
