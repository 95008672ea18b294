// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Postings: per-term doc ids with frequencies and positions.

use std::fmt;
use std::sync::Arc;

use crate::docset::{Bits, DocId, DocIdIterator, NOT_STARTED, NO_MORE_DOCS};
use crate::error::{Error, Result};

/// A doc id cursor that also knows term frequency and positions.
pub trait Postings: DocIdIterator + fmt::Debug {
    /// Occurrences of the term in the current document.
    fn freq(&self) -> u32;

    /// Next position in the current document. Call at most `freq()` times.
    fn next_position(&mut self) -> Result<u32>;
}

impl<T: Postings + ?Sized> Postings for Box<T> {
    fn freq(&self) -> u32 {
        (**self).freq()
    }

    fn next_position(&mut self) -> Result<u32> {
        (**self).next_position()
    }
}

/// Immutable postings for one term.
#[derive(Debug, Default, Clone)]
pub struct PostingList {
    docs: Vec<DocId>,
    freqs: Vec<u32>,
    /// `positions[position_starts[i]..position_starts[i + 1]]` belong to `docs[i]`.
    positions: Vec<u32>,
    position_starts: Vec<usize>,
    has_positions: bool,
}

impl PostingList {
    pub fn new(has_positions: bool) -> Self {
        Self {
            position_starts: vec![0],
            has_positions,
            ..Self::default()
        }
    }

    /// Append a document. Ids must arrive in increasing order.
    pub fn push(&mut self, doc: DocId, positions: &[u32]) {
        if let Some(&last) = self.docs.last() {
            crate::contracts::check_doc_progress(last, doc);
        }
        self.docs.push(doc);
        self.freqs.push(positions.len() as u32);
        if self.has_positions {
            self.positions.extend_from_slice(positions);
        }
        self.position_starts.push(self.positions.len());
    }

    pub fn doc_freq(&self) -> u32 {
        self.docs.len() as u32
    }

    pub fn total_term_freq(&self) -> u64 {
        self.freqs.iter().map(|&f| u64::from(f)).sum()
    }

    pub fn docs(&self) -> &[DocId] {
        &self.docs
    }

    pub fn has_positions(&self) -> bool {
        self.has_positions
    }
}

/// Cursor over a shared [`PostingList`], honoring accept docs.
pub struct PostingsCursor {
    list: Arc<PostingList>,
    accept: Option<Arc<dyn Bits>>,
    /// Index into `list.docs`; `None` before the first move.
    index: Option<usize>,
    positions_read: usize,
}

impl PostingsCursor {
    pub fn new(list: Arc<PostingList>, accept: Option<Arc<dyn Bits>>) -> Self {
        Self {
            list,
            accept,
            index: None,
            positions_read: 0,
        }
    }

    fn doc_at(&self, index: usize) -> DocId {
        self.list.docs.get(index).copied().unwrap_or(NO_MORE_DOCS)
    }

    /// Settle on the first accepted doc at or after `index`.
    fn settle(&mut self, mut index: usize) -> DocId {
        if let Some(accept) = &self.accept {
            while index < self.list.docs.len() && !accept.get(self.list.docs[index] as usize) {
                index += 1;
            }
        }
        self.index = Some(index);
        self.positions_read = 0;
        self.doc_at(index)
    }

    fn next_index(&self) -> usize {
        self.index.map_or(0, |i| (i + 1).min(self.list.docs.len()))
    }
}

impl fmt::Debug for PostingsCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostingsCursor")
            .field("doc", &self.doc())
            .field("doc_freq", &self.list.doc_freq())
            .finish()
    }
}

impl DocIdIterator for PostingsCursor {
    fn doc(&self) -> DocId {
        self.index.map_or(NOT_STARTED, |i| self.doc_at(i))
    }

    fn next_doc(&mut self) -> Result<DocId> {
        let next = self.next_index();
        Ok(self.settle(next))
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let start = self.next_index();
        let offset = self.list.docs[start..].partition_point(|&d| d < target);
        Ok(self.settle(start + offset))
    }

    fn cost(&self) -> u64 {
        u64::from(self.list.doc_freq())
    }
}

impl Postings for PostingsCursor {
    fn freq(&self) -> u32 {
        self.index
            .and_then(|i| self.list.freqs.get(i).copied())
            .unwrap_or(0)
    }

    fn next_position(&mut self) -> Result<u32> {
        if !self.list.has_positions {
            return Err(Error::Unsupported("postings were indexed without positions"));
        }
        let index = self
            .index
            .filter(|&i| i < self.list.docs.len())
            .ok_or(Error::Unsupported("next_position on an unpositioned cursor"))?;
        let start = self.list.position_starts[index];
        let end = self.list.position_starts[index + 1];
        if start + self.positions_read >= end {
            return Err(Error::Unsupported("next_position called more than freq times"));
        }
        let position = self.list.positions[start + self.positions_read];
        self.positions_read += 1;
        Ok(position)
    }
}
