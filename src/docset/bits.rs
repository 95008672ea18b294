// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bitsets and the accept-docs predicate.
//!
//! Live documents, filter results and constant-score multi-term matches are
//! all plain bitsets over `0..max_doc`. [`Bits`] is the read side every
//! postings source consults; [`FixedBitSet`] is the one concrete set we need.

use std::fmt;

use super::{DocId, DocIdIterator, NOT_STARTED, NO_MORE_DOCS};
use crate::error::Result;

/// Random-access membership test over document ids.
pub trait Bits: Send + Sync + fmt::Debug {
    fn get(&self, index: usize) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Bits + ?Sized> Bits for std::sync::Arc<T> {
    fn get(&self, index: usize) -> bool {
        (**self).get(index)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// Accepts every id below `len`.
#[derive(Debug, Clone, Copy)]
pub struct MatchAllBits {
    len: usize,
}

impl MatchAllBits {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Bits for MatchAllBits {
    fn get(&self, index: usize) -> bool {
        index < self.len
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Fixed-length bitset backed by `u64` words.
#[derive(Clone, PartialEq, Eq)]
pub struct FixedBitSet {
    words: Vec<u64>,
    len: usize,
}

impl FixedBitSet {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// A set with every bit turned on.
    pub fn full(len: usize) -> Self {
        let mut set = Self::new(len);
        for i in 0..len {
            set.set(i);
        }
        set
    }

    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len, "bit {} out of range {}", index, self.len);
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.len, "bit {} out of range {}", index, self.len);
        self.words[index / 64] &= !(1u64 << (index % 64));
    }

    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// First set bit at or after `from`.
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        if from >= self.len {
            return None;
        }
        let mut word_index = from / 64;
        let mut word = self.words[word_index] & (u64::MAX << (from % 64));
        loop {
            if word != 0 {
                let bit = word_index * 64 + word.trailing_zeros() as usize;
                return (bit < self.len).then_some(bit);
            }
            word_index += 1;
            if word_index >= self.words.len() {
                return None;
            }
            word = self.words[word_index];
        }
    }

    /// Set every bit the cursor visits.
    pub fn or_iterator<I: DocIdIterator + ?Sized>(&mut self, iter: &mut I) -> Result<()> {
        loop {
            let doc = iter.next_doc()?;
            if doc == NO_MORE_DOCS {
                return Ok(());
            }
            self.set(doc as usize);
        }
    }
}

impl Bits for FixedBitSet {
    fn get(&self, index: usize) -> bool {
        index < self.len && self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl fmt::Debug for FixedBitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedBitSet")
            .field("len", &self.len)
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

/// Cursor over the set bits of a [`FixedBitSet`].
#[derive(Debug)]
pub struct BitSetIterator {
    bits: FixedBitSet,
    doc: DocId,
    cost: u64,
}

impl BitSetIterator {
    pub fn new(bits: FixedBitSet) -> Self {
        let cost = bits.cardinality() as u64;
        Self {
            bits,
            doc: NOT_STARTED,
            cost,
        }
    }
}

impl DocIdIterator for BitSetIterator {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next_doc(&mut self) -> Result<DocId> {
        self.advance(self.doc.saturating_add(1))
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        self.doc = self
            .bits
            .next_set_bit(target.max(0) as usize)
            .map_or(NO_MORE_DOCS, |bit| bit as DocId);
        Ok(self.doc)
    }

    fn cost(&self) -> u64 {
        self.cost
    }
}

/// Wraps a cursor and skips ids the accept bitset rejects.
#[derive(Debug)]
pub struct AcceptDocsIterator<I, B> {
    inner: I,
    accept: B,
}

impl<I: DocIdIterator, B: Bits> AcceptDocsIterator<I, B> {
    pub fn new(inner: I, accept: B) -> Self {
        Self { inner, accept }
    }

    fn skip_rejected(&mut self, mut doc: DocId) -> Result<DocId> {
        while doc != NO_MORE_DOCS && !self.accept.get(doc as usize) {
            doc = self.inner.next_doc()?;
        }
        Ok(doc)
    }
}

impl<I: DocIdIterator, B: Bits> DocIdIterator for AcceptDocsIterator<I, B> {
    fn doc(&self) -> DocId {
        self.inner.doc()
    }

    fn next_doc(&mut self) -> Result<DocId> {
        let doc = self.inner.next_doc()?;
        self.skip_rejected(doc)
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let doc = self.inner.advance(target)?;
        self.skip_rejected(doc)
    }

    fn cost(&self) -> u64 {
        self.inner.cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docset::{collect_docs, SortedDocs};

    #[test]
    fn test_set_get_clear() {
        let mut bits = FixedBitSet::new(130);
        bits.set(0);
        bits.set(64);
        bits.set(129);
        assert!(bits.get(64));
        assert!(!bits.get(65));
        assert!(!bits.get(500));
        assert_eq!(bits.cardinality(), 3);
        bits.clear(64);
        assert_eq!(bits.cardinality(), 2);
    }

    #[test]
    fn test_next_set_bit_crosses_words() {
        let mut bits = FixedBitSet::new(200);
        bits.set(3);
        bits.set(190);
        assert_eq!(bits.next_set_bit(0), Some(3));
        assert_eq!(bits.next_set_bit(4), Some(190));
        assert_eq!(bits.next_set_bit(191), None);
    }

    #[test]
    fn test_bitset_iterator() {
        let mut bits = FixedBitSet::new(100);
        for doc in [5, 6, 70, 99] {
            bits.set(doc);
        }
        let mut it = BitSetIterator::new(bits);
        assert_eq!(it.cost(), 4);
        assert_eq!(it.advance(7).unwrap(), 70);
        assert_eq!(it.next_doc().unwrap(), 99);
        assert_eq!(it.next_doc().unwrap(), NO_MORE_DOCS);
    }

    #[test]
    fn test_accept_docs_filters() {
        let mut live = FixedBitSet::full(10);
        live.clear(3);
        live.clear(4);
        let inner = SortedDocs::new(vec![1, 3, 4, 8]);
        let mut it = AcceptDocsIterator::new(inner, live);
        assert_eq!(collect_docs(&mut it).unwrap(), vec![1, 8]);
    }

    #[test]
    fn test_match_all_bits() {
        let bits = MatchAllBits::new(3);
        assert!(bits.get(2));
        assert!(!bits.get(3));
    }
}
