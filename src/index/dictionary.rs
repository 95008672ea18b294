// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Term dictionaries and their two cursor flavors.
//!
//! [`SliceTermsEnum`] binary searches a plain sorted array. [`BlockTermsEnum`]
//! walks front-coded blocks: a small index of each block's first term picks
//! the block, then the block is decoded term by term. Both answer exactly the
//! same questions, which makes them a good pair for checking that automaton
//! enumeration does not depend on the cursor underneath it.

use std::sync::Arc;

use super::codec::{decode_front_coded, encode_front_coded};
use super::postings::{PostingList, PostingsCursor};
use super::terms::{SeekStatus, TermOrder, TermsEnum};
use super::Postings;
use crate::docset::Bits;
use crate::error::{Error, Result};

// ============================================================================
// DICTIONARY
// ============================================================================

/// Sorted terms of one field with their postings.
#[derive(Debug)]
pub struct TermDictionary {
    terms: Vec<Vec<u8>>,
    postings: Vec<Arc<PostingList>>,
    order: TermOrder,
}

impl TermDictionary {
    /// Build from `(term, postings)` pairs in any order.
    pub fn new(mut entries: Vec<(Vec<u8>, PostingList)>, order: TermOrder) -> Self {
        entries.sort_by(|a, b| order.compare(&a.0, &b.0));
        entries.dedup_by(|a, b| a.0 == b.0);
        if order == TermOrder::Bytewise {
            let terms: Vec<Vec<u8>> = entries.iter().map(|(t, _)| t.clone()).collect();
            crate::contracts::check_terms_sorted(&terms);
        }
        let (terms, postings) = entries
            .into_iter()
            .map(|(term, list)| (term, Arc::new(list)))
            .unzip();
        Self {
            terms,
            postings,
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn order(&self) -> TermOrder {
        self.order
    }

    pub fn term(&self, ord: usize) -> &[u8] {
        &self.terms[ord]
    }

    pub fn postings(&self, ord: usize) -> &Arc<PostingList> {
        &self.postings[ord]
    }

    /// Position of the first term `>= target` (may be `len()`).
    fn ceil_ord(&self, target: &[u8]) -> usize {
        self.terms
            .partition_point(|t| self.order.compare(t, target).is_lt())
    }

    pub fn lookup(&self, term: &[u8]) -> Option<usize> {
        let ord = self.ceil_ord(term);
        (ord < self.terms.len() && self.terms[ord] == term).then_some(ord)
    }
}

/// Stats shared by both cursor flavors once they sit on `ord`.
fn stats_at(dict: &TermDictionary, ord: Option<usize>) -> Result<&Arc<PostingList>> {
    ord.filter(|&o| o < dict.len())
        .map(|o| dict.postings(o))
        .ok_or(Error::Unsupported("terms enum is not positioned on a term"))
}

// ============================================================================
// ARRAY-BACKED CURSOR
// ============================================================================

/// Cursor over a [`TermDictionary`] by direct indexing.
#[derive(Debug)]
pub struct SliceTermsEnum {
    dict: Arc<TermDictionary>,
    ord: Option<usize>,
}

impl SliceTermsEnum {
    pub fn new(dict: Arc<TermDictionary>) -> Self {
        Self { dict, ord: None }
    }
}

impl TermsEnum for SliceTermsEnum {
    fn next(&mut self) -> Result<bool> {
        let next = self.ord.map_or(0, |o| (o + 1).min(self.dict.len()));
        self.ord = Some(next);
        Ok(next < self.dict.len())
    }

    fn seek_ceil(&mut self, target: &[u8]) -> Result<SeekStatus> {
        let ord = self.dict.ceil_ord(target);
        self.ord = Some(ord);
        Ok(if ord >= self.dict.len() {
            SeekStatus::End
        } else if self.dict.term(ord) == target {
            SeekStatus::Found
        } else {
            SeekStatus::NotFound
        })
    }

    fn term(&self) -> &[u8] {
        match self.ord {
            Some(o) if o < self.dict.len() => self.dict.term(o),
            _ => &[],
        }
    }

    fn ord(&self) -> Result<u64> {
        self.ord
            .filter(|&o| o < self.dict.len())
            .map(|o| o as u64)
            .ok_or(Error::Unsupported("terms enum is not positioned on a term"))
    }

    fn doc_freq(&self) -> Result<u32> {
        Ok(stats_at(&self.dict, self.ord)?.doc_freq())
    }

    fn total_term_freq(&self) -> Result<u64> {
        Ok(stats_at(&self.dict, self.ord)?.total_term_freq())
    }

    fn postings(&self, accept: Option<Arc<dyn Bits>>) -> Result<Box<dyn Postings>> {
        let list = Arc::clone(stats_at(&self.dict, self.ord)?);
        Ok(Box::new(PostingsCursor::new(list, accept)))
    }

    fn order(&self) -> TermOrder {
        self.dict.order()
    }
}

// ============================================================================
// BLOCK-BACKED CURSOR
// ============================================================================

/// Front-coded blocks over a [`TermDictionary`].
#[derive(Debug)]
pub struct TermBlocks {
    dict: Arc<TermDictionary>,
    block_size: usize,
    /// First term of each block, for picking the block to decode.
    index: Vec<Vec<u8>>,
    blocks: Vec<Vec<u8>>,
}

impl TermBlocks {
    pub fn build(dict: Arc<TermDictionary>, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        let mut index = Vec::new();
        let mut blocks = Vec::new();
        for chunk in dict.terms.chunks(block_size) {
            let mut buf = Vec::new();
            let mut previous: &[u8] = &[];
            for term in chunk {
                encode_front_coded(previous, term, &mut buf);
                previous = term;
            }
            index.push(chunk[0].clone());
            blocks.push(buf);
        }
        Self {
            dict,
            block_size,
            index,
            blocks,
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Cursor that decodes [`TermBlocks`] on the fly.
#[derive(Debug)]
pub struct BlockTermsEnum {
    blocks: Arc<TermBlocks>,
    /// Block being decoded, byte offset of the next entry, ordinal within block.
    block: usize,
    offset: usize,
    in_block: usize,
    term: Vec<u8>,
    ord: Option<usize>,
}

impl BlockTermsEnum {
    pub fn new(blocks: Arc<TermBlocks>) -> Self {
        Self {
            blocks,
            block: 0,
            offset: 0,
            in_block: 0,
            term: Vec::new(),
            ord: None,
        }
    }

    fn load_block(&mut self, block: usize) {
        self.block = block;
        self.offset = 0;
        self.in_block = 0;
        self.term.clear();
    }

    /// Decode the next entry of the current block, moving on to later blocks.
    fn decode_next(&mut self) -> Result<bool> {
        loop {
            if self.block >= self.blocks.blocks.len() {
                self.ord = Some(self.blocks.dict.len());
                self.term.clear();
                return Ok(false);
            }
            let bytes = &self.blocks.blocks[self.block];
            if self.offset < bytes.len() {
                let used = decode_front_coded(&bytes[self.offset..], &mut self.term)?;
                self.offset += used;
                self.ord = Some(self.block * self.blocks.block_size + self.in_block);
                self.in_block += 1;
                return Ok(true);
            }
            let next = self.block + 1;
            self.load_block(next);
        }
    }
}

impl TermsEnum for BlockTermsEnum {
    fn next(&mut self) -> Result<bool> {
        if self.ord.is_none() {
            self.load_block(0);
        }
        self.decode_next()
    }

    fn seek_ceil(&mut self, target: &[u8]) -> Result<SeekStatus> {
        let order = self.blocks.dict.order();
        // last block whose first term is <= target
        let block = self
            .blocks
            .index
            .partition_point(|first| order.compare(first, target).is_le())
            .saturating_sub(1);
        self.load_block(block);
        while self.decode_next()? {
            match order.compare(&self.term, target) {
                std::cmp::Ordering::Less => continue,
                std::cmp::Ordering::Equal => return Ok(SeekStatus::Found),
                std::cmp::Ordering::Greater => return Ok(SeekStatus::NotFound),
            }
        }
        Ok(SeekStatus::End)
    }

    fn term(&self) -> &[u8] {
        &self.term
    }

    fn ord(&self) -> Result<u64> {
        self.ord
            .filter(|&o| o < self.blocks.dict.len())
            .map(|o| o as u64)
            .ok_or(Error::Unsupported("terms enum is not positioned on a term"))
    }

    fn doc_freq(&self) -> Result<u32> {
        Ok(stats_at(&self.blocks.dict, self.ord)?.doc_freq())
    }

    fn total_term_freq(&self) -> Result<u64> {
        Ok(stats_at(&self.blocks.dict, self.ord)?.total_term_freq())
    }

    fn postings(&self, accept: Option<Arc<dyn Bits>>) -> Result<Box<dyn Postings>> {
        let list = Arc::clone(stats_at(&self.blocks.dict, self.ord)?);
        Ok(Box::new(PostingsCursor::new(list, accept)))
    }

    fn order(&self) -> TermOrder {
        self.blocks.dict.order()
    }
}
