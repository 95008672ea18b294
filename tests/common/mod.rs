// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::collections::BTreeSet;

use quarry::automaton::CompiledAutomaton;
use quarry::index::{
    BlockTermsEnum, PostingList, SliceTermsEnum, TermBlocks, TermDictionary, TermOrder, TermsEnum,
};
use quarry::{DocId, IndexReader, Query, Searcher};
use std::sync::Arc;

// Re-export canonical test utilities from quarry::testing
pub use quarry::testing::{drain, reader, sample_reader, BODY};

// ============================================================================
// DICTIONARIES
// ============================================================================

/// A bytewise dictionary holding `terms` (sorted and deduplicated first);
/// term `i` is posted to doc `i`.
pub fn dictionary(terms: &[&str]) -> Arc<TermDictionary> {
    let sorted: BTreeSet<&str> = terms.iter().copied().collect();
    let entries = sorted
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let mut list = PostingList::new(false);
            list.push(i as DocId, &[]);
            (t.as_bytes().to_vec(), list)
        })
        .collect();
    Arc::new(TermDictionary::new(entries, TermOrder::Bytewise))
}

/// Every term `compiled` enumerates from `dict`, plus the number of
/// dictionary terms it compared.
pub fn enumerate(dict: &Arc<TermDictionary>, compiled: &CompiledAutomaton) -> (Vec<String>, u64) {
    intersect(Box::new(SliceTermsEnum::new(Arc::clone(dict))), compiled)
}

/// Like [`enumerate`], walking front-coded blocks of `block_size` terms.
pub fn enumerate_blocks(
    dict: &Arc<TermDictionary>,
    compiled: &CompiledAutomaton,
    block_size: usize,
) -> (Vec<String>, u64) {
    let blocks = Arc::new(TermBlocks::build(Arc::clone(dict), block_size));
    intersect(Box::new(BlockTermsEnum::new(blocks)), compiled)
}

fn intersect(tenum: Box<dyn TermsEnum>, compiled: &CompiledAutomaton) -> (Vec<String>, u64) {
    let mut terms = quarry::automaton::AutomatonTermsEnum::intersect(tenum, compiled, BODY).unwrap();
    let mut out = Vec::new();
    while terms.next().unwrap() {
        out.push(String::from_utf8_lossy(terms.term()).into_owned());
    }
    (out, terms.comparisons())
}

// ============================================================================
// SEARCH HELPERS
// ============================================================================

/// Global doc ids of the top `n` hits, in rank order.
pub fn top_ids(reader: &IndexReader, query: &Query, n: usize) -> Vec<DocId> {
    let searcher = Searcher::new(reader);
    searcher
        .search(query, n)
        .unwrap()
        .score_docs
        .iter()
        .map(|sd| sd.doc)
        .collect()
}

/// Matching doc ids in ascending order, ignoring scores.
pub fn matching_ids(reader: &IndexReader, query: &Query) -> Vec<DocId> {
    let mut ids = top_ids(reader, query, reader.max_doc().max(1) as usize);
    ids.sort_unstable();
    ids
}

/// Docs whose `body` text holds `term` as a token.
pub fn docs_with(texts: &[&str], term: &str) -> BTreeSet<DocId> {
    texts
        .iter()
        .enumerate()
        .filter(|(_, t)| quarry::index::tokenize(t).iter().any(|tok| tok == term))
        .map(|(i, _)| i as DocId)
        .collect()
}
