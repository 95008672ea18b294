// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for top-k collection over boolean queries.
//!
//! Random corpora over a tiny vocabulary and a random boolean query: the
//! collected hits must be ordered by score then doc, bounded by `k`, and
//! agree with the total hit count.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quarry::search::BooleanQuery;
use quarry::testing::{reader, BODY};
use quarry::{Query, Searcher};

const VOCAB: &[&str] = &["ant", "bee", "cat", "dog", "eel", "fox"];

#[derive(Debug, Arbitrary)]
struct TopKInput {
    docs: Vec<Vec<u8>>,
    must: Vec<u8>,
    should: Vec<u8>,
    must_not: Vec<u8>,
    min_should_match: u8,
    k: u8,
    segment_size: u8,
}

fn word(b: u8) -> &'static str {
    VOCAB[b as usize % VOCAB.len()]
}

fuzz_target!(|input: TopKInput| {
    if input.docs.is_empty() || input.docs.len() > 64 {
        return;
    }
    let texts: Vec<String> = input
        .docs
        .iter()
        .map(|d| d.iter().take(12).map(|&b| word(b)).collect::<Vec<_>>().join(" "))
        .collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let segment_size = usize::from(input.segment_size).max(1);
    let Ok(reader) = reader(&refs, segment_size) else {
        return;
    };

    let mut query = BooleanQuery::new();
    for &b in input.must.iter().take(3) {
        query = query.must(Query::term(BODY, word(b)));
    }
    for &b in input.should.iter().take(4) {
        query = query.should(Query::term(BODY, word(b)));
    }
    for &b in input.must_not.iter().take(2) {
        query = query.must_not(Query::term(BODY, word(b)));
    }
    let query: Query = query.min_should_match(usize::from(input.min_should_match % 4)).into();

    let searcher = Searcher::new(&reader);
    let k = usize::from(input.k).max(1);
    let Ok(top) = searcher.search(&query, k) else {
        return;
    };
    let count = searcher.count(&query).unwrap();

    assert!(top.score_docs.len() <= k);
    assert!(top.score_docs.len() as u64 <= count);
    for pair in top.score_docs.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(
            a.score > b.score || (a.score == b.score && a.doc < b.doc),
            "out of order: {:?} before {:?}",
            a,
            b
        );
    }
});
