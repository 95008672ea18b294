// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit tests, integration tests, benches and
//! fuzz targets.
//!
//! This module is always compiled but hidden from documentation.

#![doc(hidden)]

use crate::config::TermsCursor;
use crate::docset::{DocId, NO_MORE_DOCS};
use crate::error::Result;
use crate::index::{DocValue, Document, IndexReader};
use crate::scorer::Scorer;

/// Field every helper corpus indexes its text under.
pub const BODY: &str = "body";

/// A small corpus with overlapping vocabulary, a `rank` value and an `id`.
pub const SAMPLE_TEXTS: &[&str] = &[
    "rust async runtime",
    "the rust compiler and the borrow checker",
    "async python event loop",
    "rust rust rust",
    "search engine written in rust",
    "a search engine for python docs",
    "test text tent teat toast",
    "quick brown fox jumps over the lazy dog",
];

/// One document per text, under [`BODY`], with `id` and `rank` values.
pub fn documents(texts: &[&str]) -> Vec<Document> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            Document::new()
                .text(BODY, text)
                .text("id", &i.to_string())
                .value("rank", DocValue::Long((i % 3) as i64))
        })
        .collect()
}

/// Reader over `texts`, `segment_size` documents per segment.
pub fn reader(texts: &[&str], segment_size: usize) -> Result<IndexReader> {
    IndexReader::from_documents(documents(texts), segment_size, TermsCursor::Array)
}

/// Reader over [`SAMPLE_TEXTS`] split into segments of three.
pub fn sample_reader() -> Result<IndexReader> {
    reader(SAMPLE_TEXTS, 3)
}

/// Drain `scorer` into `(doc, score)` pairs.
pub fn drain<S: Scorer + ?Sized>(scorer: &mut S) -> Result<Vec<(DocId, f32)>> {
    let mut hits = Vec::new();
    loop {
        let doc = scorer.next_doc()?;
        if doc == NO_MORE_DOCS {
            return Ok(hits);
        }
        hits.push((doc, scorer.score()?));
    }
}

/// Deterministic pseudo-random words for benches: `count` docs of `len` words
/// drawn from a vocabulary of `vocab` words.
pub fn synthetic_texts(count: usize, len: usize, vocab: usize) -> Vec<String> {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    (0..count)
        .map(|_| {
            (0..len)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    format!("w{}", state % vocab.max(1) as u64)
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

