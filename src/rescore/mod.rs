// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Second-pass re-ranking of hits that were already collected.
//!
//! A rescorer never re-runs the first query. It walks the first-pass hits in
//! doc id order, which lines them up with the reader's segments, and
//! re-enters each segment once:
//!
//! ```text
//! first pass:  (7, 2.1) (2, 1.9) (12, 0.4)      global ids, by score
//! by doc:      2 | 7      12                    seg 0 = 0..10, seg 1 = 10..20
//! local:       2   7  |   2
//! ```
//!
//! | Rescorer         | New order                                          |
//! |------------------|----------------------------------------------------|
//! | [`SortRescorer`] | a [`Sort`](crate::collect::Sort) over the hits     |
//! | [`QueryRescorer`]| `first + weight × second` where a second query matches |

mod query;
mod sort;

pub use query::QueryRescorer;
pub use sort::SortRescorer;

use crate::collect::TopDocs;
use crate::docset::DocId;
use crate::error::Result;
use crate::search::{Explanation, Searcher};

pub trait Rescorer {
    /// Re-rank `first_pass`, keeping at most `top_n` hits.
    fn rescore(&self, searcher: &Searcher<'_>, first_pass: &TopDocs, top_n: usize) -> Result<TopDocs>;

    /// Explain how global doc `doc` was re-ranked, given how it scored in the first pass.
    fn explain(&self, searcher: &Searcher<'_>, first_pass: Explanation, doc: DocId) -> Result<Explanation>;
}

/// First-pass hits ordered by doc id, checked against the reader.
fn hits_by_doc(searcher: &Searcher<'_>, first_pass: &TopDocs) -> Result<Vec<crate::collect::ScoreDoc>> {
    let max_doc = searcher.reader().max_doc();
    let mut hits = first_pass.score_docs.clone();
    if let Some(bad) = hits.iter().find(|h| h.doc < 0 || h.doc >= max_doc) {
        return Err(crate::error::Error::InvalidArgument(format!(
            "first-pass doc {} out of range 0..{}",
            bad.doc, max_doc
        )));
    }
    hits.sort_by_key(|h| h.doc);
    Ok(hits)
}
