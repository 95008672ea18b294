// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The collaborators the scoring core pulls from: term dictionaries and postings.
//!
//! The engine itself only talks to the [`Terms`], [`TermsEnum`] and
//! [`Postings`] traits. What lives here is an in-memory reference
//! implementation of them, good enough for tests, benchmarks and the CLI:
//!
//! ```text
//! IndexReader ──▶ Segment ──▶ FieldIndex ──▶ TermDictionary ──▶ PostingList
//!  (doc bases)    (live docs,   (Terms)       (SliceTermsEnum,   (PostingsCursor)
//!                  doc values)                 BlockTermsEnum)
//! ```
//!
//! It is not a persistence format. Segments are built in memory and stay there.

mod codec;
mod dictionary;
mod postings;
mod reader;
mod segment;
mod terms;

pub use dictionary::{BlockTermsEnum, SliceTermsEnum, TermBlocks, TermDictionary};
pub use postings::{PostingList, Postings, PostingsCursor};
pub use reader::{IndexReader, LeafContext};
pub use segment::{
    tokenize, DocValue, Document, FieldIndex, Segment, SegmentBuilder, StoredDocument,
};
pub use terms::{EmptyTermsEnum, SeekStatus, TermOrder, Terms, TermsEnum};

/// Corpus-wide statistics for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStatistics {
    pub field: String,
    pub max_doc: u64,
    pub doc_count: u64,
    pub sum_doc_freq: u64,
    pub sum_total_term_freq: u64,
}

/// Corpus-wide statistics for one term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermStatistics {
    pub term: Vec<u8>,
    pub doc_freq: u64,
    pub total_term_freq: u64,
}
