// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scoring core for full-text search.
//!
//! Queries become trees of doc-id iterators that are merged lazily and
//! scored per document, then fed to bounded top-K collectors. Multi-term
//! queries (prefix, wildcard, regexp, range, fuzzy) are matched against the
//! term dictionary by walking a byte automaton together with the sorted
//! terms, so only terms the automaton can still accept are ever looked at.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  automaton   │──▶│    search    │──▶│    scorer    │──▶│   collect    │
//! │ (patterns to │   │ (Query, Weight│   │ (ScorerNode  │   │ (top-K by    │
//! │  term sets)  │   │  rewrite)    │   │  combinators)│   │  score/sort) │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//!        │                  │                  │                  │
//!        ▼                  ▼                  ▼                  ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │            index (Terms, TermsEnum, Postings)  ·  docset            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Module      | Role                                                      |
//! |-------------|-----------------------------------------------------------|
//! | `docset`    | the doc-id iterator contract, bitsets, accept-docs        |
//! | `index`     | in-memory segments, term dictionaries and postings        |
//! | `automaton` | regexp / wildcard / fuzzy / range automata, term walking  |
//! | `scorer`    | term, phrase, conjunction, disjunction, req-opt, req-excl |
//! | `collect`   | bounded priority queue and collectors                     |
//! | `search`    | query tree, rewrite, weights, searcher, lazy `Hits`       |
//! | `rescore`   | second-pass re-ranking by sort or by query                |
//! | `contracts` | debug-build invariant checks                              |
//!
//! # Usage
//!
//! ```
//! use quarry::{Document, IndexReader, Query, Searcher, TermsCursor};
//!
//! let docs = vec![
//!     Document::new().text("body", "fast rust search"),
//!     Document::new().text("body", "slow python search"),
//! ];
//! let reader = IndexReader::from_documents(docs, 1000, TermsCursor::Array).unwrap();
//! let searcher = Searcher::new(&reader);
//!
//! let query = Query::from_json(r#"{"type": "prefix", "field": "body", "prefix": "ru"}"#).unwrap();
//! let top = searcher.search(&query, 10).unwrap();
//! assert_eq!(top.score_docs[0].doc, 0);
//! ```

pub mod automaton;
pub mod collect;
pub mod config;
pub mod contracts;
pub mod docset;
pub mod error;
pub mod index;
pub mod rescore;
pub mod scorer;
pub mod search;
pub mod testing;

pub use collect::{
    CollectFlow, Collector, ScoreDoc, Sort, SortField, TopDocs, TopFieldCollector, TopFieldDocs,
    TopScoreDocCollector,
};
pub use config::{SearchConfig, TermsCursor};
pub use docset::{DocId, DocIdIterator, NO_MORE_DOCS, NOT_STARTED};
pub use error::{Error, Result};
pub use index::{DocValue, Document, IndexReader, StoredDocument};
pub use rescore::{QueryRescorer, Rescorer, SortRescorer};
pub use scorer::{ClassicSimilarity, Scorer, ScorerNode, Similarity};
pub use search::{Explanation, Hits, Occur, Query, RewriteMethod, Searcher};
