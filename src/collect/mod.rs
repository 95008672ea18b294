// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Collectors: where a scorer's hits go.
//!
//! The searcher drives one scorer per segment and hands every matching doc
//! to a [`Collector`], together with the scorer so the collector can decide
//! whether it wants the score at all. A collector may answer
//! [`CollectFlow::StopSegment`] to skip the rest of the current segment;
//! the searcher then moves on to the next one. Nothing is an error here.
//!
//! | Collector                    | Keeps                                   |
//! |------------------------------|-----------------------------------------|
//! | [`TopScoreDocCollector`]     | K best by score, ties to lower doc id   |
//! | [`TopFieldCollector`]        | K best by a [`Sort`]                    |
//! | [`TotalHitCountCollector`]   | a count                                 |
//! | [`EarlyTerminatingCollector`]| whatever it wraps, N hits per segment   |

mod count;
mod early;
mod priority_queue;
mod top_field;
mod top_score;

pub use count::TotalHitCountCollector;
pub use early::EarlyTerminatingCollector;
pub use priority_queue::{HeapOrder, PriorityQueue};
pub use top_field::{FieldDoc, Sort, SortField, SortKey, SortValue, TopFieldCollector, TopFieldDocs};
pub use top_score::TopScoreDocCollector;

use serde::{Deserialize, Serialize};

use crate::docset::DocId;
use crate::error::Result;
use crate::index::LeafContext;
use crate::scorer::Scorer;

/// What the driver should do after a `collect` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectFlow {
    Continue,
    /// Done with this segment; carry on with the next.
    StopSegment,
}

pub trait Collector {
    /// Called before the first doc of each segment.
    fn set_next_reader(&mut self, leaf: LeafContext<'_>) -> Result<()>;

    /// `doc` is segment-local; `scorer` is positioned on it.
    fn collect(&mut self, doc: DocId, scorer: &mut dyn Scorer) -> Result<CollectFlow>;

    /// Whether docs may arrive out of id order within a segment.
    fn accepts_docs_out_of_order(&self) -> bool {
        false
    }
}

impl<C: Collector + ?Sized> Collector for &mut C {
    fn set_next_reader(&mut self, leaf: LeafContext<'_>) -> Result<()> {
        (**self).set_next_reader(leaf)
    }

    fn collect(&mut self, doc: DocId, scorer: &mut dyn Scorer) -> Result<CollectFlow> {
        (**self).collect(doc, scorer)
    }

    fn accepts_docs_out_of_order(&self) -> bool {
        (**self).accepts_docs_out_of_order()
    }
}

/// A hit: global doc id and score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDoc {
    pub doc: DocId,
    pub score: f32,
}

impl ScoreDoc {
    pub fn new(doc: DocId, score: f32) -> Self {
        Self { doc, score }
    }
}

/// Ranked hits of one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDocs {
    /// Every admitted hit, not just the ones kept.
    pub total_hits: u64,
    pub score_docs: Vec<ScoreDoc>,
    /// Best score, or negative infinity with no hits.
    pub max_score: f32,
}

impl TopDocs {
    pub fn empty() -> Self {
        Self {
            total_hits: 0,
            score_docs: Vec::new(),
            max_score: f32::NEG_INFINITY,
        }
    }
}
