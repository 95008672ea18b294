// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! K best hits by score.

use tracing::trace;

use super::{CollectFlow, Collector, PriorityQueue, ScoreDoc, TopDocs};
use crate::docset::DocId;
use crate::error::Result;
use crate::index::LeafContext;
use crate::scorer::Scorer;

type ScoreOrder = fn(&ScoreDoc, &ScoreDoc) -> bool;

/// Lower score is worse; among equal scores the higher doc id is worse.
fn worse(a: &ScoreDoc, b: &ScoreDoc) -> bool {
    if a.score == b.score {
        a.doc > b.doc
    } else {
        a.score < b.score
    }
}

/// Keeps the K highest-scoring hits.
///
/// Scores `<= 0` (and NaN) are not matches worth ranking: they are dropped
/// before touching the queue or the threshold. Once the queue is full,
/// anything below the current worst is rejected with one comparison.
#[derive(Debug)]
pub struct TopScoreDocCollector {
    queue: PriorityQueue<ScoreDoc, ScoreOrder>,
    doc_base: DocId,
    total_hits: u64,
    min_score: f32,
}

impl TopScoreDocCollector {
    pub fn new(num_hits: usize) -> Result<Self> {
        Ok(Self {
            queue: PriorityQueue::new(num_hits, worse as ScoreOrder)?,
            doc_base: 0,
            total_hits: 0,
            min_score: f32::NEG_INFINITY,
        })
    }

    /// Offer a hit directly, `doc` relative to the current segment.
    pub fn collect_score(&mut self, doc: DocId, score: f32) {
        if score.is_nan() || score <= 0.0 {
            return;
        }
        self.total_hits += 1;
        if self.queue.is_full() && score < self.min_score {
            return;
        }
        self.queue.insert_with_overflow(ScoreDoc::new(self.doc_base + doc, score));
        if self.queue.is_full() {
            if let Some(top) = self.queue.top() {
                self.min_score = top.score;
            }
        }
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Score a hit must reach to get in; negative infinity until full.
    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    /// Drain into ranked order: score descending, doc id ascending.
    pub fn top_docs(mut self) -> TopDocs {
        let score_docs = self.queue.drain_sorted();
        let max_score = score_docs.first().map_or(f32::NEG_INFINITY, |sd| sd.score);
        TopDocs {
            total_hits: self.total_hits,
            score_docs,
            max_score,
        }
    }
}

impl Collector for TopScoreDocCollector {
    fn set_next_reader(&mut self, leaf: LeafContext<'_>) -> Result<()> {
        self.doc_base = leaf.doc_base;
        Ok(())
    }

    fn collect(&mut self, doc: DocId, scorer: &mut dyn Scorer) -> Result<CollectFlow> {
        let score = scorer.score()?;
        trace!(doc, score, "collect");
        self.collect_score(doc, score);
        Ok(CollectFlow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn drained(capacity: usize, hits: &[(DocId, f32)]) -> TopDocs {
        let mut c = TopScoreDocCollector::new(capacity).unwrap();
        for &(doc, score) in hits {
            c.collect_score(doc, score);
        }
        c.top_docs()
    }

    fn pairs(top: &TopDocs) -> Vec<(DocId, f32)> {
        top.score_docs.iter().map(|sd| (sd.doc, sd.score)).collect()
    }

    #[test]
    fn test_ties_keep_lower_doc_id() {
        let top = drained(3, &[(1, 5.0), (2, 3.0), (3, 3.0), (4, 9.0)]);
        assert_eq!(pairs(&top), vec![(4, 9.0), (1, 5.0), (2, 3.0)]);
        assert_eq!(top.max_score, 9.0);
        assert_eq!(top.total_hits, 4);
    }

    #[test]
    fn test_non_positive_scores_never_enter() {
        let mut c = TopScoreDocCollector::new(2).unwrap();
        c.collect_score(1, 0.0);
        c.collect_score(2, -1.0);
        c.collect_score(3, f32::NAN);
        assert_eq!(c.total_hits(), 0);
        assert_eq!(c.min_score(), f32::NEG_INFINITY);
        c.collect_score(4, 2.0);
        c.collect_score(5, 1.0);
        assert_eq!(c.min_score(), 1.0);
        c.collect_score(6, 0.0);
        assert_eq!(c.min_score(), 1.0);
        assert_eq!(pairs(&c.top_docs()), vec![(4, 2.0), (5, 1.0)]);
    }

    #[test]
    fn test_fewer_hits_than_capacity() {
        let top = drained(10, &[(3, 1.0), (7, 4.0)]);
        assert_eq!(pairs(&top), vec![(7, 4.0), (3, 1.0)]);
        let empty = drained(10, &[]);
        assert_eq!(empty.max_score, f32::NEG_INFINITY);
        assert_eq!(empty.total_hits, 0);
    }

    #[test]
    fn test_capacity_must_be_positive() {
        assert!(matches!(TopScoreDocCollector::new(0).unwrap_err(), Error::InvalidCapacity(0)));
    }
}
