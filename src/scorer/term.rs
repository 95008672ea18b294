// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scores one term's postings.

use crate::docset::{DocId, DocIdIterator};
use crate::error::Result;
use crate::index::Postings;

use super::{Scorer, SimScorer};

/// `tf(freq) × weight × norm(doc)` for every doc in the postings.
#[derive(Debug)]
pub struct TermScorer {
    postings: Box<dyn Postings>,
    sim: SimScorer,
}

impl TermScorer {
    pub fn new(postings: Box<dyn Postings>, sim: SimScorer) -> Self {
        Self { postings, sim }
    }
}

impl DocIdIterator for TermScorer {
    fn doc(&self) -> DocId {
        self.postings.doc()
    }

    fn next_doc(&mut self) -> Result<DocId> {
        self.postings.next_doc()
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        self.postings.advance(target)
    }

    fn cost(&self) -> u64 {
        self.postings.cost()
    }
}

impl Scorer for TermScorer {
    fn score(&mut self) -> Result<f32> {
        Ok(self.sim.score(self.postings.doc(), self.postings.freq() as f32))
    }

    fn freq(&mut self) -> Result<u32> {
        Ok(self.postings.freq())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::docset::NO_MORE_DOCS;
    use crate::index::{CollectionStatistics, PostingList, PostingsCursor, TermStatistics};
    use crate::scorer::{ClassicSimilarity, Similarity};

    #[test]
    fn test_scores_follow_term_frequency() {
        let mut list = PostingList::new(true);
        list.push(1, &[0]);
        list.push(3, &[0, 4, 9, 12]);
        let sim: Arc<dyn Similarity> = Arc::new(ClassicSimilarity);
        let collection = CollectionStatistics {
            field: "body".into(),
            max_doc: 10,
            doc_count: 10,
            sum_doc_freq: 2,
            sum_total_term_freq: 5,
        };
        let term = TermStatistics {
            term: b"fox".to_vec(),
            doc_freq: 9,
            total_term_freq: 5,
        };
        let weight = sim.compute_weight(1.0, &collection, &[term]);
        let postings = Box::new(PostingsCursor::new(Arc::new(list), None));
        let mut scorer = TermScorer::new(postings, SimScorer::new(sim, weight, None));

        assert_eq!(scorer.next_doc().unwrap(), 1);
        assert_eq!(scorer.freq().unwrap(), 1);
        let one = scorer.score().unwrap();
        assert_eq!(scorer.next_doc().unwrap(), 3);
        assert_eq!(scorer.freq().unwrap(), 4);
        assert!((scorer.score().unwrap() - 2.0 * one).abs() < 1e-6);
        assert_eq!(scorer.next_doc().unwrap(), NO_MORE_DOCS);
    }
}
