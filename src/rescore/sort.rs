// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Re-rank first-pass hits by a sort.

use tracing::debug;

use super::{hits_by_doc, Rescorer};
use crate::collect::{Collector, Sort, TopDocs, TopFieldCollector, TopFieldDocs};
use crate::docset::{DocId, DocIdIterator};
use crate::error::{Error, Result};
use crate::search::{Explanation, Searcher};
use crate::scorer::Scorer;

/// Stands in for a real scorer while replaying stored hits: it only knows
/// the one doc and score it was given.
#[derive(Debug)]
struct FakeScorer {
    doc: DocId,
    score: f32,
}

impl DocIdIterator for FakeScorer {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next_doc(&mut self) -> Result<DocId> {
        Err(Error::Unsupported("next_doc on a replayed hit"))
    }

    fn advance(&mut self, _target: DocId) -> Result<DocId> {
        Err(Error::Unsupported("advance on a replayed hit"))
    }

    fn cost(&self) -> u64 {
        1
    }
}

impl Scorer for FakeScorer {
    fn score(&mut self) -> Result<f32> {
        Ok(self.score)
    }

    fn freq(&mut self) -> Result<u32> {
        Err(Error::Unsupported("freq on a replayed hit"))
    }
}

#[derive(Debug, Clone)]
pub struct SortRescorer {
    sort: Sort,
}

impl SortRescorer {
    pub fn new(sort: Sort) -> Self {
        Self { sort }
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Like [`Rescorer::rescore`], keeping the sort values of every hit.
    pub fn rescore_sorted(&self, searcher: &Searcher<'_>, first_pass: &TopDocs, top_n: usize) -> Result<TopFieldDocs> {
        let hits = hits_by_doc(searcher, first_pass)?;
        if top_n == 0 {
            return Ok(TopFieldDocs {
                total_hits: hits.len() as u64,
                field_docs: Vec::new(),
                max_score: f32::NEG_INFINITY,
                sort: self.sort.clone(),
            });
        }
        let reader = searcher.reader();
        let mut collector = TopFieldCollector::new(self.sort.clone(), top_n, true, true)?;
        let mut end: DocId = 0;
        let mut doc_base: DocId = 0;
        for hit in &hits {
            if hit.doc >= end {
                let leaf = reader.leaf(reader.sub_index(hit.doc));
                collector.set_next_reader(leaf)?;
                doc_base = leaf.doc_base;
                end = leaf.doc_base + leaf.segment.max_doc();
            }
            let mut fake = FakeScorer {
                doc: hit.doc - doc_base,
                score: hit.score,
            };
            collector.collect(fake.doc, &mut fake)?;
        }
        debug!(hits = hits.len(), top_n, sort = %self.sort, "sort rescored");
        Ok(collector.top_docs())
    }
}

impl Rescorer for SortRescorer {
    fn rescore(&self, searcher: &Searcher<'_>, first_pass: &TopDocs, top_n: usize) -> Result<TopDocs> {
        let sorted = self.rescore_sorted(searcher, first_pass, top_n)?;
        Ok(TopDocs {
            total_hits: sorted.total_hits,
            score_docs: sorted
                .field_docs
                .iter()
                .map(|fd| crate::collect::ScoreDoc::new(fd.doc, fd.score))
                .collect(),
            max_score: sorted.max_score,
        })
    }

    fn explain(&self, searcher: &Searcher<'_>, first_pass: Explanation, doc: DocId) -> Result<Explanation> {
        let one = TopDocs {
            total_hits: 1,
            score_docs: vec![crate::collect::ScoreDoc::new(doc, first_pass.value)],
            max_score: first_pass.value,
        };
        let sorted = self.rescore_sorted(searcher, &one, 1)?;
        let Some(hit) = sorted.field_docs.first() else {
            return Err(Error::InvalidArgument(format!("doc {} was not rescored", doc)));
        };
        let mut details = vec![Explanation::matched(
            first_pass.value,
            "first pass score",
            vec![first_pass.clone()],
        )];
        for (field, value) in self.sort.fields.iter().zip(&hit.fields) {
            details.push(Explanation::matched(
                0.0,
                format!("sort field {} value={}", field, value),
                Vec::new(),
            ));
        }
        Ok(Explanation::matched(
            0.0,
            format!("sort field values for sort={}", self.sort),
            details,
        ))
    }
}
