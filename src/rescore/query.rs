// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Re-rank first-pass hits by how well a second query scores them.

use tracing::debug;

use super::{hits_by_doc, Rescorer};
use crate::collect::{ScoreDoc, TopDocs};
use crate::docset::{DocId, DocIdIterator};
use crate::error::Result;
use crate::scorer::{Scorer, ScorerNode};
use crate::search::{Explanation, Query, Searcher};

/// Adds `weight × second` to the first-pass score of every hit the second
/// query also matches. Hits it misses keep their first-pass score.
#[derive(Debug, Clone)]
pub struct QueryRescorer {
    query: Query,
    weight: f32,
}

impl QueryRescorer {
    pub fn new(query: Query, weight: f32) -> Self {
        Self { query, weight }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn combine(&self, first: f32, second: Option<f32>) -> f32 {
        match second {
            Some(second) => first + self.weight * second,
            None => first,
        }
    }
}

impl Rescorer for QueryRescorer {
    fn rescore(&self, searcher: &Searcher<'_>, first_pass: &TopDocs, top_n: usize) -> Result<TopDocs> {
        let mut hits = hits_by_doc(searcher, first_pass)?;
        let reader = searcher.reader();
        let weight = searcher.create_normalized_weight(&self.query)?;

        let mut end: DocId = 0;
        let mut doc_base: DocId = 0;
        let mut scorer: Option<ScorerNode> = None;
        let mut rescored = 0usize;
        for hit in &mut hits {
            if hit.doc >= end {
                let leaf = reader.leaf(reader.sub_index(hit.doc));
                doc_base = leaf.doc_base;
                end = leaf.doc_base + leaf.segment.max_doc();
                scorer = weight.scorer(leaf, None)?;
            }
            let second = match scorer.as_mut() {
                Some(s) => {
                    let target = hit.doc - doc_base;
                    let mut actual = s.doc();
                    if actual < target {
                        actual = s.advance(target)?;
                    }
                    if actual == target {
                        Some(s.score()?)
                    } else {
                        None
                    }
                }
                None => None,
            };
            rescored += usize::from(second.is_some());
            hit.score = self.combine(hit.score, second);
        }

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc.cmp(&b.doc)));
        hits.truncate(top_n);
        debug!(hits = first_pass.score_docs.len(), rescored, top_n, "query rescored");
        let max_score = hits.first().map_or(f32::NEG_INFINITY, |h: &ScoreDoc| h.score);
        Ok(TopDocs {
            total_hits: first_pass.total_hits,
            score_docs: hits,
            max_score,
        })
    }

    fn explain(&self, searcher: &Searcher<'_>, first_pass: Explanation, doc: DocId) -> Result<Explanation> {
        let second_pass = searcher.explain(&self.query, doc)?;
        let second = second_pass.is_match().then_some(second_pass.value);
        let score = self.combine(first_pass.value, second);
        let first = Explanation::matched(first_pass.value, "first pass score", vec![first_pass]);
        let second = match second {
            Some(value) => Explanation::matched(value, "second pass score", vec![second_pass]),
            None => Explanation::matched(0.0, "no second pass score", vec![second_pass]),
        };
        Ok(Explanation::matched(
            score,
            "combined first and second pass score",
            vec![first, second],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TermsCursor;
    use crate::index::{Document, IndexReader};

    fn reader() -> IndexReader {
        let texts = [
            "rust search engine",
            "rust compiler",
            "search engine internals",
            "rust rust rust",
            "engine tuning",
        ];
        let docs = texts.iter().map(|t| Document::new().text("body", t)).collect();
        IndexReader::from_documents(docs, 2, TermsCursor::Array).unwrap()
    }

    #[test]
    fn test_second_query_lifts_matching_hits() {
        let reader = reader();
        let searcher = Searcher::new(&reader);
        let first = searcher.search(&Query::term("body", "engine"), 10).unwrap();
        let before: Vec<DocId> = first.score_docs.iter().map(|sd| sd.doc).collect();
        assert_eq!(before.len(), 3);

        let rescorer = QueryRescorer::new(Query::term("body", "rust"), 10.0);
        let top = rescorer.rescore(&searcher, &first, 10).unwrap();
        assert_eq!(top.score_docs[0].doc, 0);
        assert_eq!(top.total_hits, first.total_hits);
        assert_eq!(top.max_score, top.score_docs[0].score);

        let unmatched: Vec<&ScoreDoc> = top.score_docs.iter().filter(|sd| sd.doc != 0).collect();
        for sd in unmatched {
            let original = first.score_docs.iter().find(|o| o.doc == sd.doc).unwrap();
            assert_eq!(sd.score, original.score);
        }
    }

    #[test]
    fn test_truncates_to_top_n() {
        let reader = reader();
        let searcher = Searcher::new(&reader);
        let first = searcher.search(&Query::term("body", "engine"), 10).unwrap();
        let rescorer = QueryRescorer::new(Query::term("body", "internals"), 1.0);
        let top = rescorer.rescore(&searcher, &first, 1).unwrap();
        assert_eq!(top.score_docs.len(), 1);
        assert_eq!(top.score_docs[0].doc, 2);
    }

    #[test]
    fn test_empty_first_pass() {
        let reader = reader();
        let searcher = Searcher::new(&reader);
        let rescorer = QueryRescorer::new(Query::term("body", "rust"), 1.0);
        let top = rescorer.rescore(&searcher, &TopDocs::empty(), 5).unwrap();
        assert!(top.score_docs.is_empty());
        assert_eq!(top.max_score, f32::NEG_INFINITY);
    }

    #[test]
    fn test_explain_combines_both_passes() {
        let reader = reader();
        let searcher = Searcher::new(&reader);
        let query = Query::term("body", "engine");
        let rescorer = QueryRescorer::new(Query::term("body", "rust"), 2.0);

        let first = searcher.explain(&query, 0).unwrap();
        let e = rescorer.explain(&searcher, first.clone(), 0).unwrap();
        assert_eq!(e.description, "combined first and second pass score");
        assert_eq!(e.details[1].description, "second pass score");
        let second = e.details[1].value;
        assert!((e.value - (first.value + 2.0 * second)).abs() < 1e-6);

        let first = searcher.explain(&query, 4).unwrap();
        let e = rescorer.explain(&searcher, first.clone(), 4).unwrap();
        assert_eq!(e.details[1].description, "no second pass score");
        assert_eq!(e.value, first.value);
    }
}
