// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded queues and collectors driven through a searcher.

use crate::common::{sample_reader, BODY};
use quarry::collect::{
    EarlyTerminatingCollector, PriorityQueue, TotalHitCountCollector,
};
use quarry::{Query, ScoreDoc, Searcher, Sort, SortField, TopScoreDocCollector};

/// Worse: lower score, then higher doc id.
fn worse(a: &ScoreDoc, b: &ScoreDoc) -> bool {
    if a.score == b.score {
        a.doc > b.doc
    } else {
        a.score < b.score
    }
}

#[test]
fn test_capacity_three_keeps_best() {
    let mut queue = PriorityQueue::new(3, worse).unwrap();
    for (doc, score) in [(1, 5.0), (2, 3.0), (3, 3.0), (4, 9.0)] {
        queue.insert_with_overflow(ScoreDoc::new(doc, score));
    }
    let drained: Vec<(i32, f32)> = queue.drain_sorted().iter().map(|sd| (sd.doc, sd.score)).collect();
    assert_eq!(drained, vec![(4, 9.0), (1, 5.0), (2, 3.0)]);
}

#[test]
fn test_top_score_counts_every_positive_hit() {
    let mut collector = TopScoreDocCollector::new(2).unwrap();
    for (doc, score) in [(0, 1.0), (1, 0.0), (2, 4.0), (3, 2.0), (4, f32::NAN)] {
        collector.collect_score(doc, score);
    }
    assert_eq!(collector.total_hits(), 3);
    let top = collector.top_docs();
    assert_eq!(top.score_docs, vec![ScoreDoc::new(2, 4.0), ScoreDoc::new(3, 2.0)]);
    assert_eq!(top.max_score, 4.0);
}

#[test]
fn test_count_matches_search_total() {
    let reader = sample_reader().unwrap();
    let searcher = Searcher::new(&reader);
    let query = Query::term(BODY, "rust");
    let mut counter = TotalHitCountCollector::new();
    searcher.search_with(&query, &mut counter).unwrap();
    assert_eq!(counter.total_hits(), searcher.search(&query, 1).unwrap().total_hits);
    assert_eq!(searcher.count(&query).unwrap(), counter.total_hits());
}

#[test]
fn test_early_termination_caps_each_segment() {
    let reader = sample_reader().unwrap();
    let searcher = Searcher::new(&reader);
    let query = Query::match_all();
    let mut early = EarlyTerminatingCollector::new(TotalHitCountCollector::new(), 1).unwrap();
    searcher.search_with(&query, &mut early).unwrap();
    assert_eq!(early.terminated_segments(), reader.leaf_count());
    assert_eq!(early.into_inner().total_hits(), reader.leaf_count() as u64);
}

#[test]
fn test_sorted_search_reports_values() {
    let reader = sample_reader().unwrap();
    let searcher = Searcher::new(&reader);
    let sort = Sort::new(vec![SortField::field("rank").reversed(), SortField::doc()]);
    let top = searcher.search_sorted(&Query::match_all(), 3, &sort).unwrap();
    let docs: Vec<i32> = top.field_docs.iter().map(|fd| fd.doc).collect();
    assert_eq!(docs, vec![2, 5, 1]);
    assert_eq!(top.total_hits, reader.max_doc() as u64);
}
