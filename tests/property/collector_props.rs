// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded top-K collection equals sort-then-truncate.

use proptest::prelude::*;

use quarry::collect::PriorityQueue;
use quarry::{ScoreDoc, TopScoreDocCollector};

fn hits_strategy() -> impl Strategy<Value = Vec<f32>> {
    // a small score alphabet forces ties
    prop::collection::vec(prop::sample::select(vec![-1.0f32, 0.0, 0.5, 1.0, 1.5, 2.0, 7.25]), 0..64)
}

fn ranked(scores: &[f32]) -> Vec<ScoreDoc> {
    let mut hits: Vec<ScoreDoc> = scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s > 0.0)
        .map(|(d, &s)| ScoreDoc::new(d as i32, s))
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc.cmp(&b.doc)));
    hits
}

proptest! {
    /// Property: the collector keeps the K best positive hits, ties to the
    /// lower doc id, and counts every positive hit.
    #[test]
    fn prop_top_k_equals_sorted_prefix(scores in hits_strategy(), k in 1usize..10) {
        let mut collector = TopScoreDocCollector::new(k).unwrap();
        for (doc, &score) in scores.iter().enumerate() {
            collector.collect_score(doc as i32, score);
        }
        let expected = ranked(&scores);
        prop_assert_eq!(collector.total_hits(), expected.len() as u64);
        let top = collector.top_docs();
        let truncated: Vec<ScoreDoc> = expected.into_iter().take(k).collect();
        prop_assert_eq!(top.score_docs, truncated);
    }

    /// Property: the queue never exceeds its capacity and drains best first.
    #[test]
    fn prop_queue_bounded_and_ordered(values in prop::collection::vec(0i32..100, 0..80), k in 1usize..12) {
        let mut queue = PriorityQueue::new(k, |a: &i32, b: &i32| a < b).unwrap();
        for v in &values {
            queue.insert_with_overflow(*v);
            prop_assert!(queue.len() <= k);
        }
        let drained = queue.drain_sorted();
        let mut expected = values.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        expected.truncate(k);
        prop_assert_eq!(drained, expected);
    }
}
