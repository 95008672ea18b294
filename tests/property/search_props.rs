// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! End-to-end search over random corpora and segmentations.

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::common::{docs_with, matching_ids, reader, BODY};
use quarry::search::BooleanQuery;
use quarry::{DocId, Query, Searcher};

const VOCAB: &[&str] = &["alpha", "beta", "gamma", "delta", "omega"];

fn corpus_strategy() -> impl Strategy<Value = Vec<String>> {
    let doc = prop::collection::vec(prop::sample::select(VOCAB.to_vec()), 1..6).prop_map(|w| w.join(" "));
    prop::collection::vec(doc, 1..20)
}

fn term_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(VOCAB.to_vec())
}

proptest! {
    /// Property: boolean queries over terms match exactly the set algebra
    /// of the docs holding those terms, whatever the segment size.
    #[test]
    fn prop_boolean_matches_set_algebra(
        corpus in corpus_strategy(),
        a in term_strategy(),
        b in term_strategy(),
        segment_size in 1usize..6,
    ) {
        let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
        let reader = reader(&texts, segment_size).unwrap();
        let with_a = docs_with(&texts, a);
        let with_b = docs_with(&texts, b);

        let and: Query = BooleanQuery::new().must(Query::term(BODY, a)).must(Query::term(BODY, b)).into();
        let expected: Vec<DocId> = with_a.intersection(&with_b).copied().collect();
        prop_assert_eq!(matching_ids(&reader, &and), expected);

        let or: Query = BooleanQuery::new().should(Query::term(BODY, a)).should(Query::term(BODY, b)).into();
        let expected: Vec<DocId> = with_a.union(&with_b).copied().collect();
        prop_assert_eq!(matching_ids(&reader, &or), expected);

        let not: Query = BooleanQuery::new().must(Query::term(BODY, a)).must_not(Query::term(BODY, b)).into();
        let expected: Vec<DocId> = with_a.difference(&with_b).copied().collect();
        prop_assert_eq!(matching_ids(&reader, &not), expected);
    }

    /// Property: hits come back best first, and every score equals the
    /// value of its explanation.
    #[test]
    fn prop_ranked_and_explained(corpus in corpus_strategy(), a in term_strategy(), b in term_strategy()) {
        let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
        let reader = reader(&texts, 4).unwrap();
        let searcher = Searcher::new(&reader);
        let q: Query = BooleanQuery::new().should(Query::term(BODY, a)).should(Query::term(BODY, b)).into();
        let top = searcher.search(&q, 100).unwrap();
        for pair in top.score_docs.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for hit in &top.score_docs {
            let e = searcher.explain(&q, hit.doc).unwrap();
            prop_assert!(e.is_match());
            prop_assert!((e.value - hit.score).abs() <= 1e-4 * hit.score.max(1.0));
        }
    }

    /// Property: a prefix query matches the docs holding any term with
    /// that prefix.
    #[test]
    fn prop_prefix_matches_terms(corpus in corpus_strategy(), prefix in "[abdgo]{1,2}") {
        let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
        let reader = reader(&texts, 3).unwrap();
        let expected: BTreeSet<DocId> = VOCAB.iter()
            .filter(|t| t.starts_with(&prefix))
            .flat_map(|t| docs_with(&texts, t))
            .collect();
        let got = matching_ids(&reader, &Query::prefix(BODY, &prefix));
        prop_assert_eq!(got, expected.into_iter().collect::<Vec<_>>());
    }
}
