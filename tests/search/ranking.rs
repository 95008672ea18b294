// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Ranking over the sample corpus.

use crate::common::{matching_ids, sample_reader, top_ids, BODY};
use quarry::search::{BooleanQuery, PhraseQuery};
use quarry::index::Segment;
use quarry::{Document, Error, IndexReader, Query, Searcher};

#[test]
fn test_term_frequency_wins() {
    let reader = sample_reader().unwrap();
    // "rust rust rust" first
    assert_eq!(top_ids(&reader, &Query::term(BODY, "rust"), 1), vec![3]);
}

#[test]
fn test_json_query_tree() {
    let reader = sample_reader().unwrap();
    let query = Query::from_json(
        r#"{
            "type": "boolean",
            "must": [{"type": "term", "field": "body", "term": "search"}],
            "should": [{"type": "term", "field": "body", "term": "rust", "boost": 4.0}],
            "must_not": [{"type": "term", "field": "body", "term": "docs"}]
        }"#,
    )
    .unwrap();
    assert_eq!(top_ids(&reader, &query, 10), vec![4]);
}

#[test]
fn test_boost_reorders() {
    let reader = sample_reader().unwrap();
    let boosted = |python: f32, rust: f32| -> Query {
        BooleanQuery::new()
            .should(Query::term(BODY, "python").with_boost(python))
            .should(Query::term(BODY, "rust").with_boost(rust))
            .into()
    };
    let python_first = top_ids(&reader, &boosted(20.0, 1.0), 1)[0];
    let rust_first = top_ids(&reader, &boosted(1.0, 20.0), 1)[0];
    assert!([2, 5].contains(&python_first));
    assert_eq!(rust_first, 3);
}

#[test]
fn test_phrases() {
    let reader = sample_reader().unwrap();
    assert_eq!(matching_ids(&reader, &Query::phrase(BODY, &["search", "engine"])), vec![4, 5]);
    assert_eq!(matching_ids(&reader, &Query::phrase(BODY, &["engine", "search"])), Vec::<i32>::new());

    let sloppy = Query::Phrase(PhraseQuery::new(BODY, &["rust", "checker"]).slop(4));
    assert_eq!(matching_ids(&reader, &sloppy), vec![1]);
    let tight = Query::Phrase(PhraseQuery::new(BODY, &["rust", "checker"]).slop(3));
    assert!(matching_ids(&reader, &tight).is_empty());
}

#[test]
fn test_phrase_needs_positions() {
    let segment = Segment::builder("_0")
        .add(Document::new().text(BODY, "search engine"))
        .without_positions(BODY)
        .build()
        .unwrap();
    let reader = IndexReader::new(vec![segment]).unwrap();
    let searcher = Searcher::new(&reader);
    let err = searcher.search(&Query::phrase(BODY, &["search", "engine"]), 1);
    assert!(matches!(err, Err(Error::MissingPositions(_))));
    // terms alone still score
    assert_eq!(searcher.count(&Query::term(BODY, "engine")).unwrap(), 1);
}

#[test]
fn test_fuzzy_prefers_closer_terms() {
    let reader = sample_reader().unwrap();
    // "tent" is exact, "test" / "text" / "teat" one edit away: all in doc 6
    let ids = matching_ids(&reader, &Query::fuzzy(BODY, "tent", 1));
    assert_eq!(ids, vec![6]);
    let ids = matching_ids(&reader, &Query::fuzzy(BODY, "rusty", 1));
    assert_eq!(ids, vec![0, 1, 3, 4]);
}

#[test]
fn test_match_all_and_deleted_counts() {
    let reader = sample_reader().unwrap();
    let searcher = Searcher::new(&reader);
    assert_eq!(searcher.count(&Query::match_all()).unwrap(), 8);
    let top = searcher.search(&Query::match_all(), 3).unwrap();
    assert_eq!(top.score_docs.len(), 3);
    assert_eq!(top.total_hits, 8);
}

#[test]
fn test_filtered_query_keeps_order_of_unfiltered() {
    let reader = sample_reader().unwrap();
    let rust = Query::term(BODY, "rust");
    let everything = Query::filtered(rust.clone(), Query::match_all());
    assert_eq!(top_ids(&reader, &everything, 10), top_ids(&reader, &rust, 10));

    let engines = Query::filtered(rust.clone(), Query::prefix(BODY, "sea"));
    assert_eq!(matching_ids(&reader, &engines), vec![4]);

    let either: Query = BooleanQuery::new()
        .should(rust)
        .should(Query::term(BODY, "python"))
        .into();
    let async_only = Query::filtered(either, Query::term(BODY, "async"));
    assert_eq!(matching_ids(&reader, &async_only), vec![0, 2]);
}

#[test]
fn test_filter_skips_deleted_docs() {
    let segment = Segment::builder("_0")
        .add(Document::new().text(BODY, "a b"))
        .add(Document::new().text(BODY, "a"))
        .add(Document::new().text(BODY, "a b"))
        .delete(0)
        .build()
        .unwrap();
    let reader = IndexReader::new(vec![segment]).unwrap();
    let by_b = Query::filtered(Query::term(BODY, "a"), Query::term(BODY, "b"));
    assert_eq!(matching_ids(&reader, &by_b), vec![2]);
    let all = Query::filtered(Query::term(BODY, "a"), Query::match_all());
    assert_eq!(matching_ids(&reader, &all), vec![1, 2]);
}
