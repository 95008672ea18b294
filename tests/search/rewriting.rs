// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Multi-term queries under each rewrite method.

use crate::common::{matching_ids, reader, BODY};
use quarry::search::{BooleanQuery, PrefixQuery};
use quarry::{Query, RewriteMethod, SearchConfig, Searcher};

const TEXTS: &[&str] = &["carpet", "car card", "care", "cart cat", "dog", "card card card"];

fn with_method(method: RewriteMethod) -> Query {
    Query::Prefix(PrefixQuery {
        field: BODY.to_string(),
        prefix: "car".to_string(),
        rewrite: Some(method),
        boost: 1.0,
    })
}

#[test]
fn test_every_method_matches_the_same_docs() {
    let reader = reader(TEXTS, 2).unwrap();
    let expected = vec![0, 1, 2, 3, 5];
    for method in [
        RewriteMethod::ConstantScore,
        RewriteMethod::ScoringBoolean,
        RewriteMethod::TopTerms { size: 16 },
    ] {
        assert_eq!(matching_ids(&reader, &with_method(method)), expected, "{:?}", method);
    }
}

#[test]
fn test_constant_score_is_flat_scoring_is_not() {
    let reader = reader(TEXTS, 2).unwrap();
    let searcher = Searcher::new(&reader);
    let flat = searcher.search(&with_method(RewriteMethod::ConstantScore), 10).unwrap();
    assert!(flat.score_docs.iter().all(|sd| sd.score == flat.max_score));

    let scored = searcher.search(&with_method(RewriteMethod::ScoringBoolean), 10).unwrap();
    assert_eq!(scored.total_hits, 5);
    assert!(scored.score_docs.last().unwrap().score < scored.max_score);
}

#[test]
fn test_rewrite_shape() {
    let reader = reader(TEXTS, 2).unwrap();
    let searcher = Searcher::new(&reader);
    match searcher.rewrite(&with_method(RewriteMethod::ScoringBoolean)).unwrap() {
        Query::Boolean(b) => {
            assert!(b.disable_coord);
            assert_eq!(b.should.len(), 5);
            assert!(b.must.is_empty());
        }
        other => panic!("expected a boolean, got {}", other),
    }
    // top terms keeps only the best `size`
    match searcher.rewrite(&with_method(RewriteMethod::TopTerms { size: 2 })).unwrap() {
        Query::Boolean(b) => assert_eq!(b.should.len(), 2),
        other => panic!("expected a boolean, got {}", other),
    }
}

#[test]
fn test_rewrite_inside_boolean() {
    let reader = reader(TEXTS, 2).unwrap();
    let config = SearchConfig {
        default_rewrite: RewriteMethod::ScoringBoolean,
        ..SearchConfig::default()
    };
    let searcher = Searcher::with_config(&reader, config);
    let q: Query = BooleanQuery::new()
        .must(Query::wildcard(BODY, "ca*"))
        .must_not(Query::term(BODY, "card"))
        .into();
    let mut ids: Vec<i32> = searcher.search(&q, 10).unwrap().score_docs.iter().map(|sd| sd.doc).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 2, 3]);
}

#[test]
fn test_rewrite_method_from_json() {
    let q = Query::from_json(
        r#"{"type": "fuzzy", "field": "body", "term": "cart", "max_edits": 1, "rewrite": {"top_terms": {"size": 2}}}"#,
    )
    .unwrap();
    let multi = q.as_multi_term().unwrap();
    assert_eq!(multi.rewrite, Some(RewriteMethod::TopTerms { size: 2 }));

    let reader = reader(TEXTS, 2).unwrap();
    let ids = matching_ids(&reader, &q);
    assert!(!ids.is_empty());
    assert!(ids.len() <= 4);
}
