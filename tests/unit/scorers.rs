// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scorer combinators, built by hand and compiled from queries.

use std::sync::Arc;

use crate::common::{drain, reader, BODY};
use quarry::docset::SortedDocs;
use quarry::scorer::{ConjunctionScorer, ConstantScorer, DisjunctionSumScorer, ReqExclScorer};
use quarry::search::{BooleanQuery, Weight};
use quarry::{DocId, Query, ScorerNode, Searcher};

fn docs(ids: &[DocId], score: f32) -> ScorerNode {
    ScorerNode::Constant(ConstantScorer::new(Box::new(SortedDocs::new(ids.to_vec())), score))
}

fn ids(hits: &[(DocId, f32)]) -> Vec<DocId> {
    hits.iter().map(|&(d, _)| d).collect()
}

#[test]
fn test_conjunction_is_intersection() {
    let mut s = ScorerNode::Conjunction(
        ConjunctionScorer::new(
            vec![docs(&[1, 3, 5, 7, 9], 1.0), docs(&[3, 4, 5, 9], 1.0), docs(&[0, 3, 9, 12], 1.0)],
            1.0,
        )
        .unwrap(),
    );
    let hits = drain(&mut s).unwrap();
    assert_eq!(ids(&hits), vec![3, 9]);
    assert!(hits.iter().all(|&(_, score)| score == 3.0));
}

#[test]
fn test_disjunction_min_should_match() {
    let coords: Arc<[f32]> = vec![1.0; 4].into();
    let make = |msm| {
        ScorerNode::Disjunction(
            DisjunctionSumScorer::new(
                vec![docs(&[1, 2, 3], 1.0), docs(&[2, 3, 4], 1.0), docs(&[3, 4, 5], 1.0)],
                Arc::clone(&coords),
            )
            .unwrap()
            .with_min_should_match(msm),
        )
    };
    assert_eq!(ids(&drain(&mut make(1)).unwrap()), vec![1, 2, 3, 4, 5]);
    assert_eq!(ids(&drain(&mut make(2)).unwrap()), vec![2, 3, 4]);
    let all = drain(&mut make(3)).unwrap();
    assert_eq!(all, vec![(3, 3.0)]);
}

#[test]
fn test_disjunction_needs_two_clauses() {
    let err = DisjunctionSumScorer::new(vec![docs(&[1], 1.0)], vec![1.0; 2].into()).err();
    assert!(matches!(err, Some(quarry::Error::TooFewClauses(1))));
}

#[test]
fn test_exclusion_skips_prohibited() {
    let mut s = ScorerNode::ReqExcl(ReqExclScorer::new(docs(&[1, 2, 3, 4, 5], 2.0), Some(docs(&[2, 4], 1.0))));
    assert_eq!(drain(&mut s).unwrap(), vec![(1, 2.0), (3, 2.0), (5, 2.0)]);
}

fn root_name(query: Query) -> &'static str {
    let reader = reader(&["rust python", "rust", "python", "go"], 10).unwrap();
    let searcher = Searcher::new(&reader);
    let weight: Weight = searcher.create_normalized_weight(&query).unwrap();
    let leaf = reader.leaf(0);
    let scorer = weight.scorer(leaf, None).unwrap().unwrap();
    scorer.name()
}

#[test]
fn test_compiled_shapes() {
    let rust = || Query::term(BODY, "rust");
    let python = || Query::term(BODY, "python");
    assert_eq!(root_name(BooleanQuery::new().should(rust()).should(python()).into()), "Disjunction");
    assert_eq!(root_name(BooleanQuery::new().must(rust()).must_not(python()).into()), "ReqExcl");
    assert_eq!(root_name(BooleanQuery::new().must(rust()).should(python()).into()), "ReqOpt");
    assert_eq!(root_name(BooleanQuery::new().must(rust()).must(python()).into()), "Conjunction");
}

#[test]
fn test_missing_required_clause_drops_segment() {
    let reader = reader(&["rust python", "rust"], 10).unwrap();
    let searcher = Searcher::new(&reader);
    let q: Query = BooleanQuery::new()
        .must(Query::term(BODY, "rust"))
        .must(Query::term(BODY, "haskell"))
        .into();
    let weight = searcher.create_normalized_weight(&q).unwrap();
    assert!(weight.scorer(reader.leaf(0), None).unwrap().is_none());
}

#[test]
fn test_coordination_in_explanation() {
    let reader = reader(&["rust python", "rust", "python", "go"], 10).unwrap();
    let searcher = Searcher::new(&reader);
    let q: Query = BooleanQuery::new()
        .should(Query::term(BODY, "rust"))
        .should(Query::term(BODY, "python"))
        .into();
    let top = searcher.search(&q, 10).unwrap();
    assert_eq!(top.score_docs[0].doc, 0);

    let e = searcher.explain(&q, 1).unwrap();
    assert_eq!(e.description, "product of:");
    assert_eq!(e.details[1].description, "coord(1/2)");
    assert_eq!(e.details[1].value, 0.5);
    let hit = top.score_docs.iter().find(|sd| sd.doc == 1).unwrap();
    assert!((e.value - hit.score).abs() < 1e-5);

    let miss = searcher.explain(&q, 3).unwrap();
    assert!(!miss.is_match());
}
