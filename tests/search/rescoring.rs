// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Second-pass re-ranking on top of a first search.

use crate::common::{sample_reader, BODY};
use quarry::{Query, QueryRescorer, Rescorer, Searcher, Sort, SortField, SortRescorer};

#[test]
fn test_query_rescore_then_sort_rescore() {
    let reader = sample_reader().unwrap();
    let searcher = Searcher::new(&reader);
    let first = searcher.search(&Query::prefix(BODY, "a"), 10).unwrap();
    // async, and, a: docs 0, 1, 2, 5
    assert_eq!(first.total_hits, 4);

    let by_python = QueryRescorer::new(Query::term(BODY, "python"), 5.0);
    let second = by_python.rescore(&searcher, &first, 10).unwrap();
    let top_two: Vec<i32> = second.score_docs.iter().take(2).map(|sd| sd.doc).collect();
    assert!(top_two.contains(&2) && top_two.contains(&5));

    let by_rank = SortRescorer::new(Sort::new(vec![SortField::field("rank"), SortField::doc()]));
    let third = by_rank.rescore(&searcher, &second, 3).unwrap();
    let docs: Vec<i32> = third.score_docs.iter().map(|sd| sd.doc).collect();
    // ranks: 0 -> 0, 1 -> 1, 2 -> 2, 5 -> 2
    assert_eq!(docs, vec![0, 1, 2]);
}

#[test]
fn test_rescore_explanations() {
    let reader = sample_reader().unwrap();
    let searcher = Searcher::new(&reader);
    let first_query = Query::term(BODY, "search");
    let rescorer = QueryRescorer::new(Query::term(BODY, "python"), 1.0);

    let first = searcher.explain(&first_query, 5).unwrap();
    let e = rescorer.explain(&searcher, first, 5).unwrap();
    let first_pass = searcher.search(&first_query, 10).unwrap();
    let rescored = rescorer.rescore(&searcher, &first_pass, 10).unwrap();
    let hit = rescored.score_docs.iter().find(|sd| sd.doc == 5).unwrap();
    assert!((e.value - hit.score).abs() < 1e-5);

    let sort = SortRescorer::new(Sort::new(vec![SortField::field("rank").reversed()]));
    let e = sort.explain(&searcher, searcher.explain(&first_query, 4).unwrap(), 4).unwrap();
    assert_eq!(e.details[0].description, "first pass score");
    assert_eq!(e.details[1].description, "sort field \"rank\"! value=1");
}

#[test]
fn test_zero_top_n_agrees_across_rescorers() {
    let reader = sample_reader().unwrap();
    let searcher = Searcher::new(&reader);
    let first = searcher.search(&Query::term(BODY, "rust"), 10).unwrap();
    assert!(first.total_hits > 0);

    let rescorers: [Box<dyn Rescorer>; 2] = [
        Box::new(QueryRescorer::new(Query::term(BODY, "async"), 2.0)),
        Box::new(SortRescorer::new(Sort::new(vec![SortField::field("rank")]))),
    ];
    for rescorer in &rescorers {
        let top = rescorer.rescore(&searcher, &first, 0).unwrap();
        assert!(top.score_docs.is_empty());
        assert_eq!(top.total_hits, first.total_hits);
        assert_eq!(top.max_score, f32::NEG_INFINITY);
    }
}
