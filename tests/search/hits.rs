// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Lazily grown result sets.

use crate::common::{reader, BODY};
use quarry::{Hits, Query, SearchConfig, Searcher};

#[test]
fn test_walk_every_hit() {
    let texts: Vec<String> = (0..250).map(|i| format!("shared doc{}", i)).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let reader = reader(&refs, 64).unwrap();
    let searcher = Searcher::new(&reader);
    let mut hits = Hits::new(&searcher, &Query::term(BODY, "shared")).unwrap();
    assert_eq!(hits.length(), 250);

    let mut seen = Vec::new();
    for n in 0..hits.length() {
        seen.push(hits.id(n).unwrap());
        assert!(hits.score(n).unwrap() <= 1.0);
    }
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 250);
}

#[test]
fn test_stored_fields_round_trip() {
    let reader = reader(&["alpha beta", "beta gamma", "gamma delta"], 2).unwrap();
    let config = SearchConfig {
        hits_cache_capacity: 1,
        ..SearchConfig::default()
    };
    let searcher = Searcher::with_config(&reader, config);
    let mut hits = Hits::new(&searcher, &Query::term(BODY, "gamma")).unwrap();
    assert_eq!(hits.length(), 2);
    for n in 0..2 {
        let doc = hits.doc(n).unwrap();
        assert!(doc.get(BODY).unwrap().contains("gamma"));
    }
    assert_eq!(hits.cached(), 1);
    assert!(hits.doc(2).is_err());
}
