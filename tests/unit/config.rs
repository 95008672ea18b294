// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Loading and applying search configuration.

use std::fs;

use crate::common::{reader, BODY};
use quarry::{Error, Query, RewriteMethod, SearchConfig, Searcher, TermsCursor};

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quarry.json");
    fs::write(
        &path,
        r#"{"max_clause_count": 2, "default_rewrite": "scoring_boolean", "terms_cursor": {"block": {"block_size": 4}}}"#,
    )
    .unwrap();
    let config = SearchConfig::from_path(&path).unwrap();
    assert_eq!(config.max_clause_count, 2);
    assert_eq!(config.default_rewrite, RewriteMethod::ScoringBoolean);
    assert_eq!(config.terms_cursor, TermsCursor::Block { block_size: 4 });
    assert_eq!(config.top_terms_size, SearchConfig::default().top_terms_size);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SearchConfig::from_path(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_clause_limit_applies_to_scoring_rewrite() {
    let reader = reader(&["car card care cart cat"], 10).unwrap();
    let config = SearchConfig {
        max_clause_count: 2,
        default_rewrite: RewriteMethod::ScoringBoolean,
        ..SearchConfig::default()
    };
    let searcher = Searcher::with_config(&reader, config);
    let err = searcher.search(&Query::prefix(BODY, "car"), 10).unwrap_err();
    assert!(matches!(err, Error::TooManyClauses(2)));

    let narrow = Query::wildcard(BODY, "ca?");
    assert_eq!(searcher.count(&narrow).unwrap(), 1);
}

#[test]
fn test_state_limit_applies_to_patterns() {
    let reader = reader(&["abba"], 10).unwrap();
    let config = SearchConfig {
        max_determinized_states: 8,
        ..SearchConfig::default()
    };
    let searcher = Searcher::with_config(&reader, config);
    let q = Query::regexp(BODY, "(a|b)*a(a|b)(a|b)(a|b)(a|b)(a|b)(a|b)");
    assert!(matches!(searcher.search(&q, 1), Err(Error::TooComplex { .. })));
}
