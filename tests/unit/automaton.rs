// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Pattern compilation and dictionary intersection.

use crate::common::{dictionary, enumerate};
use quarry::automaton::{
    levenshtein_automaton, prefix_automaton, range_automaton, regexp_automaton,
    wildcard_automaton, AutomatonKind, CompiledAutomaton, LevenshteinOptions,
};
use quarry::Error;

const LIMIT: usize = 10_000;

fn compiled(automaton: quarry::automaton::Automaton) -> CompiledAutomaton {
    CompiledAutomaton::new(automaton, LIMIT).unwrap()
}

#[test]
fn test_bracket_pattern_compares_only_candidates() {
    let dict = dictionary(&["ant", "do", "dog", "dot", "lo", "log", "zoo"]);
    let a = CompiledAutomaton::normal(regexp_automaton("[dl]og?", LIMIT).unwrap(), LIMIT).unwrap();
    let (terms, comparisons) = enumerate(&dict, &a);
    assert_eq!(terms, vec!["do", "dog", "lo", "log"]);
    assert_eq!(comparisons, 4);
}

#[test]
fn test_wildcard_single_character() {
    let dict = dictionary(&["test", "text", "tent", "teat", "toast"]);
    let (terms, _) = enumerate(&dict, &compiled(wildcard_automaton("te?t", LIMIT).unwrap()));
    assert_eq!(terms, vec!["teat", "tent", "test", "text"]);
}

#[test]
fn test_classification() {
    assert_eq!(compiled(prefix_automaton(b"car")).kind(), &AutomatonKind::Prefix(b"car".to_vec()));
    assert_eq!(
        compiled(wildcard_automaton("cat", LIMIT).unwrap()).kind(),
        &AutomatonKind::Single(b"cat".to_vec())
    );
    assert_eq!(compiled(wildcard_automaton("*", LIMIT).unwrap()).kind(), &AutomatonKind::All);
    assert_eq!(compiled(regexp_automaton("#", LIMIT).unwrap()).kind(), &AutomatonKind::None);
    assert_eq!(compiled(wildcard_automaton("c?t", LIMIT).unwrap()).kind(), &AutomatonKind::Normal);
}

#[test]
fn test_range_bounds() {
    let dict = dictionary(&["apple", "banana", "blueberry", "cherry", "date"]);
    let a = compiled(range_automaton(Some(b"b"), Some(b"cherry"), true, false));
    let (terms, _) = enumerate(&dict, &a);
    assert_eq!(terms, vec!["banana", "blueberry"]);

    let a = compiled(range_automaton(Some(b"banana"), None, false, true));
    let (terms, _) = enumerate(&dict, &a);
    assert_eq!(terms, vec!["blueberry", "cherry", "date"]);
}

#[test]
fn test_fuzzy_one_edit() {
    let dict = dictionary(&["box", "fix", "fox", "foxes", "fx", "ox", "zebra"]);
    let options = LevenshteinOptions {
        max_edits: 1,
        ..LevenshteinOptions::default()
    };
    let a = compiled(levenshtein_automaton("fox", options, LIMIT).unwrap());
    let (terms, _) = enumerate(&dict, &a);
    assert_eq!(terms, vec!["box", "fix", "fox", "fx", "ox"]);
}

#[test]
fn test_unicode_wildcard_counts_code_points() {
    let dict = dictionary(&["cafe", "café", "caf", "cafés"]);
    let (terms, _) = enumerate(&dict, &compiled(wildcard_automaton("caf?", LIMIT).unwrap()));
    assert_eq!(terms, vec!["cafe", "café"]);
}

#[test]
fn test_state_budget_exceeded() {
    let pattern = "(a|b)*a(a|b)(a|b)(a|b)(a|b)(a|b)(a|b)(a|b)(a|b)";
    assert!(matches!(regexp_automaton(pattern, 10), Err(Error::TooComplex { .. })));
    assert!(regexp_automaton(pattern, LIMIT).is_ok());
}

#[test]
fn test_malformed_pattern_reports_position() {
    match regexp_automaton("ab(c", LIMIT) {
        Err(Error::InvalidPattern { position, .. }) => assert_eq!(position, 4),
        other => panic!("expected InvalidPattern, got {:?}", other.map(|_| ())),
    }
}
