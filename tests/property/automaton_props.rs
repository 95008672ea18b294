// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Automata accept exactly their languages, and dictionary intersection
//! finds exactly the accepted terms.

use proptest::prelude::*;

use crate::common::{dictionary, enumerate, enumerate_blocks};
use quarry::automaton::{
    edit_distance, levenshtein_automaton, prefix_automaton, range_automaton, regexp_automaton,
    wildcard_automaton, CompiledAutomaton, LevenshteinOptions,
};

const LIMIT: usize = 10_000;

// ============================================================================
// ORACLES
// ============================================================================

/// Textbook wildcard matching over code points.
fn wildcard_matches(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| wildcard_matches(rest, &text[skip..])),
        Some(('?', rest)) => !text.is_empty() && wildcard_matches(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && wildcard_matches(rest, &text[1..]),
    }
}

// ============================================================================
// STRATEGIES
// ============================================================================

fn word_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[abé]{0,6}").unwrap()
}

fn dictionary_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word_strategy(), 0..24)
}

fn wildcard_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ab*?]{0,5}").unwrap()
}

fn regexp_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "a*", "(ab)+", "[ab]é?", ".b.*", "a|bé|", "#", "@", "[^a]{1,3}", "é+a", "\"ab\"|b{2,}",
    ])
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    /// Property: a wildcard automaton agrees with direct pattern matching.
    #[test]
    fn prop_wildcard_matches_oracle(pattern in wildcard_strategy(), word in word_strategy()) {
        let automaton = wildcard_automaton(&pattern, LIMIT).unwrap();
        let p: Vec<char> = pattern.chars().collect();
        let w: Vec<char> = word.chars().collect();
        prop_assert_eq!(automaton.run(word.as_bytes()), wildcard_matches(&p, &w), "{} vs {}", pattern, word);
    }

    /// Property: a Levenshtein automaton accepts exactly the terms within
    /// `max_edits` of the query.
    #[test]
    fn prop_levenshtein_matches_edit_distance(
        query in word_strategy(),
        word in word_strategy(),
        max_edits in 0u8..=2,
        transpositions in any::<bool>(),
    ) {
        let options = LevenshteinOptions { max_edits, prefix_length: 0, transpositions };
        let automaton = levenshtein_automaton(&query, options, LIMIT).unwrap();
        let q: Vec<char> = query.chars().collect();
        let within = edit_distance(&q, &word, transpositions) <= usize::from(max_edits);
        prop_assert_eq!(automaton.run(word.as_bytes()), within, "{} vs {}", query, word);
    }

    /// Property: enumerating a dictionary through an automaton yields
    /// exactly the accepted terms, in dictionary order.
    #[test]
    fn prop_enumeration_matches_filter(words in dictionary_strategy(), pattern in wildcard_strategy()) {
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let dict = dictionary(&refs);
        let compiled = CompiledAutomaton::new(wildcard_automaton(&pattern, LIMIT).unwrap(), LIMIT).unwrap();

        let mut expected: Vec<String> = words.iter()
            .filter(|w| compiled.matches(w.as_bytes()))
            .cloned()
            .collect();
        expected.sort_unstable_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
        expected.dedup();

        let (terms, comparisons) = enumerate(&dict, &compiled);
        prop_assert_eq!(&terms, &expected);
        prop_assert!(comparisons <= dict.len() as u64);
    }

    /// Property: the array-backed and block-backed cursors enumerate the
    /// same terms for every pattern and block size.
    #[test]
    fn prop_cursor_choice_does_not_change_terms(
        words in dictionary_strategy(),
        wildcard in wildcard_strategy(),
        regexp in regexp_strategy(),
        block_size in 1usize..=5,
    ) {
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let dict = dictionary(&refs);
        let automata = [
            wildcard_automaton(&wildcard, LIMIT).unwrap(),
            regexp_automaton(regexp, LIMIT).unwrap(),
        ];
        for automaton in automata {
            let compiled = CompiledAutomaton::new(automaton, LIMIT).unwrap();
            let (slice_terms, _) = enumerate(&dict, &compiled);
            let (block_terms, _) = enumerate_blocks(&dict, &compiled, block_size);
            prop_assert_eq!(block_terms, slice_terms, "{} / {} at block size {}", wildcard, regexp, block_size);
        }
    }

    /// Property: a prefix automaton enumerates the terms starting with it.
    #[test]
    fn prop_prefix_enumeration(words in dictionary_strategy(), prefix in word_strategy()) {
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let dict = dictionary(&refs);
        let compiled = CompiledAutomaton::new(prefix_automaton(prefix.as_bytes()), LIMIT).unwrap();
        let (terms, _) = enumerate(&dict, &compiled);
        prop_assert!(terms.iter().all(|t| t.starts_with(&prefix)));
        let expected = words.iter()
            .filter(|w| w.starts_with(&prefix))
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        prop_assert_eq!(terms.len(), expected);
    }

    /// Property: a range automaton accepts by unsigned byte comparison.
    #[test]
    fn prop_range_is_byte_order(
        lower in word_strategy(),
        upper in word_strategy(),
        word in word_strategy(),
        include_lower in any::<bool>(),
        include_upper in any::<bool>(),
    ) {
        let automaton = range_automaton(Some(lower.as_bytes()), Some(upper.as_bytes()), include_lower, include_upper);
        let w = word.as_bytes();
        let above = if include_lower { w >= lower.as_bytes() } else { w > lower.as_bytes() };
        let below = if include_upper { w <= upper.as_bytes() } else { w < upper.as_bytes() };
        prop_assert_eq!(automaton.run(w), above && below);
    }
}
