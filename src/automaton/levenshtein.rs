// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Levenshtein automata for fuzzy terms.
//!
//! The NFA has one state per (characters consumed, edits spent) pair:
//!
//! ```text
//!            c[i]                     any char            any char
//! (i, e) ──────────▶ (i+1, e)   (i, e) ─────────▶ (i, e+1)   (i, e) ─────────▶ (i+1, e+1)
//!         match                        insertion                  substitution
//!
//!            ε                          c[i+1]       c[i]
//! (i, e) ──────────▶ (i+1, e+1)   (i, e) ─────▶ t ─────▶ (i+2, e+1)
//!         deletion                        transposition
//! ```
//!
//! States `(n, e)` accept. The first `prefix_length` characters admit no edits.
//! Determinization of this NFA is bounded like any other pattern.

use super::nfa::Nfa;
use super::ops::minimize;
use super::Automaton;
use crate::error::{Error, Result};

/// Highest edit distance a fuzzy automaton supports.
pub const MAX_EDITS: u8 = 2;

/// Shape of a fuzzy match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevenshteinOptions {
    pub max_edits: u8,
    /// Leading characters that must match exactly.
    pub prefix_length: usize,
    /// Count a swap of adjacent characters as one edit.
    pub transpositions: bool,
}

impl Default for LevenshteinOptions {
    fn default() -> Self {
        Self {
            max_edits: MAX_EDITS,
            prefix_length: 0,
            transpositions: true,
        }
    }
}

/// Minimal DFA accepting every string within `options.max_edits` of `term`.
pub fn levenshtein_automaton(
    term: &str,
    options: LevenshteinOptions,
    limit: usize,
) -> Result<Automaton> {
    if options.max_edits > MAX_EDITS {
        return Err(Error::InvalidArgument(format!(
            "max_edits must be at most {}, got {}",
            MAX_EDITS, options.max_edits
        )));
    }
    let chars: Vec<char> = term.chars().collect();
    let n = chars.len();
    let k = usize::from(options.max_edits);

    let mut nfa = Nfa::new();
    let states: Vec<Vec<usize>> = (0..=n)
        .map(|_| (0..=k).map(|_| nfa.add_state()).collect())
        .collect();
    for e in 0..=k {
        nfa.set_accept(states[n][e]);
    }

    let any = char::MAX as u32;
    for i in 0..=n {
        for e in 0..=k {
            let from = states[i][e];
            if i < n {
                let c = chars[i] as u32;
                nfa.add_code_point_range(from, states[i + 1][e], c, c);
            }
            if e == k || i < options.prefix_length {
                continue;
            }
            nfa.add_code_point_range(from, states[i][e + 1], 0, any);
            if i < n {
                nfa.add_code_point_range(from, states[i + 1][e + 1], 0, any);
                nfa.add_epsilon(from, states[i + 1][e + 1]);
            }
            if options.transpositions && i + 1 < n && chars[i] != chars[i + 1] {
                let swapped = nfa.add_state();
                let (a, b) = (chars[i] as u32, chars[i + 1] as u32);
                nfa.add_code_point_range(from, swapped, b, b);
                nfa.add_code_point_range(swapped, states[i + 2][e + 1], a, a);
            }
        }
    }

    Ok(minimize(&nfa.determinize(states[0][0], limit, term)?))
}

/// Edit distance between `query` and `term`, counting adjacent swaps as one
/// edit when `transpositions` is set.
pub fn edit_distance(query: &[char], term: &str, transpositions: bool) -> usize {
    let term: Vec<char> = term.chars().collect();
    let n = term.len();

    let mut before: Vec<usize> = vec![0; n + 1];
    let mut prev_row: Vec<usize> = (0..=n).collect();
    let mut curr_row: Vec<usize> = vec![0; n + 1];

    for (i, &qc) in query.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, &tc) in term.iter().enumerate() {
            let cost = usize::from(qc != tc);
            curr_row[j + 1] = (prev_row[j] + cost)
                .min(prev_row[j + 1] + 1) // deletion
                .min(curr_row[j] + 1); // insertion
            if transpositions && i > 0 && j > 0 && qc == term[j - 1] && query[i - 1] == tc {
                curr_row[j + 1] = curr_row[j + 1].min(before[j - 1] + 1);
            }
        }
        std::mem::swap(&mut before, &mut prev_row);
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[n]
}

/// Boost of a fuzzy match: 1 for an exact match, falling linearly with the
/// edits spent relative to the shorter of the two strings.
pub(crate) fn fuzzy_boost(distance: usize, query_len: usize, term_len: usize) -> f32 {
    if distance == 0 {
        return 1.0;
    }
    let shorter = query_len.min(term_len).max(1);
    (1.0 - distance as f32 / shorter as f32).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within(term: &str, candidate: &str, max_edits: u8) -> bool {
        let options = LevenshteinOptions {
            max_edits,
            ..LevenshteinOptions::default()
        };
        levenshtein_automaton(term, options, 10_000)
            .unwrap()
            .run(candidate.as_bytes())
    }

    #[test]
    fn test_edit_operations() {
        assert!(within("engine", "engine", 0));
        assert!(!within("engine", "engina", 0));
        assert!(within("engine", "engina", 1)); // substitution
        assert!(within("engine", "engne", 1)); // deletion
        assert!(within("engine", "enginxe", 1)); // insertion
        assert!(within("engine", "engien", 1)); // transposition
        assert!(!within("engine", "egn", 2));
        assert!(within("engine", "egne", 2));
    }

    #[test]
    fn test_transpositions_can_be_disabled() {
        let options = LevenshteinOptions {
            max_edits: 1,
            prefix_length: 0,
            transpositions: false,
        };
        let a = levenshtein_automaton("ab", options, 1000).unwrap();
        assert!(!a.run(b"ba"));
    }

    #[test]
    fn test_prefix_is_exact() {
        let options = LevenshteinOptions {
            max_edits: 1,
            prefix_length: 2,
            transpositions: true,
        };
        let a = levenshtein_automaton("hello", options, 1000).unwrap();
        assert!(a.run(b"helo"));
        assert!(a.run(b"hellp"));
        assert!(!a.run(b"jello"));
        assert!(!a.run(b"ehllo"));
    }

    #[test]
    fn test_unicode_counts_code_points() {
        assert!(within("café", "cafe", 1));
        assert!(within("naïve", "naive", 1));
    }

    #[test]
    fn test_max_edits_bound() {
        let options = LevenshteinOptions {
            max_edits: 3,
            ..LevenshteinOptions::default()
        };
        assert!(matches!(
            levenshtein_automaton("abc", options, 1000),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_edit_distance() {
        let q: Vec<char> = "kitten".chars().collect();
        assert_eq!(edit_distance(&q, "sitting", false), 3);
        assert_eq!(edit_distance(&q, "kitten", false), 0);
        let ab: Vec<char> = "ab".chars().collect();
        assert_eq!(edit_distance(&ab, "ba", false), 2);
        assert_eq!(edit_distance(&ab, "ba", true), 1);
        assert_eq!(edit_distance(&[], "abc", true), 3);
    }

    #[test]
    fn test_fuzzy_boost() {
        assert_eq!(fuzzy_boost(0, 5, 5), 1.0);
        assert!((fuzzy_boost(1, 5, 4) - 0.75).abs() < 1e-6);
        assert_eq!(fuzzy_boost(2, 1, 3), 0.0);
    }
}
