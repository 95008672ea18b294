// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Byte-level automata for multi-term matching.
//!
//! Wildcards, regexps, prefixes, term ranges and fuzzy terms all end up as the
//! same thing: a minimal deterministic automaton over bytes. That automaton is
//! then walked *together with* the sorted term dictionary, so the dictionary is
//! only consulted where the automaton could still accept something.
//!
//! # Pipeline
//!
//! ```text
//! pattern ──▶ Ast ──▶ Nfa ──determinize──▶ Automaton ──minimize──▶ CompiledAutomaton
//!  (regexp,   (regexp  (Thompson, UTF-8     (subset       (Moore,      (kind, run table,
//!   wildcard)  parser)  byte ranges)         construction) dead states) common prefix/suffix)
//! ```
//!
//! Code points become byte ranges through UTF-8 sequences (`utf8.rs`), so the
//! automaton accepts exactly the UTF-8 encodings of the strings the pattern
//! describes and terms can be compared byte by byte. "Any string" (`*`, `@`)
//! is the one exception: it is any byte sequence, which is the same thing on
//! dictionaries of valid UTF-8 and keeps prefix patterns recognizable.
//!
//! # Modules
//!
//! | Module         | Role                                                  |
//! |----------------|-------------------------------------------------------|
//! | `nfa`          | Thompson construction and subset determinization      |
//! | `ops`          | minimization, intersection, reversal, basic languages |
//! | `utf8`         | code point ranges to UTF-8 byte-range sequences       |
//! | `regexp`       | regular expression parser                             |
//! | `wildcard`     | `*` / `?` patterns                                    |
//! | `levenshtein`  | edit-distance automata for fuzzy terms                |
//! | `run`          | dense 256-wide transition table                       |
//! | `compiled`     | classification and dictionary intersection entry      |
//! | `terms_enum`   | the seeking terms enumerator                          |

mod compiled;
mod levenshtein;
mod nfa;
mod ops;
mod regexp;
mod run;
mod terms_enum;
mod utf8;
mod wildcard;

pub use compiled::{AutomatonKind, CompiledAutomaton};
pub use levenshtein::{edit_distance, levenshtein_automaton, LevenshteinOptions, MAX_EDITS};
pub(crate) use levenshtein::fuzzy_boost;
pub use ops::{
    intersection, make_any_string, make_empty, make_string, minimize, prefix_automaton,
    range_automaton,
};
pub use regexp::{regexp_automaton, RegExp};
pub use run::ByteRunAutomaton;
pub use terms_enum::{
    AcceptStatus, AutomatonFilter, AutomatonTermsEnum, FilteredTermsEnum, PrefixFilter,
    SingleTermFilter, TermFilter,
};
pub use wildcard::wildcard_automaton;

pub(crate) use nfa::Nfa;

/// Index of a state. State 0 is always the initial state.
pub type StateId = usize;

/// Edge on every byte in `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    pub min: u8,
    pub max: u8,
    pub to: StateId,
}

/// A deterministic automaton over bytes.
///
/// Transitions out of each state are sorted by `min` and disjoint. A missing
/// transition means rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Automaton {
    accept: Vec<bool>,
    transitions: Vec<Vec<Transition>>,
}

impl Automaton {
    /// A fresh state with no transitions.
    pub(crate) fn add_state(&mut self, accept: bool) -> StateId {
        self.accept.push(accept);
        self.transitions.push(Vec::new());
        self.accept.len() - 1
    }

    /// Install the outgoing edges of `state`, sorting and merging adjacent ranges.
    pub(crate) fn set_transitions(&mut self, state: StateId, mut edges: Vec<Transition>) {
        edges.sort_by_key(|t| (t.min, t.max));
        let mut merged: Vec<Transition> = Vec::with_capacity(edges.len());
        for t in edges {
            match merged.last_mut() {
                Some(last) if last.to == t.to && u16::from(last.max) + 1 >= u16::from(t.min) => {
                    last.max = last.max.max(t.max);
                }
                _ => merged.push(t),
            }
        }
        crate::contracts::check_transitions(&merged);
        self.transitions[state] = merged;
    }

    pub fn num_states(&self) -> usize {
        self.accept.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.iter().map(Vec::len).sum()
    }

    pub fn is_accept(&self, state: StateId) -> bool {
        self.accept[state]
    }

    /// Sorted, disjoint edges out of `state`.
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        &self.transitions[state]
    }

    pub fn step(&self, state: StateId, byte: u8) -> Option<StateId> {
        let edges = &self.transitions[state];
        let i = edges.partition_point(|t| t.max < byte);
        edges.get(i).filter(|t| t.min <= byte).map(|t| t.to)
    }

    /// Does the automaton accept `input`?
    pub fn run(&self, input: &[u8]) -> bool {
        if self.accept.is_empty() {
            return false;
        }
        let mut state = 0;
        for &byte in input {
            match self.step(state, byte) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.accept[state]
    }

    /// True when no accept state is reachable.
    pub fn is_empty_language(&self) -> bool {
        !self.reachable().iter().zip(&self.accept).any(|(&r, &a)| r && a)
    }

    /// True when the accepted language is finite. Assumes no dead states.
    pub fn is_finite(&self) -> bool {
        // 0 = unvisited, 1 = on stack, 2 = done
        let mut color = vec![0u8; self.num_states()];
        if self.num_states() == 0 {
            return true;
        }
        let mut stack: Vec<(StateId, usize)> = vec![(0, 0)];
        color[0] = 1;
        while let Some((state, edge)) = stack.pop() {
            match self.transitions[state].get(edge) {
                Some(t) => {
                    stack.push((state, edge + 1));
                    match color[t.to] {
                        1 => return false,
                        0 => {
                            color[t.to] = 1;
                            stack.push((t.to, 0));
                        }
                        _ => {}
                    }
                }
                None => color[state] = 2,
            }
        }
        true
    }

    /// Longest byte string every accepted string starts with.
    pub fn common_prefix(&self) -> Vec<u8> {
        let mut prefix = Vec::new();
        if self.num_states() == 0 {
            return prefix;
        }
        let mut visited = vec![false; self.num_states()];
        let mut state = 0;
        loop {
            visited[state] = true;
            let edges = &self.transitions[state];
            if self.accept[state] || edges.len() != 1 || edges[0].min != edges[0].max {
                return prefix;
            }
            prefix.push(edges[0].min);
            state = edges[0].to;
            if visited[state] {
                return prefix;
            }
        }
    }

    /// The one string accepted, if the language is a singleton.
    pub fn single_string(&self) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        let mut state = 0;
        for _ in 0..=self.num_states() {
            let edges = self.transitions.get(state)?;
            if self.accept[state] {
                return edges.is_empty().then_some(out);
            }
            match edges.as_slice() {
                [t] if t.min == t.max => {
                    out.push(t.min);
                    state = t.to;
                }
                _ => return None,
            }
        }
        None
    }

    /// True when `state` accepts and loops to itself on every byte.
    pub(crate) fn is_any_string_state(&self, state: StateId) -> bool {
        self.accept[state]
            && matches!(
                self.transitions[state].as_slice(),
                [Transition { min: 0, max: 255, to }] if *to == state
            )
    }

    fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.num_states()];
        if self.num_states() == 0 {
            return seen;
        }
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(state) = stack.pop() {
            for t in &self.transitions[state] {
                if !seen[t.to] {
                    seen[t.to] = true;
                    stack.push(t.to);
                }
            }
        }
        seen
    }

    /// Accepted strings in byte order, up to `limit`. Finite languages only
    /// make sense here; infinite ones are cut off at `limit`.
    pub fn accepted_strings(&self, limit: usize) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        if self.num_states() > 0 {
            self.collect_strings(0, &mut path, limit, &mut out, 0);
        }
        out
    }

    fn collect_strings(
        &self,
        state: StateId,
        path: &mut Vec<u8>,
        limit: usize,
        out: &mut Vec<Vec<u8>>,
        depth: usize,
    ) {
        if out.len() >= limit || depth > self.num_states() * 4 + 16 {
            return;
        }
        if self.accept[state] {
            out.push(path.clone());
        }
        for t in &self.transitions[state] {
            for byte in t.min..=t.max {
                path.push(byte);
                self.collect_strings(t.to, path, limit, out, depth + 1);
                path.pop();
                if out.len() >= limit {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc_or_abd() -> Automaton {
        // 0 -a-> 1 -b-> 2 -[c-d]-> 3(accept)
        let mut a = Automaton::default();
        for accept in [false, false, false, true] {
            a.add_state(accept);
        }
        a.set_transitions(0, vec![Transition { min: b'a', max: b'a', to: 1 }]);
        a.set_transitions(1, vec![Transition { min: b'b', max: b'b', to: 2 }]);
        a.set_transitions(
            2,
            vec![
                Transition { min: b'd', max: b'd', to: 3 },
                Transition { min: b'c', max: b'c', to: 3 },
            ],
        );
        a
    }

    #[test]
    fn test_set_transitions_merges_adjacent_ranges() {
        let a = abc_or_abd();
        assert_eq!(a.transitions(2), &[Transition { min: b'c', max: b'd', to: 3 }]);
        assert_eq!(a.num_transitions(), 3);
    }

    #[test]
    fn test_run_and_step() {
        let a = abc_or_abd();
        assert!(a.run(b"abc"));
        assert!(a.run(b"abd"));
        assert!(!a.run(b"abe"));
        assert!(!a.run(b"ab"));
        assert_eq!(a.step(0, b'a'), Some(1));
        assert_eq!(a.step(0, b'b'), None);
    }

    #[test]
    fn test_shape_queries() {
        let a = abc_or_abd();
        assert!(a.is_finite());
        assert!(!a.is_empty_language());
        assert_eq!(a.common_prefix(), b"ab");
        assert_eq!(a.single_string(), None);
        assert_eq!(a.accepted_strings(10), vec![b"abc".to_vec(), b"abd".to_vec()]);
    }

    #[test]
    fn test_loop_is_infinite() {
        let mut a = Automaton::default();
        a.add_state(true);
        a.set_transitions(0, vec![Transition { min: 0, max: 255, to: 0 }]);
        assert!(!a.is_finite());
        assert!(a.is_any_string_state(0));
        assert!(a.run(b""));
        assert!(a.run(&[0xFF, 0x00]));
    }
}
