// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Nondeterministic automata with epsilon edges, and subset construction.

use std::collections::{HashMap, VecDeque};

use super::utf8::Utf8Sequences;
use super::{Automaton, StateId, Transition};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
struct NfaState {
    accept: bool,
    epsilon: Vec<StateId>,
    edges: Vec<(u8, u8, StateId)>,
}

/// Thompson-style NFA over bytes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Nfa {
    states: Vec<NfaState>,
}

impl Nfa {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self) -> StateId {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    pub fn set_accept(&mut self, state: StateId) {
        self.states[state].accept = true;
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from].epsilon.push(to);
    }

    pub fn add_edge(&mut self, from: StateId, min: u8, max: u8, to: StateId) {
        self.states[from].edges.push((min, max, to));
    }

    /// Edges from `from` to `to` accepting the UTF-8 encoding of any code
    /// point in `lo..=hi`.
    pub fn add_code_point_range(&mut self, from: StateId, to: StateId, lo: u32, hi: u32) {
        for seq in Utf8Sequences::new(lo, hi) {
            let ranges = seq.ranges();
            let mut state = from;
            for (i, range) in ranges.iter().enumerate() {
                let next = if i + 1 == ranges.len() { to } else { self.add_state() };
                self.add_edge(state, range.start, range.end, next);
                state = next;
            }
        }
    }

    /// Copy the edges of `dfa` into this NFA with every edge reversed.
    /// Returns the new start state, which reaches every former accept state.
    pub fn reversed(dfa: &Automaton) -> (Self, StateId) {
        let mut nfa = Nfa::new();
        for _ in 0..dfa.num_states() {
            nfa.add_state();
        }
        let start = nfa.add_state();
        for state in 0..dfa.num_states() {
            for t in dfa.transitions(state) {
                nfa.add_edge(t.to, t.min, t.max, state);
            }
            if dfa.is_accept(state) {
                nfa.add_epsilon(start, state);
            }
        }
        if dfa.num_states() > 0 {
            nfa.set_accept(0);
        }
        (nfa, start)
    }

    fn closure(&self, seeds: impl IntoIterator<Item = StateId>) -> Vec<StateId> {
        let mut seen = vec![false; self.states.len()];
        let mut stack: Vec<StateId> = Vec::new();
        for s in seeds {
            if !seen[s] {
                seen[s] = true;
                stack.push(s);
            }
        }
        let mut out = Vec::new();
        while let Some(s) = stack.pop() {
            out.push(s);
            for &next in &self.states[s].epsilon {
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Subset construction starting from `start`.
    ///
    /// Fails with [`Error::TooComplex`] once more than `limit` DFA states
    /// would be needed. `pattern` is only used for the error.
    pub fn determinize(&self, start: StateId, limit: usize, pattern: &str) -> Result<Automaton> {
        let mut dfa = Automaton::default();
        let mut ids: HashMap<Vec<StateId>, StateId> = HashMap::new();
        let mut queue: VecDeque<Vec<StateId>> = VecDeque::new();

        let initial = self.closure([start]);
        let accept = initial.iter().any(|&s| self.states[s].accept);
        ids.insert(initial.clone(), dfa.add_state(accept));
        queue.push_back(initial);

        while let Some(set) = queue.pop_front() {
            let from = ids[&set];

            let mut points: Vec<u16> = Vec::new();
            for &s in &set {
                for &(min, max, _) in &self.states[s].edges {
                    points.push(u16::from(min));
                    points.push(u16::from(max) + 1);
                }
            }
            points.sort_unstable();
            points.dedup();

            let mut edges = Vec::new();
            for window in points.windows(2) {
                let (lo, hi) = (window[0], window[1] - 1);
                let targets = set.iter().flat_map(|&s| {
                    self.states[s]
                        .edges
                        .iter()
                        .filter(move |&&(min, max, _)| u16::from(min) <= lo && hi <= u16::from(max))
                        .map(|&(_, _, to)| to)
                });
                let target = self.closure(targets);
                if target.is_empty() {
                    continue;
                }
                let to = match ids.get(&target) {
                    Some(&id) => id,
                    None => {
                        if dfa.num_states() >= limit {
                            return Err(Error::TooComplex {
                                pattern: pattern.to_string(),
                                limit,
                            });
                        }
                        let accept = target.iter().any(|&s| self.states[s].accept);
                        let id = dfa.add_state(accept);
                        ids.insert(target.clone(), id);
                        queue.push_back(target);
                        id
                    }
                };
                // points are byte boundaries, so lo and hi fit in u8
                edges.push(Transition {
                    min: lo as u8,
                    max: hi as u8,
                    to,
                });
            }
            dfa.set_transitions(from, edges);
        }
        Ok(dfa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinize_union_of_literals() {
        // "ab" | "ac"
        let mut nfa = Nfa::new();
        let start = nfa.add_state();
        for last in [b'b', b'c'] {
            let a = nfa.add_state();
            let end = nfa.add_state();
            nfa.add_edge(start, b'a', b'a', a);
            nfa.add_edge(a, last, last, end);
            nfa.set_accept(end);
        }
        let dfa = nfa.determinize(start, 100, "ab|ac").unwrap();
        assert!(dfa.run(b"ab"));
        assert!(dfa.run(b"ac"));
        assert!(!dfa.run(b"a"));
        // one accept state per branch until minimization merges them
        assert_eq!(dfa.num_states(), 4);
        assert_eq!(crate::automaton::minimize(&dfa).num_states(), 3);
    }

    #[test]
    fn test_epsilon_closure_accepts_empty() {
        let mut nfa = Nfa::new();
        let start = nfa.add_state();
        let end = nfa.add_state();
        nfa.add_epsilon(start, end);
        nfa.set_accept(end);
        let dfa = nfa.determinize(start, 10, "").unwrap();
        assert!(dfa.run(b""));
        assert!(!dfa.run(b"x"));
    }

    #[test]
    fn test_overlapping_ranges_split() {
        let mut nfa = Nfa::new();
        let start = nfa.add_state();
        let x = nfa.add_state();
        let y = nfa.add_state();
        nfa.add_edge(start, b'a', b'm', x);
        nfa.add_edge(start, b'k', b'z', y);
        nfa.set_accept(y);
        let dfa = nfa.determinize(start, 10, "").unwrap();
        assert!(!dfa.run(b"a"));
        assert!(dfa.run(b"k"));
        assert!(dfa.run(b"z"));
    }

    #[test]
    fn test_state_limit() {
        // (a|b)*a(a|b)(a|b)(a|b): needs 16 DFA states
        let mut nfa = Nfa::new();
        let start = nfa.add_state();
        nfa.add_edge(start, b'a', b'b', start);
        let mut prev = nfa.add_state();
        nfa.add_edge(start, b'a', b'a', prev);
        for _ in 0..3 {
            let next = nfa.add_state();
            nfa.add_edge(prev, b'a', b'b', next);
            prev = next;
        }
        nfa.set_accept(prev);
        let err = nfa.determinize(start, 8, "(a|b)*a...").unwrap_err();
        assert!(matches!(err, Error::TooComplex { limit: 8, .. }));
        assert!(nfa.determinize(start, 64, "").is_ok());
    }

    #[test]
    fn test_code_point_range_is_utf8() {
        let mut nfa = Nfa::new();
        let start = nfa.add_state();
        let end = nfa.add_state();
        nfa.set_accept(end);
        nfa.add_code_point_range(start, end, 0, 0x10FFFF);
        let dfa = nfa.determinize(start, 100, ".").unwrap();
        for s in ["a", "é", "中", "😀"] {
            assert!(dfa.run(s.as_bytes()), "{}", s);
        }
        assert!(!dfa.run(b"ab"));
        assert!(!dfa.run(&[0xED, 0xA0, 0x80])); // encoded surrogate
    }
}
