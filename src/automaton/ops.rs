// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Automaton algebra: basic languages, minimization, intersection and the
//! byte-order range construction.

use std::collections::{HashMap, VecDeque};

use super::{Automaton, Nfa, StateId, Transition};
use crate::error::Result;

// ============================================================================
// BASIC LANGUAGES
// ============================================================================

/// Accepts nothing.
pub fn make_empty() -> Automaton {
    let mut a = Automaton::default();
    a.add_state(false);
    a
}

/// Accepts exactly `bytes`.
pub fn make_string(bytes: &[u8]) -> Automaton {
    let mut a = Automaton::default();
    let mut state = a.add_state(bytes.is_empty());
    for (i, &b) in bytes.iter().enumerate() {
        let next = a.add_state(i + 1 == bytes.len());
        a.set_transitions(state, vec![Transition { min: b, max: b, to: next }]);
        state = next;
    }
    a
}

/// Accepts every byte string, the empty one included.
pub fn make_any_string() -> Automaton {
    let mut a = Automaton::default();
    let state = a.add_state(true);
    a.set_transitions(state, vec![Transition { min: 0, max: 255, to: state }]);
    a
}

/// Accepts every string starting with `prefix`.
pub fn prefix_automaton(prefix: &[u8]) -> Automaton {
    let mut a = Automaton::default();
    let mut state = a.add_state(prefix.is_empty());
    for (i, &b) in prefix.iter().enumerate() {
        let next = a.add_state(i + 1 == prefix.len());
        a.set_transitions(state, vec![Transition { min: b, max: b, to: next }]);
        state = next;
    }
    a.set_transitions(state, vec![Transition { min: 0, max: 255, to: state }]);
    a
}

/// Strings between `lower` and `upper` in unsigned byte order. A missing
/// bound is open.
pub fn range_automaton(
    lower: Option<&[u8]>,
    upper: Option<&[u8]>,
    include_lower: bool,
    include_upper: bool,
) -> Automaton {
    match (lower, upper) {
        (None, None) => make_any_string(),
        (Some(lower), None) => minimize(&at_least(lower, include_lower)),
        (None, Some(upper)) => minimize(&at_most(upper, include_upper)),
        (Some(lower), Some(upper)) => {
            intersection(&at_least(lower, include_lower), &at_most(upper, include_upper))
        }
    }
}

fn at_least(lower: &[u8], inclusive: bool) -> Automaton {
    let mut a = Automaton::default();
    let any = a.add_state(true);
    a.set_transitions(any, vec![Transition { min: 0, max: 255, to: any }]);
    let states: Vec<StateId> = (0..=lower.len())
        .map(|i| a.add_state(i == lower.len() && inclusive))
        .collect();
    for (i, &b) in lower.iter().enumerate() {
        let mut edges = vec![Transition { min: b, max: b, to: states[i + 1] }];
        if b < 255 {
            edges.push(Transition { min: b + 1, max: 255, to: any });
        }
        a.set_transitions(states[i], edges);
    }
    a.set_transitions(states[lower.len()], vec![Transition { min: 0, max: 255, to: any }]);
    with_initial(a, states[0])
}

fn at_most(upper: &[u8], inclusive: bool) -> Automaton {
    let mut a = Automaton::default();
    let any = a.add_state(true);
    a.set_transitions(any, vec![Transition { min: 0, max: 255, to: any }]);
    let states: Vec<StateId> = (0..=upper.len())
        .map(|i| a.add_state(i < upper.len() || inclusive))
        .collect();
    for (i, &b) in upper.iter().enumerate() {
        let mut edges = vec![Transition { min: b, max: b, to: states[i + 1] }];
        if b > 0 {
            edges.push(Transition { min: 0, max: b - 1, to: any });
        }
        a.set_transitions(states[i], edges);
    }
    with_initial(a, states[0])
}

/// Renumber so that `initial` becomes state 0.
fn with_initial(a: Automaton, initial: StateId) -> Automaton {
    if initial == 0 {
        return a;
    }
    let n = a.num_states();
    let map = |s: StateId| {
        if s == initial {
            0
        } else if s == 0 {
            initial
        } else {
            s
        }
    };
    let mut out = Automaton::default();
    for i in 0..n {
        out.add_state(a.is_accept(map(i)));
    }
    for i in 0..n {
        let edges = a
            .transitions(map(i))
            .iter()
            .map(|t| Transition { to: map(t.to), ..*t })
            .collect();
        out.set_transitions(i, edges);
    }
    out
}

// ============================================================================
// MINIMIZATION
// ============================================================================

/// Drop states that are unreachable or cannot reach an accept state.
fn remove_dead_states(a: &Automaton) -> Automaton {
    let n = a.num_states();
    if n == 0 {
        return make_empty();
    }
    let mut reachable = vec![false; n];
    let mut stack = vec![0];
    reachable[0] = true;
    let mut incoming: Vec<Vec<StateId>> = vec![Vec::new(); n];
    while let Some(s) = stack.pop() {
        for t in a.transitions(s) {
            incoming[t.to].push(s);
            if !reachable[t.to] {
                reachable[t.to] = true;
                stack.push(t.to);
            }
        }
    }
    let mut live = vec![false; n];
    let mut stack: Vec<StateId> = (0..n).filter(|&s| reachable[s] && a.is_accept(s)).collect();
    for &s in &stack {
        live[s] = true;
    }
    while let Some(s) = stack.pop() {
        for &p in &incoming[s] {
            if !live[p] {
                live[p] = true;
                stack.push(p);
            }
        }
    }
    if !live[0] {
        return make_empty();
    }

    let mut remap = vec![usize::MAX; n];
    let mut out = Automaton::default();
    for s in (0..n).filter(|&s| live[s]) {
        remap[s] = out.add_state(a.is_accept(s));
    }
    for s in (0..n).filter(|&s| live[s]) {
        let edges = a
            .transitions(s)
            .iter()
            .filter(|t| live[t.to])
            .map(|t| Transition { to: remap[t.to], ..*t })
            .collect();
        out.set_transitions(remap[s], edges);
    }
    out
}

/// Minimal equivalent automaton with no dead states.
///
/// Moore partition refinement; a missing edge behaves like an edge to an
/// implicit reject state, so trimmed automata minimize correctly.
pub fn minimize(a: &Automaton) -> Automaton {
    let a = remove_dead_states(a);
    let n = a.num_states();

    let mut class: Vec<usize> = (0..n).map(|s| usize::from(a.is_accept(s))).collect();
    let mut classes = class.iter().collect::<std::collections::HashSet<_>>().len();
    loop {
        let mut ids: HashMap<(usize, Vec<(u8, u8, usize)>), usize> = HashMap::new();
        let mut next = Vec::with_capacity(n);
        for s in 0..n {
            let signature = (class[s], class_edges(&a, s, &class));
            let len = ids.len();
            next.push(*ids.entry(signature).or_insert(len));
        }
        let refined = ids.len();
        class = next;
        if refined == classes {
            break;
        }
        classes = refined;
    }

    // breadth-first numbering over sorted edges, so equal languages give
    // identical automata
    let mut order = vec![usize::MAX; classes];
    let mut representative = vec![0];
    order[class[0]] = 0;
    let mut queue = VecDeque::from([0]);
    while let Some(s) = queue.pop_front() {
        for t in a.transitions(s) {
            if order[class[t.to]] == usize::MAX {
                order[class[t.to]] = representative.len();
                representative.push(t.to);
                queue.push_back(t.to);
            }
        }
    }
    let mut out = Automaton::default();
    for &s in &representative {
        out.add_state(a.is_accept(s));
    }
    for (id, &s) in representative.iter().enumerate() {
        let edges = a
            .transitions(s)
            .iter()
            .map(|t| Transition { to: order[class[t.to]], ..*t })
            .collect();
        out.set_transitions(id, edges);
    }
    out
}

fn class_edges(a: &Automaton, s: StateId, class: &[usize]) -> Vec<(u8, u8, usize)> {
    let mut edges: Vec<(u8, u8, usize)> = Vec::new();
    for t in a.transitions(s) {
        let c = class[t.to];
        match edges.last_mut() {
            Some(last) if last.2 == c && u16::from(last.1) + 1 == u16::from(t.min) => last.1 = t.max,
            _ => edges.push((t.min, t.max, c)),
        }
    }
    edges
}

// ============================================================================
// PRODUCT AND REVERSAL
// ============================================================================

/// Strings accepted by both automata, minimized.
pub fn intersection(a: &Automaton, b: &Automaton) -> Automaton {
    if a.num_states() == 0 || b.num_states() == 0 {
        return make_empty();
    }
    let mut out = Automaton::default();
    let mut ids: HashMap<(StateId, StateId), StateId> = HashMap::new();
    let mut queue = VecDeque::new();
    ids.insert((0, 0), out.add_state(a.is_accept(0) && b.is_accept(0)));
    queue.push_back((0, 0));
    while let Some((x, y)) = queue.pop_front() {
        let from = ids[&(x, y)];
        let mut edges = Vec::new();
        for t1 in a.transitions(x) {
            for t2 in b.transitions(y) {
                let (min, max) = (t1.min.max(t2.min), t1.max.min(t2.max));
                if min > max {
                    continue;
                }
                let key = (t1.to, t2.to);
                let to = match ids.get(&key) {
                    Some(&id) => id,
                    None => {
                        let id = out.add_state(a.is_accept(key.0) && b.is_accept(key.1));
                        ids.insert(key, id);
                        queue.push_back(key);
                        id
                    }
                };
                edges.push(Transition { min, max, to });
            }
        }
        out.set_transitions(from, edges);
    }
    minimize(&out)
}

/// Longest byte string every accepted string ends with.
pub(crate) fn common_suffix(a: &Automaton, limit: usize) -> Result<Vec<u8>> {
    let (nfa, start) = Nfa::reversed(a);
    let reversed = minimize(&nfa.determinize(start, limit, "")?);
    let mut suffix = reversed.common_prefix();
    suffix.reverse();
    Ok(suffix)
}
