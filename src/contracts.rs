// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Runtime contracts for the ordering invariants the engine relies on.
//!
//! Every check here is a `debug_assert!`: free in release builds, loud in
//! tests. They catch the bugs that are otherwise silent, like a postings list
//! that repeats a doc id or a term dictionary built out of order, long before
//! they surface as a wrong top-K.
//!
//! | Contract                     | Invariant                                    |
//! |------------------------------|----------------------------------------------|
//! | `check_strictly_increasing`  | doc id lists never repeat or go backwards    |
//! | `check_doc_progress`         | a cursor only ever moves forward             |
//! | `check_conjunction_agreement`| every AND child sits on the reported doc     |
//! | `check_terms_sorted`         | term dictionaries are in unsigned byte order |
//! | `check_heap`                 | a priority queue parent never beats a child  |
//! | `check_transitions`          | automaton edges are sorted and disjoint      |

use crate::automaton::Transition;
use crate::docset::DocId;

// ============================================================================
// DOC ID ORDER
// ============================================================================

/// Doc ids in a postings list or sorted set must strictly increase.
#[inline]
pub fn check_strictly_increasing(docs: &[DocId]) {
    debug_assert!(
        docs.windows(2).all(|w| w[0] < w[1]),
        "Contract violation: doc ids are not strictly increasing"
    );
}

/// A cursor's next id must be beyond its previous one.
#[inline]
pub fn check_doc_progress(previous: DocId, next: DocId) {
    debug_assert!(
        next > previous,
        "Contract violation: cursor moved from {} back to {}",
        previous,
        next
    );
}

/// A conjunction only reports a doc once every child is positioned on it.
#[inline]
pub fn check_conjunction_agreement(doc: DocId, others: impl Iterator<Item = DocId>) {
    if cfg!(debug_assertions) {
        let mut others = others;
        debug_assert!(
            others.all(|other| other == doc),
            "Contract violation: conjunction reported doc {} before its children agreed",
            doc
        );
    }
}

// ============================================================================
// TERM ORDER
// ============================================================================

/// Terms must be unique and sorted by unsigned bytes.
#[inline]
pub fn check_terms_sorted(terms: &[Vec<u8>]) {
    debug_assert!(
        terms.windows(2).all(|w| w[0] < w[1]),
        "Contract violation: term dictionary is not sorted in byte order"
    );
}

// ============================================================================
// HEAP ORDER
// ============================================================================

/// Binary heap in a slice: no child is "less" than its parent.
#[inline]
pub fn check_heap<T>(heap: &[T], size: usize, less_than: impl Fn(&T, &T) -> bool) {
    debug_assert!(
        (1..size).all(|i| !less_than(&heap[i], &heap[(i - 1) / 2])),
        "Contract violation: heap order broken"
    );
}

// ============================================================================
// AUTOMATON SHAPE
// ============================================================================

/// Transitions out of a state are sorted by `min` and never overlap.
#[inline]
pub fn check_transitions(transitions: &[Transition]) {
    debug_assert!(
        transitions.iter().all(|t| t.min <= t.max)
            && transitions.windows(2).all(|w| w[0].max < w[1].min),
        "Contract violation: transitions are unsorted or overlapping"
    );
}
