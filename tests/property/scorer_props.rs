// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Combinators match set algebra over their children's doc ids.

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::common::drain;
use quarry::docset::{slow_advance, SortedDocs};
use quarry::scorer::{ConjunctionScorer, ConstantScorer, DisjunctionSumScorer, ReqExclScorer};
use quarry::{DocId, DocIdIterator, ScorerNode, NO_MORE_DOCS};

fn set_strategy() -> impl Strategy<Value = BTreeSet<DocId>> {
    prop::collection::btree_set(0..60i32, 0..20)
}

fn sets_strategy() -> impl Strategy<Value = Vec<BTreeSet<DocId>>> {
    prop::collection::vec(set_strategy(), 2..5)
}

fn leaf(set: &BTreeSet<DocId>) -> ScorerNode {
    let docs: Vec<DocId> = set.iter().copied().collect();
    ScorerNode::Constant(ConstantScorer::new(Box::new(SortedDocs::new(docs)), 1.0))
}

fn ids(scorer: &mut ScorerNode) -> Vec<DocId> {
    drain(scorer).unwrap().into_iter().map(|(d, _)| d).collect()
}

proptest! {
    /// Property: a conjunction yields the intersection, each doc once.
    #[test]
    fn prop_conjunction_is_intersection(sets in sets_strategy()) {
        let expected: Vec<DocId> = sets[0].iter()
            .filter(|d| sets.iter().all(|s| s.contains(d)))
            .copied()
            .collect();
        let children = sets.iter().map(leaf).collect();
        let mut s = ScorerNode::Conjunction(ConjunctionScorer::new(children, 1.0).unwrap());
        prop_assert_eq!(ids(&mut s), expected);
    }

    /// Property: a disjunction yields docs matched by at least
    /// `min_should_match` children, scored by how many matched.
    #[test]
    fn prop_disjunction_counts_matches(sets in sets_strategy(), msm in 1usize..4) {
        let coords = vec![1.0f32; sets.len() + 1].into();
        let children = sets.iter().map(leaf).collect();
        let mut s = ScorerNode::Disjunction(
            DisjunctionSumScorer::new(children, coords).unwrap().with_min_should_match(msm),
        );
        let all: BTreeSet<DocId> = sets.iter().flatten().copied().collect();
        let expected: Vec<(DocId, f32)> = all.into_iter()
            .map(|d| (d, sets.iter().filter(|s| s.contains(&d)).count()))
            .filter(|&(_, n)| n >= msm)
            .map(|(d, n)| (d, n as f32))
            .collect();
        prop_assert_eq!(drain(&mut s).unwrap(), expected);
    }

    /// Property: exclusion is set difference.
    #[test]
    fn prop_exclusion_is_difference(required in set_strategy(), excluded in set_strategy()) {
        let expected: Vec<DocId> = required.difference(&excluded).copied().collect();
        let mut s = ScorerNode::ReqExcl(ReqExclScorer::new(leaf(&required), Some(leaf(&excluded))));
        prop_assert_eq!(ids(&mut s), expected);
    }

    /// Property: advance lands on the first doc at or past the target, same
    /// as stepping with next_doc.
    #[test]
    fn prop_advance_matches_stepping(set in set_strategy(), targets in prop::collection::vec(0..70i32, 1..8)) {
        let mut targets = targets;
        targets.sort_unstable();
        let docs: Vec<DocId> = set.iter().copied().collect();
        let mut fast = SortedDocs::new(docs.clone());
        let mut slow = SortedDocs::new(docs);
        for target in targets {
            if fast.doc() == NO_MORE_DOCS {
                break;
            }
            if target <= fast.doc() {
                continue;
            }
            let a = fast.advance(target).unwrap();
            let b = slow_advance(&mut slow, target).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(a >= target);
        }
    }
}
