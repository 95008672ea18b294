// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for automaton-driven term enumeration.
//!
//! Builds a small dictionary from the input and checks that enumerating it
//! through a wildcard automaton yields exactly the terms a linear filter
//! accepts, in dictionary order.

#![no_main]

use std::collections::BTreeSet;
use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quarry::automaton::{wildcard_automaton, AutomatonTermsEnum, CompiledAutomaton};
use quarry::index::{PostingList, SliceTermsEnum, TermDictionary, TermOrder, TermsEnum};

const LIMIT: usize = 2_000;

#[derive(Debug, Arbitrary)]
struct TermsInput {
    pattern: String,
    terms: Vec<String>,
}

fuzz_target!(|input: TermsInput| {
    if input.pattern.len() > 32 || input.terms.len() > 64 {
        return;
    }
    let Ok(automaton) = wildcard_automaton(&input.pattern, LIMIT) else {
        return;
    };
    let Ok(compiled) = CompiledAutomaton::new(automaton, LIMIT) else {
        return;
    };

    let sorted: BTreeSet<Vec<u8>> = input.terms.iter().map(|t| t.as_bytes().to_vec()).collect();
    let expected: Vec<Vec<u8>> = sorted.iter().filter(|t| compiled.matches(t)).cloned().collect();
    let entries = sorted
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let mut list = PostingList::new(false);
            list.push(i as i32, &[]);
            (t, list)
        })
        .collect();
    let dict = Arc::new(TermDictionary::new(entries, TermOrder::Bytewise));

    let tenum = Box::new(SliceTermsEnum::new(dict));
    let Ok(mut terms) = AutomatonTermsEnum::intersect(tenum, &compiled, "body") else {
        return;
    };
    let mut found = Vec::new();
    while terms.next().unwrap() {
        found.push(terms.term().to_vec());
    }
    assert_eq!(found, expected, "enumeration differs for pattern={:?}", input.pattern);
});
