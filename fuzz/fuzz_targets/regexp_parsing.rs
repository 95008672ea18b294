// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for regular expression and wildcard parsing.
//!
//! Arbitrary patterns must either compile or fail with a typed error, never
//! panic. When a pattern compiles, the compiled form must agree with the
//! raw automaton on every probe string.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quarry::automaton::{regexp_automaton, wildcard_automaton, CompiledAutomaton};

const LIMIT: usize = 2_000;

#[derive(Debug, Arbitrary)]
struct PatternInput {
    pattern: String,
    wildcard: bool,
    probes: Vec<Vec<u8>>,
}

fuzz_target!(|input: PatternInput| {
    // Cap lengths to avoid timeouts
    if input.pattern.len() > 64 || input.probes.len() > 16 {
        return;
    }

    let parsed = if input.wildcard {
        wildcard_automaton(&input.pattern, LIMIT)
    } else {
        regexp_automaton(&input.pattern, LIMIT)
    };
    let Ok(automaton) = parsed else {
        return;
    };

    let compiled = match CompiledAutomaton::new(automaton.clone(), LIMIT) {
        Ok(compiled) => compiled,
        Err(_) => return,
    };

    for probe in &input.probes {
        let probe = &probe[..probe.len().min(32)];
        assert_eq!(
            automaton.run(probe),
            compiled.matches(probe),
            "compiled form disagrees for pattern={:?} probe={:?}",
            input.pattern,
            probe
        );
    }
});
