// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Dense transition table for the hot loop.
//!
//! Term enumeration calls `step` once per byte of every candidate term. A
//! binary search over ranges is fine for building; running uses a flat
//! `states × 256` table instead.

use super::{Automaton, StateId};

const NONE: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct ByteRunAutomaton {
    table: Vec<u32>,
    accept: Vec<bool>,
}

impl ByteRunAutomaton {
    pub fn new(automaton: &Automaton) -> Self {
        let n = automaton.num_states();
        let mut table = vec![NONE; n * 256];
        for state in 0..n {
            let row = &mut table[state * 256..(state + 1) * 256];
            for t in automaton.transitions(state) {
                for byte in t.min..=t.max {
                    row[usize::from(byte)] = t.to as u32;
                }
            }
        }
        Self {
            table,
            accept: (0..n).map(|s| automaton.is_accept(s)).collect(),
        }
    }

    pub fn num_states(&self) -> usize {
        self.accept.len()
    }

    #[inline]
    pub fn is_accept(&self, state: StateId) -> bool {
        self.accept[state]
    }

    #[inline]
    pub fn step(&self, state: StateId, byte: u8) -> Option<StateId> {
        match self.table[state * 256 + usize::from(byte)] {
            NONE => None,
            to => Some(to as StateId),
        }
    }

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
}
