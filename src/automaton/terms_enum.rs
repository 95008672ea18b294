// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Filtered term enumeration: walking a dictionary and an automaton together.
//!
//! A [`FilteredTermsEnum`] drives an underlying [`TermsEnum`] through a
//! [`TermFilter`]. The filter sees each candidate term once and answers with
//! an [`AcceptStatus`]; when it asks for a seek, it also supplies the next
//! term worth looking at, and the dictionary jumps straight there.
//!
//! For automata the seek target is the smallest string greater than the
//! current term that the automaton could still accept (`next_string`). On a
//! dictionary of `do, dog, dot, lo, log, zoo`, the pattern `[dl]og?` seeks to
//! `do`, reads `dog`, seeks to `lo`, reads `log` and ends: four comparisons.
//!
//! Infinite automata need care: a loop means there is no "next" string in a
//! finite number of steps. When the walk enters a loop the enumerator goes
//! *linear*: it records an upper bound (the end of the looping transition's
//! range) and compares consecutive terms below it without seeking.

use std::sync::Arc;

use tracing::trace;

use super::{Automaton, ByteRunAutomaton, CompiledAutomaton, StateId};
use crate::docset::Bits;
use crate::error::{Error, Result};
use crate::index::{Postings, SeekStatus, TermOrder, TermsEnum};

/// What the filter thinks of the current term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptStatus {
    /// Accept and keep reading sequentially.
    Yes,
    /// Accept, then seek.
    YesAndSeek,
    /// Reject and keep reading sequentially.
    No,
    /// Reject, then seek.
    NoAndSeek,
    /// Reject and stop.
    End,
}

/// Decides which terms a [`FilteredTermsEnum`] returns.
pub trait TermFilter {
    /// Classify `term`. Called once per term the dictionary produces.
    fn accept(&mut self, term: &[u8]) -> AcceptStatus;

    /// Where to seek next. `current` is the last term seen, `None` before the
    /// first seek. Returning `None` ends the enumeration.
    fn next_seek_term(&mut self, current: Option<&[u8]>) -> Option<Vec<u8>>;
}

/// A [`TermsEnum`] restricted to the terms a [`TermFilter`] accepts.
///
/// Positioning is driven by the filter, so `seek_ceil` is unsupported.
pub struct FilteredTermsEnum<'a, F> {
    tenum: Box<dyn TermsEnum + 'a>,
    filter: F,
    current: Vec<u8>,
    started: bool,
    do_seek: bool,
    exhausted: bool,
    comparisons: u64,
}

impl<'a, F: TermFilter> FilteredTermsEnum<'a, F> {
    pub fn new(tenum: Box<dyn TermsEnum + 'a>, filter: F) -> Self {
        Self {
            tenum,
            filter,
            current: Vec::new(),
            started: false,
            do_seek: true,
            exhausted: false,
            comparisons: 0,
        }
    }

    /// Terms handed to the filter so far.
    pub fn comparisons(&self) -> u64 {
        self.comparisons
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    fn finish(&mut self) -> Result<bool> {
        self.exhausted = true;
        Ok(false)
    }
}

impl<F: TermFilter> TermsEnum for FilteredTermsEnum<'_, F> {
    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        loop {
            if self.do_seek {
                self.do_seek = false;
                let current = self.started.then_some(self.current.as_slice());
                let Some(target) = self.filter.next_seek_term(current) else {
                    return self.finish();
                };
                debug_assert!(
                    !self.started || target.as_slice() > self.current.as_slice(),
                    "seek target must move forward"
                );
                trace!(target = ?String::from_utf8_lossy(&target), "seek");
                if self.tenum.seek_ceil(&target)? == SeekStatus::End {
                    return self.finish();
                }
            } else if !self.tenum.next()? {
                return self.finish();
            }

            self.started = true;
            self.current.clear();
            self.current.extend_from_slice(self.tenum.term());
            self.comparisons += 1;

            match self.filter.accept(&self.current) {
                AcceptStatus::YesAndSeek => {
                    self.do_seek = true;
                    return Ok(true);
                }
                AcceptStatus::Yes => return Ok(true),
                AcceptStatus::NoAndSeek => self.do_seek = true,
                AcceptStatus::No => {}
                AcceptStatus::End => return self.finish(),
            }
        }
    }

    fn seek_ceil(&mut self, _target: &[u8]) -> Result<SeekStatus> {
        Err(Error::Unsupported("seek on a filtered terms enum"))
    }

    fn seek_exact(&mut self, _target: &[u8]) -> Result<bool> {
        Err(Error::Unsupported("seek on a filtered terms enum"))
    }

    fn term(&self) -> &[u8] {
        self.tenum.term()
    }

    fn ord(&self) -> Result<u64> {
        self.tenum.ord()
    }

    fn doc_freq(&self) -> Result<u32> {
        self.tenum.doc_freq()
    }

    fn total_term_freq(&self) -> Result<u64> {
        self.tenum.total_term_freq()
    }

    fn postings(&self, accept: Option<Arc<dyn Bits>>) -> Result<Box<dyn Postings>> {
        self.tenum.postings(accept)
    }

    fn order(&self) -> TermOrder {
        self.tenum.order()
    }
}

// ============================================================================
// FILTERS
// ============================================================================

/// Terms starting with a fixed prefix.
#[derive(Debug, Clone)]
pub struct PrefixFilter {
    prefix: Vec<u8>,
}

impl PrefixFilter {
    pub fn new(prefix: Vec<u8>) -> Self {
        Self { prefix }
    }
}

impl TermFilter for PrefixFilter {
    fn accept(&mut self, term: &[u8]) -> AcceptStatus {
        if term.starts_with(&self.prefix) {
            AcceptStatus::Yes
        } else {
            AcceptStatus::End
        }
    }

    fn next_seek_term(&mut self, current: Option<&[u8]>) -> Option<Vec<u8>> {
        current.is_none().then(|| self.prefix.clone())
    }
}

/// Exactly one term.
#[derive(Debug, Clone)]
pub struct SingleTermFilter {
    term: Vec<u8>,
}

impl SingleTermFilter {
    pub fn new(term: Vec<u8>) -> Self {
        Self { term }
    }
}

impl TermFilter for SingleTermFilter {
    fn accept(&mut self, term: &[u8]) -> AcceptStatus {
        if term == self.term.as_slice() {
            AcceptStatus::Yes
        } else {
            AcceptStatus::End
        }
    }

    fn next_seek_term(&mut self, current: Option<&[u8]>) -> Option<Vec<u8>> {
        current.is_none().then(|| self.term.clone())
    }
}

/// Terms accepted by a compiled automaton, with seek targets computed by
/// walking it.
#[derive(Debug, Clone)]
pub struct AutomatonFilter {
    run: Arc<ByteRunAutomaton>,
    automaton: Arc<Automaton>,
    finite: bool,
    common_suffix: Option<Vec<u8>>,
    /// Generation stamp per state, for loop detection within one walk.
    visited: Vec<u64>,
    generation: u64,
    seek: Vec<u8>,
    saved_states: Vec<StateId>,
    linear: bool,
    linear_upper_bound: Vec<u8>,
}

/// Filtered enumeration of the terms an automaton accepts.
pub type AutomatonTermsEnum<'a> = FilteredTermsEnum<'a, AutomatonFilter>;

impl<'a> AutomatonTermsEnum<'a> {
    /// Intersect `tenum` with `compiled`. The dictionary must sort bytewise.
    pub fn intersect(
        tenum: Box<dyn TermsEnum + 'a>,
        compiled: &CompiledAutomaton,
        field: &str,
    ) -> Result<Self> {
        tenum.order().require_bytewise(field)?;
        Ok(FilteredTermsEnum::new(tenum, AutomatonFilter::new(compiled)))
    }
}

impl AutomatonFilter {
    pub fn new(compiled: &CompiledAutomaton) -> Self {
        let automaton = Arc::clone(compiled.automaton());
        let num_states = automaton.num_states();
        Self {
            run: Arc::clone(compiled.run_automaton()),
            automaton,
            finite: compiled.is_finite(),
            common_suffix: compiled.common_suffix().map(<[u8]>::to_vec),
            visited: vec![0; num_states],
            generation: 0,
            seek: Vec::new(),
            saved_states: Vec::new(),
            linear: false,
            linear_upper_bound: Vec::new(),
        }
    }

    fn reject(&self, term: &[u8]) -> AcceptStatus {
        if self.linear && term < self.linear_upper_bound.as_slice() {
            AcceptStatus::No
        } else {
            AcceptStatus::NoAndSeek
        }
    }

    /// Mark the walk as inside a loop entered at `position` of the seek
    /// string. Terms below the returned bound are compared without seeking.
    fn set_linear(&mut self, position: usize) {
        let mut state = 0;
        for &byte in &self.seek[..position] {
            match self.run.step(state, byte) {
                Some(next) => state = next,
                None => return,
            }
        }
        let byte = self.seek[position];
        let mut max_interval = self
            .automaton
            .transitions(state)
            .iter()
            .find(|t| t.min <= byte && byte <= t.max)
            .map_or(0xFF, |t| t.max);
        if max_interval != 0xFF {
            max_interval += 1;
        }
        self.linear_upper_bound.clear();
        self.linear_upper_bound.extend_from_slice(&self.seek[..position]);
        self.linear_upper_bound.push(max_interval);
        self.linear = true;
    }

    /// Advance `seek` to the next string the automaton could accept.
    fn next_string(&mut self) -> bool {
        let mut position = 0;
        self.saved_states.resize(self.seek.len() + 1, 0);
        self.saved_states[0] = 0;

        loop {
            self.generation += 1;
            self.linear = false;
            let mut state = self.saved_states[position];
            // walk the usable prefix of the current seek string
            while position < self.seek.len() {
                self.visited[state] = self.generation;
                let Some(next) = self.run.step(state, self.seek[position]) else {
                    break;
                };
                self.saved_states[position + 1] = next;
                if !self.finite && !self.linear && self.visited[next] == self.generation {
                    self.set_linear(position);
                }
                state = next;
                position += 1;
            }
            if self.next_string_from(state, position) {
                return true;
            }
            let Some(backed) = self.backtrack(position) else {
                return false;
            };
            position = backed;
            if let Some(next) = self.run.step(self.saved_states[position], self.seek[position]) {
                if self.run.is_accept(next) {
                    return true;
                }
            }
            if !self.finite {
                position = 0;
            }
        }
    }

    /// Extend `seek[..position]`, from `state`, to the smallest accepted
    /// string greater than the current seek string.
    fn next_string_from(&mut self, mut state: StateId, position: usize) -> bool {
        let mut min_byte: u16 = 0;
        if position < self.seek.len() {
            let byte = self.seek[position];
            if byte == 0xFF {
                return false;
            }
            min_byte = u16::from(byte) + 1;
        }
        self.seek.truncate(position);
        self.visited[state] = self.generation;

        let automaton = Arc::clone(&self.automaton);
        let Some(first) = automaton
            .transitions(state)
            .iter()
            .find(|t| u16::from(t.max) >= min_byte)
        else {
            return false;
        };
        // min_byte <= t.max <= 0xFF here
        self.seek.push(first.min.max(min_byte as u8));
        state = first.to;

        // then follow the smallest edges until an accept state or a loop
        while self.visited[state] != self.generation && !self.run.is_accept(state) {
            self.visited[state] = self.generation;
            let Some(t) = automaton.transitions(state).first() else {
                break;
            };
            state = t.to;
            self.seek.push(t.min);
            if !self.finite && !self.linear && self.visited[state] == self.generation {
                self.set_linear(self.seek.len() - 1);
            }
        }
        true
    }

    /// Increment the last byte before `position` that is not 0xFF and cut
    /// everything after it. Returns the new position.
    fn backtrack(&mut self, mut position: usize) -> Option<usize> {
        while position > 0 {
            position -= 1;
            let byte = self.seek[position];
            if byte != 0xFF {
                self.seek[position] = byte + 1;
                self.seek.truncate(position + 1);
                return Some(position);
            }
        }
        None
    }
}

impl TermFilter for AutomatonFilter {
    fn accept(&mut self, term: &[u8]) -> AcceptStatus {
        if let Some(suffix) = &self.common_suffix {
            if !term.ends_with(suffix) {
                return self.reject(term);
            }
        }
        if self.run.run(term) {
            if self.linear {
                AcceptStatus::Yes
            } else {
                AcceptStatus::YesAndSeek
            }
        } else {
            self.reject(term)
        }
    }

    fn next_seek_term(&mut self, current: Option<&[u8]>) -> Option<Vec<u8>> {
        match current {
            None => {
                self.seek.clear();
                if self.run.num_states() > 0 && self.run.is_accept(0) {
                    return Some(Vec::new());
                }
            }
            Some(term) => {
                self.seek.clear();
                self.seek.extend_from_slice(term);
            }
        }
        self.next_string().then(|| self.seek.clone())
    }
}
