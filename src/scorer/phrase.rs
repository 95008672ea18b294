// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Phrase matching on term positions.
//!
//! Both phrase scorers first find docs containing every term (a leapfrog
//! conjunction over the postings, cheapest first), then look at positions.
//! Each term's cursor is a [`PhrasePositions`] whose `position` is shifted by
//! the term's offset in the phrase, so "quick brown fox" at raw positions
//! 4, 5, 6 reads as 4, 4, 4: a phrase match is a point where the shifted
//! positions agree.
//!
//! | Scorer               | Match                                        | freq             |
//! |----------------------|----------------------------------------------|------------------|
//! | [`ExactPhraseScorer`] | all shifted positions equal                 | number of matches |
//! | [`SloppyPhraseScorer`] | shifted positions span at most `slop`      | Σ `sloppy_freq(span)` |
//!
//! # Repeated terms
//!
//! In a sloppy phrase like "to be or not to be" the two `to` cursors read the
//! same postings and would happily both land on the same token. Such cursors
//! form a repeat group; whenever two members of a group sit on the same
//! token, the one with the lower shifted position moves on.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::docset::{DocId, DocIdIterator, NO_MORE_DOCS};
use crate::error::Result;
use crate::index::Postings;

use super::{Scorer, SimScorer};

// ============================================================================
// POSITION CURSOR
// ============================================================================

/// One phrase term's postings with its offset in the phrase.
#[derive(Debug)]
pub struct PhrasePositions {
    postings: Box<dyn Postings>,
    /// Raw position minus `offset`.
    pub position: i32,
    count: u32,
    pub offset: i32,
    /// Index among the phrase's terms; unique tiebreak.
    pub ord: usize,
    /// Repeat group this cursor belongs to, if its term repeats.
    pub rpt_group: Option<usize>,
    /// Index inside the repeat group.
    pub rpt_ind: usize,
    pub term: Vec<u8>,
}

impl PhrasePositions {
    pub fn new(postings: Box<dyn Postings>, offset: i32, ord: usize, term: Vec<u8>) -> Self {
        Self {
            postings,
            position: 0,
            count: 0,
            offset,
            ord,
            rpt_group: None,
            rpt_ind: 0,
            term,
        }
    }

    /// Reset to the first position of the current doc.
    pub fn first_position(&mut self) -> Result<bool> {
        self.count = self.postings.freq();
        self.next_position()
    }

    /// Step to the next position; false once the doc's positions are used up.
    pub fn next_position(&mut self) -> Result<bool> {
        if self.count == 0 {
            return Ok(false);
        }
        self.count -= 1;
        self.position = self.postings.next_position()? as i32 - self.offset;
        Ok(true)
    }

    /// Position in the document, undoing the phrase offset.
    fn term_position(&self) -> i32 {
        self.position + self.offset
    }

    pub fn doc(&self) -> DocId {
        self.postings.doc()
    }
}

// ============================================================================
// DOC CONJUNCTION
// ============================================================================

/// Docs containing every phrase term.
#[derive(Debug)]
struct PhraseDocs {
    pps: Vec<PhrasePositions>,
    /// Indices into `pps` by ascending cost.
    order: Vec<usize>,
}

impl PhraseDocs {
    fn new(mut pps: Vec<PhrasePositions>) -> Self {
        for (ord, pp) in pps.iter_mut().enumerate() {
            pp.ord = ord;
        }
        let mut order: Vec<usize> = (0..pps.len()).collect();
        order.sort_by_key(|&i| pps[i].postings.cost());
        Self { pps, order }
    }

    fn doc(&self) -> DocId {
        self.order.first().map_or(NO_MORE_DOCS, |&i| self.pps[i].doc())
    }

    fn next_doc(&mut self) -> Result<DocId> {
        let Some(&lead) = self.order.first() else {
            return Ok(NO_MORE_DOCS);
        };
        let doc = self.pps[lead].postings.next_doc()?;
        self.do_next(doc)
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let Some(&lead) = self.order.first() else {
            return Ok(NO_MORE_DOCS);
        };
        let doc = self.pps[lead].postings.advance(target)?;
        self.do_next(doc)
    }

    fn do_next(&mut self, mut doc: DocId) -> Result<DocId> {
        let lead = self.order[0];
        'candidate: loop {
            if doc == NO_MORE_DOCS {
                return Ok(doc);
            }
            for &i in &self.order[1..] {
                let postings = &mut self.pps[i].postings;
                if postings.doc() < doc {
                    let next = postings.advance(doc)?;
                    if next > doc {
                        doc = self.pps[lead].postings.advance(next)?;
                        continue 'candidate;
                    }
                }
            }
            return Ok(doc);
        }
    }

    fn cost(&self) -> u64 {
        self.order.first().map_or(0, |&i| self.pps[i].postings.cost())
    }
}

// ============================================================================
// EXACT
// ============================================================================

/// Terms at consecutive positions, in order.
#[derive(Debug)]
pub struct ExactPhraseScorer {
    docs: PhraseDocs,
    sim: SimScorer,
    freq: u32,
}

impl ExactPhraseScorer {
    pub fn new(pps: Vec<PhrasePositions>, sim: SimScorer) -> Self {
        Self {
            docs: PhraseDocs::new(pps),
            sim,
            freq: 0,
        }
    }

    /// Count the points where every shifted position agrees.
    fn phrase_freq(&mut self) -> Result<u32> {
        let pps = &mut self.docs.pps;
        for pp in pps.iter_mut() {
            if !pp.first_position()? {
                return Ok(0);
            }
        }
        let mut freq = 0;
        loop {
            let target = pps.iter().map(|pp| pp.position).max().unwrap_or(0);
            let mut aligned = true;
            for pp in pps.iter_mut() {
                while pp.position < target {
                    if !pp.next_position()? {
                        return Ok(freq);
                    }
                }
                aligned &= pp.position == target;
            }
            if aligned {
                freq += 1;
                if !pps[0].next_position()? {
                    return Ok(freq);
                }
            }
        }
    }

    fn confirm(&mut self, mut doc: DocId) -> Result<DocId> {
        while doc != NO_MORE_DOCS {
            self.freq = self.phrase_freq()?;
            if self.freq > 0 {
                return Ok(doc);
            }
            doc = self.docs.next_doc()?;
        }
        Ok(doc)
    }
}

impl DocIdIterator for ExactPhraseScorer {
    fn doc(&self) -> DocId {
        self.docs.doc()
    }

    fn next_doc(&mut self) -> Result<DocId> {
        let doc = self.docs.next_doc()?;
        self.confirm(doc)
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let doc = self.docs.advance(target)?;
        self.confirm(doc)
    }

    fn cost(&self) -> u64 {
        self.docs.cost()
    }
}

impl Scorer for ExactPhraseScorer {
    fn score(&mut self) -> Result<f32> {
        Ok(self.sim.score(self.docs.doc(), self.freq as f32))
    }

    fn freq(&mut self) -> Result<u32> {
        Ok(self.freq)
    }
}

// ============================================================================
// SLOPPY
// ============================================================================

/// Min-queue of cursor snapshots ordered by (position, offset, ord).
///
/// Keys are taken when a cursor is pushed; a cursor is only moved while it
/// is out of the queue, or is popped and re-pushed right after.
#[derive(Debug, Default)]
struct PhraseQueue {
    heap: BinaryHeap<Reverse<(i32, i32, usize)>>,
}

impl PhraseQueue {
    fn push(&mut self, pp: &PhrasePositions) {
        self.heap.push(Reverse((pp.position, pp.offset, pp.ord)));
    }

    fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|Reverse((_, _, ord))| ord)
    }

    fn top_position(&self) -> i32 {
        self.heap.peek().map_or(i32::MAX, |Reverse((position, _, _))| *position)
    }

    fn clear(&mut self) {
        self.heap.clear();
    }
}

/// Terms within `slop` position moves of the phrase, in any order.
///
/// For each doc, every minimal window in which all terms occur contributes
/// `sloppy_freq(window length)` when that length is at most `slop`.
#[derive(Debug)]
pub struct SloppyPhraseScorer {
    docs: PhraseDocs,
    sim: SimScorer,
    slop: i32,
    queue: PhraseQueue,
    /// Largest shifted position of any cursor.
    end: i32,
    checked_repeats: bool,
    has_repeats: bool,
    /// Indices into `pps` per repeat group, sorted by offset.
    repeat_groups: Vec<Vec<usize>>,
    sloppy_freq: f32,
    num_matches: u32,
}

impl SloppyPhraseScorer {
    pub fn new(pps: Vec<PhrasePositions>, slop: u32, sim: SimScorer) -> Self {
        Self {
            docs: PhraseDocs::new(pps),
            sim,
            slop: slop.min(i32::MAX as u32) as i32,
            queue: PhraseQueue::default(),
            end: i32::MIN,
            checked_repeats: false,
            has_repeats: false,
            repeat_groups: Vec::new(),
            sloppy_freq: 0.0,
            num_matches: 0,
        }
    }

    /// Summed `sloppy_freq(distance)` over the current doc's matches.
    pub fn sloppy_freq(&self) -> f32 {
        self.sloppy_freq
    }

    fn phrase_freq(&mut self) -> Result<f32> {
        self.num_matches = 0;
        if !self.init_phrase_positions()? {
            return Ok(0.0);
        }
        let mut freq = 0.0;
        let Some(mut pp) = self.queue.pop() else {
            return Ok(0.0);
        };
        let mut match_length = self.end - self.docs.pps[pp].position;
        let mut next = self.queue.top_position();
        while self.advance_pp(pp)? {
            if self.has_repeats && !self.advance_repeats(pp)? {
                break;
            }
            let position = self.docs.pps[pp].position;
            if position > next {
                // pp moved past the queue top: the window ending here is minimal
                if match_length <= self.slop {
                    freq += self.sim.sloppy_freq(match_length as u32);
                    self.num_matches += 1;
                }
                self.queue.push(&self.docs.pps[pp]);
                pp = match self.queue.pop() {
                    Some(top) => top,
                    None => break,
                };
                next = self.queue.top_position();
                match_length = self.end - self.docs.pps[pp].position;
            } else {
                match_length = match_length.min(self.end - position);
            }
        }
        if match_length <= self.slop {
            freq += self.sim.sloppy_freq(match_length as u32);
            self.num_matches += 1;
        }
        Ok(freq)
    }

    fn advance_pp(&mut self, pp: usize) -> Result<bool> {
        let cursor = &mut self.docs.pps[pp];
        if !cursor.next_position()? {
            return Ok(false);
        }
        self.end = self.end.max(cursor.position);
        Ok(true)
    }

    /// Resolve collisions between `pp` and the rest of its repeat group.
    ///
    /// Cursors that were moved while sitting in the queue are popped out and
    /// pushed back so their keys are fresh. False once a cursor runs dry.
    fn advance_repeats(&mut self, pp: usize) -> Result<bool> {
        let Some(group) = self.docs.pps[pp].rpt_group else {
            return Ok(true);
        };
        let k0 = self.docs.pps[pp].rpt_ind;
        let mut requeue = vec![false; self.repeat_groups[group].len()];
        let mut current = pp;
        while let Some(k) = self.collide(current, group) {
            let other = self.repeat_groups[group][k];
            current = self.lesser(current, other);
            if !self.advance_pp(current)? {
                return Ok(false);
            }
            if k != k0 {
                requeue[k] = true;
            }
        }
        let mut popped = Vec::new();
        while requeue.iter().any(|&r| r) {
            let Some(top) = self.queue.pop() else {
                break;
            };
            popped.push(top);
            let cursor = &self.docs.pps[top];
            if cursor.rpt_group == Some(group) {
                requeue[cursor.rpt_ind] = false;
            }
        }
        for &top in popped.iter().rev() {
            self.queue.push(&self.docs.pps[top]);
        }
        Ok(true)
    }

    /// Index in its group of a cursor on the same document token as `pp`.
    fn collide(&self, pp: usize, group: usize) -> Option<usize> {
        let position = self.docs.pps[pp].term_position();
        self.repeat_groups[group]
            .iter()
            .find(|&&other| other != pp && self.docs.pps[other].term_position() == position)
            .map(|&other| self.docs.pps[other].rpt_ind)
    }

    fn lesser(&self, a: usize, b: usize) -> usize {
        let (pa, pb) = (&self.docs.pps[a], &self.docs.pps[b]);
        if pa.position < pb.position || (pa.position == pb.position && pa.offset < pb.offset) {
            a
        } else {
            b
        }
    }

    fn init_phrase_positions(&mut self) -> Result<bool> {
        self.end = i32::MIN;
        if !self.checked_repeats {
            return self.init_first_time();
        }
        if !self.has_repeats {
            self.init_simple()?;
            return Ok(true);
        }
        self.init_complex()
    }

    fn init_simple(&mut self) -> Result<()> {
        self.queue.clear();
        for pp in &mut self.docs.pps {
            pp.first_position()?;
            self.end = self.end.max(pp.position);
            self.queue.push(pp);
        }
        Ok(())
    }

    fn init_complex(&mut self) -> Result<bool> {
        self.place_first_positions()?;
        if !self.advance_repeat_groups()? {
            return Ok(false);
        }
        self.fill_queue();
        Ok(true)
    }

    fn init_first_time(&mut self) -> Result<bool> {
        self.checked_repeats = true;
        self.place_first_positions()?;
        self.gather_repeat_groups();
        self.has_repeats = !self.repeat_groups.is_empty();
        if self.has_repeats && !self.advance_repeat_groups()? {
            return Ok(false);
        }
        self.fill_queue();
        Ok(true)
    }

    fn place_first_positions(&mut self) -> Result<()> {
        for pp in &mut self.docs.pps {
            pp.first_position()?;
        }
        Ok(())
    }

    fn fill_queue(&mut self) {
        self.queue.clear();
        for pp in &self.docs.pps {
            self.end = self.end.max(pp.position);
            self.queue.push(pp);
        }
    }

    /// Group cursors of the same term at different phrase offsets.
    fn gather_repeat_groups(&mut self) {
        let pps = &mut self.docs.pps;
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for i in 0..pps.len() {
            if pps[i].rpt_group.is_some() {
                continue;
            }
            for j in i + 1..pps.len() {
                if pps[j].rpt_group.is_some() || pps[j].offset == pps[i].offset || pps[j].term != pps[i].term {
                    continue;
                }
                let group = match pps[i].rpt_group {
                    Some(group) => group,
                    None => {
                        groups.push(vec![i]);
                        pps[i].rpt_group = Some(groups.len() - 1);
                        groups.len() - 1
                    }
                };
                pps[j].rpt_group = Some(group);
                groups[group].push(j);
            }
        }
        for (g, group) in groups.iter_mut().enumerate() {
            group.sort_by_key(|&i| pps[i].offset);
            for (ind, &i) in group.iter().enumerate() {
                pps[i].rpt_group = Some(g);
                pps[i].rpt_ind = ind;
            }
        }
        self.repeat_groups = groups;
    }

    /// Move the j-th member of each group j positions ahead so no two
    /// members start on the same token.
    fn advance_repeat_groups(&mut self) -> Result<bool> {
        for group in &self.repeat_groups {
            for (j, &pp) in group.iter().enumerate().skip(1) {
                for _ in 0..j {
                    if !self.docs.pps[pp].next_position()? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    fn confirm(&mut self, mut doc: DocId) -> Result<DocId> {
        while doc != NO_MORE_DOCS {
            self.sloppy_freq = self.phrase_freq()?;
            if self.num_matches > 0 {
                return Ok(doc);
            }
            doc = self.docs.next_doc()?;
        }
        Ok(doc)
    }
}

impl DocIdIterator for SloppyPhraseScorer {
    fn doc(&self) -> DocId {
        self.docs.doc()
    }

    fn next_doc(&mut self) -> Result<DocId> {
        let doc = self.docs.next_doc()?;
        self.confirm(doc)
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let doc = self.docs.advance(target)?;
        self.confirm(doc)
    }

    fn cost(&self) -> u64 {
        self.docs.cost()
    }
}

impl Scorer for SloppyPhraseScorer {
    fn score(&mut self) -> Result<f32> {
        Ok(self.sim.score(self.docs.doc(), self.sloppy_freq))
    }

    fn freq(&mut self) -> Result<u32> {
        Ok(self.num_matches)
    }
}
