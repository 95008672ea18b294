// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Stop each segment after a fixed number of hits.
//!
//! Useful when a segment's doc order already is the ranking (an index
//! sorted by the query's sort), so the first N hits of each segment are the
//! only candidates.

use tracing::debug;

use super::{CollectFlow, Collector};
use crate::docset::DocId;
use crate::error::{Error, Result};
use crate::index::LeafContext;
use crate::scorer::Scorer;

#[derive(Debug)]
pub struct EarlyTerminatingCollector<C> {
    inner: C,
    per_segment: usize,
    seen: usize,
    segment: usize,
    terminated_segments: usize,
}

impl<C: Collector> EarlyTerminatingCollector<C> {
    pub fn new(inner: C, per_segment: usize) -> Result<Self> {
        if per_segment == 0 {
            return Err(Error::InvalidArgument("per-segment hit limit must be positive".into()));
        }
        Ok(Self {
            inner,
            per_segment,
            seen: 0,
            segment: 0,
            terminated_segments: 0,
        })
    }

    /// Segments that were cut short.
    pub fn terminated_segments(&self) -> usize {
        self.terminated_segments
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Collector> Collector for EarlyTerminatingCollector<C> {
    fn set_next_reader(&mut self, leaf: LeafContext<'_>) -> Result<()> {
        self.seen = 0;
        self.segment = leaf.ord;
        self.inner.set_next_reader(leaf)
    }

    fn collect(&mut self, doc: DocId, scorer: &mut dyn Scorer) -> Result<CollectFlow> {
        let flow = self.inner.collect(doc, scorer)?;
        self.seen += 1;
        if flow == CollectFlow::StopSegment || self.seen >= self.per_segment {
            debug!(segment = self.segment, hits = self.seen, "stopping segment early");
            self.terminated_segments += 1;
            return Ok(CollectFlow::StopSegment);
        }
        Ok(CollectFlow::Continue)
    }

    fn accepts_docs_out_of_order(&self) -> bool {
        self.inner.accepts_docs_out_of_order()
    }
}
