// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Counting without ranking.

use super::{CollectFlow, Collector};
use crate::docset::DocId;
use crate::error::Result;
use crate::index::LeafContext;
use crate::scorer::Scorer;

/// Counts every doc it sees and never asks for a score.
#[derive(Debug, Default, Clone)]
pub struct TotalHitCountCollector {
    total_hits: u64,
}

impl TotalHitCountCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }
}

impl Collector for TotalHitCountCollector {
    fn set_next_reader(&mut self, _leaf: LeafContext<'_>) -> Result<()> {
        Ok(())
    }

    fn collect(&mut self, _doc: DocId, _scorer: &mut dyn Scorer) -> Result<CollectFlow> {
        self.total_hits += 1;
        Ok(CollectFlow::Continue)
    }

    fn accepts_docs_out_of_order(&self) -> bool {
        true
    }
}
