// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Required plus optional (`+a b`).
//!
//! Matching is decided by the required side alone. The optional side only
//! affects scores, so it is not touched until `score()` asks, and then only
//! advanced as far as the required doc.

use std::sync::Arc;

use crate::docset::{DocId, DocIdIterator, NO_MORE_DOCS};
use crate::error::Result;

use super::{Scorer, ScorerNode};

/// How a mixed boolean coordinates its score.
#[derive(Debug, Clone)]
pub enum OptionalCoord {
    /// No coordination, plain sum.
    Off,
    /// `coords[required + matched_optional]`. With `counted` the optional
    /// side is a disjunction whose `freq()` says how many optional clauses
    /// matched; otherwise it is one clause counting as one.
    Table {
        coords: Arc<[f32]>,
        required: usize,
        counted: bool,
    },
}

#[derive(Debug)]
pub struct ReqOptScorer {
    required: Box<ScorerNode>,
    optional: Option<Box<ScorerNode>>,
    coord: OptionalCoord,
}

impl ReqOptScorer {
    pub fn new(required: ScorerNode, optional: ScorerNode) -> Self {
        Self {
            required: Box::new(required),
            optional: Some(Box::new(optional)),
            coord: OptionalCoord::Off,
        }
    }

    pub fn with_coord(mut self, coord: OptionalCoord) -> Self {
        self.coord = coord;
        self
    }

    pub fn required(&self) -> &ScorerNode {
        &self.required
    }

    pub fn optional(&self) -> Option<&ScorerNode> {
        self.optional.as_deref()
    }

    /// Advance the optional side to the required doc; true when it matches.
    fn optional_on_doc(&mut self) -> Result<bool> {
        let doc = self.required.doc();
        let Some(optional) = self.optional.as_mut() else {
            return Ok(false);
        };
        let mut optional_doc = optional.doc();
        if optional_doc < doc {
            optional_doc = optional.advance(doc)?;
        }
        if optional_doc == NO_MORE_DOCS {
            self.optional = None;
            return Ok(false);
        }
        Ok(optional_doc == doc)
    }

    fn coord_for(&self, matched_optional: usize) -> f32 {
        match &self.coord {
            OptionalCoord::Off => 1.0,
            OptionalCoord::Table { coords, required, .. } => {
                let index = (*required + matched_optional).min(coords.len().saturating_sub(1));
                coords.get(index).copied().unwrap_or(1.0)
            }
        }
    }
}

impl DocIdIterator for ReqOptScorer {
    fn doc(&self) -> DocId {
        self.required.doc()
    }

    fn next_doc(&mut self) -> Result<DocId> {
        self.required.next_doc()
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        self.required.advance(target)
    }

    fn cost(&self) -> u64 {
        self.required.cost()
    }
}

impl Scorer for ReqOptScorer {
    fn score(&mut self) -> Result<f32> {
        let required_score = self.required.score()?;
        if !self.optional_on_doc()? {
            return Ok(required_score * self.coord_for(0));
        }
        let Some(optional) = self.optional.as_mut() else {
            return Ok(required_score * self.coord_for(0));
        };
        let optional_score = optional.score()?;
        let matched = match &self.coord {
            OptionalCoord::Table { counted: true, .. } => optional.freq()? as usize,
            _ => 1,
        };
        Ok((required_score + optional_score) * self.coord_for(matched))
    }

    fn freq(&mut self) -> Result<u32> {
        Ok(if self.optional_on_doc()? { 2 } else { 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::test_util::{doc_ids, docs, drain};

    #[test]
    fn test_optional_only_adds_score() {
        let mut s = ScorerNode::ReqOpt(ReqOptScorer::new(docs(&[1, 3, 5], 1.0), docs(&[2, 3, 9], 0.5)));
        let hits = drain(&mut s);
        assert_eq!(doc_ids(&hits), vec![1, 3, 5]);
        assert_eq!(hits[0].1, 1.0);
        assert_eq!(hits[1].1, 1.5);
        assert_eq!(hits[2].1, 1.0);
    }

    #[test]
    fn test_optional_is_lazy() {
        let mut s = ReqOptScorer::new(docs(&[1, 3, 5], 1.0), docs(&[2, 3], 1.0));
        s.next_doc().unwrap();
        s.next_doc().unwrap();
        // never scored: the optional side has not moved
        assert_eq!(s.optional().map(|o| o.doc()), Some(-1));
        assert_eq!(s.freq().unwrap(), 2);
        s.next_doc().unwrap();
        assert_eq!(s.freq().unwrap(), 1);
        assert!(s.optional().is_none());
    }

    #[test]
    fn test_coord_table_counts_optional_clause() {
        // +a b, max_coord 2
        let coords: Arc<[f32]> = vec![0.0, 0.5, 1.0].into();
        let mut s = ScorerNode::ReqOpt(
            ReqOptScorer::new(docs(&[1, 2], 1.0), docs(&[2], 1.0)).with_coord(OptionalCoord::Table {
                coords,
                required: 1,
                counted: false,
            }),
        );
        assert_eq!(drain(&mut s), vec![(1, 0.5), (2, 2.0)]);
    }
}
