// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Required minus excluded (`+a -b`).

use crate::docset::{DocId, DocIdIterator, NO_MORE_DOCS};
use crate::error::Result;

use super::{Scorer, ScorerNode};

/// Iterates `required`, skipping docs `excluded` also matches.
///
/// The excluded cursor is only advanced to docs the required side produced,
/// and is dropped for good once it runs dry.
#[derive(Debug)]
pub struct ReqExclScorer {
    required: Box<ScorerNode>,
    excluded: Option<Box<ScorerNode>>,
}

impl ReqExclScorer {
    pub fn new(required: ScorerNode, excluded: Option<ScorerNode>) -> Self {
        Self {
            required: Box::new(required),
            excluded: excluded.map(Box::new),
        }
    }

    pub fn required(&self) -> &ScorerNode {
        &self.required
    }

    pub fn excluded(&self) -> Option<&ScorerNode> {
        self.excluded.as_deref()
    }

    fn to_non_excluded(&mut self, mut doc: DocId) -> Result<DocId> {
        loop {
            if doc == NO_MORE_DOCS {
                return Ok(doc);
            }
            let Some(excluded) = self.excluded.as_mut() else {
                return Ok(doc);
            };
            let mut excluded_doc = excluded.doc();
            if excluded_doc < doc {
                excluded_doc = excluded.advance(doc)?;
            }
            if excluded_doc == NO_MORE_DOCS {
                self.excluded = None;
                return Ok(doc);
            }
            if excluded_doc > doc {
                return Ok(doc);
            }
            doc = self.required.next_doc()?;
        }
    }
}

impl DocIdIterator for ReqExclScorer {
    fn doc(&self) -> DocId {
        self.required.doc()
    }

    fn next_doc(&mut self) -> Result<DocId> {
        let doc = self.required.next_doc()?;
        self.to_non_excluded(doc)
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        let doc = self.required.advance(target)?;
        self.to_non_excluded(doc)
    }

    fn cost(&self) -> u64 {
        self.required.cost()
    }
}

impl Scorer for ReqExclScorer {
    fn score(&mut self) -> Result<f32> {
        self.required.score()
    }

    fn freq(&mut self) -> Result<u32> {
        self.required.freq()
    }
}
