// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A ranked result set that grows on demand.
//!
//! `Hits` fetches the top 100 on creation and, whenever a caller reaches past
//! what it holds, searches again for twice as many. Scores are divided by the
//! best score when that exceeds 1, so they read as relevance in `(0, 1]`.
//! Stored documents are loaded lazily and kept in a small LRU cache owned by
//! the result set.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::debug;

use super::{Query, Searcher, Weight};
use crate::collect::ScoreDoc;
use crate::docset::DocId;
use crate::error::{Error, Result};
use crate::index::StoredDocument;

/// Smallest batch worth a search.
const MIN_FETCH: usize = 50;

pub struct Hits<'r> {
    searcher: Searcher<'r>,
    weight: Weight,
    hits: Vec<ScoreDoc>,
    length: usize,
    cache: LruCache<usize, Arc<StoredDocument>>,
}

impl<'r> Hits<'r> {
    pub fn new(searcher: &Searcher<'r>, query: &Query) -> Result<Self> {
        let weight = searcher.create_normalized_weight(query)?;
        let capacity = NonZeroUsize::new(searcher.config().hits_cache_capacity)
            .ok_or(Error::InvalidCapacity(0))?;
        let mut hits = Self {
            searcher: searcher.clone(),
            weight,
            hits: Vec::new(),
            length: 0,
            cache: LruCache::new(capacity),
        };
        hits.fetch_more(MIN_FETCH)?;
        Ok(hits)
    }

    /// Search again for at least `2 × min` hits.
    fn fetch_more(&mut self, min: usize) -> Result<()> {
        let min = min.max(self.hits.len());
        let top = self.searcher.search_weight_top(&self.weight, min * 2)?;
        self.length = top.total_hits as usize;
        let norm = if top.max_score > 1.0 { 1.0 / top.max_score } else { 1.0 };
        let start = self.hits.len();
        self.hits.extend(
            top.score_docs[start.min(top.score_docs.len())..]
                .iter()
                .map(|sd| ScoreDoc::new(sd.doc, sd.score * norm)),
        );
        debug!(fetched = self.hits.len(), total = self.length, "fetched hits");
        Ok(())
    }

    fn hit(&mut self, n: usize) -> Result<ScoreDoc> {
        if n >= self.length {
            return Err(Error::InvalidArgument(format!("hit {} out of range 0..{}", n, self.length)));
        }
        if n >= self.hits.len() {
            self.fetch_more(n)?;
        }
        self.hits
            .get(n)
            .copied()
            .ok_or_else(|| Error::InvalidArgument(format!("hit {} out of range 0..{}", n, self.hits.len())))
    }

    /// Total number of matching docs.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Normalized score of the `n`th hit.
    pub fn score(&mut self, n: usize) -> Result<f32> {
        Ok(self.hit(n)?.score)
    }

    /// Global doc id of the `n`th hit.
    pub fn id(&mut self, n: usize) -> Result<DocId> {
        Ok(self.hit(n)?.doc)
    }

    /// Stored fields of the `n`th hit, cached.
    pub fn doc(&mut self, n: usize) -> Result<Arc<StoredDocument>> {
        if let Some(doc) = self.cache.get(&n) {
            return Ok(Arc::clone(doc));
        }
        let id = self.id(n)?;
        let doc = Arc::new(self.searcher.doc(id)?.clone());
        self.cache.put(n, Arc::clone(&doc));
        Ok(doc)
    }

    /// Documents currently cached.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
