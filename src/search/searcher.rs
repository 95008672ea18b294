// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The searcher: rewrite, weigh, then walk every segment.
//!
//! ```text
//! for leaf in reader.leaves():
//!     collector.set_next_reader(leaf)
//!     scorer = weight.scorer(leaf, live_docs)      # None: skip the segment
//!     while (doc = scorer.next_doc()) != NO_MORE_DOCS:
//!         if collector.collect(doc, scorer) == StopSegment: break
//! ```
//!
//! Deleted docs never reach a collector: the segment's live docs are passed
//! down as accept docs, so postings skip them at the source.

use std::sync::Arc;

use tracing::debug;

use super::rewrite::{rewrite, RewriteContext};
use super::{Explanation, Query, Weight};
use crate::collect::{
    CollectFlow, Collector, Sort, TopDocs, TopFieldCollector, TopFieldDocs, TopScoreDocCollector,
    TotalHitCountCollector,
};
use crate::config::SearchConfig;
use crate::docset::{DocId, DocIdIterator, NO_MORE_DOCS};
use crate::error::{Error, Result};
use crate::index::{IndexReader, StoredDocument};
use crate::scorer::{ClassicSimilarity, Similarity};

#[derive(Debug, Clone)]
pub struct Searcher<'r> {
    reader: &'r IndexReader,
    similarity: Arc<dyn Similarity>,
    config: SearchConfig,
}

impl<'r> Searcher<'r> {
    /// Classic TF-IDF scoring with the default configuration.
    pub fn new(reader: &'r IndexReader) -> Self {
        Self::with_config(reader, SearchConfig::default())
    }

    pub fn with_config(reader: &'r IndexReader, config: SearchConfig) -> Self {
        Self {
            reader,
            similarity: Arc::new(ClassicSimilarity),
            config,
        }
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn reader(&self) -> &'r IndexReader {
        self.reader
    }

    pub fn similarity(&self) -> &Arc<dyn Similarity> {
        &self.similarity
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn rewrite(&self, query: &Query) -> Result<Query> {
        let mut ctx = RewriteContext::new(self.reader, &self.config);
        let rewritten = rewrite(query, &mut ctx)?;
        debug!(query = %query, rewritten = %rewritten, terms_visited = ctx.terms_visited, "rewrote query");
        Ok(rewritten)
    }

    /// Rewrite `query`, build its weight and push the query norm down.
    pub fn create_normalized_weight(&self, query: &Query) -> Result<Weight> {
        let rewritten = self.rewrite(query)?;
        let mut weight = Weight::create(&rewritten, self)?;
        let sum = weight.value_for_normalization();
        let mut norm = self.similarity.query_norm(sum);
        if !norm.is_finite() {
            norm = 1.0;
        }
        weight.normalize(norm, 1.0);
        Ok(weight)
    }

    /// Result sizes never exceed the number of docs there are.
    fn clamp_hits(&self, n: usize) -> usize {
        n.min(self.reader.max_doc().max(1) as usize)
    }

    /// The `n` best hits by score.
    pub fn search(&self, query: &Query, n: usize) -> Result<TopDocs> {
        let weight = self.create_normalized_weight(query)?;
        self.search_weight_top(&weight, n)
    }

    pub(crate) fn search_weight_top(&self, weight: &Weight, n: usize) -> Result<TopDocs> {
        let mut collector = TopScoreDocCollector::new(self.clamp_hits(n))?;
        self.search_weight(weight, &mut collector)?;
        Ok(collector.top_docs())
    }

    /// The `n` best hits under `sort`, with scores tracked.
    pub fn search_sorted(&self, query: &Query, n: usize, sort: &Sort) -> Result<TopFieldDocs> {
        let mut collector = TopFieldCollector::new(sort.clone(), self.clamp_hits(n), true, true)?;
        self.search_with(query, &mut collector)?;
        Ok(collector.top_docs())
    }

    /// Feed every hit of `query` to `collector`.
    pub fn search_with<C: Collector + ?Sized>(&self, query: &Query, collector: &mut C) -> Result<()> {
        let weight = self.create_normalized_weight(query)?;
        self.search_weight(&weight, collector)
    }

    pub fn count(&self, query: &Query) -> Result<u64> {
        let mut collector = TotalHitCountCollector::new();
        self.search_with(query, &mut collector)?;
        Ok(collector.total_hits())
    }

    pub(crate) fn search_weight<C: Collector + ?Sized>(&self, weight: &Weight, collector: &mut C) -> Result<()> {
        for leaf in self.reader.leaves() {
            collector.set_next_reader(leaf)?;
            let Some(mut scorer) = weight.scorer(leaf, leaf.segment.live_docs())? else {
                debug!(segment = leaf.ord, "no scorer for segment");
                continue;
            };
            let mut collected = 0u64;
            loop {
                let doc = scorer.next_doc()?;
                if doc == NO_MORE_DOCS {
                    break;
                }
                collected += 1;
                if collector.collect(doc, &mut scorer)? == CollectFlow::StopSegment {
                    debug!(segment = leaf.ord, collected, "collector stopped segment");
                    break;
                }
            }
            debug!(segment = leaf.ord, collected, "searched segment");
        }
        Ok(())
    }

    /// How global doc `doc` scores against `query`.
    pub fn explain(&self, query: &Query, doc: DocId) -> Result<Explanation> {
        let weight = self.create_normalized_weight(query)?;
        self.explain_weight(&weight, doc)
    }

    pub(crate) fn explain_weight(&self, weight: &Weight, doc: DocId) -> Result<Explanation> {
        if doc < 0 || doc >= self.reader.max_doc() {
            return Err(Error::InvalidArgument(format!(
                "doc {} out of range 0..{}",
                doc,
                self.reader.max_doc()
            )));
        }
        let leaf = self.reader.leaf(self.reader.sub_index(doc));
        weight.explain(leaf, doc - leaf.doc_base)
    }

    /// Stored fields of global doc `doc`.
    pub fn doc(&self, doc: DocId) -> Result<&'r StoredDocument> {
        self.reader.document(doc)
    }
}
