// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A reader over several segments, each with its own doc base.
//!
//! Global doc ids are `doc_base + local id`. Searching visits segments one
//! after another; [`IndexReader::sub_index`] maps a global id back to its
//! segment, which is how rescoring re-enters the right segment.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::segment::{Document, Segment, StoredDocument};
use super::terms::TermOrder;
use super::{CollectionStatistics, TermStatistics};
use crate::config::TermsCursor;
use crate::docset::DocId;
use crate::error::{Error, Result};

/// One segment as seen from the composite reader.
#[derive(Debug, Clone, Copy)]
pub struct LeafContext<'a> {
    /// Position of this segment among the reader's leaves.
    pub ord: usize,
    /// Added to segment-local ids to get global ids.
    pub doc_base: DocId,
    pub segment: &'a Arc<Segment>,
}

/// Ordered segments plus their doc bases.
#[derive(Debug, Clone)]
pub struct IndexReader {
    segments: Vec<Arc<Segment>>,
    doc_bases: Vec<DocId>,
    max_doc: DocId,
}

impl IndexReader {
    /// Open a reader over `segments`.
    ///
    /// Every segment must sort a given field the same way; a reader that
    /// mixes orders cannot merge or seek terms consistently.
    pub fn new(segments: Vec<Segment>) -> Result<Self> {
        let mut orders: BTreeMap<&str, TermOrder> = BTreeMap::new();
        for segment in &segments {
            for name in segment.field_names() {
                let order = segment.terms(name).map_or(TermOrder::Bytewise, |t| t.order());
                let expected = *orders.entry(name).or_insert(order);
                if expected != order {
                    return Err(Error::TermOrderMismatch {
                        field: name.to_string(),
                        expected: expected.name(),
                        found: order.name(),
                    });
                }
            }
        }

        let mut doc_bases = Vec::with_capacity(segments.len());
        let mut max_doc: DocId = 0;
        for segment in &segments {
            doc_bases.push(max_doc);
            max_doc = max_doc
                .checked_add(segment.max_doc())
                .ok_or_else(|| Error::InvalidArgument("index holds too many documents".into()))?;
        }

        debug!(segments = segments.len(), max_doc, "opened reader");
        Ok(Self {
            segments: segments.into_iter().map(Arc::new).collect(),
            doc_bases,
            max_doc,
        })
    }

    /// Split `docs` into segments of at most `segment_size` documents.
    pub fn from_documents(
        docs: Vec<Document>,
        segment_size: usize,
        cursor: TermsCursor,
    ) -> Result<Self> {
        if segment_size == 0 {
            return Err(Error::InvalidArgument("segment_size must be positive".into()));
        }
        let mut segments = Vec::new();
        let mut docs = docs.into_iter().peekable();
        while docs.peek().is_some() {
            let chunk: Vec<Document> = docs.by_ref().take(segment_size).collect();
            let name = format!("_{}", segments.len());
            segments.push(
                Segment::builder(&name)
                    .terms_cursor(cursor)
                    .add_all(chunk)
                    .build()?,
            );
        }
        Self::new(segments)
    }

    pub fn leaves(&self) -> impl Iterator<Item = LeafContext<'_>> {
        self.segments
            .iter()
            .zip(&self.doc_bases)
            .enumerate()
            .map(|(ord, (segment, &doc_base))| LeafContext {
                ord,
                doc_base,
                segment,
            })
    }

    pub fn leaf(&self, ord: usize) -> LeafContext<'_> {
        LeafContext {
            ord,
            doc_base: self.doc_bases[ord],
            segment: &self.segments[ord],
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.segments.len()
    }

    /// Index of the segment holding global id `doc`.
    pub fn sub_index(&self, doc: DocId) -> usize {
        self.doc_bases
            .partition_point(|&base| base <= doc)
            .saturating_sub(1)
    }

    pub fn max_doc(&self) -> DocId {
        self.max_doc
    }

    pub fn num_docs(&self) -> DocId {
        self.segments.iter().map(|s| s.num_docs()).sum()
    }

    pub fn document(&self, doc: DocId) -> Result<&StoredDocument> {
        if doc < 0 || doc >= self.max_doc {
            return Err(Error::InvalidArgument(format!(
                "doc {} out of range 0..{}",
                doc, self.max_doc
            )));
        }
        let leaf = self.leaf(self.sub_index(doc));
        leaf.segment.document(doc - leaf.doc_base)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.segments.iter().any(|s| s.field(field).is_some())
    }

    /// Field-level statistics summed over segments.
    pub fn collection_statistics(&self, field: &str) -> CollectionStatistics {
        let mut stats = CollectionStatistics {
            field: field.to_string(),
            max_doc: self.max_doc.max(0) as u64,
            doc_count: 0,
            sum_doc_freq: 0,
            sum_total_term_freq: 0,
        };
        for terms in self.segments.iter().filter_map(|s| s.terms(field)) {
            stats.doc_count += terms.doc_count();
            stats.sum_doc_freq += terms.sum_doc_freq();
            stats.sum_total_term_freq += terms.sum_total_term_freq();
        }
        stats
    }

    /// Term-level statistics summed over segments.
    pub fn term_statistics(&self, field: &str, term: &[u8]) -> Result<TermStatistics> {
        let mut stats = TermStatistics {
            term: term.to_vec(),
            doc_freq: 0,
            total_term_freq: 0,
        };
        for terms in self.segments.iter().filter_map(|s| s.terms(field)) {
            let mut cursor = terms.iterator()?;
            if cursor.seek_exact(term)? {
                stats.doc_freq += u64::from(cursor.doc_freq()?);
                stats.total_term_freq += cursor.total_term_freq()?;
            }
        }
        Ok(stats)
    }
}
