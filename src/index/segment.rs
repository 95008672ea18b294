// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-memory segments: the reference postings source and term dictionary.
//!
//! A segment is built once from documents and never changes afterwards
//! (deletions included: they are applied at build time as a live-docs bitset).
//! Text fields are split into lowercase alphanumeric tokens; anything smarter
//! belongs to an analysis layer this crate does not have.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dictionary::{BlockTermsEnum, SliceTermsEnum, TermBlocks, TermDictionary};
use super::postings::PostingList;
use super::terms::{TermOrder, Terms, TermsEnum};
use crate::config::TermsCursor;
use crate::docset::{Bits, DocId, FixedBitSet};
use crate::error::{Error, Result};

// ============================================================================
// DOCUMENTS
// ============================================================================

/// A per-document sortable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocValue {
    Long(i64),
    Double(f64),
    Text(String),
}

/// Input document: indexed text fields plus sortable values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub values: BTreeMap<String, DocValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, field: &str, text: &str) -> Self {
        self.fields.insert(field.to_string(), text.to_string());
        self
    }

    pub fn value(mut self, field: &str, value: DocValue) -> Self {
        self.values.insert(field.to_string(), value);
        self
    }
}

/// Stored text of one document, as handed back by searches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoredDocument {
    fields: BTreeMap<String, String>,
}

impl StoredDocument {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Lowercase alphanumeric runs.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

// ============================================================================
// FIELD INDEX
// ============================================================================

/// One field's inverted index within a segment.
#[derive(Debug)]
pub struct FieldIndex {
    name: String,
    dict: Arc<TermDictionary>,
    cursor: TermsCursor,
    blocks: OnceLock<Arc<TermBlocks>>,
    /// Token count per document, for length normalization.
    lengths: Arc<[u32]>,
    has_positions: bool,
    doc_count: u64,
    sum_doc_freq: u64,
    sum_total_term_freq: u64,
}

impl FieldIndex {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dictionary(&self) -> &Arc<TermDictionary> {
        &self.dict
    }

    /// Token count of every document, indexed by doc id.
    pub fn lengths(&self) -> &Arc<[u32]> {
        &self.lengths
    }
}

impl Terms for FieldIndex {
    fn iterator(&self) -> Result<Box<dyn TermsEnum + '_>> {
        Ok(match self.cursor {
            TermsCursor::Array => Box::new(SliceTermsEnum::new(Arc::clone(&self.dict))),
            TermsCursor::Block { block_size } => {
                let blocks = self.blocks.get_or_init(|| {
                    Arc::new(TermBlocks::build(Arc::clone(&self.dict), block_size))
                });
                Box::new(BlockTermsEnum::new(Arc::clone(blocks)))
            }
        })
    }

    fn size(&self) -> u64 {
        self.dict.len() as u64
    }

    fn doc_count(&self) -> u64 {
        self.doc_count
    }

    fn sum_doc_freq(&self) -> u64 {
        self.sum_doc_freq
    }

    fn sum_total_term_freq(&self) -> u64 {
        self.sum_total_term_freq
    }

    fn has_positions(&self) -> bool {
        self.has_positions
    }

    fn order(&self) -> TermOrder {
        self.dict.order()
    }
}

// ============================================================================
// SEGMENT
// ============================================================================

/// An immutable, independently searchable chunk of the index.
#[derive(Debug)]
pub struct Segment {
    name: String,
    max_doc: DocId,
    fields: BTreeMap<String, FieldIndex>,
    live_docs: Option<Arc<FixedBitSet>>,
    stored: Vec<StoredDocument>,
    doc_values: BTreeMap<String, Vec<Option<DocValue>>>,
}

impl Segment {
    pub fn builder(name: &str) -> SegmentBuilder {
        SegmentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_doc(&self) -> DocId {
        self.max_doc
    }

    pub fn num_docs(&self) -> DocId {
        self.live_docs
            .as_ref()
            .map_or(self.max_doc, |live| live.cardinality() as DocId)
    }

    pub fn field(&self, name: &str) -> Option<&FieldIndex> {
        self.fields.get(name)
    }

    pub fn terms(&self, name: &str) -> Option<&dyn Terms> {
        self.fields.get(name).map(|f| f as &dyn Terms)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Live documents, or `None` when nothing was deleted.
    pub fn live_docs(&self) -> Option<Arc<dyn Bits>> {
        self.live_docs
            .as_ref()
            .map(|live| Arc::clone(live) as Arc<dyn Bits>)
    }

    pub fn is_live(&self, doc: DocId) -> bool {
        self.live_docs
            .as_ref()
            .map_or(true, |live| live.get(doc as usize))
    }

    pub fn document(&self, doc: DocId) -> Result<&StoredDocument> {
        usize::try_from(doc)
            .ok()
            .and_then(|d| self.stored.get(d))
            .ok_or_else(|| Error::InvalidArgument(format!("doc {} out of range in {}", doc, self.name)))
    }

    pub fn doc_value(&self, field: &str, doc: DocId) -> Option<&DocValue> {
        self.doc_values
            .get(field)
            .and_then(|values| values.get(doc as usize))
            .and_then(Option::as_ref)
    }
}

/// Accumulates documents and freezes them into a [`Segment`].
#[derive(Debug)]
pub struct SegmentBuilder {
    name: String,
    docs: Vec<Document>,
    deleted: Vec<DocId>,
    order: TermOrder,
    cursor: TermsCursor,
    without_positions: Vec<String>,
}

impl SegmentBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            docs: Vec::new(),
            deleted: Vec::new(),
            order: TermOrder::Bytewise,
            cursor: TermsCursor::Array,
            without_positions: Vec::new(),
        }
    }

    pub fn add(mut self, doc: Document) -> Self {
        self.docs.push(doc);
        self
    }

    pub fn add_all(mut self, docs: impl IntoIterator<Item = Document>) -> Self {
        self.docs.extend(docs);
        self
    }

    /// Mark a document deleted (segment-local id).
    pub fn delete(mut self, doc: DocId) -> Self {
        self.deleted.push(doc);
        self
    }

    pub fn term_order(mut self, order: TermOrder) -> Self {
        self.order = order;
        self
    }

    pub fn terms_cursor(mut self, cursor: TermsCursor) -> Self {
        self.cursor = cursor;
        self
    }

    /// Index `field` with frequencies only.
    pub fn without_positions(mut self, field: &str) -> Self {
        self.without_positions.push(field.to_string());
        self
    }

    pub fn build(self) -> Result<Segment> {
        let max_doc = DocId::try_from(self.docs.len())
            .map_err(|_| Error::InvalidArgument("segment holds too many documents".into()))?;

        // field -> term -> [(doc, positions)], docs visited in id order
        let mut inverted: BTreeMap<String, BTreeMap<Vec<u8>, Vec<(DocId, Vec<u32>)>>> =
            BTreeMap::new();
        let mut lengths: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        let mut doc_values: BTreeMap<String, Vec<Option<DocValue>>> = BTreeMap::new();
        let mut stored = Vec::with_capacity(self.docs.len());

        for (doc, document) in self.docs.iter().enumerate() {
            let doc = doc as DocId;
            for (field, text) in &document.fields {
                let tokens = tokenize(text);
                lengths
                    .entry(field.clone())
                    .or_insert_with(|| vec![0; self.docs.len()])[doc as usize] = tokens.len() as u32;
                let terms = inverted.entry(field.clone()).or_default();
                for (position, token) in tokens.into_iter().enumerate() {
                    let postings = terms.entry(token.into_bytes()).or_default();
                    match postings.last_mut() {
                        Some((last, positions)) if *last == doc => positions.push(position as u32),
                        _ => postings.push((doc, vec![position as u32])),
                    }
                }
            }
            for (field, value) in &document.values {
                doc_values
                    .entry(field.clone())
                    .or_insert_with(|| vec![None; self.docs.len()])[doc as usize] = Some(value.clone());
            }
            stored.push(StoredDocument {
                fields: document.fields.clone(),
            });
        }

        let mut fields = BTreeMap::new();
        for (name, terms) in inverted {
            let has_positions = !self.without_positions.contains(&name);
            let mut sum_doc_freq = 0;
            let mut sum_total_term_freq = 0;
            let entries = terms
                .into_iter()
                .map(|(term, postings)| {
                    let mut list = PostingList::new(has_positions);
                    for (doc, positions) in &postings {
                        list.push(*doc, positions);
                    }
                    sum_doc_freq += u64::from(list.doc_freq());
                    sum_total_term_freq += list.total_term_freq();
                    (term, list)
                })
                .collect();
            let field_lengths = lengths.remove(&name).unwrap_or_default();
            let doc_count = field_lengths.iter().filter(|&&l| l > 0).count() as u64;
            fields.insert(
                name.clone(),
                FieldIndex {
                    name,
                    dict: Arc::new(TermDictionary::new(entries, self.order)),
                    cursor: self.cursor,
                    blocks: OnceLock::new(),
                    lengths: field_lengths.into(),
                    has_positions,
                    doc_count,
                    sum_doc_freq,
                    sum_total_term_freq,
                },
            );
        }

        let live_docs = if self.deleted.is_empty() {
            None
        } else {
            let mut live = FixedBitSet::full(self.docs.len());
            for &doc in &self.deleted {
                if doc < 0 || doc >= max_doc {
                    return Err(Error::InvalidArgument(format!(
                        "cannot delete doc {} from a segment of {}",
                        doc, max_doc
                    )));
                }
                live.clear(doc as usize);
            }
            Some(Arc::new(live))
        };

        debug!(
            segment = %self.name,
            docs = max_doc,
            fields = fields.len(),
            deleted = self.deleted.len(),
            "built segment"
        );

        Ok(Segment {
            name: self.name,
            max_doc,
            fields,
            live_docs,
            stored,
            doc_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docset::{DocIdIterator, NO_MORE_DOCS};

    fn segment() -> Segment {
        Segment::builder("_0")
            .add(Document::new().text("body", "The quick brown fox"))
            .add(Document::new().text("body", "quick quick fox").value("year", DocValue::Long(2020)))
            .add(Document::new().text("title", "Lazy dog"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Hello, World! x2"), vec!["hello", "world", "x2"]);
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn test_field_statistics() {
        let seg = segment();
        let body = seg.field("body").unwrap();
        assert_eq!(body.size(), 4);
        assert_eq!(body.doc_count(), 2);
        assert_eq!(body.sum_total_term_freq(), 7);
        assert_eq!(&body.lengths()[..], &[4, 3, 0]);
        assert!(seg.field("missing").is_none());
    }

    #[test]
    fn test_postings_carry_positions() {
        let seg = segment();
        let mut terms = seg.terms("body").unwrap().iterator().unwrap();
        assert!(terms.seek_exact(b"quick").unwrap());
        assert_eq!(terms.doc_freq().unwrap(), 2);
        let mut postings = terms.postings(None).unwrap();
        assert_eq!(postings.next_doc().unwrap(), 0);
        assert_eq!(postings.next_position().unwrap(), 1);
        assert_eq!(postings.next_doc().unwrap(), 1);
        assert_eq!(postings.freq(), 2);
        assert_eq!(postings.next_doc().unwrap(), NO_MORE_DOCS);
    }

    #[test]
    fn test_deletions_and_values() {
        let seg = Segment::builder("_1")
            .add(Document::new().text("body", "a"))
            .add(Document::new().text("body", "a"))
            .delete(0)
            .build()
            .unwrap();
        assert_eq!(seg.num_docs(), 1);
        assert!(!seg.is_live(0));
        assert!(seg.live_docs().is_some());

        let seg = segment();
        assert_eq!(seg.doc_value("year", 1), Some(&DocValue::Long(2020)));
        assert_eq!(seg.doc_value("year", 0), None);
        assert_eq!(seg.document(2).unwrap().get("title"), Some("Lazy dog"));
        assert!(seg.document(9).is_err());
    }

    #[test]
    fn test_bad_delete_rejected() {
        let err = Segment::builder("_2")
            .add(Document::new())
            .delete(5)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_block_cursor_is_used_when_configured() {
        let seg = Segment::builder("_3")
            .terms_cursor(TermsCursor::Block { block_size: 2 })
            .add(Document::new().text("body", "d c b a"))
            .build()
            .unwrap();
        let mut terms = seg.terms("body").unwrap().iterator().unwrap();
        let mut seen = Vec::new();
        while terms.next().unwrap() {
            seen.push(terms.term().to_vec());
        }
        assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]);
    }
}
