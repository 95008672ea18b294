// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! K best hits by an arbitrary sort.
//!
//! A [`Sort`] is a list of [`SortField`]s compared in turn, with the doc id
//! as the final tiebreak. Each field's natural direction:
//!
//! | Key         | Natural order                         |
//! |-------------|---------------------------------------|
//! | `score`     | higher score first                    |
//! | `doc`       | lower doc id first                    |
//! | `field`     | ascending doc value, missing last     |
//!
//! `reverse` flips a field's direction (missing values stay last).

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{CollectFlow, Collector, HeapOrder, PriorityQueue};
use crate::docset::DocId;
use crate::error::{Error, Result};
use crate::index::{DocValue, LeafContext, Segment};
use crate::scorer::Scorer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Score,
    Doc,
    /// A per-document value stored under this name.
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortField {
    pub key: SortKey,
    #[serde(default)]
    pub reverse: bool,
}

impl SortField {
    pub fn score() -> Self {
        Self {
            key: SortKey::Score,
            reverse: false,
        }
    }

    pub fn doc() -> Self {
        Self {
            key: SortKey::Doc,
            reverse: false,
        }
    }

    pub fn field(name: &str) -> Self {
        Self {
            key: SortKey::Field(name.to_string()),
            reverse: false,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = !self.reverse;
        self
    }

    fn compare(&self, a: &SortValue, b: &SortValue) -> Ordering {
        let natural = match (a, b) {
            (SortValue::Score(a), SortValue::Score(b)) => b.total_cmp(a),
            (SortValue::Doc(a), SortValue::Doc(b)) => a.cmp(b),
            (SortValue::Value(a), SortValue::Value(b)) => match (a, b) {
                (Some(a), Some(b)) => compare_doc_values(a, b),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            _ => Ordering::Equal,
        };
        if self.reverse {
            natural.reverse()
        } else {
            natural
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            SortKey::Score => f.write_str("<score>")?,
            SortKey::Doc => f.write_str("<doc>")?,
            SortKey::Field(name) => write!(f, "\"{}\"", name)?,
        }
        if self.reverse {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// Numbers before text; integers and floats compare by value.
fn compare_doc_values(a: &DocValue, b: &DocValue) -> Ordering {
    match (a, b) {
        (DocValue::Long(a), DocValue::Long(b)) => a.cmp(b),
        (DocValue::Text(a), DocValue::Text(b)) => a.cmp(b),
        (DocValue::Text(_), _) => Ordering::Greater,
        (_, DocValue::Text(_)) => Ordering::Less,
        (a, b) => numeric(a).total_cmp(&numeric(b)),
    }
}

fn numeric(value: &DocValue) -> f64 {
    match value {
        DocValue::Long(v) => *v as f64,
        DocValue::Double(v) => *v,
        DocValue::Text(_) => f64::NAN,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub fields: Vec<SortField>,
}

impl Sort {
    pub fn new(fields: Vec<SortField>) -> Self {
        Self { fields }
    }

    /// By score, best first.
    pub fn relevance() -> Self {
        Self::new(vec![SortField::score()])
    }

    pub fn index_order() -> Self {
        Self::new(vec![SortField::doc()])
    }

    pub fn needs_scores(&self) -> bool {
        self.fields.iter().any(|f| f.key == SortKey::Score)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

/// One sort key's value for a hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SortValue {
    Score(f32),
    Doc(DocId),
    Value(Option<DocValue>),
}

impl fmt::Display for SortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortValue::Score(score) => write!(f, "{}", score),
            SortValue::Doc(doc) => write!(f, "{}", doc),
            SortValue::Value(None) => f.write_str("null"),
            SortValue::Value(Some(DocValue::Long(v))) => write!(f, "{}", v),
            SortValue::Value(Some(DocValue::Double(v))) => write!(f, "{}", v),
            SortValue::Value(Some(DocValue::Text(v))) => f.write_str(v),
        }
    }
}

/// A hit with the values it was sorted by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDoc {
    pub doc: DocId,
    /// NaN unless scores were tracked.
    pub score: f32,
    pub fields: Vec<SortValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopFieldDocs {
    pub total_hits: u64,
    pub field_docs: Vec<FieldDoc>,
    /// NaN unless the max score was tracked.
    pub max_score: f32,
    pub sort: Sort,
}

#[derive(Debug, Clone)]
struct FieldOrder {
    fields: Arc<[SortField]>,
}

impl FieldOrder {
    fn compare(&self, a: &FieldDoc, b: &FieldDoc) -> Ordering {
        self.fields
            .iter()
            .zip(a.fields.iter().zip(&b.fields))
            .map(|(field, (va, vb))| field.compare(va, vb))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.doc.cmp(&b.doc))
    }
}

impl HeapOrder<FieldDoc> for FieldOrder {
    fn less_than(&self, a: &FieldDoc, b: &FieldDoc) -> bool {
        self.compare(a, b) == Ordering::Greater
    }
}

/// Keeps the K best hits under a [`Sort`].
///
/// Every collected doc counts towards `total_hits`, whatever its score.
#[derive(Debug)]
pub struct TopFieldCollector {
    sort: Sort,
    queue: PriorityQueue<FieldDoc, FieldOrder>,
    doc_base: DocId,
    segment: Option<Arc<Segment>>,
    total_hits: u64,
    track_scores: bool,
    track_max_score: bool,
    max_score: f32,
}

impl TopFieldCollector {
    pub fn new(sort: Sort, num_hits: usize, track_scores: bool, track_max_score: bool) -> Result<Self> {
        if sort.fields.is_empty() {
            return Err(Error::InvalidArgument("sort needs at least one field".into()));
        }
        let order = FieldOrder {
            fields: sort.fields.clone().into(),
        };
        Ok(Self {
            queue: PriorityQueue::new(num_hits, order)?,
            sort,
            doc_base: 0,
            segment: None,
            total_hits: 0,
            track_scores,
            track_max_score,
            max_score: f32::NEG_INFINITY,
        })
    }

    fn needs_score(&self) -> bool {
        self.track_scores || self.track_max_score || self.sort.needs_scores()
    }

    fn sort_value(&self, key: &SortKey, doc: DocId, score: f32) -> SortValue {
        match key {
            SortKey::Score => SortValue::Score(score),
            SortKey::Doc => SortValue::Doc(self.doc_base + doc),
            SortKey::Field(name) => SortValue::Value(
                self.segment
                    .as_ref()
                    .and_then(|segment| segment.doc_value(name, doc))
                    .cloned(),
            ),
        }
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    pub fn top_docs(mut self) -> TopFieldDocs {
        let field_docs = self.queue.drain_sorted();
        let max_score = if self.track_max_score { self.max_score } else { f32::NAN };
        TopFieldDocs {
            total_hits: self.total_hits,
            field_docs,
            max_score,
            sort: self.sort,
        }
    }
}

impl Collector for TopFieldCollector {
    fn set_next_reader(&mut self, leaf: LeafContext<'_>) -> Result<()> {
        self.doc_base = leaf.doc_base;
        self.segment = Some(Arc::clone(leaf.segment));
        Ok(())
    }

    fn collect(&mut self, doc: DocId, scorer: &mut dyn Scorer) -> Result<CollectFlow> {
        self.total_hits += 1;
        let score = if self.needs_score() { scorer.score()? } else { f32::NAN };
        if self.track_max_score && score > self.max_score {
            self.max_score = score;
        }
        let fields = self
            .sort
            .fields
            .iter()
            .map(|field| self.sort_value(&field.key, doc, score))
            .collect();
        let hit = FieldDoc {
            doc: self.doc_base + doc,
            score: if self.track_scores { score } else { f32::NAN },
            fields,
        };
        self.queue.insert_with_overflow(hit);
        Ok(CollectFlow::Continue)
    }
}
