// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Term weighting.
//!
//! Scoring is split in two phases, the way boolean queries need it:
//!
//! 1. **Weight**: per query term, from corpus statistics only. Every leaf
//!    reports `value_for_normalization()`; the searcher sums them, asks the
//!    similarity for a `query_norm`, and pushes it back down with
//!    `normalize()`. After that each leaf's weight is fixed for the search.
//! 2. **Score**: per document, `tf(freq) × weight × norm(doc)`.
//!
//! Coordination factors (`coord`) also come from here. The combinators only
//! multiply by what they are given.
//!
//! # Classic TF-IDF
//!
//! | Factor      | Formula                          |
//! |-------------|----------------------------------|
//! | `tf`        | `sqrt(freq)`                     |
//! | `idf`       | `1 + ln(max_doc / (doc_freq+1))` |
//! | `queryNorm` | `1 / sqrt(sum of squares)`       |
//! | `coord`     | `overlap / max_overlap`          |
//! | `norm`      | `1 / sqrt(field length)`         |
//! | `sloppy`    | `1 / (distance + 1)`             |

use std::fmt;
use std::sync::Arc;

use crate::docset::DocId;
use crate::index::{CollectionStatistics, TermStatistics};
use crate::search::Explanation;

pub trait Similarity: fmt::Debug + Send + Sync {
    /// Reward for matching `overlap` of `max_overlap` clauses.
    fn coord(&self, overlap: usize, max_overlap: usize) -> f32;

    fn query_norm(&self, sum_of_squared_weights: f32) -> f32;

    fn tf(&self, freq: f32) -> f32;

    fn idf(&self, doc_freq: u64, max_doc: u64) -> f32;

    /// Normalization for a field holding `length` tokens.
    fn length_norm(&self, length: u32) -> f32;

    /// Frequency contribution of a sloppy phrase match spanning `distance`.
    fn sloppy_freq(&self, distance: u32) -> f32;

    /// Query-time weight of one term (or the sum over a phrase's terms).
    fn compute_weight(
        &self,
        boost: f32,
        collection: &CollectionStatistics,
        terms: &[TermStatistics],
    ) -> SimWeight {
        let mut idf = 0.0;
        let mut details = Vec::with_capacity(terms.len());
        for term in terms {
            let value = self.idf(term.doc_freq, collection.max_doc);
            idf += value;
            details.push(Explanation::matched(
                value,
                format!(
                    "idf(docFreq={}, maxDocs={})",
                    term.doc_freq, collection.max_doc
                ),
                Vec::new(),
            ));
        }
        let idf_explain = match details.len() {
            1 => details.remove(0),
            _ => Explanation::matched(idf, "idf(), sum of:", details),
        };
        SimWeight::new(idf, boost, idf_explain)
    }
}

/// Classic vector-space TF-IDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicSimilarity;

impl Similarity for ClassicSimilarity {
    fn coord(&self, overlap: usize, max_overlap: usize) -> f32 {
        if max_overlap == 0 {
            return 1.0;
        }
        overlap as f32 / max_overlap as f32
    }

    fn query_norm(&self, sum_of_squared_weights: f32) -> f32 {
        if sum_of_squared_weights <= 0.0 || !sum_of_squared_weights.is_finite() {
            return 1.0;
        }
        1.0 / sum_of_squared_weights.sqrt()
    }

    fn tf(&self, freq: f32) -> f32 {
        freq.sqrt()
    }

    fn idf(&self, doc_freq: u64, max_doc: u64) -> f32 {
        (1.0 + (max_doc as f64 / (doc_freq as f64 + 1.0)).ln()) as f32
    }

    fn length_norm(&self, length: u32) -> f32 {
        1.0 / (length.max(1) as f32).sqrt()
    }

    fn sloppy_freq(&self, distance: u32) -> f32 {
        1.0 / (distance as f32 + 1.0)
    }
}

/// Normalized query-side weight of one leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct SimWeight {
    pub idf: f32,
    pub boost: f32,
    /// `query_norm × top_level_boost` once normalized.
    pub query_norm: f32,
    /// `idf × boost × query_norm`.
    pub query_weight: f32,
    /// `query_weight × idf`: what a document's tf and norm multiply.
    pub value: f32,
    idf_explain: Explanation,
}

impl SimWeight {
    pub fn new(idf: f32, boost: f32, idf_explain: Explanation) -> Self {
        let query_weight = idf * boost;
        Self {
            idf,
            boost,
            query_norm: 1.0,
            query_weight,
            value: query_weight * idf,
            idf_explain,
        }
    }

    pub fn value_for_normalization(&self) -> f32 {
        self.query_weight * self.query_weight
    }

    pub fn normalize(&mut self, query_norm: f32, top_level_boost: f32) {
        self.query_norm = query_norm * top_level_boost;
        self.query_weight *= self.query_norm;
        self.value = self.query_weight * self.idf;
    }

    pub fn explain_query(&self) -> Explanation {
        let mut details = Vec::new();
        if self.boost != 1.0 {
            details.push(Explanation::matched(self.boost, "boost", Vec::new()));
        }
        details.push(self.idf_explain.clone());
        details.push(Explanation::matched(self.query_norm, "queryNorm", Vec::new()));
        Explanation::matched(self.query_weight, "queryWeight, product of:", details)
    }
}

/// Per-segment document scorer built from a normalized [`SimWeight`].
#[derive(Debug, Clone)]
pub struct SimScorer {
    similarity: Arc<dyn Similarity>,
    weight: SimWeight,
    lengths: Option<Arc<[u32]>>,
}

impl SimScorer {
    pub fn new(similarity: Arc<dyn Similarity>, weight: SimWeight, lengths: Option<Arc<[u32]>>) -> Self {
        Self {
            similarity,
            weight,
            lengths,
        }
    }

    fn norm(&self, doc: DocId) -> f32 {
        self.lengths
            .as_ref()
            .and_then(|lengths| usize::try_from(doc).ok().and_then(|d| lengths.get(d)))
            .map_or(1.0, |&len| self.similarity.length_norm(len))
    }

    pub fn score(&self, doc: DocId, freq: f32) -> f32 {
        self.similarity.tf(freq) * self.weight.value * self.norm(doc)
    }

    pub fn sloppy_freq(&self, distance: u32) -> f32 {
        self.similarity.sloppy_freq(distance)
    }

    pub fn explain(&self, doc: DocId, freq: f32, description: &str) -> Explanation {
        let tf = self.similarity.tf(freq);
        let norm = self.norm(doc);
        let field = Explanation::matched(
            tf * self.weight.idf * norm,
            format!("fieldWeight in {}, product of:", doc),
            vec![
                Explanation::matched(
                    tf,
                    format!("tf(freq={}), with freq of:", freq),
                    vec![Explanation::matched(freq, "termFreq", Vec::new())],
                ),
                self.weight.idf_explain.clone(),
                Explanation::matched(norm, format!("fieldNorm(doc={})", doc), Vec::new()),
            ],
        );
        let query = self.weight.explain_query();
        if query.value == 1.0 {
            return Explanation::matched(field.value, description.to_string(), field.details);
        }
        Explanation::matched(
            query.value * field.value,
            format!("{}, product of:", description),
            vec![query, field],
        )
    }
}
