// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Weights: a rewritten query bound to one reader.
//!
//! A weight is built once per search. It gathers corpus statistics, takes
//! part in query normalization, and then hands out one scorer per segment.
//!
//! ```text
//! create ──▶ value_for_normalization ──▶ normalize(query_norm, boost) ──▶ scorer(leaf)*
//! ```
//!
//! `scorer` returns `None` when a segment cannot match at all (missing
//! field, missing term), which lets boolean compilation drop or short-circuit
//! whole clauses.

use std::fmt;
use std::sync::Arc;

use super::boolean::BooleanWeight;
use super::query::{FilteredQuery, PhraseQuery, Query, TermQuery};
use super::{Explanation, Searcher};
use crate::automaton::CompiledAutomaton;
use crate::docset::{
    AcceptDocsIterator, AllDocsIterator, BitSetIterator, Bits, DocId, DocIdIterator, FixedBitSet,
};
use crate::error::{Error, Result};
use crate::index::{LeafContext, TermsEnum};
use crate::scorer::{
    ConstantScorer, ExactPhraseScorer, PhrasePositions, Scorer, ScorerNode, SimScorer, SimWeight,
    Similarity, SloppyPhraseScorer, TermScorer,
};

#[derive(Debug)]
pub enum Weight {
    Term(TermWeight),
    Boolean(BooleanWeight),
    Phrase(PhraseWeight),
    Constant(ConstantWeight),
    Filtered(FilteredWeight),
}

impl Weight {
    /// Build the weight of an already rewritten query.
    pub fn create(query: &Query, searcher: &Searcher<'_>) -> Result<Weight> {
        Ok(match query {
            Query::Term(q) => Weight::Term(TermWeight::new(q, searcher)?),
            Query::Boolean(q) => Weight::Boolean(BooleanWeight::new(q, searcher)?),
            Query::Phrase(q) => Weight::Phrase(PhraseWeight::new(q, searcher)?),
            Query::MatchAll(q) => {
                Weight::Constant(ConstantWeight::new(ConstantSource::MatchAll, q.boost, query.to_string()))
            }
            Query::ConstantScore(q) => {
                let source = match q.query.as_multi_term() {
                    Some(multi) => ConstantSource::Filter {
                        field: multi.field.to_string(),
                        automaton: multi.compile(searcher.config())?,
                    },
                    None => ConstantSource::Query(Box::new(Weight::create(&q.query, searcher)?)),
                };
                Weight::Constant(ConstantWeight::new(source, q.boost, query.to_string()))
            }
            Query::Filtered(q) => Weight::Filtered(FilteredWeight::new(q, searcher)?),
            other => match other.as_multi_term() {
                Some(multi) => Weight::Constant(ConstantWeight::new(
                    ConstantSource::Filter {
                        field: multi.field.to_string(),
                        automaton: multi.compile(searcher.config())?,
                    },
                    multi.boost,
                    other.to_string(),
                )),
                None => return Err(Error::Unsupported("query kind has no weight")),
            },
        })
    }

    /// Sum of squared weights below this node, before normalization.
    pub fn value_for_normalization(&self) -> f32 {
        match self {
            Weight::Term(w) => w.sim_weight.value_for_normalization(),
            Weight::Boolean(w) => w.value_for_normalization(),
            Weight::Phrase(w) => w.sim_weight.value_for_normalization(),
            Weight::Constant(w) => w.query_weight * w.query_weight,
            Weight::Filtered(w) => w.query.value_for_normalization() * w.boost * w.boost,
        }
    }

    pub fn normalize(&mut self, query_norm: f32, top_level_boost: f32) {
        match self {
            Weight::Term(w) => w.sim_weight.normalize(query_norm, top_level_boost),
            Weight::Boolean(w) => w.normalize(query_norm, top_level_boost),
            Weight::Phrase(w) => w.sim_weight.normalize(query_norm, top_level_boost),
            Weight::Constant(w) => {
                w.query_norm = query_norm * top_level_boost;
                w.query_weight *= w.query_norm;
            }
            Weight::Filtered(w) => w.query.normalize(query_norm, top_level_boost * w.boost),
        }
    }

    /// Scorer over one segment, skipping docs `accept_docs` rejects; `None`
    /// when nothing in the segment can match.
    pub fn scorer(&self, leaf: LeafContext<'_>, accept_docs: Option<Arc<dyn Bits>>) -> Result<Option<ScorerNode>> {
        match self {
            Weight::Term(w) => w.scorer(leaf, accept_docs),
            Weight::Boolean(w) => w.scorer(leaf, accept_docs),
            Weight::Phrase(w) => w.scorer(leaf, accept_docs),
            Weight::Constant(w) => w.scorer(leaf, accept_docs),
            Weight::Filtered(w) => w.scorer(leaf, accept_docs),
        }
    }

    /// How segment-local `doc` scores, or why it does not match.
    pub fn explain(&self, leaf: LeafContext<'_>, doc: DocId) -> Result<Explanation> {
        match self {
            Weight::Term(w) => w.explain(leaf, doc),
            Weight::Boolean(w) => w.explain(leaf, doc),
            Weight::Phrase(w) => w.explain(leaf, doc),
            Weight::Constant(w) => w.explain(leaf, doc),
            Weight::Filtered(w) => w.explain(leaf, doc),
        }
    }
}

/// Position `scorer` on `doc`; true when it matches there.
pub(crate) fn lands_on(scorer: &mut ScorerNode, doc: DocId) -> Result<bool> {
    Ok(scorer.doc() == doc || (scorer.doc() < doc && scorer.advance(doc)? == doc))
}

fn describe(query: &dyn fmt::Display, doc: DocId, similarity: &dyn Similarity) -> String {
    format!("weight({} in {}) [{:?}]", query, doc, similarity)
}

// ============================================================================
// TERM
// ============================================================================

#[derive(Debug)]
pub struct TermWeight {
    query: TermQuery,
    similarity: Arc<dyn Similarity>,
    sim_weight: SimWeight,
}

impl TermWeight {
    fn new(query: &TermQuery, searcher: &Searcher<'_>) -> Result<Self> {
        let reader = searcher.reader();
        let collection = reader.collection_statistics(&query.field);
        let term = reader.term_statistics(&query.field, query.term.as_bytes())?;
        let similarity = Arc::clone(searcher.similarity());
        let sim_weight = similarity.compute_weight(query.boost, &collection, &[term]);
        Ok(Self {
            query: query.clone(),
            similarity,
            sim_weight,
        })
    }

    fn sim_scorer(&self, leaf: LeafContext<'_>) -> SimScorer {
        let lengths = leaf.segment.field(&self.query.field).map(|f| Arc::clone(f.lengths()));
        SimScorer::new(Arc::clone(&self.similarity), self.sim_weight.clone(), lengths)
    }

    fn scorer(&self, leaf: LeafContext<'_>, accept_docs: Option<Arc<dyn Bits>>) -> Result<Option<ScorerNode>> {
        let Some(terms) = leaf.segment.terms(&self.query.field) else {
            return Ok(None);
        };
        let mut tenum = terms.iterator()?;
        if !tenum.seek_exact(self.query.term.as_bytes())? {
            return Ok(None);
        }
        let postings = tenum.postings(accept_docs)?;
        Ok(Some(ScorerNode::Term(TermScorer::new(postings, self.sim_scorer(leaf)))))
    }

    fn explain(&self, leaf: LeafContext<'_>, doc: DocId) -> Result<Explanation> {
        if let Some(mut scorer) = self.scorer(leaf, None)? {
            if lands_on(&mut scorer, doc)? {
                let freq = scorer.freq()? as f32;
                let description = describe(&Query::Term(self.query.clone()), doc, &*self.similarity);
                return Ok(self.sim_scorer(leaf).explain(doc, freq, &description));
            }
        }
        Ok(Explanation::no_match("no matching term", Vec::new()))
    }
}

// ============================================================================
// PHRASE
// ============================================================================

#[derive(Debug)]
pub struct PhraseWeight {
    query: PhraseQuery,
    positions: Vec<u32>,
    similarity: Arc<dyn Similarity>,
    sim_weight: SimWeight,
}

impl PhraseWeight {
    fn new(query: &PhraseQuery, searcher: &Searcher<'_>) -> Result<Self> {
        let positions = query.term_positions()?;
        let reader = searcher.reader();
        let collection = reader.collection_statistics(&query.field);
        let terms = query
            .terms
            .iter()
            .map(|t| reader.term_statistics(&query.field, t.as_bytes()))
            .collect::<Result<Vec<_>>>()?;
        let similarity = Arc::clone(searcher.similarity());
        let sim_weight = similarity.compute_weight(query.boost, &collection, &terms);
        Ok(Self {
            query: query.clone(),
            positions,
            similarity,
            sim_weight,
        })
    }

    fn sim_scorer(&self, leaf: LeafContext<'_>) -> SimScorer {
        let lengths = leaf.segment.field(&self.query.field).map(|f| Arc::clone(f.lengths()));
        SimScorer::new(Arc::clone(&self.similarity), self.sim_weight.clone(), lengths)
    }

    fn scorer(&self, leaf: LeafContext<'_>, accept_docs: Option<Arc<dyn Bits>>) -> Result<Option<ScorerNode>> {
        let field = &self.query.field;
        let Some(terms) = leaf.segment.terms(field) else {
            return Ok(None);
        };
        if !terms.has_positions() {
            return Err(Error::MissingPositions(field.clone()));
        }
        let mut tenum = terms.iterator()?;
        let mut pps = Vec::with_capacity(self.query.terms.len());
        for (ord, (term, &position)) in self.query.terms.iter().zip(&self.positions).enumerate() {
            if !tenum.seek_exact(term.as_bytes())? {
                return Ok(None);
            }
            let postings = tenum.postings(accept_docs.clone())?;
            pps.push(PhrasePositions::new(postings, position as i32, ord, term.as_bytes().to_vec()));
        }
        let sim = self.sim_scorer(leaf);
        Ok(Some(if self.query.slop == 0 {
            ScorerNode::ExactPhrase(ExactPhraseScorer::new(pps, sim))
        } else {
            ScorerNode::SloppyPhrase(SloppyPhraseScorer::new(pps, self.query.slop, sim))
        }))
    }

    fn explain(&self, leaf: LeafContext<'_>, doc: DocId) -> Result<Explanation> {
        if let Some(mut scorer) = self.scorer(leaf, None)? {
            if lands_on(&mut scorer, doc)? {
                let freq = match &mut scorer {
                    ScorerNode::SloppyPhrase(s) => s.sloppy_freq(),
                    other => other.freq()? as f32,
                };
                let description = describe(&Query::Phrase(self.query.clone()), doc, &*self.similarity);
                return Ok(self.sim_scorer(leaf).explain(doc, freq, &description));
            }
        }
        Ok(Explanation::no_match("no matching term", Vec::new()))
    }
}

// ============================================================================
// CONSTANT
// ============================================================================

/// Where a constant-score weight gets its docs from.
#[derive(Debug)]
pub enum ConstantSource {
    MatchAll,
    /// Every doc holding a term the automaton accepts.
    Filter {
        field: String,
        automaton: CompiledAutomaton,
    },
    /// Whatever another weight matches; its scores are ignored.
    Query(Box<Weight>),
}

#[derive(Debug)]
pub struct ConstantWeight {
    source: ConstantSource,
    boost: f32,
    query_norm: f32,
    query_weight: f32,
    description: String,
}

impl ConstantWeight {
    fn new(source: ConstantSource, boost: f32, description: String) -> Self {
        Self {
            source,
            boost,
            query_norm: 1.0,
            query_weight: boost,
            description,
        }
    }

    pub fn source(&self) -> &ConstantSource {
        &self.source
    }

    fn scorer(&self, leaf: LeafContext<'_>, accept_docs: Option<Arc<dyn Bits>>) -> Result<Option<ScorerNode>> {
        let docs: Box<dyn DocIdIterator> = match &self.source {
            ConstantSource::MatchAll => {
                let all = AllDocsIterator::new(leaf.segment.max_doc());
                match accept_docs {
                    Some(accept) => Box::new(AcceptDocsIterator::new(all, accept)),
                    None => Box::new(all),
                }
            }
            ConstantSource::Filter { field, automaton } => {
                let Some(terms) = leaf.segment.terms(field) else {
                    return Ok(None);
                };
                let mut bits = FixedBitSet::new(leaf.segment.max_doc().max(0) as usize);
                let mut tenum = automaton.terms(terms, field)?;
                while tenum.next()? {
                    let mut postings = tenum.postings(accept_docs.clone())?;
                    bits.or_iterator(&mut postings)?;
                }
                if bits.cardinality() == 0 {
                    return Ok(None);
                }
                Box::new(BitSetIterator::new(bits))
            }
            ConstantSource::Query(inner) => match inner.scorer(leaf, accept_docs)? {
                Some(scorer) => Box::new(scorer),
                None => return Ok(None),
            },
        };
        Ok(Some(ScorerNode::Constant(ConstantScorer::new(docs, self.query_weight))))
    }

    fn explain(&self, leaf: LeafContext<'_>, doc: DocId) -> Result<Explanation> {
        if let Some(mut scorer) = self.scorer(leaf, None)? {
            if lands_on(&mut scorer, doc)? {
                return Ok(Explanation::matched(
                    self.query_weight,
                    format!("{}, product of:", self.description),
                    vec![
                        Explanation::matched(self.boost, "boost", Vec::new()),
                        Explanation::matched(self.query_norm, "queryNorm", Vec::new()),
                    ],
                ));
            }
        }
        Ok(Explanation::no_match(
            format!("{} doesn't match id {}", self.description, doc),
            Vec::new(),
        ))
    }
}

// ============================================================================
// FILTERED
// ============================================================================

/// A scoring weight whose docs are cut down to what a second weight matches.
///
/// Per segment the filter is drained into a bitset, which then replaces the
/// accept docs handed to the scoring side.
#[derive(Debug)]
pub struct FilteredWeight {
    query: Box<Weight>,
    filter: Box<Weight>,
    boost: f32,
    filter_description: String,
}

impl FilteredWeight {
    fn new(query: &FilteredQuery, searcher: &Searcher<'_>) -> Result<Self> {
        Ok(Self {
            query: Box::new(Weight::create(&query.query, searcher)?),
            filter: Box::new(Weight::create(&query.filter, searcher)?),
            boost: query.boost,
            filter_description: query.filter.to_string(),
        })
    }

    /// Docs of the segment the filter lets through, live docs applied;
    /// `None` when there are none.
    fn filter_bits(&self, leaf: LeafContext<'_>, accept_docs: Option<Arc<dyn Bits>>) -> Result<Option<FixedBitSet>> {
        let Some(mut filter) = self.filter.scorer(leaf, accept_docs)? else {
            return Ok(None);
        };
        let mut bits = FixedBitSet::new(leaf.segment.max_doc().max(0) as usize);
        bits.or_iterator(&mut filter)?;
        Ok((bits.cardinality() > 0).then_some(bits))
    }

    fn scorer(&self, leaf: LeafContext<'_>, accept_docs: Option<Arc<dyn Bits>>) -> Result<Option<ScorerNode>> {
        let Some(bits) = self.filter_bits(leaf, accept_docs)? else {
            return Ok(None);
        };
        let accept: Arc<dyn Bits> = Arc::new(bits);
        self.query.scorer(leaf, Some(accept))
    }

    fn explain(&self, leaf: LeafContext<'_>, doc: DocId) -> Result<Explanation> {
        let inner = self.query.explain(leaf, doc)?;
        let passes = match self.filter_bits(leaf, None)? {
            Some(bits) => bits.get(doc as usize),
            None => false,
        };
        if passes {
            Ok(inner)
        } else {
            Ok(Explanation::no_match(
                format!("failure to match filter: {}", self.filter_description),
                vec![inner],
            ))
        }
    }
}
