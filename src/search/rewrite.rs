// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Rewriting: turn a query tree into one the weights can score directly.
//!
//! Multi-term queries are the main customers. Each one picks a
//! [`RewriteMethod`]:
//!
//! | Method           | Result                                         | Bound              |
//! |------------------|------------------------------------------------|--------------------|
//! | `ConstantScore`  | unchanged; the weight builds a per-segment bitset | none            |
//! | `ScoringBoolean` | `should` boolean of every matching term         | `max_clause_count` |
//! | `TopTerms`       | `should` boolean of the best terms by boost     | `size`             |
//!
//! Besides that, a boolean with a single non-prohibited clause collapses into
//! that clause, and a one-term phrase becomes a term query. Rewriting repeats
//! until the tree stops changing.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use super::query::{BooleanQuery, MultiTerm, Query, TermQuery};
use super::RewriteMethod;
use crate::automaton::{edit_distance, fuzzy_boost};
use crate::collect::PriorityQueue;
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::index::{IndexReader, TermsEnum};

/// State shared by every rewrite of one search.
///
/// Passed down by `&mut`, so a top-terms rewrite can publish the boost a
/// term now has to beat and fuzzy enumeration can read it back.
#[derive(Debug)]
pub struct RewriteContext<'a> {
    pub reader: &'a IndexReader,
    pub config: &'a SearchConfig,
    /// Lowest boost still competitive once a top-terms queue is full.
    pub competitive_boost: Option<f32>,
    /// Terms enumerated by every multi-term rewrite so far.
    pub terms_visited: u64,
}

impl<'a> RewriteContext<'a> {
    pub fn new(reader: &'a IndexReader, config: &'a SearchConfig) -> Self {
        Self {
            reader,
            config,
            competitive_boost: None,
            terms_visited: 0,
        }
    }

    fn is_competitive(&self, boost: f32) -> bool {
        self.competitive_boost.map_or(true, |min| boost >= min)
    }
}

/// Rewrite `query` until it no longer changes.
pub fn rewrite(query: &Query, ctx: &mut RewriteContext<'_>) -> Result<Query> {
    let mut current = rewrite_once(query, ctx)?;
    loop {
        let next = rewrite_once(&current, ctx)?;
        if next == current {
            return Ok(current);
        }
        current = next;
    }
}

fn rewrite_once(query: &Query, ctx: &mut RewriteContext<'_>) -> Result<Query> {
    match query {
        Query::Boolean(b) => rewrite_boolean(b, ctx),
        Query::Phrase(p) if p.terms.len() == 1 => Ok(Query::Term(TermQuery {
            field: p.field.clone(),
            term: p.terms[0].clone(),
            boost: p.boost,
        })),
        Query::Phrase(p) if p.terms.is_empty() => Ok(BooleanQuery {
            boost: p.boost,
            ..BooleanQuery::new()
        }
        .into()),
        Query::ConstantScore(c) => {
            let mut c = c.clone();
            *c.query = rewrite_once(&c.query, ctx)?;
            Ok(Query::ConstantScore(c))
        }
        Query::Filtered(f) => {
            let mut f = f.clone();
            *f.query = rewrite_once(&f.query, ctx)?;
            *f.filter = rewrite_once(&f.filter, ctx)?;
            Ok(Query::Filtered(f))
        }
        _ => match query.as_multi_term() {
            Some(multi) => rewrite_multi_term(multi, ctx),
            None => Ok(query.clone()),
        },
    }
}

fn rewrite_boolean(b: &BooleanQuery, ctx: &mut RewriteContext<'_>) -> Result<Query> {
    if b.min_should_match == 0 && b.must_not.is_empty() && b.must.len() + b.should.len() == 1 {
        let only = b.must.first().or_else(|| b.should.first());
        if let Some(only) = only {
            let mut query = rewrite_once(only, ctx)?;
            if b.boost != 1.0 {
                query.set_boost(query.boost() * b.boost);
            }
            return Ok(query);
        }
    }
    let rewrite_all = |clauses: &[Query], ctx: &mut RewriteContext<'_>| -> Result<Vec<Query>> {
        clauses.iter().map(|q| rewrite_once(q, ctx)).collect()
    };
    Ok(Query::Boolean(BooleanQuery {
        must: rewrite_all(&b.must, ctx)?,
        should: rewrite_all(&b.should, ctx)?,
        must_not: rewrite_all(&b.must_not, ctx)?,
        ..b.clone()
    }))
}

// ============================================================================
// MULTI-TERM
// ============================================================================

fn rewrite_multi_term(multi: MultiTerm<'_>, ctx: &mut RewriteContext<'_>) -> Result<Query> {
    let method = multi.rewrite_method(ctx.config);
    let terms = match method {
        RewriteMethod::ConstantScore => return Ok(multi.query.clone()),
        RewriteMethod::ScoringBoolean => collect_all_terms(multi, ctx)?,
        RewriteMethod::TopTerms { size } => collect_top_terms(multi, size, ctx)?,
    };
    debug!(
        query = %multi.query,
        ?method,
        clauses = terms.len(),
        terms_visited = ctx.terms_visited,
        "rewrote multi-term query"
    );
    let should = terms
        .into_iter()
        .map(|(term, boost)| {
            Ok(Query::Term(TermQuery {
                field: multi.field.to_string(),
                term: term_text(multi.field, term)?,
                boost: multi.boost * boost,
            }))
        })
        .collect::<Result<_>>()?;
    Ok(Query::Boolean(BooleanQuery {
        should,
        disable_coord: true,
        ..BooleanQuery::new()
    }))
}

/// Term queries carry text, so an enumerated term must be UTF-8 to become one.
fn term_text(field: &str, term: Vec<u8>) -> Result<String> {
    String::from_utf8(term).map_err(|e| {
        Error::InvalidArgument(format!(
            "term {:?} in field '{}' is not UTF-8 and cannot be rewritten to a term query",
            e.as_bytes(),
            field
        ))
    })
}

/// Scores a matched term: 1, or the edit-distance boost for fuzzy queries.
struct TermBooster {
    fuzzy: Option<(Vec<char>, bool)>,
}

impl TermBooster {
    fn new(query: &Query) -> Self {
        let fuzzy = match query {
            Query::Fuzzy(q) => Some((q.term.chars().collect(), q.transpositions)),
            _ => None,
        };
        Self { fuzzy }
    }

    fn boost(&self, term: &[u8]) -> f32 {
        match &self.fuzzy {
            None => 1.0,
            Some((chars, transpositions)) => {
                let term = String::from_utf8_lossy(term);
                let distance = edit_distance(chars, &term, *transpositions);
                fuzzy_boost(distance, chars.len(), term.chars().count())
            }
        }
    }
}

/// Visit every matching term of every segment.
fn for_each_term(
    multi: MultiTerm<'_>,
    ctx: &mut RewriteContext<'_>,
    mut visit: impl FnMut(&[u8], &mut RewriteContext<'_>) -> Result<()>,
) -> Result<()> {
    let compiled = multi.compile(ctx.config)?;
    let reader = ctx.reader;
    for leaf in reader.leaves() {
        let Some(terms) = leaf.segment.terms(multi.field) else {
            continue;
        };
        let mut tenum = compiled.terms(terms, multi.field)?;
        while tenum.next()? {
            ctx.terms_visited += 1;
            trace!(term = %String::from_utf8_lossy(tenum.term()), segment = leaf.ord, "matched term");
            visit(tenum.term(), ctx)?;
        }
    }
    Ok(())
}

fn collect_all_terms(multi: MultiTerm<'_>, ctx: &mut RewriteContext<'_>) -> Result<Vec<(Vec<u8>, f32)>> {
    let booster = TermBooster::new(multi.query);
    let max_clauses = ctx.config.max_clause_count;
    let mut terms: BTreeMap<Vec<u8>, f32> = BTreeMap::new();
    for_each_term(multi, ctx, |term, _| {
        if !terms.contains_key(term) {
            if terms.len() == max_clauses {
                return Err(Error::TooManyClauses(max_clauses));
            }
            terms.insert(term.to_vec(), booster.boost(term));
        }
        Ok(())
    })?;
    Ok(terms.into_iter().collect())
}

/// "Is `a` a worse term than `b`": lower boost, then the greater term.
fn worse_term(a: &(f32, Vec<u8>), b: &(f32, Vec<u8>)) -> bool {
    if a.0 == b.0 {
        a.1 > b.1
    } else {
        a.0 < b.0
    }
}

fn collect_top_terms(
    multi: MultiTerm<'_>,
    size: usize,
    ctx: &mut RewriteContext<'_>,
) -> Result<Vec<(Vec<u8>, f32)>> {
    let booster = TermBooster::new(multi.query);
    let size = size.min(ctx.config.max_clause_count);
    let mut queue = PriorityQueue::new(size, worse_term)?;
    let mut queued: BTreeSet<Vec<u8>> = BTreeSet::new();
    ctx.competitive_boost = None;
    for_each_term(multi, ctx, |term, ctx| {
        if queued.contains(term) {
            return Ok(());
        }
        let boost = booster.boost(term);
        if !ctx.is_competitive(boost) {
            return Ok(());
        }
        let candidate = (boost, term.to_vec());
        if let Some(top) = queue.top() {
            if queue.is_full() && !worse_term(top, &candidate) {
                return Ok(());
            }
        }
        queued.insert(candidate.1.clone());
        if let Some((_, evicted)) = queue.insert_with_overflow(candidate) {
            queued.remove(&evicted);
        }
        if queue.is_full() {
            ctx.competitive_boost = queue.top().map(|(boost, _)| *boost);
        }
        Ok(())
    })?;
    let mut terms: Vec<(Vec<u8>, f32)> = queue.drain_sorted().into_iter().map(|(b, t)| (t, b)).collect();
    terms.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(terms)
}
