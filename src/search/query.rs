// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The query tree.
//!
//! Queries are plain data: they serialize to JSON tagged by `type`, compare
//! by value, and print in the familiar `field:term` syntax. Turning one into
//! something that can score documents happens in two later steps, rewriting
//! ([`super::rewrite`]) and weighting ([`super::weight`]).
//!
//! ```json
//! {"type": "boolean",
//!  "must": [{"type": "term", "field": "body", "term": "rust"}],
//!  "should": [{"type": "fuzzy", "field": "body", "term": "tokoi", "max_edits": 1}]}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RewriteMethod;
use crate::automaton::{
    levenshtein_automaton, prefix_automaton, range_automaton, regexp_automaton, wildcard_automaton,
    CompiledAutomaton, LevenshteinOptions, MAX_EDITS,
};
use crate::config::SearchConfig;
use crate::error::{Error, Result};

fn default_boost() -> f32 {
    1.0
}

fn is_default_boost(boost: &f32) -> bool {
    *boost == 1.0
}

fn default_true() -> bool {
    true
}

fn default_max_edits() -> u8 {
    MAX_EDITS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    Term(TermQuery),
    Boolean(BooleanQuery),
    Phrase(PhraseQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Regexp(RegexpQuery),
    TermRange(TermRangeQuery),
    Fuzzy(FuzzyQuery),
    MatchAll(MatchAllQuery),
    ConstantScore(ConstantScoreQuery),
    Filtered(FilteredQuery),
}

// ============================================================================
// LEAF QUERIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermQuery {
    pub field: String,
    pub term: String,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

impl TermQuery {
    pub fn new(field: &str, term: &str) -> Self {
        Self {
            field: field.to_string(),
            term: term.to_string(),
            boost: 1.0,
        }
    }
}

/// Terms at given relative positions, within `slop` moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseQuery {
    pub field: String,
    pub terms: Vec<String>,
    /// Relative position of each term; consecutive when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<u32>>,
    #[serde(default)]
    pub slop: u32,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

impl PhraseQuery {
    pub fn new(field: &str, terms: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
            positions: None,
            slop: 0,
            boost: 1.0,
        }
    }

    pub fn slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    /// Position of every term, explicit or consecutive.
    pub fn term_positions(&self) -> Result<Vec<u32>> {
        match &self.positions {
            None => Ok((0..self.terms.len() as u32).collect()),
            Some(positions) if positions.len() == self.terms.len() => Ok(positions.clone()),
            Some(positions) => Err(Error::InvalidArgument(format!(
                "phrase has {} terms but {} positions",
                self.terms.len(),
                positions.len()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAllQuery {
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self { boost: 1.0 }
    }
}

/// Matches what `query` matches, every hit scoring the boost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantScoreQuery {
    pub query: Box<Query>,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

/// `query`, restricted to the docs `filter` matches.
///
/// Only `query` scores; the filter is evaluated per segment into a bitset
/// and never touches normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredQuery {
    pub query: Box<Query>,
    pub filter: Box<Query>,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

// ============================================================================
// BOOLEAN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BooleanQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Query>,
    /// Optional clauses a doc must match at least this many of.
    #[serde(default)]
    pub min_should_match: usize,
    /// Skip coordination factors when scoring.
    #[serde(default)]
    pub disable_coord: bool,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

impl BooleanQuery {
    pub fn new() -> Self {
        Self {
            boost: 1.0,
            ..Self::default()
        }
    }

    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    pub fn min_should_match(mut self, n: usize) -> Self {
        self.min_should_match = n;
        self
    }

    pub fn disable_coord(mut self, disable: bool) -> Self {
        self.disable_coord = disable;
        self
    }

    /// Clauses in declaration order: must, then should, then must_not.
    pub fn clauses(&self) -> impl Iterator<Item = (&Query, Occur)> {
        self.must
            .iter()
            .map(|q| (q, Occur::Must))
            .chain(self.should.iter().map(|q| (q, Occur::Should)))
            .chain(self.must_not.iter().map(|q| (q, Occur::MustNot)))
    }

    pub fn clause_count(&self) -> usize {
        self.must.len() + self.should.len() + self.must_not.len()
    }
}

// ============================================================================
// MULTI-TERM QUERIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixQuery {
    pub field: String,
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewriteMethod>,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

/// `*` any string, `?` any character, `\` escapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildcardQuery {
    pub field: String,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewriteMethod>,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexpQuery {
    pub field: String,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewriteMethod>,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

/// Terms between `lower` and `upper` in byte order; a missing end is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRangeQuery {
    pub field: String,
    #[serde(default)]
    pub lower: Option<String>,
    #[serde(default)]
    pub upper: Option<String>,
    #[serde(default = "default_true")]
    pub include_lower: bool,
    #[serde(default = "default_true")]
    pub include_upper: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewriteMethod>,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

/// Terms within `max_edits` edits of `term`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyQuery {
    pub field: String,
    pub term: String,
    #[serde(default = "default_max_edits")]
    pub max_edits: u8,
    #[serde(default)]
    pub prefix_length: usize,
    #[serde(default = "default_true")]
    pub transpositions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewriteMethod>,
    #[serde(default = "default_boost", skip_serializing_if = "is_default_boost")]
    pub boost: f32,
}

impl FuzzyQuery {
    pub fn new(field: &str, term: &str, max_edits: u8) -> Self {
        Self {
            field: field.to_string(),
            term: term.to_string(),
            max_edits,
            prefix_length: 0,
            transpositions: true,
            rewrite: None,
            boost: 1.0,
        }
    }

    pub fn options(&self) -> LevenshteinOptions {
        LevenshteinOptions {
            max_edits: self.max_edits,
            prefix_length: self.prefix_length,
            transpositions: self.transpositions,
        }
    }
}

/// What every term-pattern query shares.
#[derive(Debug, Clone, Copy)]
pub struct MultiTerm<'q> {
    pub field: &'q str,
    pub rewrite: Option<RewriteMethod>,
    pub boost: f32,
    pub query: &'q Query,
}

impl MultiTerm<'_> {
    /// Rewrite to use: the query's own, or the configured default.
    /// Fuzzy queries default to keeping their best terms.
    pub fn rewrite_method(&self, config: &SearchConfig) -> RewriteMethod {
        match (self.rewrite, self.query) {
            (Some(method), _) => method,
            (None, Query::Fuzzy(_)) => RewriteMethod::TopTerms {
                size: config.top_terms_size,
            },
            (None, _) => config.default_rewrite,
        }
    }

    /// The byte automaton accepting this query's terms.
    pub fn compile(&self, config: &SearchConfig) -> Result<CompiledAutomaton> {
        let limit = config.max_determinized_states;
        let automaton = match self.query {
            Query::Prefix(q) => prefix_automaton(q.prefix.as_bytes()),
            Query::Wildcard(q) => wildcard_automaton(&q.pattern, limit)?,
            Query::Regexp(q) => regexp_automaton(&q.pattern, limit)?,
            Query::TermRange(q) => range_automaton(
                q.lower.as_deref().map(str::as_bytes),
                q.upper.as_deref().map(str::as_bytes),
                q.include_lower,
                q.include_upper,
            ),
            Query::Fuzzy(q) => levenshtein_automaton(&q.term, q.options(), limit)?,
            _ => return Err(Error::Unsupported("not a multi-term query")),
        };
        CompiledAutomaton::new(automaton, limit)
    }
}

// ============================================================================
// QUERY
// ============================================================================

impl Query {
    pub fn term(field: &str, term: &str) -> Self {
        Query::Term(TermQuery::new(field, term))
    }

    pub fn phrase(field: &str, terms: &[&str]) -> Self {
        Query::Phrase(PhraseQuery::new(field, terms))
    }

    pub fn prefix(field: &str, prefix: &str) -> Self {
        Query::Prefix(PrefixQuery {
            field: field.to_string(),
            prefix: prefix.to_string(),
            rewrite: None,
            boost: 1.0,
        })
    }

    pub fn wildcard(field: &str, pattern: &str) -> Self {
        Query::Wildcard(WildcardQuery {
            field: field.to_string(),
            pattern: pattern.to_string(),
            rewrite: None,
            boost: 1.0,
        })
    }

    pub fn regexp(field: &str, pattern: &str) -> Self {
        Query::Regexp(RegexpQuery {
            field: field.to_string(),
            pattern: pattern.to_string(),
            rewrite: None,
            boost: 1.0,
        })
    }

    pub fn range(field: &str, lower: Option<&str>, upper: Option<&str>) -> Self {
        Query::TermRange(TermRangeQuery {
            field: field.to_string(),
            lower: lower.map(str::to_string),
            upper: upper.map(str::to_string),
            include_lower: true,
            include_upper: true,
            rewrite: None,
            boost: 1.0,
        })
    }

    pub fn fuzzy(field: &str, term: &str, max_edits: u8) -> Self {
        Query::Fuzzy(FuzzyQuery::new(field, term, max_edits))
    }

    pub fn match_all() -> Self {
        Query::MatchAll(MatchAllQuery::default())
    }

    pub fn constant_score(query: Query) -> Self {
        Query::ConstantScore(ConstantScoreQuery {
            query: Box::new(query),
            boost: 1.0,
        })
    }

    pub fn filtered(query: Query, filter: Query) -> Self {
        Query::Filtered(FilteredQuery {
            query: Box::new(query),
            filter: Box::new(filter),
            boost: 1.0,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn boost(&self) -> f32 {
        match self {
            Query::Term(q) => q.boost,
            Query::Boolean(q) => q.boost,
            Query::Phrase(q) => q.boost,
            Query::Prefix(q) => q.boost,
            Query::Wildcard(q) => q.boost,
            Query::Regexp(q) => q.boost,
            Query::TermRange(q) => q.boost,
            Query::Fuzzy(q) => q.boost,
            Query::MatchAll(q) => q.boost,
            Query::ConstantScore(q) => q.boost,
            Query::Filtered(q) => q.boost,
        }
    }

    pub fn set_boost(&mut self, boost: f32) {
        let slot = match self {
            Query::Term(q) => &mut q.boost,
            Query::Boolean(q) => &mut q.boost,
            Query::Phrase(q) => &mut q.boost,
            Query::Prefix(q) => &mut q.boost,
            Query::Wildcard(q) => &mut q.boost,
            Query::Regexp(q) => &mut q.boost,
            Query::TermRange(q) => &mut q.boost,
            Query::Fuzzy(q) => &mut q.boost,
            Query::MatchAll(q) => &mut q.boost,
            Query::ConstantScore(q) => &mut q.boost,
            Query::Filtered(q) => &mut q.boost,
        };
        *slot = boost;
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    /// The shared view of a prefix, wildcard, regexp, range or fuzzy query.
    pub fn as_multi_term(&self) -> Option<MultiTerm<'_>> {
        let (field, rewrite, boost) = match self {
            Query::Prefix(q) => (&q.field, q.rewrite, q.boost),
            Query::Wildcard(q) => (&q.field, q.rewrite, q.boost),
            Query::Regexp(q) => (&q.field, q.rewrite, q.boost),
            Query::TermRange(q) => (&q.field, q.rewrite, q.boost),
            Query::Fuzzy(q) => (&q.field, q.rewrite, q.boost),
            _ => return None,
        };
        Some(MultiTerm {
            field,
            rewrite,
            boost,
            query: self,
        })
    }
}

macro_rules! into_query {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Query {
            fn from(q: $ty) -> Self {
                Query::$variant(q)
            }
        })*
    };
}

into_query!(
    TermQuery => Term,
    BooleanQuery => Boolean,
    PhraseQuery => Phrase,
    PrefixQuery => Prefix,
    WildcardQuery => Wildcard,
    RegexpQuery => Regexp,
    TermRangeQuery => TermRange,
    FuzzyQuery => Fuzzy,
    MatchAllQuery => MatchAll,
    ConstantScoreQuery => ConstantScore,
    FilteredQuery => Filtered,
);

// ============================================================================
// DISPLAY
// ============================================================================

struct Boost(f32);

impl fmt::Display for Boost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 != 1.0 {
            write!(f, "^{}", self.0)?;
        }
        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Term(q) => write!(f, "{}:{}{}", q.field, q.term, Boost(q.boost)),
            Query::Boolean(q) => {
                let nested = q.boost != 1.0 || q.min_should_match > 0;
                if nested {
                    f.write_str("(")?;
                }
                for (i, (clause, occur)) in q.clauses().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    match occur {
                        Occur::Must => f.write_str("+")?,
                        Occur::MustNot => f.write_str("-")?,
                        Occur::Should => {}
                    }
                    if let Query::Boolean(_) = clause {
                        write!(f, "({})", clause)?;
                    } else {
                        write!(f, "{}", clause)?;
                    }
                }
                if nested {
                    f.write_str(")")?;
                }
                if q.min_should_match > 0 {
                    write!(f, "~{}", q.min_should_match)?;
                }
                write!(f, "{}", Boost(q.boost))
            }
            Query::Phrase(q) => {
                write!(f, "{}:\"{}\"", q.field, q.terms.join(" "))?;
                if q.slop > 0 {
                    write!(f, "~{}", q.slop)?;
                }
                write!(f, "{}", Boost(q.boost))
            }
            Query::Prefix(q) => write!(f, "{}:{}*{}", q.field, q.prefix, Boost(q.boost)),
            Query::Wildcard(q) => write!(f, "{}:{}{}", q.field, q.pattern, Boost(q.boost)),
            Query::Regexp(q) => write!(f, "{}:/{}/{}", q.field, q.pattern, Boost(q.boost)),
            Query::TermRange(q) => write!(
                f,
                "{}:{}{} TO {}{}{}",
                q.field,
                if q.include_lower { '[' } else { '{' },
                q.lower.as_deref().unwrap_or("*"),
                q.upper.as_deref().unwrap_or("*"),
                if q.include_upper { ']' } else { '}' },
                Boost(q.boost)
            ),
            Query::Fuzzy(q) => write!(f, "{}:{}~{}{}", q.field, q.term, q.max_edits, Boost(q.boost)),
            Query::MatchAll(q) => write!(f, "*:*{}", Boost(q.boost)),
            Query::ConstantScore(q) => write!(f, "ConstantScore({}){}", q.query, Boost(q.boost)),
            Query::Filtered(q) => write!(f, "filtered({})->{}{}", q.query, q.filter, Boost(q.boost)),
        }
    }
}
