// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! From a query tree to ranked hits.
//!
//! # Pipeline
//!
//! ```text
//! Query ──rewrite──▶ Query ──weight──▶ Weight ──normalize──▶ Weight
//!  (tree)  (multi-term   (only term,     (statistics,   (query_norm pushed
//!           expansion)    phrase, bool,   per leaf)       down once)
//!                         constant)
//!                                              │ per segment
//!                                              ▼
//!                               ScorerNode ──collect──▶ Collector ──▶ TopDocs
//! ```
//!
//! | Module        | Role                                                 |
//! |---------------|------------------------------------------------------|
//! | `query`       | the serializable query tree                          |
//! | `rewrite`     | multi-term expansion and simplification              |
//! | `weight`      | statistics, normalization, per-segment scorers       |
//! | `boolean`     | how a boolean's clauses combine into one scorer      |
//! | `searcher`    | the per-segment collection loop                      |
//! | `hits`        | lazily grown result sets with a document cache       |
//! | `explanation` | score explanations                                   |

mod boolean;
mod explanation;
mod hits;
mod query;
mod rewrite;
mod searcher;
mod weight;

pub use explanation::Explanation;
pub use hits::Hits;
pub use query::{
    BooleanQuery, ConstantScoreQuery, FilteredQuery, FuzzyQuery, MatchAllQuery, MultiTerm, Occur,
    PhraseQuery, PrefixQuery, Query, RegexpQuery, TermQuery, TermRangeQuery, WildcardQuery,
};
pub use rewrite::RewriteContext;
pub use searcher::Searcher;
pub use weight::{ConstantSource, Weight};

use serde::{Deserialize, Serialize};

/// How a multi-term query turns into something scoreable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteMethod {
    /// Every matching doc scores the query boost; terms become a bitset.
    ConstantScore,
    /// A boolean of every matching term, each scored as a term query.
    ScoringBoolean,
    /// A boolean of the `size` best terms by boost.
    TopTerms { size: usize },
}
