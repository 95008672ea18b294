// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Search configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config. The
//! limits here exist to stop pathological patterns (a regexp that explodes on
//! determinization, a prefix that rewrites into a million clauses) from
//! eating the process.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::search::RewriteMethod;

/// Which dictionary cursor segments hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermsCursor {
    /// Binary search over a sorted array of terms.
    #[default]
    Array,
    /// Front-coded blocks with a first-term index.
    Block { block_size: usize },
}

/// Tunables for rewriting, determinization and result caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound on clauses a scoring rewrite may produce.
    pub max_clause_count: usize,
    /// Upper bound on DFA states while compiling one pattern.
    pub max_determinized_states: usize,
    /// Rewrite used by multi-term queries that do not pick one.
    pub default_rewrite: RewriteMethod,
    /// Terms kept by top-terms rewrites (fuzzy queries).
    pub top_terms_size: usize,
    /// Stored documents cached per `Hits` result set.
    pub hits_cache_capacity: usize,
    pub terms_cursor: TermsCursor,
    /// Documents per segment when building from a flat corpus.
    pub segment_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_clause_count: 1024,
            max_determinized_states: 10_000,
            default_rewrite: RewriteMethod::ConstantScore,
            top_terms_size: 50,
            hits_cache_capacity: 200,
            terms_cursor: TermsCursor::Array,
            segment_size: 1000,
        }
    }
}

impl SearchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_clause_count", self.max_clause_count),
            ("max_determinized_states", self.max_determinized_states),
            ("top_terms_size", self.top_terms_size),
            ("hits_cache_capacity", self.hits_cache_capacity),
            ("segment_size", self.segment_size),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(Error::InvalidArgument(format!("{} must be positive", name)));
        }
        if let TermsCursor::Block { block_size: 0 } = self.terms_cursor {
            return Err(Error::InvalidArgument("block_size must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = SearchConfig::from_json("{}").unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.max_clause_count, 1024);
    }

    #[test]
    fn test_parse_overrides() {
        let json = r#"{
            "max_clause_count": 16,
            "default_rewrite": "scoring_boolean",
            "terms_cursor": {"block": {"block_size": 8}}
        }"#;
        let config = SearchConfig::from_json(json).unwrap();
        assert_eq!(config.max_clause_count, 16);
        assert_eq!(config.default_rewrite, RewriteMethod::ScoringBoolean);
        assert_eq!(config.terms_cursor, TermsCursor::Block { block_size: 8 });
    }

    #[test]
    fn test_zero_limits_rejected() {
        let err = SearchConfig::from_json(r#"{"hits_cache_capacity": 0}"#).unwrap_err();
        assert!(err.to_string().contains("hits_cache_capacity"));
        assert!(SearchConfig::from_json(r#"{"terms_cursor": {"block": {"block_size": 0}}}"#).is_err());
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        assert!(matches!(SearchConfig::from_json("{"), Err(Error::Json(_))));
    }
}
