// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! One error type for the whole crate.
//!
//! Construction mistakes fail fast with a variant that says what was wrong.
//! I/O failures from a postings or dictionary source pass through untouched.
//! Early termination of a segment is not here at all: collectors return
//! [`CollectFlow::StopSegment`](crate::collect::CollectFlow) instead.

use thiserror::Error;

/// Errors raised while building or running a query.
#[derive(Debug, Error)]
pub enum Error {
    /// A disjunction needs at least two clauses to be worth a heap.
    #[error("disjunction requires at least 2 sub-scorers, got {0}")]
    TooFewClauses(usize),

    /// Top-K structures need room for at least one hit.
    #[error("collector capacity must be positive, got {0}")]
    InvalidCapacity(usize),

    /// A term dictionary is not in unsigned byte order.
    #[error("term dictionary for field '{field}' is sorted {found}, expected {expected}")]
    TermOrderMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A phrase was run against a field indexed without positions.
    #[error("field '{0}' was indexed without position data")]
    MissingPositions(String),

    /// The pattern could not be parsed.
    #[error("invalid pattern '{pattern}' at byte {position}: {message}")]
    InvalidPattern {
        pattern: String,
        position: usize,
        message: String,
    },

    /// Determinization would exceed the configured state budget.
    #[error("pattern '{pattern}' is too complex to determinize (more than {limit} states)")]
    TooComplex { pattern: String, limit: usize },

    /// A scoring rewrite produced more clauses than allowed.
    #[error("rewrite produced more than {0} clauses")]
    TooManyClauses(usize),

    /// The field does not exist in any segment.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A caller passed a value outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is structurally impossible for this object.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_pattern(pattern: &str, position: usize, message: impl Into<String>) -> Self {
        Error::InvalidPattern {
            pattern: pattern.to_string(),
            position,
            message: message.into(),
        }
    }
}
