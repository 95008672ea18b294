// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The term dictionary contract.
//!
//! A [`TermsEnum`] is a cursor over one field's terms in sorted order. It can
//! step forward, jump to the ceiling of any byte string, and hand out the
//! postings of the term it sits on. Everything the automaton matcher does is
//! phrased in terms of `next` and `seek_ceil`.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Postings;
use crate::docset::Bits;
use crate::error::{Error, Result};

/// Outcome of [`TermsEnum::seek_ceil`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekStatus {
    /// The exact term exists; the cursor is on it.
    Found,
    /// The cursor is on the smallest term greater than the target.
    NotFound,
    /// Every term is smaller than the target.
    End,
}

/// Sort order of a term dictionary.
///
/// Automaton intersection only works on unsigned byte order. The UTF-16 order
/// exists for dictionaries written by UTF-16 based tooling; it differs only for
/// supplementary characters vs. the `U+E000..U+FFFF` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermOrder {
    #[default]
    Bytewise,
    Utf16,
}

impl TermOrder {
    pub fn name(self) -> &'static str {
        match self {
            TermOrder::Bytewise => "bytewise",
            TermOrder::Utf16 => "utf16",
        }
    }

    pub fn compare(self, a: &[u8], b: &[u8]) -> Ordering {
        match self {
            TermOrder::Bytewise => a.cmp(b),
            TermOrder::Utf16 => compare_utf8_as_utf16(a, b),
        }
    }

    /// Fail unless terms are in the order automaton seeking expects.
    pub fn require_bytewise(self, field: &str) -> Result<()> {
        match self {
            TermOrder::Bytewise => Ok(()),
            other => Err(Error::TermOrderMismatch {
                field: field.to_string(),
                expected: TermOrder::Bytewise.name(),
                found: other.name(),
            }),
        }
    }
}

/// Compare UTF-8 bytes the way their UTF-16 encodings would compare.
///
/// Lead bytes `0xEE`/`0xEF` (the `U+E000..U+FFFF` block) are lifted above
/// `0xF0..0xF4` (supplementary planes, surrogate pairs in UTF-16).
fn compare_utf8_as_utf16(a: &[u8], b: &[u8]) -> Ordering {
    for (&x, &y) in a.iter().zip(b) {
        if x == y {
            continue;
        }
        let (mut x, mut y) = (u32::from(x), u32::from(y));
        if x >= 0xEE && y >= 0xEE {
            if x & 0xFE == 0xEE {
                x += 0x0E;
            }
            if y & 0xFE == 0xEE {
                y += 0x0E;
            }
        }
        return x.cmp(&y);
    }
    a.len().cmp(&b.len())
}

/// Cursor over a field's sorted terms.
pub trait TermsEnum {
    /// Step to the next term. `false` once past the last term.
    fn next(&mut self) -> Result<bool>;

    /// Position on the smallest term `>= target`.
    fn seek_ceil(&mut self, target: &[u8]) -> Result<SeekStatus>;

    /// Position on `target` if it exists.
    fn seek_exact(&mut self, target: &[u8]) -> Result<bool> {
        Ok(self.seek_ceil(target)? == SeekStatus::Found)
    }

    /// Current term. Empty before the first move.
    fn term(&self) -> &[u8];

    /// Ordinal of the current term within the dictionary.
    fn ord(&self) -> Result<u64>;

    fn doc_freq(&self) -> Result<u32>;

    fn total_term_freq(&self) -> Result<u64>;

    /// Postings of the current term, skipping ids `accept` rejects.
    fn postings(&self, accept: Option<Arc<dyn Bits>>) -> Result<Box<dyn Postings>>;

    fn order(&self) -> TermOrder;
}

impl<T: TermsEnum + ?Sized> TermsEnum for Box<T> {
    fn next(&mut self) -> Result<bool> {
        (**self).next()
    }

    fn seek_ceil(&mut self, target: &[u8]) -> Result<SeekStatus> {
        (**self).seek_ceil(target)
    }

    fn seek_exact(&mut self, target: &[u8]) -> Result<bool> {
        (**self).seek_exact(target)
    }

    fn term(&self) -> &[u8] {
        (**self).term()
    }

    fn ord(&self) -> Result<u64> {
        (**self).ord()
    }

    fn doc_freq(&self) -> Result<u32> {
        (**self).doc_freq()
    }

    fn total_term_freq(&self) -> Result<u64> {
        (**self).total_term_freq()
    }

    fn postings(&self, accept: Option<Arc<dyn Bits>>) -> Result<Box<dyn Postings>> {
        (**self).postings(accept)
    }

    fn order(&self) -> TermOrder {
        (**self).order()
    }
}

/// Per-field view of the dictionary: statistics plus a cursor factory.
pub trait Terms: fmt::Debug {
    fn iterator(&self) -> Result<Box<dyn TermsEnum + '_>>;

    /// Number of distinct terms.
    fn size(&self) -> u64;

    /// Number of documents with at least one term in this field.
    fn doc_count(&self) -> u64;

    fn sum_doc_freq(&self) -> u64;

    fn sum_total_term_freq(&self) -> u64;

    fn has_positions(&self) -> bool;

    fn order(&self) -> TermOrder;
}

/// A dictionary with no terms.
#[derive(Debug, Default)]
pub struct EmptyTermsEnum;

impl TermsEnum for EmptyTermsEnum {
    fn next(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn seek_ceil(&mut self, _target: &[u8]) -> Result<SeekStatus> {
        Ok(SeekStatus::End)
    }

    fn term(&self) -> &[u8] {
        &[]
    }

    fn ord(&self) -> Result<u64> {
        Err(Error::Unsupported("ord on an empty terms enum"))
    }

    fn doc_freq(&self) -> Result<u32> {
        Err(Error::Unsupported("doc_freq on an empty terms enum"))
    }

    fn total_term_freq(&self) -> Result<u64> {
        Err(Error::Unsupported("total_term_freq on an empty terms enum"))
    }

    fn postings(&self, _accept: Option<Arc<dyn Bits>>) -> Result<Box<dyn Postings>> {
        Err(Error::Unsupported("postings on an empty terms enum"))
    }

    fn order(&self) -> TermOrder {
        TermOrder::Bytewise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_order_differs_only_in_high_planes() {
        let bmp_private = "\u{E000}".as_bytes();
        let supplementary = "\u{1F600}".as_bytes();
        assert_eq!(
            TermOrder::Bytewise.compare(bmp_private, supplementary),
            Ordering::Less
        );
        assert_eq!(
            TermOrder::Utf16.compare(bmp_private, supplementary),
            Ordering::Greater
        );
        assert_eq!(TermOrder::Utf16.compare(b"abc", b"abd"), Ordering::Less);
        assert_eq!(TermOrder::Utf16.compare(b"ab", b"abc"), Ordering::Less);
    }

    #[test]
    fn test_require_bytewise() {
        assert!(TermOrder::Bytewise.require_bytewise("body").is_ok());
        let err = TermOrder::Utf16.require_bytewise("body").unwrap_err();
        assert!(matches!(err, Error::TermOrderMismatch { .. }));
    }

    #[test]
    fn test_empty_terms_enum() {
        let mut terms = EmptyTermsEnum;
        assert!(!terms.next().unwrap());
        assert_eq!(terms.seek_ceil(b"a").unwrap(), SeekStatus::End);
    }
}
