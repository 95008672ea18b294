// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! An automaton prepared for dictionary intersection.
//!
//! Classification picks the cheapest way to enumerate matching terms:
//!
//! | Kind     | Language                  | Enumeration                     |
//! |----------|---------------------------|---------------------------------|
//! | `None`   | empty                     | nothing, dictionary untouched   |
//! | `All`    | every string              | the plain dictionary cursor     |
//! | `Single` | one string                | one exact seek                  |
//! | `Prefix` | prefix + any string       | one seek, then read sequentially |
//! | `Normal` | anything else             | [`AutomatonTermsEnum`]          |

use std::sync::Arc;

use tracing::debug;

use super::ops::{common_suffix, minimize};
use super::terms_enum::{AutomatonTermsEnum, FilteredTermsEnum, PrefixFilter, SingleTermFilter};
use super::{Automaton, ByteRunAutomaton};
use crate::error::Result;
use crate::index::{EmptyTermsEnum, Terms, TermsEnum};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomatonKind {
    None,
    All,
    Single(Vec<u8>),
    Prefix(Vec<u8>),
    Normal,
}

#[derive(Debug, Clone)]
pub struct CompiledAutomaton {
    kind: AutomatonKind,
    automaton: Arc<Automaton>,
    run: Arc<ByteRunAutomaton>,
    finite: bool,
    common_suffix: Option<Vec<u8>>,
}

impl CompiledAutomaton {
    /// Minimize and classify `automaton`. `limit` bounds the determinization
    /// needed for the common suffix.
    pub fn new(automaton: Automaton, limit: usize) -> Result<Self> {
        let automaton = minimize(&automaton);
        let kind = classify(&automaton);
        Self::build(automaton, kind, limit)
    }

    /// Skip classification and always intersect with the automaton.
    pub fn normal(automaton: Automaton, limit: usize) -> Result<Self> {
        Self::build(minimize(&automaton), AutomatonKind::Normal, limit)
    }

    fn build(automaton: Automaton, kind: AutomatonKind, limit: usize) -> Result<Self> {
        let finite = automaton.is_finite();
        // the suffix only pays off when seeking cannot bound the scan
        let common_suffix = if kind == AutomatonKind::Normal && !finite {
            common_suffix(&automaton, limit)
                .ok()
                .filter(|suffix| !suffix.is_empty())
        } else {
            None
        };
        debug!(
            ?kind,
            states = automaton.num_states(),
            transitions = automaton.num_transitions(),
            finite,
            "compiled automaton"
        );
        Ok(Self {
            kind,
            run: Arc::new(ByteRunAutomaton::new(&automaton)),
            automaton: Arc::new(automaton),
            finite,
            common_suffix,
        })
    }

    pub fn kind(&self) -> &AutomatonKind {
        &self.kind
    }

    pub fn automaton(&self) -> &Arc<Automaton> {
        &self.automaton
    }

    pub fn run_automaton(&self) -> &Arc<ByteRunAutomaton> {
        &self.run
    }

    pub fn is_finite(&self) -> bool {
        self.finite
    }

    pub fn common_suffix(&self) -> Option<&[u8]> {
        self.common_suffix.as_deref()
    }

    pub fn matches(&self, term: &[u8]) -> bool {
        self.run.run(term)
    }

    /// Terms of `terms` this automaton accepts, in dictionary order.
    ///
    /// Fails with `TermOrderMismatch` unless the dictionary sorts bytewise.
    pub fn terms<'a>(&self, terms: &'a dyn Terms, field: &str) -> Result<Box<dyn TermsEnum + 'a>> {
        if self.kind == AutomatonKind::None {
            return Ok(Box::new(EmptyTermsEnum));
        }
        terms.order().require_bytewise(field)?;
        Ok(match &self.kind {
            AutomatonKind::None => Box::new(EmptyTermsEnum),
            AutomatonKind::All => terms.iterator()?,
            AutomatonKind::Single(term) => Box::new(FilteredTermsEnum::new(
                terms.iterator()?,
                SingleTermFilter::new(term.clone()),
            )),
            AutomatonKind::Prefix(prefix) => Box::new(FilteredTermsEnum::new(
                terms.iterator()?,
                PrefixFilter::new(prefix.clone()),
            )),
            AutomatonKind::Normal => {
                Box::new(AutomatonTermsEnum::intersect(terms.iterator()?, self, field)?)
            }
        })
    }
}

fn classify(automaton: &Automaton) -> AutomatonKind {
    if automaton.is_empty_language() {
        return AutomatonKind::None;
    }
    if automaton.num_states() == 1 && automaton.is_any_string_state(0) {
        return AutomatonKind::All;
    }
    if let Some(single) = automaton.single_string() {
        return AutomatonKind::Single(single);
    }
    let prefix = automaton.common_prefix();
    let mut state = 0;
    for &byte in &prefix {
        match automaton.step(state, byte) {
            Some(next) => state = next,
            None => return AutomatonKind::Normal,
        }
    }
    if automaton.is_any_string_state(state) {
        AutomatonKind::Prefix(prefix)
    } else {
        AutomatonKind::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{
        make_any_string, prefix_automaton, range_automaton, regexp_automaton, wildcard_automaton,
    };
    use crate::error::Error;
    use crate::index::{Document, Segment, TermOrder};

    fn kind_of(automaton: Automaton) -> AutomatonKind {
        CompiledAutomaton::new(automaton, 1000).unwrap().kind().clone()
    }

    #[test]
    fn test_classification() {
        assert_eq!(kind_of(regexp_automaton("#", 100).unwrap()), AutomatonKind::None);
        assert_eq!(kind_of(make_any_string()), AutomatonKind::All);
        assert_eq!(kind_of(wildcard_automaton("*", 100).unwrap()), AutomatonKind::All);
        assert_eq!(kind_of(regexp_automaton("@", 100).unwrap()), AutomatonKind::All);
        assert_eq!(
            kind_of(wildcard_automaton("foo", 100).unwrap()),
            AutomatonKind::Single(b"foo".to_vec())
        );
        assert_eq!(kind_of(wildcard_automaton("", 100).unwrap()), AutomatonKind::Single(Vec::new()));
        assert_eq!(
            kind_of(wildcard_automaton("fo*", 100).unwrap()),
            AutomatonKind::Prefix(b"fo".to_vec())
        );
        assert_eq!(kind_of(prefix_automaton(b"")), AutomatonKind::All);
        assert_eq!(kind_of(wildcard_automaton("f*o", 100).unwrap()), AutomatonKind::Normal);
        assert_eq!(
            kind_of(range_automaton(Some(&b"a"[..]), Some(&b"c"[..]), true, true)),
            AutomatonKind::Normal
        );
    }

    #[test]
    fn test_common_suffix_only_for_infinite() {
        let c = CompiledAutomaton::new(wildcard_automaton("*ing", 100).unwrap(), 100).unwrap();
        assert_eq!(c.common_suffix(), Some(&b"ing"[..]));
        assert!(!c.is_finite());
        let c = CompiledAutomaton::new(regexp_automaton("(r|s)ing", 100).unwrap(), 100).unwrap();
        assert_eq!(c.common_suffix(), None);
    }

    fn segment(order: TermOrder) -> Segment {
        Segment::builder("_0")
            .term_order(order)
            .add(Document::new().text("body", "fox foxes fog dog"))
            .build()
            .unwrap()
    }

    fn collect(mut tenum: Box<dyn TermsEnum + '_>) -> Vec<String> {
        let mut out = Vec::new();
        while tenum.next().unwrap() {
            out.push(String::from_utf8_lossy(tenum.term()).into_owned());
        }
        out
    }

    #[test]
    fn test_terms_per_kind() {
        let seg = segment(TermOrder::Bytewise);
        let terms = seg.terms("body").unwrap();
        let run = |automaton: Automaton| {
            let c = CompiledAutomaton::new(automaton, 1000).unwrap();
            collect(c.terms(terms, "body").unwrap())
        };
        assert_eq!(run(wildcard_automaton("fox*", 100).unwrap()), vec!["fox", "foxes"]);
        assert_eq!(run(wildcard_automaton("fog", 100).unwrap()), vec!["fog"]);
        assert_eq!(run(wildcard_automaton("*", 100).unwrap()), vec!["dog", "fog", "fox", "foxes"]);
        assert_eq!(run(wildcard_automaton("?o?", 100).unwrap()), vec!["dog", "fog", "fox"]);
        assert!(run(regexp_automaton("#", 100).unwrap()).is_empty());
    }

    #[test]
    fn test_non_bytewise_dictionary_rejected() {
        let seg = segment(TermOrder::Utf16);
        let terms = seg.terms("body").unwrap();
        let c = CompiledAutomaton::new(wildcard_automaton("fo?", 100).unwrap(), 100).unwrap();
        assert!(matches!(c.terms(terms, "body").err(), Some(Error::TermOrderMismatch { .. })));
        // no accepting state: the dictionary is never consulted
        let none = CompiledAutomaton::new(regexp_automaton("#", 100).unwrap(), 100).unwrap();
        assert!(none.terms(terms, "body").is_ok());
    }
}
