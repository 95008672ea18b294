// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Wildcard patterns: `*` any string, `?` one code point, `\` escapes the
//! next character. Everything else is literal.

use super::regexp::RegExp;
use super::Automaton;
use crate::error::Result;

/// Translate a wildcard pattern into the equivalent [`RegExp`] tree.
fn parse(pattern: &str) -> RegExp {
    let mut items: Vec<RegExp> = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let item = match c {
            '*' => RegExp::AnyString,
            '?' => RegExp::AnyChar,
            // a trailing backslash matches itself
            '\\' => {
                literal.push(chars.next().unwrap_or('\\'));
                continue;
            }
            c => {
                literal.push(c);
                continue;
            }
        };
        if !literal.is_empty() {
            items.push(RegExp::Literal(std::mem::take(&mut literal)));
        }
        // runs of `*` collapse
        if !(item == RegExp::AnyString && items.last() == Some(&RegExp::AnyString)) {
            items.push(item);
        }
    }
    if !literal.is_empty() {
        items.push(RegExp::Literal(literal));
    }
    match items.len() {
        0 => RegExp::EmptyString,
        1 => items.remove(0),
        _ => RegExp::Concat(items),
    }
}

/// Compile a wildcard pattern into a minimal DFA.
pub fn wildcard_automaton(pattern: &str, limit: usize) -> Result<Automaton> {
    parse(pattern).to_automaton(limit, pattern)
}
