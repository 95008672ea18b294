// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Regular expressions over terms.
//!
//! ```text
//! union    := concat ('|' concat)*
//! concat   := repeat*
//! repeat   := simple ('?' | '*' | '+' | '{' n '}' | '{' n ',' '}' | '{' n ',' m '}')*
//! simple   := '[' '^'? class ']' | '.' | '#' | '@' | '"' chars '"'
//!           | '(' ')' | '(' union ')' | '\' char | char
//! ```
//!
//! `.` is one code point, `@` any string, `#` the empty language and `()` the
//! empty string. The operators `~`, `&` and `<n-m>` are not supported; those
//! characters match themselves. Patterns match whole terms.

use std::fmt;

use super::nfa::Nfa;
use super::ops::minimize;
use super::{Automaton, StateId};
use crate::error::{Error, Result};

/// Largest `{n,m}` bound accepted.
const MAX_REPEAT: u32 = 1000;

/// Parsed regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegExp {
    /// `#`: matches nothing.
    Empty,
    /// `()`: matches the empty string only.
    EmptyString,
    Literal(String),
    Class { ranges: Vec<(char, char)>, negated: bool },
    /// `.`
    AnyChar,
    /// `@`
    AnyString,
    Concat(Vec<RegExp>),
    Union(Vec<RegExp>),
    Repeat { inner: Box<RegExp>, min: u32, max: Option<u32> },
}

impl RegExp {
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut parser = Parser { pattern, pos: 0 };
        let regexp = parser.parse_union()?;
        match parser.peek() {
            None => Ok(regexp),
            Some(c) => Err(Error::invalid_pattern(pattern, parser.pos, format!("unexpected '{}'", c))),
        }
    }

    /// Minimal DFA for this expression, bounded by `limit` states.
    pub fn to_automaton(&self, limit: usize, pattern: &str) -> Result<Automaton> {
        let mut nfa = Nfa::new();
        let start = nfa.add_state();
        let end = nfa.add_state();
        self.compile(&mut nfa, start, end);
        nfa.set_accept(end);
        Ok(minimize(&nfa.determinize(start, limit, pattern)?))
    }

    /// Add NFA states so that `from` reaches `to` on exactly this language.
    pub(crate) fn compile(&self, nfa: &mut Nfa, from: StateId, to: StateId) {
        match self {
            RegExp::Empty => {}
            RegExp::EmptyString => nfa.add_epsilon(from, to),
            RegExp::Literal(text) => {
                let bytes = text.as_bytes();
                if bytes.is_empty() {
                    nfa.add_epsilon(from, to);
                    return;
                }
                let mut state = from;
                for (i, &b) in bytes.iter().enumerate() {
                    let next = if i + 1 == bytes.len() { to } else { nfa.add_state() };
                    nfa.add_edge(state, b, b, next);
                    state = next;
                }
            }
            RegExp::Class { ranges, negated } => {
                let ranges = if *negated { complement(ranges) } else { normalize(ranges) };
                for (lo, hi) in ranges {
                    nfa.add_code_point_range(from, to, lo, hi);
                }
            }
            RegExp::AnyChar => nfa.add_code_point_range(from, to, 0, char::MAX as u32),
            RegExp::AnyString => {
                let any = nfa.add_state();
                nfa.add_epsilon(from, any);
                nfa.add_edge(any, 0, 255, any);
                nfa.add_epsilon(any, to);
            }
            RegExp::Concat(items) => {
                let mut state = from;
                for (i, item) in items.iter().enumerate() {
                    let next = if i + 1 == items.len() { to } else { nfa.add_state() };
                    item.compile(nfa, state, next);
                    state = next;
                }
                if items.is_empty() {
                    nfa.add_epsilon(from, to);
                }
            }
            RegExp::Union(alternatives) => {
                for alt in alternatives {
                    alt.compile(nfa, from, to);
                }
            }
            RegExp::Repeat { inner, min, max } => {
                let mut state = from;
                for _ in 0..*min {
                    let next = nfa.add_state();
                    inner.compile(nfa, state, next);
                    state = next;
                }
                match max {
                    None => {
                        // state -ε-> loop, loop -inner-> loop, loop -ε-> to
                        let looped = nfa.add_state();
                        nfa.add_epsilon(state, looped);
                        inner.compile(nfa, looped, looped);
                        nfa.add_epsilon(looped, to);
                    }
                    Some(max) => {
                        for _ in *min..*max {
                            let next = nfa.add_state();
                            inner.compile(nfa, state, next);
                            nfa.add_epsilon(state, to);
                            state = next;
                        }
                        nfa.add_epsilon(state, to);
                    }
                }
            }
        }
    }
}

/// Sort and merge overlapping ranges.
fn normalize(ranges: &[(char, char)]) -> Vec<(u32, u32)> {
    let mut sorted: Vec<(u32, u32)> = ranges.iter().map(|&(a, b)| (a as u32, b as u32)).collect();
    sorted.sort_unstable();
    let mut out: Vec<(u32, u32)> = Vec::with_capacity(sorted.len());
    for (lo, hi) in sorted {
        match out.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
            _ => out.push((lo, hi)),
        }
    }
    out
}

fn complement(ranges: &[(char, char)]) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    let mut next = 0u32;
    for (lo, hi) in normalize(ranges) {
        if lo > next {
            out.push((next, lo - 1));
        }
        next = hi + 1;
    }
    if next <= char::MAX as u32 {
        out.push((next, char::MAX as u32));
    }
    out
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegExp::Empty => write!(f, "#"),
            RegExp::EmptyString => write!(f, "()"),
            RegExp::Literal(text) => write!(f, "\"{}\"", text),
            RegExp::Class { ranges, negated } => {
                write!(f, "[{}", if *negated { "^" } else { "" })?;
                for (lo, hi) in ranges {
                    if lo == hi {
                        write!(f, "\\{}", lo)?;
                    } else {
                        write!(f, "\\{}-\\{}", lo, hi)?;
                    }
                }
                write!(f, "]")
            }
            RegExp::AnyChar => write!(f, "."),
            RegExp::AnyString => write!(f, "@"),
            RegExp::Concat(items) => items.iter().try_for_each(|item| write!(f, "{}", item)),
            RegExp::Union(alts) => {
                write!(f, "(")?;
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", alt)?;
                }
                write!(f, ")")
            }
            RegExp::Repeat { inner, min, max } => match max {
                None => write!(f, "({}){{{},}}", inner, min),
                Some(max) => write!(f, "({}){{{},{}}}", inner, min, max),
            },
        }
    }
}

/// Compile `pattern` into a minimal DFA.
pub fn regexp_automaton(pattern: &str, limit: usize) -> Result<Automaton> {
    RegExp::parse(pattern)?.to_automaton(limit, pattern)
}

struct Parser<'a> {
    pattern: &'a str,
    /// Byte offset of the next character.
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse_union(&mut self) -> Result<RegExp> {
        let mut alternatives = vec![self.parse_concat()?];
        while self.eat('|') {
            alternatives.push(self.parse_concat()?);
        }
        Ok(if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            RegExp::Union(alternatives)
        })
    }

    fn parse_concat(&mut self) -> Result<RegExp> {
        let mut items: Vec<RegExp> = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let item = self.parse_repeat()?;
            match (items.last_mut(), item) {
                (Some(RegExp::Literal(prev)), RegExp::Literal(next)) => prev.push_str(&next),
                (_, item) => items.push(item),
            }
        }
        Ok(match items.len() {
            0 => RegExp::EmptyString,
            1 => items.remove(0),
            _ => RegExp::Concat(items),
        })
    }

    fn parse_repeat(&mut self) -> Result<RegExp> {
        let mut exp = self.parse_simple()?;
        loop {
            let (min, max) = match self.peek() {
                Some('?') => (0, Some(1)),
                Some('*') => (0, None),
                Some('+') => (1, None),
                Some('{') => {
                    let start = self.pos;
                    self.bump();
                    let (min, max) = self.parse_counts(start)?;
                    exp = repeat(exp, min, max);
                    continue;
                }
                _ => return Ok(exp),
            };
            self.bump();
            exp = repeat(exp, min, max);
        }
    }

    fn parse_counts(&mut self, start: usize) -> Result<(u32, Option<u32>)> {
        let min = self.parse_number()?;
        let max = if self.eat(',') {
            if self.peek() == Some('}') {
                None
            } else {
                Some(self.parse_number()?)
            }
        } else {
            Some(min)
        };
        if !self.eat('}') {
            return Err(Error::invalid_pattern(self.pattern, self.pos, "expected '}'"));
        }
        if let Some(max) = max {
            if max < min {
                return Err(Error::invalid_pattern(self.pattern, start, "repeat bound max < min"));
            }
        }
        if min.max(max.unwrap_or(0)) > MAX_REPEAT {
            return Err(Error::invalid_pattern(
                self.pattern,
                start,
                format!("repeat bound above {}", MAX_REPEAT),
            ));
        }
        Ok((min, max))
    }

    fn parse_number(&mut self) -> Result<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pattern[start..self.pos]
            .parse()
            .map_err(|_| Error::invalid_pattern(self.pattern, start, "expected a number"))
    }

    fn parse_simple(&mut self) -> Result<RegExp> {
        let start = self.pos;
        let Some(c) = self.bump() else {
            return Err(Error::invalid_pattern(self.pattern, start, "unexpected end of pattern"));
        };
        match c {
            '.' => Ok(RegExp::AnyChar),
            '#' => Ok(RegExp::Empty),
            '@' => Ok(RegExp::AnyString),
            '[' => self.parse_class(start),
            '"' => {
                let text_start = self.pos;
                match self.pattern[text_start..].find('"') {
                    Some(len) => {
                        self.pos = text_start + len + 1;
                        Ok(RegExp::Literal(self.pattern[text_start..text_start + len].to_string()))
                    }
                    None => Err(Error::invalid_pattern(self.pattern, start, "unterminated string")),
                }
            }
            '(' => {
                if self.eat(')') {
                    return Ok(RegExp::EmptyString);
                }
                let inner = self.parse_union()?;
                if !self.eat(')') {
                    return Err(Error::invalid_pattern(self.pattern, self.pos, "expected ')'"));
                }
                Ok(inner)
            }
            '\\' => self.escaped(start).map(|c| RegExp::Literal(c.to_string())),
            '?' | '*' | '+' | '{' => {
                Err(Error::invalid_pattern(self.pattern, start, format!("nothing to repeat before '{}'", c)))
            }
            c => Ok(RegExp::Literal(c.to_string())),
        }
    }

    fn escaped(&mut self, start: usize) -> Result<char> {
        self.bump()
            .ok_or_else(|| Error::invalid_pattern(self.pattern, start, "dangling escape"))
    }

    fn parse_class(&mut self, start: usize) -> Result<RegExp> {
        let negated = self.eat('^');
        let mut ranges = Vec::new();
        loop {
            let item = self.pos;
            let lo = match self.bump() {
                None => return Err(Error::invalid_pattern(self.pattern, start, "unterminated class")),
                Some(']') => break,
                Some('\\') => self.escaped(item)?,
                Some(c) => c,
            };
            let hi = if self.peek() == Some('-') && !self.pattern[self.pos + 1..].starts_with(']') {
                self.bump();
                match self.bump() {
                    None => return Err(Error::invalid_pattern(self.pattern, start, "unterminated class")),
                    Some('\\') => self.escaped(item)?,
                    Some(c) => c,
                }
            } else {
                lo
            };
            if hi < lo {
                return Err(Error::invalid_pattern(self.pattern, item, "class range out of order"));
            }
            ranges.push((lo, hi));
        }
        if ranges.is_empty() {
            return Err(Error::invalid_pattern(self.pattern, start, "empty class"));
        }
        Ok(RegExp::Class { ranges, negated })
    }
}

fn repeat(inner: RegExp, min: u32, max: Option<u32>) -> RegExp {
    RegExp::Repeat {
        inner: Box::new(inner),
        min,
        max,
    }
}
