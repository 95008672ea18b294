// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Code point ranges as sequences of UTF-8 byte ranges.
//!
//! A range like `U+0000..=U+10FFFF` is not one byte range; it is a handful of
//! sequences such as `[00-7F]`, `[C2-DF][80-BF]`, `[E0][A0-BF][80-BF]`, ...
//! Each sequence has the property that every byte combination it describes is
//! the encoding of a code point in the range. Surrogates are never produced.

const MAX_UTF8_BYTES: usize = 4;

/// Inclusive byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Utf8Range {
    pub start: u8,
    pub end: u8,
}

/// One to four byte ranges, matched in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Utf8Sequence {
    ranges: [Utf8Range; MAX_UTF8_BYTES],
    len: usize,
}

impl Utf8Sequence {
    pub fn ranges(&self) -> &[Utf8Range] {
        &self.ranges[..self.len]
    }

    fn from_encoded(start: &[u8], end: &[u8]) -> Self {
        let mut ranges = [Utf8Range { start: 0, end: 0 }; MAX_UTF8_BYTES];
        for (i, (&s, &e)) in start.iter().zip(end).enumerate() {
            ranges[i] = Utf8Range { start: s, end: e };
        }
        Self {
            ranges,
            len: start.len(),
        }
    }
}

/// Iterator over the UTF-8 sequences covering a code point range, in
/// ascending order.
#[derive(Debug)]
pub(crate) struct Utf8Sequences {
    stack: Vec<(u32, u32)>,
}

impl Utf8Sequences {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            stack: vec![(start, end.min(char::MAX as u32))],
        }
    }
}

fn max_scalar_value(bytes: usize) -> u32 {
    match bytes {
        1 => 0x7F,
        2 => 0x7FF,
        3 => 0xFFFF,
        _ => char::MAX as u32,
    }
}

fn encode(cp: u32, buf: &mut [u8; MAX_UTF8_BYTES]) -> Option<usize> {
    char::from_u32(cp).map(|c| c.encode_utf8(buf).len())
}

impl Iterator for Utf8Sequences {
    type Item = Utf8Sequence;

    fn next(&mut self) -> Option<Utf8Sequence> {
        'top: while let Some((start, mut end)) = self.stack.pop() {
            'inner: loop {
                if start < 0xE000 && end > 0xD7FF {
                    self.stack.push((0xE000, end));
                    end = 0xD7FF;
                    continue 'inner;
                }
                if start > end {
                    continue 'top;
                }
                for i in 1..MAX_UTF8_BYTES {
                    let max = max_scalar_value(i);
                    if start <= max && max < end {
                        self.stack.push((max + 1, end));
                        end = max;
                        continue 'inner;
                    }
                }
                if end <= 0x7F {
                    let (s, e) = (start as u8, end as u8);
                    return Some(Utf8Sequence::from_encoded(&[s], &[e]));
                }
                for i in 1..MAX_UTF8_BYTES {
                    let m: u32 = (1 << (6 * i)) - 1;
                    if start & !m != end & !m {
                        if start & m != 0 {
                            self.stack.push(((start | m) + 1, end));
                            end = start | m;
                            continue 'inner;
                        }
                        if end & m != m {
                            self.stack.push((end & !m, end));
                            end = (end & !m) - 1;
                            continue 'inner;
                        }
                    }
                }
                let mut lo = [0u8; MAX_UTF8_BYTES];
                let mut hi = [0u8; MAX_UTF8_BYTES];
                match (encode(start, &mut lo), encode(end, &mut hi)) {
                    (Some(n), Some(m)) if n == m => {
                        return Some(Utf8Sequence::from_encoded(&lo[..n], &hi[..n]));
                    }
                    _ => continue 'top,
                }
            }
        }
        None
    }
}
