// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Byte-level encoding for term blocks: LEB128 varints and front coding.
//!
//! Sorted terms share long prefixes, so each term in a block is stored as
//! `(shared prefix length, suffix length, suffix bytes)` against the term
//! before it. Decoding failures surface as `io::Error` so that a corrupt block
//! behaves like any other storage failure.

use std::io;

/// A u64 never needs more than ten 7-bit groups.
const MAX_VARINT_BYTES: usize = 10;

pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Decode a varint, returning `(value, bytes_consumed)`.
pub fn decode_varint(bytes: &[u8]) -> io::Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().take(MAX_VARINT_BYTES).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if bytes.len() >= MAX_VARINT_BYTES {
        Err(io::Error::new(io::ErrorKind::InvalidData, "varint too long"))
    } else {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated varint"))
    }
}

/// Append `term` front-coded against `previous`.
pub fn encode_front_coded(previous: &[u8], term: &[u8], buf: &mut Vec<u8>) {
    let shared = previous
        .iter()
        .zip(term)
        .take_while(|(a, b)| a == b)
        .count();
    encode_varint(shared as u64, buf);
    encode_varint((term.len() - shared) as u64, buf);
    buf.extend_from_slice(&term[shared..]);
}

/// Rebuild the next term in place. `term` holds the previous term on entry.
/// Returns the number of bytes consumed.
pub fn decode_front_coded(bytes: &[u8], term: &mut Vec<u8>) -> io::Result<usize> {
    let (shared, a) = decode_varint(bytes)?;
    let (suffix_len, b) = decode_varint(&bytes[a..])?;
    let (shared, suffix_len) = (shared as usize, suffix_len as usize);
    let start = a + b;
    if shared > term.len() || start + suffix_len > bytes.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "front-coded term points outside its block",
        ));
    }
    term.truncate(shared);
    term.extend_from_slice(&bytes[start..start + suffix_len]);
    Ok(start + suffix_len)
}
