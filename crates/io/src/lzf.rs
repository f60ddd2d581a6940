//! LZF codec as used by PCD `binary_compressed` data sections.
//!
//! The stream is a sequence of tokens, each introduced by a control byte:
//!
//! * `ctrl < 32`: literal run of `ctrl + 1` bytes copied from the input.
//! * `ctrl >= 32`: back-reference. `ctrl >> 5` is the length nibble (7 means
//!   one extension byte follows), `(ctrl & 0x1f) << 8 | next` is the distance
//!   minus one. `length + 2` bytes are copied from already decoded output.
//!
//! Decoding validates every copy against both buffers before touching them.

use thiserror::Error;

const MAX_LITERAL: usize = 1 << 5;
const MAX_OFFSET: usize = 1 << 13;
const MAX_REF: usize = (1 << 8) + (1 << 3);
const HASH_LOG: u32 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LzfError {
    #[error("literal run of {len} bytes at input offset {input} overruns the buffers")]
    LiteralOverrun { input: usize, len: usize },

    #[error("back-reference of {len} bytes at output offset {output} exceeds capacity {capacity}")]
    OutputOverflow {
        output: usize,
        len: usize,
        capacity: usize,
    },

    #[error("back-reference at output offset {output} points {distance} bytes before the start")]
    NegativeBackReference { output: usize, distance: usize },

    #[error("compressed stream ends inside a token at input offset {input}")]
    TruncatedInput { input: usize },
}

/// Decodes `input` into a buffer of at most `capacity` bytes.
///
/// Returns the decoded bytes; the result may be shorter than `capacity` if the
/// stream ends early, so callers that need an exact size must check it.
pub fn decompress(input: &[u8], capacity: usize) -> Result<Vec<u8>, LzfError> {
    // The declared capacity comes from untrusted headers; grow on demand.
    let mut out = Vec::with_capacity(capacity.min(input.len().saturating_mul(4)));
    let mut ip = 0usize;

    while ip < input.len() {
        let ctrl = input[ip] as usize;
        ip += 1;

        if ctrl < MAX_LITERAL {
            let len = ctrl + 1;
            if out.len() + len > capacity || ip + len > input.len() {
                return Err(LzfError::LiteralOverrun { input: ip - 1, len });
            }
            out.extend_from_slice(&input[ip..ip + len]);
            ip += len;
            continue;
        }

        let mut len = ctrl >> 5;
        if ip >= input.len() {
            return Err(LzfError::TruncatedInput { input: ip });
        }
        if len == 7 {
            len += input[ip] as usize;
            ip += 1;
            if ip >= input.len() {
                return Err(LzfError::TruncatedInput { input: ip });
            }
        }
        let distance = ((ctrl & 0x1f) << 8) + 1 + input[ip] as usize;
        ip += 1;

        let op = out.len();
        if op + len + 2 > capacity {
            return Err(LzfError::OutputOverflow {
                output: op,
                len: len + 2,
                capacity,
            });
        }
        let Some(mut r) = op.checked_sub(distance) else {
            return Err(LzfError::NegativeBackReference {
                output: op,
                distance,
            });
        };

        // Source and destination may overlap; copy one byte at a time.
        for _ in 0..len + 2 {
            let b = out[r];
            out.push(b);
            r += 1;
        }
    }

    Ok(out)
}

#[inline]
fn hash(window: &[u8]) -> usize {
    let v = (u32::from(window[0]) << 16) | (u32::from(window[1]) << 8) | u32::from(window[2]);
    (v.wrapping_mul(2_654_435_761) >> (32 - HASH_LOG)) as usize
}

fn flush_literals(out: &mut Vec<u8>, lit: &mut Vec<u8>) {
    if lit.is_empty() {
        return;
    }
    out.push((lit.len() - 1) as u8);
    out.extend_from_slice(lit);
    lit.clear();
}

/// Reference encoder producing streams [`decompress`] accepts.
///
/// Greedy single-candidate hash matcher; compression ratio is secondary to
/// producing a valid stream.
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / MAX_LITERAL + 1);
    let mut lit = Vec::with_capacity(MAX_LITERAL);
    let mut table = vec![usize::MAX; 1 << HASH_LOG];
    let mut i = 0usize;

    while i + 2 < input.len() {
        let h = hash(&input[i..i + 3]);
        let candidate = table[h];
        table[h] = i;

        let matched = candidate != usize::MAX
            && i - candidate <= MAX_OFFSET
            && input[candidate..candidate + 3] == input[i..i + 3];

        if !matched {
            lit.push(input[i]);
            i += 1;
            if lit.len() == MAX_LITERAL {
                flush_literals(&mut out, &mut lit);
            }
            continue;
        }

        let max_len = MAX_REF.min(input.len() - i);
        let mut len = 3;
        while len < max_len && input[candidate + len] == input[i + len] {
            len += 1;
        }

        flush_literals(&mut out, &mut lit);
        let off = i - candidate - 1;
        let l = len - 2;
        if l < 7 {
            out.push(((l << 5) | (off >> 8)) as u8);
        } else {
            out.push(((7 << 5) | (off >> 8)) as u8);
            out.push((l - 7) as u8);
        }
        out.push((off & 0xff) as u8);
        i += len;
    }

    for &b in &input[i..] {
        lit.push(b);
        if lit.len() == MAX_LITERAL {
            flush_literals(&mut out, &mut lit);
        }
    }
    flush_literals(&mut out, &mut lit);
    out
}
