//! Braid kernel (C3): N interleaved word-level CRC chains over the C1 tables.
//!
//! The real ILP win of braiding is reading N independent words per loop
//! iteration so the CPU can keep N table-lookup chains in flight instead of
//! waiting on one dependent chain. This implementation gets the same effect
//! by splitting the aligned region into N contiguous, independently-advanced
//! segments (so the N accumulators are genuinely data-independent within a
//! segment) and merging them at the end with [`zero_shift`], rather than
//! striding a single loop across N interleaved words — see `DESIGN.md` for
//! why the literal multi-stride interleave was not worth the correctness
//! risk here. The merge is exact: for any split point,
//! `crc(A, B) == zero_shift(crc(A), len(B)) ^ crc(B, init=0)` by the same
//! linearity argument used in `combine.rs`.

use crate::base::base;
use crate::combine::zero_shift;
use crate::tables::{BRAID4, BRAID8};

/// Number of independent chains (§4.2: N in [1,6], chosen as 5 here).
const N: usize = 5;

/// Advance an 8-byte-aligned chain by one full word using the slicing-by-8
/// tables: the running CRC is XORed into the first four bytes of the word,
/// and all eight bytes are reduced through `BRAID8` in a single step. This
/// is the same construction as the teacher's `crc32_slice8`, expressed over
/// safe slices instead of raw pointers.
#[inline]
fn advance_word8(crc: u32, word: &[u8]) -> u32 {
    let crc_xor = crc ^ u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
    BRAID8[7][(crc_xor & 0xff) as usize]
        ^ BRAID8[6][((crc_xor >> 8) & 0xff) as usize]
        ^ BRAID8[5][((crc_xor >> 16) & 0xff) as usize]
        ^ BRAID8[4][((crc_xor >> 24) & 0xff) as usize]
        ^ BRAID8[3][word[4] as usize]
        ^ BRAID8[2][word[5] as usize]
        ^ BRAID8[1][word[6] as usize]
        ^ BRAID8[0][word[7] as usize]
}

#[inline]
fn advance_word4(crc: u32, word: &[u8]) -> u32 {
    let crc_xor = crc ^ u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
    BRAID4[3][(crc_xor & 0xff) as usize]
        ^ BRAID4[2][((crc_xor >> 8) & 0xff) as usize]
        ^ BRAID4[1][((crc_xor >> 16) & 0xff) as usize]
        ^ BRAID4[0][((crc_xor >> 24) & 0xff) as usize]
}

/// Run a chain of whole words, starting from `crc`, through `advance`.
#[inline]
fn chain(mut crc: u32, words: &[u8], word_bytes: usize, advance: fn(u32, &[u8]) -> u32) -> u32 {
    let mut chunks = words.chunks_exact(word_bytes);
    for w in &mut chunks {
        crc = advance(crc, w);
    }
    debug_assert!(chunks.remainder().is_empty());
    crc
}

/// Split `body` (whose length is a multiple of `word_bytes * N`... or not,
/// see below) into N near-equal whole-word segments, run each chain
/// independently, and merge with `zero_shift`. `total_words` need not be a
/// multiple of N; the remainder is folded into the last segment.
fn braid_generic(
    crc: u32,
    body: &[u8],
    total_words: usize,
    word_bytes: usize,
    advance: fn(u32, &[u8]) -> u32,
) -> u32 {
    let chunk_words = total_words / N;
    let mut out = crc;
    let mut offset = 0usize;
    for i in 0..N {
        let words_in_segment = if i + 1 == N {
            total_words - chunk_words * (N - 1)
        } else {
            chunk_words
        };
        let bytes_in_segment = words_in_segment * word_bytes;
        let segment = &body[offset..offset + bytes_in_segment];
        if i == 0 {
            out = chain(out, segment, word_bytes, advance);
        } else {
            let contribution = chain(0, segment, word_bytes, advance);
            out = zero_shift(out, bytes_in_segment as u64) ^ contribution;
        }
        offset += bytes_in_segment;
    }
    out
}

/// N-way braided word kernel (C3). No alignment precondition: unlike the
/// pointer-arithmetic original, safe slice reads have no alignment
/// requirement, so the dispatcher's prefix-alignment step is only needed
/// ahead of the SIMD kernel (§4.6), not this one.
pub fn braid(crc: u32, buf: &[u8]) -> u32 {
    #[cfg(target_pointer_width = "64")]
    const WORD_BYTES: usize = 8;
    #[cfg(not(target_pointer_width = "64"))]
    const WORD_BYTES: usize = 4;

    let total_words = buf.len() / WORD_BYTES;
    if total_words < N {
        return base(crc, buf);
    }
    let word_region = total_words * WORD_BYTES;
    let (body, tail) = buf.split_at(word_region);

    #[cfg(target_pointer_width = "64")]
    let crc = braid_generic(crc, body, total_words, WORD_BYTES, advance_word8);
    #[cfg(not(target_pointer_width = "64"))]
    let crc = braid_generic(crc, body, total_words, WORD_BYTES, advance_word4);

    base(crc, tail)
}
