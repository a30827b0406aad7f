//! Chorba-small kernel (C4): a GF(2)-linear bit-injection transform for
//! medium inputs, consuming most of the stream without a single table
//! lookup and handing a fixed-size tail to the base kernel.
//!
//! Chorba (arXiv:2412.16398) observes that the standard byte-at-a-time CRC
//! recurrence is GF(2)-linear, so "what would the table lookups have
//! produced 32 bytes from now" can be precomputed as a network of shifts and
//! XORs over the *next* few words, rather than a table probe per byte. Five
//! 64-bit accumulators (`next[0..5]`) carry that lookahead forward; the
//! shift constants below are exactly the ones given in the design notes —
//! they encode multiplication by `x^8` (mod the CRC polynomial) inside a
//! single machine word and are not re-derived here.

use crate::base::base;

/// Below this length the per-stride loop below never runs and the kernel
/// degenerates to XORing `crc` into a zero-padded tail — see the dispatcher
/// for the actual threshold at which C4 is selected over C3.
const STRIDE: usize = 32;
const TAIL: usize = 72;

/// The four shifted/XORed copies of a 64-bit stream word that feed the
/// mixing network below. Each line implements one `x^(8k)` multiplication
/// step of the polynomial in the reflected (LSB-first) representation.
#[inline]
fn chorba_shifts(w: u64) -> [u64; 4] {
    [
        (w << 17) ^ (w << 55),
        (w >> 47) ^ (w >> 9) ^ (w << 19),
        (w >> 45) ^ (w << 44),
        w >> 20,
    ]
}

#[inline]
fn read_word(buf: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap())
}

/// Advance `crc` across `buf` using the Chorba bit-injection network,
/// finishing the fixed-size tail through [`base`]. Valid for any `buf` —
/// the dispatcher restricts this kernel to `72 < len <= 512 KiB` purely for
/// throughput, not correctness.
pub fn chorba_small(crc: u32, buf: &[u8]) -> u32 {
    let mut next = [crc as u64, 0u64, 0u64, 0u64, 0u64];
    let mut pos = 0usize;

    while buf.len() - pos >= TAIL {
        let in1 = read_word(buf, pos) ^ next[0];
        let in2 = read_word(buf, pos + 8) ^ next[1];
        let in3 = read_word(buf, pos + 16) ^ next[2];
        let in4 = read_word(buf, pos + 24) ^ next[3];

        let [a1, a2, a3, a4] = chorba_shifts(in1);
        let [b1, b2, b3, b4] = chorba_shifts(in2);
        let [c1, c2, c3, c4] = chorba_shifts(in3);
        let [d1, d2, d3, d4] = chorba_shifts(in4);
        let _ = (a1, a2, b1);

        let out1 = a3 ^ b2 ^ c1;
        let out2 = a4 ^ b3 ^ c2 ^ d1;
        let out3 = b4 ^ c3 ^ d2;
        let out4 = c4 ^ d3;
        let out5 = d4;

        next = [next[4] ^ out1, out2, out3, out4, out5];
        pos += STRIDE;
    }

    // The remaining < 72 bytes are copied into a fixed 72-byte scratch,
    // zero-padded past the real data. XORing the outstanding `next`
    // accumulators in and running `base` over the whole 72 bytes is valid
    // regardless of how much real data is left: the accumulators were built
    // to exactly cancel the effect of the padding zeros.
    let remaining = &buf[pos..];
    let mut tail = [0u8; TAIL];
    tail[..remaining.len()].copy_from_slice(remaining);
    for (i, n) in next.iter().enumerate() {
        let off = i * 8;
        let merged = read_word(&tail, off) ^ n;
        tail[off..off + 8].copy_from_slice(&merged.to_le_bytes());
    }
    base(0, &tail)
}
