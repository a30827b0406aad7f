//! CLMUL fold kernel (C6): x86_64 PCLMULQDQ 4-lane folding pipeline.
//!
//! Transcribed from the independently-verified `zlib-rs` PCLMULQDQ fold
//! (kept in the pack under `other_examples`), which the design notes single
//! out specifically because the teacher's own `crc_simd.rs` fold constants
//! are self-flagged as unverified and disabled pending confirmation. Using
//! unverified constants would violate reference equivalence against the
//! scalar kernels, so this module follows the verified source instead.
//!
//! The literal C reference this crate's Chorba kernels are grounded on also
//! describes a "bonus"-block Chorba augmentation folded into the first
//! 512+64-byte stride of a large enough buffer (XORing precomputed subsets
//! of four lookahead blocks into the main fold, trading clmul ops for
//! XORs). `chorba_fold_stride` below is that augmentation, sharing
//! `CHORBA_MIX32` with the scalar Chorba kernels for the subset-selection
//! bitmasks. See `DESIGN.md`.

use core::arch::x86_64::__m128i;
use std::arch::x86_64::{
    _mm_and_si128, _mm_clmulepi64_si128, _mm_extract_epi32, _mm_load_si128, _mm_loadu_si128,
    _mm_or_si128, _mm_shuffle_epi8, _mm_slli_si128, _mm_srli_si128, _mm_storeu_si128,
    _mm_xor_si128,
};

use crate::braid::braid;

const INITIAL: u32 = 0;

#[repr(C, align(16))]
struct Align16([u8; 16]);

const fn reg(input: [u32; 4]) -> __m128i {
    // Safety: any valid [u32; 4] bit pattern is a valid __m128i.
    unsafe { core::mem::transmute(input) }
}

/// Loads the `i`th 16-byte block of `src` (`src` must hold at least
/// `16 * (i + 1)` bytes).
#[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
unsafe fn load_block(src: &[u8], i: usize) -> __m128i {
    unsafe { _mm_loadu_si128((src.as_ptr() as *const __m128i).add(i)) }
}

/// Four 128-bit partial-CRC lanes, persisted across `append` calls.
#[derive(Clone, Copy)]
pub(crate) struct Lanes {
    fold: [__m128i; 4],
}

impl Lanes {
    const XMM_FOLD4: __m128i = reg([0xc6e41596, 0x00000001, 0x54442bd4, 0x00000001]);

    /// `_mm_set_epi64x(0x1D9513D7, 0x8F352D95)`: low lane = `x^480 mod G`,
    /// high lane = `x^544 mod G` (§9's `K_544|480`).
    const SHIFT_544_480: __m128i = reg([0x8F352D95, 0x0000_0000, 0x1D95_13D7, 0x0000_0000]);
    /// `_mm_set_epi64x(0x910EEEC1, 0x33FFF533)`: low lane = `x^992 mod G`,
    /// high lane = `x^1056 mod G` (§9's `K_1056|992`).
    const SHIFT_1056_992: __m128i = reg([0x33FF_F533, 0x0000_0000, 0x910E_EEC1, 0x0000_0000]);

    pub(crate) fn new() -> Self {
        let xmm_crc0 = reg([0x9db42487, 0, 0, 0]);
        let zero = reg([0, 0, 0, 0]);
        Self {
            fold: [xmm_crc0, zero, zero, zero],
        }
    }

    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    unsafe fn step(input: __m128i) -> __m128i {
        unsafe {
            _mm_xor_si128(
                _mm_clmulepi64_si128(input, Self::XMM_FOLD4, 0x01),
                _mm_clmulepi64_si128(input, Self::XMM_FOLD4, 0x10),
            )
        }
    }

    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    unsafe fn fold_step<const N: usize>(&mut self) {
        self.fold = std::array::from_fn(|i| match self.fold.get(i + N) {
            Some(v) => *v,
            None => unsafe { Self::step(self.fold[(i + N) - 4]) },
        });
    }

    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    unsafe fn fold_const(lane: __m128i, k: __m128i) -> __m128i {
        unsafe {
            _mm_xor_si128(
                _mm_clmulepi64_si128(lane, k, 0x11),
                _mm_clmulepi64_si128(lane, k, 0x00),
            )
        }
    }

    /// The Chorba "bonus block" augmentation: folds the next 512 bytes of
    /// `src` (after an initial 64-byte lookahead block) eight lanes at a
    /// time, XORing in bitmask subsets of four lookahead blocks taken 512
    /// bytes ahead instead of spending a clmul on them immediately. Only
    /// engages while a full 512+64+64-byte super-stride remains; the
    /// ordinary 64-byte loop in `fold_help` picks up everything shorter.
    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    unsafe fn chorba_fold_stride(&mut self, src: &mut &[u8]) {
        while src.len() >= 512 + 64 + 64 {
            let bonus4 = unsafe { load_block(src, 4) };
            let bonus3 = unsafe { load_block(src, 5) };
            let bonus2 = unsafe { load_block(src, 6) };
            let bonus1 = unsafe { load_block(src, 7) };
            *src = &src[64..];

            for round in 0..8 {
                let k = if round == 0 {
                    Self::SHIFT_1056_992
                } else {
                    Self::SHIFT_544_480
                };
                for lane in 0..4 {
                    let mask = crate::tables::CHORBA_MIX32[round * 4 + lane];
                    let mut t = unsafe { load_block(src, 4 + round * 4 + lane) };
                    if mask & 0b0001 != 0 {
                        t = unsafe { _mm_xor_si128(t, bonus1) };
                    }
                    if mask & 0b0010 != 0 {
                        t = unsafe { _mm_xor_si128(t, bonus2) };
                    }
                    if mask & 0b0100 != 0 {
                        t = unsafe { _mm_xor_si128(t, bonus3) };
                    }
                    if mask & 0b1000 != 0 {
                        t = unsafe { _mm_xor_si128(t, bonus4) };
                    }
                    self.fold[lane] =
                        unsafe { _mm_xor_si128(t, Self::fold_const(self.fold[lane], k)) };
                }
            }
            *src = &src[512..];
        }
    }

    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    unsafe fn partial_fold(&mut self, xmm_crc_part: __m128i, len: usize) {
        const PSHUFB_SHF_TABLE: [__m128i; 15] = [
            reg([0x84838281, 0x88878685, 0x8c8b8a89, 0x008f8e8d]),
            reg([0x85848382, 0x89888786, 0x8d8c8b8a, 0x01008f8e]),
            reg([0x86858483, 0x8a898887, 0x8e8d8c8b, 0x0201008f]),
            reg([0x87868584, 0x8b8a8988, 0x8f8e8d8c, 0x03020100]),
            reg([0x88878685, 0x8c8b8a89, 0x008f8e8d, 0x04030201]),
            reg([0x89888786, 0x8d8c8b8a, 0x01008f8e, 0x05040302]),
            reg([0x8a898887, 0x8e8d8c8b, 0x0201008f, 0x06050403]),
            reg([0x8b8a8988, 0x8f8e8d8c, 0x03020100, 0x07060504]),
            reg([0x8c8b8a89, 0x008f8e8d, 0x04030201, 0x08070605]),
            reg([0x8d8c8b8a, 0x01008f8e, 0x05040302, 0x09080706]),
            reg([0x8e8d8c8b, 0x0201008f, 0x06050403, 0x0a090807]),
            reg([0x8f8e8d8c, 0x03020100, 0x07060504, 0x0b0a0908]),
            reg([0x008f8e8d, 0x04030201, 0x08070605, 0x0c0b0a09]),
            reg([0x01008f8e, 0x05040302, 0x09080706, 0x0d0c0b0a]),
            reg([0x0201008f, 0x06050403, 0x0a090807, 0x0e0d0c0b]),
        ];

        let xmm_shl = PSHUFB_SHF_TABLE[len - 1];
        let xmm_shr = unsafe { _mm_xor_si128(xmm_shl, reg([0x80808080u32; 4])) };

        let xmm_a0 = unsafe { Self::step(_mm_shuffle_epi8(self.fold[0], xmm_shl)) };

        self.fold[0] = unsafe { _mm_shuffle_epi8(self.fold[0], xmm_shr) };
        let tmp1 = unsafe { _mm_shuffle_epi8(self.fold[1], xmm_shl) };
        self.fold[0] = unsafe { _mm_or_si128(self.fold[0], tmp1) };

        self.fold[1] = unsafe { _mm_shuffle_epi8(self.fold[1], xmm_shr) };
        let tmp2 = unsafe { _mm_shuffle_epi8(self.fold[2], xmm_shl) };
        self.fold[1] = unsafe { _mm_or_si128(self.fold[1], tmp2) };

        self.fold[2] = unsafe { _mm_shuffle_epi8(self.fold[2], xmm_shr) };
        let tmp3 = unsafe { _mm_shuffle_epi8(self.fold[3], xmm_shl) };
        self.fold[2] = unsafe { _mm_or_si128(self.fold[2], tmp3) };

        self.fold[3] = unsafe { _mm_shuffle_epi8(self.fold[3], xmm_shr) };
        let crc_part = unsafe { _mm_shuffle_epi8(xmm_crc_part, xmm_shl) };
        self.fold[3] = unsafe { _mm_or_si128(self.fold[3], crc_part) };

        self.fold[3] = unsafe { _mm_xor_si128(self.fold[3], xmm_a0) };
    }

    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    #[allow(clippy::needless_range_loop)]
    unsafe fn progress<const N: usize, const COPY: bool>(
        &mut self,
        dst: &mut [u8],
        src: &mut &[u8],
        init_crc: &mut u32,
    ) -> usize {
        let mut it = src.chunks_exact(16);
        let mut input: [_; 4] = std::array::from_fn(|_| unsafe {
            _mm_load_si128(it.next().unwrap().as_ptr() as *const __m128i)
        });

        *src = &src[N * 16..];

        if COPY {
            for (s, d) in input[..N].iter().zip(dst.chunks_exact(16)) {
                unsafe { _mm_storeu_si128(d.as_ptr() as *mut __m128i, *s) };
            }
        } else if *init_crc != INITIAL {
            let xmm_initial = reg([*init_crc, 0, 0, 0]);
            input[0] = unsafe { _mm_xor_si128(input[0], xmm_initial) };
            *init_crc = INITIAL;
        }

        unsafe { self.fold_step::<N>() };

        for i in 0..N {
            self.fold[i + (4 - N)] = unsafe { _mm_xor_si128(self.fold[i + (4 - N)], input[i]) };
        }

        if COPY { N * 16 } else { 0 }
    }

    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    unsafe fn fold_help<const COPY: bool>(
        &mut self,
        mut dst: &mut [u8],
        mut src: &[u8],
        mut init_crc: u32,
    ) {
        let mut xmm_crc_part = reg([0; 4]);
        let mut partial_buf = Align16([0u8; 16]);

        debug_assert!(src.len() >= 31 || init_crc != INITIAL);
        if COPY {
            debug_assert_eq!(dst.len(), src.len());
        }

        if src.len() < 16 {
            if COPY {
                if src.is_empty() {
                    return;
                }
                partial_buf.0[..src.len()].copy_from_slice(src);
                xmm_crc_part =
                    unsafe { _mm_load_si128(partial_buf.0.as_mut_ptr() as *mut __m128i) };
                dst[..src.len()].copy_from_slice(&partial_buf.0[..src.len()]);
            }
        } else {
            let align_diff = (16 - (src.as_ptr() as usize & 0xF)) & 0xF;
            if align_diff != 0 {
                xmm_crc_part = unsafe { _mm_loadu_si128(src.as_ptr() as *const __m128i) };
                if COPY {
                    unsafe { _mm_storeu_si128(dst.as_mut_ptr() as *mut __m128i, xmm_crc_part) };
                    dst = &mut dst[align_diff..];
                } else {
                    if init_crc != INITIAL {
                        let xmm_initial = reg([init_crc, 0, 0, 0]);
                        xmm_crc_part = unsafe { _mm_xor_si128(xmm_crc_part, xmm_initial) };
                        init_crc = INITIAL;
                    }
                    if align_diff < 4 && init_crc != INITIAL {
                        let xmm_t0 = xmm_crc_part;
                        xmm_crc_part =
                            unsafe { _mm_loadu_si128((src.as_ptr() as *const __m128i).add(1)) };
                        unsafe { self.fold_step::<1>() };
                        self.fold[3] = unsafe { _mm_xor_si128(self.fold[3], xmm_t0) };
                        src = &src[16..];
                    }
                }
                unsafe { self.partial_fold(xmm_crc_part, align_diff) };
                src = &src[align_diff..];
            }

            // The bonus-block augmentation reads lookahead blocks it never
            // writes back through `dst`, so it's restricted to the plain
            // (non-copying) fold path.
            if !COPY {
                unsafe { self.chorba_fold_stride(&mut src) };
            }

            while src.len() >= 64 {
                let n = unsafe { self.progress::<4, COPY>(dst, &mut src, &mut init_crc) };
                dst = &mut dst[n..];
            }
            if src.len() >= 48 {
                let n = unsafe { self.progress::<3, COPY>(dst, &mut src, &mut init_crc) };
                dst = &mut dst[n..];
            } else if src.len() >= 32 {
                let n = unsafe { self.progress::<2, COPY>(dst, &mut src, &mut init_crc) };
                dst = &mut dst[n..];
            } else if src.len() >= 16 {
                let n = unsafe { self.progress::<1, COPY>(dst, &mut src, &mut init_crc) };
                dst = &mut dst[n..];
            }
        }

        if !src.is_empty() {
            unsafe {
                std::ptr::copy_nonoverlapping(
                    src.as_ptr(),
                    &mut xmm_crc_part as *mut _ as *mut u8,
                    src.len(),
                );
            }
            if COPY {
                unsafe {
                    _mm_storeu_si128(partial_buf.0.as_mut_ptr() as *mut __m128i, xmm_crc_part);
                    std::ptr::copy_nonoverlapping(
                        partial_buf.0.as_ptr(),
                        dst.as_mut_ptr(),
                        src.len(),
                    );
                }
            }
            unsafe { self.partial_fold(xmm_crc_part, src.len()) };
        }
    }

    /// Absorb `src` into the lanes. Requires `src.len() >= 31` unless
    /// `init_crc` carries a pending initial value.
    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    pub(crate) unsafe fn fold(&mut self, src: &[u8], init_crc: u32) {
        unsafe { self.fold_help::<false>(&mut [], src, init_crc) }
    }

    /// Absorb `src` into the lanes while also copying it verbatim to `dst`.
    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    pub(crate) unsafe fn fold_copy(&mut self, dst: &mut [u8], src: &[u8]) {
        unsafe { self.fold_help::<true>(dst, src, 0) }
    }

    /// Reduce the four 128-bit lanes to the final 32-bit CRC via two
    /// Barrett-style reductions, using the verified `RK1..RK8` constants.
    #[target_feature(enable = "pclmulqdq", enable = "sse2", enable = "sse4.1")]
    pub(crate) unsafe fn finish(self) -> u32 {
        const CRC_MASK1: __m128i = reg([0xFFFFFFFF, 0xFFFFFFFF, 0x00000000, 0x00000000]);
        const CRC_MASK2: __m128i = reg([0x00000000, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF]);

        const RK1_RK2: __m128i = reg([0xccaa009e, 0x00000000, 0x751997d0, 0x00000001]);
        const RK5_RK6: __m128i = reg([0xccaa009e, 0x00000000, 0x63cd6124, 0x00000001]);
        const RK7_RK8: __m128i = reg([0xf7011640, 0x00000001, 0xdb710640, 0x00000001]);

        let [mut xmm_crc0, mut xmm_crc1, mut xmm_crc2, mut xmm_crc3] = self.fold;

        let mut crc_fold = RK1_RK2;
        unsafe {
            let x_tmp0 = _mm_clmulepi64_si128(xmm_crc0, crc_fold, 0x10);
            xmm_crc0 = _mm_clmulepi64_si128(xmm_crc0, crc_fold, 0x01);
            xmm_crc1 = _mm_xor_si128(xmm_crc1, x_tmp0);
            xmm_crc1 = _mm_xor_si128(xmm_crc1, xmm_crc0);

            let x_tmp1 = _mm_clmulepi64_si128(xmm_crc1, crc_fold, 0x10);
            xmm_crc1 = _mm_clmulepi64_si128(xmm_crc1, crc_fold, 0x01);
            xmm_crc2 = _mm_xor_si128(xmm_crc2, x_tmp1);
            xmm_crc2 = _mm_xor_si128(xmm_crc2, xmm_crc1);

            let x_tmp2 = _mm_clmulepi64_si128(xmm_crc2, crc_fold, 0x10);
            xmm_crc2 = _mm_clmulepi64_si128(xmm_crc2, crc_fold, 0x01);
            xmm_crc3 = _mm_xor_si128(xmm_crc3, x_tmp2);
            xmm_crc3 = _mm_xor_si128(xmm_crc3, xmm_crc2);

            crc_fold = RK5_RK6;

            xmm_crc0 = xmm_crc3;
            xmm_crc3 = _mm_clmulepi64_si128(xmm_crc3, crc_fold, 0);
            xmm_crc0 = _mm_srli_si128(xmm_crc0, 8);
            xmm_crc3 = _mm_xor_si128(xmm_crc3, xmm_crc0);

            xmm_crc0 = xmm_crc3;
            xmm_crc3 = _mm_slli_si128(xmm_crc3, 4);
            xmm_crc3 = _mm_clmulepi64_si128(xmm_crc3, crc_fold, 0x10);
            xmm_crc3 = _mm_xor_si128(xmm_crc3, xmm_crc0);
            xmm_crc3 = _mm_and_si128(xmm_crc3, CRC_MASK2);

            xmm_crc1 = xmm_crc3;
            xmm_crc2 = xmm_crc3;
            crc_fold = RK7_RK8;

            xmm_crc3 = _mm_clmulepi64_si128(xmm_crc3, crc_fold, 0);
            xmm_crc3 = _mm_xor_si128(xmm_crc3, xmm_crc2);
            xmm_crc3 = _mm_and_si128(xmm_crc3, CRC_MASK1);

            xmm_crc2 = xmm_crc3;
            xmm_crc3 = _mm_clmulepi64_si128(xmm_crc3, crc_fold, 0x10);
            xmm_crc3 = _mm_xor_si128(xmm_crc3, xmm_crc2);
            xmm_crc3 = _mm_xor_si128(xmm_crc3, xmm_crc1);

            !(_mm_extract_epi32(xmm_crc3, 2) as u32)
        }
    }
}

/// One-shot entry point: folds with a fresh [`Lanes`] state and finishes
/// immediately. Below 64 bytes, falls back to [`braid`] (the CLMUL setup
/// and teardown cost isn't worth it at that size).
pub(crate) fn crc32_clmul(buf: &[u8], start: u32) -> u32 {
    if buf.len() < 64 {
        return braid(start, buf);
    }
    let mut lanes = Lanes::new();
    unsafe {
        lanes.fold(buf, start);
        lanes.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::base;

    #[test]
    fn test_clmul_matches_base_large() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 2654435761) as u8).collect();
        for &len in &[64, 65, 127, 128, 200, 1000, 4000, 4096] {
            let buf = &data[..len];
            assert_eq!(crc32_clmul(buf, 0), base(0, buf), "len={len}");
        }
    }

    #[test]
    fn test_clmul_chorba_stride_boundary() {
        // 512 + 64 + 64 is the exact threshold at which `chorba_fold_stride`
        // engages; check just below, at, and just past it, plus enough past
        // it for a second 576-byte super-stride to run.
        let data: Vec<u8> = (0..4000u32).map(|i| (i * 97 + 11) as u8).collect();
        for &len in &[639, 640, 641, 1024, 1216, 1217, 2000] {
            let buf = &data[..len];
            assert_eq!(crc32_clmul(buf, 0), base(0, buf), "len={len}");
        }
    }

    #[test]
    fn test_clmul_matches_base_small_falls_back_to_braid() {
        let data: Vec<u8> = (0..63u32).map(|i| i as u8).collect();
        assert_eq!(crc32_clmul(&data, 0), base(0, &data));
    }
}
