//! CPU feature probe, hoisted into its own interface so the dispatcher
//! depends on a queried-once-and-cached fact rather than a macro invocation
//! scattered through the hot path.
//!
//! Mirrors the teacher's `is_supported()` shape (compile-time
//! `cfg!(target_feature = ...)` short-circuit, falling back to the
//! `is_x86_feature_detected!`/`is_aarch64_feature_detected!` runtime probes),
//! but memoizes the runtime result in a [`OnceLock`] instead of
//! re-detecting it on every call.

use std::sync::OnceLock;

/// True if PCLMULQDQ + SSE4.1 are usable on this process's core.
pub fn has_pclmulqdq() -> bool {
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| {
        if cfg!(target_feature = "pclmulqdq") && cfg!(target_feature = "sse4.1") {
            return true;
        }
        #[cfg(target_arch = "x86_64")]
        {
            std::is_x86_feature_detected!("pclmulqdq") && std::is_x86_feature_detected!("sse4.1")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            false
        }
    })
}

/// True if the AVX-512 VPCLMULQDQ wide fold path is usable.
pub fn has_vpclmulqdq_512() -> bool {
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| {
        if cfg!(target_feature = "vpclmulqdq") && cfg!(target_feature = "avx512f") {
            return true;
        }
        #[cfg(target_arch = "x86_64")]
        {
            std::is_x86_feature_detected!("vpclmulqdq") && std::is_x86_feature_detected!("avx512f")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            false
        }
    })
}

/// True if the aarch64 CRC32 ACLE instructions are usable.
pub fn has_arm_crc32() -> bool {
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| {
        if cfg!(target_feature = "crc") {
            return true;
        }
        #[cfg(target_arch = "aarch64")]
        {
            std::arch::is_aarch64_feature_detected!("crc")
        }
        #[cfg(not(target_arch = "aarch64"))]
        {
            false
        }
    })
}
