//! # chorba32
//!
//! Length-adaptive IEEE 802.3 CRC-32: a braided table kernel, a "Chorba"
//! GF(2) bit-injection kernel, and a PCLMULQDQ/ACLE hardware kernel, picked
//! per call by input length and runtime CPU capability.
//!
//! - [`base`]: byte-at-a-time reference kernel and universal tail handler.
//! - [`tables`]: compile-time lookup tables for the reflected polynomial.
//! - [`braid`]: N-way interleaved word kernel for small-to-medium inputs.
//! - [`chorba_small`] / [`chorba_large`]: GF(2)-linear bit-injection
//!   kernels that replace most table lookups for medium and very large
//!   inputs respectively.
//! - [`clmul`] (x86_64 only): carry-less-multiply 4-lane folding kernel.
//! - [`arm_crc`] (aarch64 only): hardware CRC32 ACLE instruction kernel.
//! - [`cpuid`]: runtime feature probe, queried once per process.
//! - [`dispatch`]: selects a kernel per call and owns pre/post conditioning.
//! - [`fold_state`]: streaming handle for incremental CRC-32 computation.
//! - [`combine`]: join two independently-computed CRC-32 values.
//! - [`error`]: the crate's (tiny) fallibility surface.
//!
//! ## Example
//!
//! ```rust
//! use chorba32::crc32;
//!
//! assert_eq!(crc32(0, b"123456789"), 0xCBF4_3926);
//! ```
//!
//! All kernels produce bit-identical output for a given `(prior_crc, buf)`;
//! which one runs is an implementation detail driven by length and CPU
//! features, not part of the API contract.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod base;
pub mod braid;
pub mod chorba_large;
pub mod chorba_small;
pub mod combine;
pub mod cpuid;
pub mod dispatch;
pub mod error;
pub mod fold_state;
pub mod tables;

#[cfg(target_arch = "aarch64")]
pub mod arm_crc;
#[cfg(target_arch = "x86_64")]
pub mod clmul;

pub use combine::combine;
pub use dispatch::{KernelChoice, choose_kernel, crc32};
pub use error::{CrcError, Result};
pub use fold_state::FoldState;

/// Convenience re-exports for the common case of a one-shot checksum plus
/// the streaming fold handle.
pub mod prelude {
    pub use crate::combine::combine;
    pub use crate::dispatch::crc32;
    pub use crate::error::{CrcError, Result};
    pub use crate::fold_state::FoldState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_check_vectors() {
        assert_eq!(crc32(0, b""), 0x0000_0000);
        assert_eq!(crc32(0, b"abc"), 0x3524_41C2);
        assert_eq!(crc32(0, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_combine_round_trips_crc32() {
        let a = b"chorba ";
        let b = b"checksum";
        let whole = crc32(0, &[a.as_slice(), b.as_slice()].concat());
        assert_eq!(combine(crc32(0, a), crc32(0, b), b.len() as u64), whole);
    }
}
