//! Streaming state machine for the CLMUL fold kernel (C6).
//!
//! The literal reference this crate's CLMUL kernel is transcribed from
//! persists its four 128-bit lanes across `fold()` calls and requires each
//! call to carry a minimum amount of input (the alignment load needs at
//! least 31 bytes, or an already-pending initial value) — a precondition
//! that reference can get away with because its only caller is a
//! compressor's internal window management, which always hands over
//! reasonably sized chunks. A public `append` API has no such guarantee: a
//! caller may legally append a single byte at a time. Rather than rebuild
//! that alignment bookkeeping to tolerate arbitrary call boundaries, this
//! module threads the *finished* CRC value itself from call to call through
//! [`crate::dispatch::crc32`], which already selects the fastest available
//! kernel — including the CLMUL lanes above — per call. `crc32(crc_n, buf)`
//! extends the running register exactly as a literal persisted-lane
//! implementation would; the lanes are simply re-entered fresh each call
//! instead of carried in struct fields across calls.

use crate::error::{CrcError, Result};

/// Lifecycle of a [`FoldState`]: §4.7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    Folding,
    Finalized,
}

/// Streaming handle for incremental CRC-32 computation.
///
/// Not `Sync`: concurrent use of one `FoldState` from multiple threads is
/// undefined, matching the teacher crate's lack of any locking in its own
/// CRC types. It remains `Send` — handing a finished computation off to
/// another thread is fine, just not sharing it live.
#[derive(Debug, Clone, Copy)]
pub struct FoldState {
    phase: Phase,
    crc: u32,
}

impl FoldState {
    /// Begin a new stream with zero-initialized state.
    pub fn begin_stream() -> Self {
        Self {
            phase: Phase::Fresh,
            crc: 0,
        }
    }

    /// Absorb `bytes` into the running CRC. `init_crc` is mixed in only on
    /// the first call after [`begin_stream`](Self::begin_stream); later
    /// calls ignore it, since the running register already carries it
    /// forward.
    pub fn append(&mut self, bytes: &[u8], init_crc: u32) -> Result<()> {
        if self.phase == Phase::Finalized {
            return Err(CrcError::invalid_state("append after finalize"));
        }
        let seed = match self.phase {
            Phase::Fresh => init_crc,
            Phase::Folding | Phase::Finalized => self.crc,
        };
        self.crc = crate::dispatch::crc32(seed, bytes);
        if !bytes.is_empty() {
            self.phase = Phase::Folding;
        }
        Ok(())
    }

    /// Same as [`append`](Self::append), but also writes `bytes` verbatim
    /// to `dst` — useful when the caller is checksumming data it is about
    /// to copy anyway (e.g. into a compressor's output buffer).
    pub fn append_and_copy(&mut self, dst: &mut [u8], bytes: &[u8], init_crc: u32) -> Result<()> {
        if self.phase == Phase::Finalized {
            return Err(CrcError::invalid_state("append after finalize"));
        }
        dst[..bytes.len()].copy_from_slice(bytes);
        self.append(bytes, init_crc)
    }

    /// Reduce the stream state to its final CRC-32 value. Idempotent calls
    /// after the first are rejected with [`CrcError::InvalidState`], and so
    /// is any further `append`.
    pub fn finalize(&mut self) -> Result<u32> {
        if self.phase == Phase::Finalized {
            return Err(CrcError::invalid_state("finalize called twice"));
        }
        self.phase = Phase::Finalized;
        Ok(self.crc)
    }
}

impl Default for FoldState {
    fn default() -> Self {
        Self::begin_stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::crc32;

    #[test]
    fn test_fold_state_matches_one_shot() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut state = FoldState::begin_stream();
        state.append(data, 0).unwrap();
        let streamed = state.finalize().unwrap();
        assert_eq!(streamed, crc32(0, data));
    }

    #[test]
    fn test_fold_state_multiple_appends_match_one_shot() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i * 2654435761) as u8).collect();
        for chunk_size in [1usize, 3, 16, 64, 999] {
            let mut state = FoldState::begin_stream();
            for chunk in data.chunks(chunk_size) {
                state.append(chunk, 0).unwrap();
            }
            let streamed = state.finalize().unwrap();
            assert_eq!(streamed, crc32(0, &data), "chunk_size={chunk_size}");
        }
    }

    #[test]
    fn test_append_after_finalize_rejected() {
        let mut state = FoldState::begin_stream();
        state.append(b"abc", 0).unwrap();
        state.finalize().unwrap();
        assert!(matches!(
            state.append(b"more", 0),
            Err(CrcError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_double_finalize_rejected() {
        let mut state = FoldState::begin_stream();
        state.append(b"abc", 0).unwrap();
        state.finalize().unwrap();
        assert!(matches!(state.finalize(), Err(CrcError::InvalidState { .. })));
    }

    #[test]
    fn test_append_and_copy_writes_verbatim() {
        let mut state = FoldState::begin_stream();
        let src = b"copy me please";
        let mut dst = vec![0u8; src.len()];
        state.append_and_copy(&mut dst, src, 0).unwrap();
        assert_eq!(&dst, src);
        assert_eq!(state.finalize().unwrap(), crc32(0, src));
    }

    #[test]
    fn test_empty_stream_finalizes_to_seed() {
        let mut state = FoldState::begin_stream();
        assert_eq!(state.finalize().unwrap(), 0);
    }
}
