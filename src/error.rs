//! Error types for the CRC engine.
//!
//! The fallibility surface here is tiny next to a format library's: every
//! computational kernel is a total function over `&[u8]`, so the only thing
//! that can go wrong is misuse of the streaming fold state machine.

use thiserror::Error;

/// Errors produced by the streaming CLMUL fold API.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CrcError {
    /// A `FoldState` transition was rejected, e.g. appending after `finalize`.
    #[error("invalid fold state transition: {what}")]
    InvalidState { what: &'static str },
}

impl CrcError {
    pub(crate) fn invalid_state(what: &'static str) -> Self {
        CrcError::InvalidState { what }
    }
}

/// Result alias used throughout the crate's fallible streaming API.
pub type Result<T> = core::result::Result<T, CrcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CrcError::invalid_state("append after finalize");
        assert_eq!(
            err.to_string(),
            "invalid fold state transition: append after finalize"
        );
    }
}
