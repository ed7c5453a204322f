use thiserror::Error;

/// Errors raised by alphabet configuration — the only errors SELFIES
/// encoding/decoding can surface, since the decoder itself is total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphabetError {
    #[error("alphabet conflict: {0}")]
    AlphabetConflict(String),
}
