use base64::DecodeError;

/// Errors surfaced by the proof-of-work solvers.
#[derive(Debug, thiserror::Error)]
pub enum PowError {
    /// The deadline passed before a solution was found.
    #[error("Deadline exceeded")]
    DeadlineExceeded,
    #[error("Invalid challenge length")]
    InvalidChallengeLength,
    #[error("Failed to decode base64 encoded challenge: {0}")]
    Base64Decode(#[from] DecodeError),
    #[error("Invalid challenge parameters")]
    InvalidChallengeParams,
    /// The 64-bit search space ran out, which no honest challenge reaches.
    #[error("Challenge search space exhausted")]
    SearchExhausted,
    #[error("An unexpected error occurred")]
    Unexpected,
}
