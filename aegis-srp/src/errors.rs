use base64::DecodeError;

use crate::ModulusVerifyError;

/// Errors surfaced by the SRP engine.
#[derive(Debug, thiserror::Error)]
pub enum SrpError {
    #[error("Failed to decode base64 encoded parameter: {0}")]
    Base64Decode(#[from] DecodeError),
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    /// Extraction or signature verification of the signed modulus failed.
    ///
    /// See [`ModulusSignatureVerifier`](crate::ModulusSignatureVerifier).
    #[error("Invalid SRP modulus message: {0}")]
    ModulusVerify(#[from] ModulusVerifyError),
    /// The decoded modulus does not describe a valid safe-prime group.
    #[error("SRP modulus rejected: {0}")]
    ModulusRejected(&'static str),
    #[error("Invalid SRP input: {0}")]
    InvalidInput(&'static str),
    /// A group element left the interval (1, N-1), or the scrambling
    /// parameter hashed to zero. The session must be aborted.
    #[error("SRP parameter out of bounds: {0}")]
    ParameterOutOfBounds(&'static str),
    #[error("Invalid SRP protocol state: {0}")]
    ProtocolState(&'static str),
    /// The client proof did not match; the cached shared session is cleared.
    #[error("Invalid SRP client proof")]
    ProofMismatch,
    #[error("SRP password hash version {0} requires a username")]
    MissingUsername(u8),
    #[error("The SRP version is not supported by this implementation")]
    UnsupportedVersion,
    #[error("Internal SRP failure: {0}")]
    Internal(&'static str),
}

/// Errors thrown by the mailbox password hash.
#[derive(Debug, thiserror::Error)]
pub enum MailboxHashError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Invalid salt provided")]
    InvalidSalt,
}
