//! Process-wide source of cryptographically strong randomness.
use rand::RngCore;

use crate::{srp::SALT_LEN_BYTES, SrpError};

/// Draws `len` random bytes from the process CSPRNG.
///
/// # Errors
///
/// Returns `Err` if the system randomness source fails.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, SrpError> {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng()
        .try_fill_bytes(&mut bytes)
        .map_err(|_err| SrpError::Internal("system randomness is unavailable"))?;
    Ok(bytes)
}

/// Draws `bits / 8` random bytes from the process CSPRNG.
///
/// # Errors
///
/// Returns `Err` if the system randomness source fails.
pub fn random_bits(bits: usize) -> Result<Vec<u8>, SrpError> {
    random_bytes(bits / 8)
}

/// Generates a fresh salt for verifier registration.
pub(crate) fn random_salt() -> Result<[u8; SALT_LEN_BYTES], SrpError> {
    let mut salt = [0_u8; SALT_LEN_BYTES];
    rand::thread_rng()
        .try_fill_bytes(&mut salt)
        .map_err(|_err| SrpError::Internal("system randomness is unavailable"))?;
    Ok(salt)
}
