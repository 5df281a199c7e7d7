//! The two proof-of-work search loops.
use std::time::{SystemTime, UNIX_EPOCH};

use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use base64::{prelude::BASE64_STANDARD as BASE_64, Engine as _};
use curve25519_dalek::MontgomeryPoint;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::PowError;

/// Byte length of one HMAC-SHA256 key in a challenge.
const PRF_KEY_LEN: usize = 32;

/// Byte length of an HMAC-SHA256 output.
const PRF_OUTPUT_LEN: usize = 32;

/// ECDLP layout: scalar PRF key, point PRF key, target hash.
const ECDLP_CHALLENGE_LEN: usize = 2 * PRF_KEY_LEN + PRF_OUTPUT_LEN;

/// Four little-endian u32 Argon2 parameters.
const ARGON2_PARAMS_LEN: usize = 16;

/// Argon2 layout: three PRF keys, target hash, parameter block.
const ARGON2_CHALLENGE_LEN: usize = 3 * PRF_KEY_LEN + PRF_OUTPUT_LEN + ARGON2_PARAMS_LEN;

type HmacSha256 = Hmac<Sha256>;

/// Solves an ECDLP proof-of-work challenge.
///
/// Searches for the index i whose PRF image, clamped and multiplied onto the
/// X25519 base point, hashes to the challenge target. The solution is
/// `LE64(i) || point`, base64 encoded.
///
/// # Parameters
///
/// * `b64_challenge`        - The base64 encoded challenge from the server.
/// * `deadline_unix_millis` - Absolute deadline in Unix milliseconds;
///   negative removes the limit.
///
/// # Errors
///
/// Returns a [`PowError`] if the deadline expires or the challenge is
/// malformed.
pub fn solve_ecdlp_challenge(
    b64_challenge: &str,
    deadline_unix_millis: i64,
) -> Result<String, PowError> {
    let challenge = BASE_64.decode(b64_challenge)?;
    if challenge.len() != ECDLP_CHALLENGE_LEN {
        return Err(PowError::InvalidChallengeLength);
    }
    let (scalar_prf_key, rest) = challenge.split_at(PRF_KEY_LEN);
    let (point_prf_key, target_hash) = rest.split_at(PRF_KEY_LEN);

    let mut index: u64 = 0;
    loop {
        // One deadline poll per iteration, before any work.
        if deadline_exceeded(deadline_unix_millis) {
            return Err(PowError::DeadlineExceeded);
        }

        let scalar = prf(scalar_prf_key, &index.to_le_bytes())?;
        let point = MontgomeryPoint::mul_base_clamped(scalar);

        if prf(point_prf_key, point.as_bytes())?.as_slice() == target_hash {
            return Ok(encode_solution(index, point.as_bytes()));
        }

        index = index.checked_add(1).ok_or(PowError::SearchExhausted)?;
    }
}

/// Solves an Argon2id preimage proof-of-work challenge.
///
/// Searches for the index i whose PRF image, run through Argon2id with the
/// parameters carried in the challenge, hashes to the challenge target. The
/// solution is `LE64(i) || digest`, base64 encoded.
///
/// # Parameters
///
/// * `b64_challenge`        - The base64 encoded challenge from the server.
/// * `deadline_unix_millis` - Absolute deadline in Unix milliseconds;
///   negative removes the limit.
///
/// # Errors
///
/// Returns a [`PowError`] if the deadline expires or the challenge is
/// malformed.
pub fn solve_argon2_preimage_challenge(
    b64_challenge: &str,
    deadline_unix_millis: i64,
) -> Result<String, PowError> {
    let challenge = BASE_64.decode(b64_challenge)?;
    if challenge.len() != ARGON2_CHALLENGE_LEN {
        return Err(PowError::InvalidChallengeLength);
    }
    let (password_prf_key, rest) = challenge.split_at(PRF_KEY_LEN);
    let (argon2_salt, rest) = rest.split_at(PRF_KEY_LEN);
    let (target_prf_key, rest) = rest.split_at(PRF_KEY_LEN);
    let (target_hash, argon2_params) = rest.split_at(PRF_OUTPUT_LEN);

    // The engine and its output buffer are reused across the whole search.
    let (argon2, mut digest) = build_argon2(argon2_params)?;

    let mut index: u64 = 0;
    loop {
        if deadline_exceeded(deadline_unix_millis) {
            return Err(PowError::DeadlineExceeded);
        }

        let password = prf(password_prf_key, &index.to_le_bytes())?;
        argon2
            .hash_password_into(&password, argon2_salt, &mut digest)
            .map_err(|_err| PowError::InvalidChallengeParams)?;

        if prf(target_prf_key, &digest)?.as_slice() == target_hash {
            return Ok(encode_solution(index, &digest));
        }

        index = index.checked_add(1).ok_or(PowError::SearchExhausted)?;
    }
}

/// Current wall-clock time in Unix milliseconds.
pub(crate) fn unix_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

fn deadline_exceeded(deadline_unix_millis: i64) -> bool {
    deadline_unix_millis >= 0 && unix_millis_now() > deadline_unix_millis
}

fn prf(key: &[u8], data: &[u8]) -> Result<[u8; PRF_OUTPUT_LEN], PowError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_err| PowError::Unexpected)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

fn build_argon2(params: &[u8]) -> Result<(Argon2<'static>, Box<[u8]>), PowError> {
    // Parameter block: threads, output length, memory (KiB), passes.
    let threads = le_u32(params, 0);
    let output_len = le_u32(params, 4);
    let memory_kib = le_u32(params, 8);
    let passes = le_u32(params, 12);

    let output_len = usize::try_from(output_len).map_err(|_err| PowError::InvalidChallengeParams)?;
    let params = ParamsBuilder::new()
        .m_cost(memory_kib)
        .t_cost(passes)
        .p_cost(threads)
        .output_len(output_len)
        .build()
        .map_err(|_err| PowError::InvalidChallengeParams)?;

    let engine = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    Ok((engine, vec![0_u8; output_len].into_boxed_slice()))
}

/// The caller validated the slice length; offsets are in bounds.
fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn encode_solution(index: u64, digest: &[u8]) -> String {
    let mut solution = Vec::with_capacity(8 + digest.len());
    solution.extend_from_slice(&index.to_le_bytes());
    solution.extend_from_slice(digest);
    BASE_64.encode(solution)
}
