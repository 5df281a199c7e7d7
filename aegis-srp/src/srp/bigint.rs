//! Fixed-width big-integer helpers for the SRP group.
//!
//! Group elements travel as little-endian byte strings of exactly the group
//! width, while the arithmetic runs on [`crypto_bigint::U2048`]. Secret
//! exponents must only ever be raised through the Montgomery residue engine,
//! which is constant-time in the exponent; the variable-time routines in this
//! module are reserved for public values.
use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Encoding, Integer, NonZero, RandomMod, U2048};

use crate::SrpError;

pub(crate) type BigUint = U2048;

/// The bit width of the SRP group this build is compiled for.
pub const SRP_BIT_LENGTH: usize = 2048;

/// The byte length of an encoded element of the SRP group.
pub const SRP_LEN_BYTES: usize = SRP_BIT_LENGTH / 8;

/// Ephemeral secrets on either side must exceed twice the group bit length,
/// so that the corresponding public value wraps the modulus.
pub(crate) const SECRET_FLOOR: BigUint = BigUint::from_u32(2 * SRP_BIT_LENGTH as u32);

/// Parses a little-endian fixed-width group element.
pub(crate) fn decode_le(bytes: &[u8]) -> Result<BigUint, SrpError> {
    if bytes.len() != SRP_LEN_BYTES {
        return Err(SrpError::InvalidInput(
            "group elements must be 256 bytes long",
        ));
    }
    Ok(BigUint::from_le_slice(bytes))
}

/// Serializes a group element little-endian at the fixed group width.
pub(crate) fn encode_le(value: &BigUint) -> [u8; SRP_LEN_BYTES] {
    value.to_le_bytes()
}

/// Loads the modulus and returns it together with N - 1, both as [`NonZero`].
///
/// Only structural checks happen here: the modulus must be odd and larger
/// than one, which the Montgomery engine requires. Primality is checked
/// separately where the protocol demands it.
pub(crate) fn prepare_modulus(
    modulus: &[u8; SRP_LEN_BYTES],
) -> Result<(NonZero<BigUint>, NonZero<BigUint>), SrpError> {
    let n = BigUint::from_le_slice(modulus);
    if n <= BigUint::ONE || bool::from(n.is_even()) {
        return Err(SrpError::ModulusRejected("modulus is even or zero"));
    }
    // Both values were just checked to be non-zero, the fallback is unreachable.
    let n_minus_one = NonZero::new(n.sub_mod(&BigUint::ONE, &n)).unwrap_or(NonZero::MAX);
    let n = NonZero::new(n).unwrap_or(NonZero::MAX);
    Ok((n, n_minus_one))
}

/// Miller-Rabin primality test with random witnesses.
///
/// Variable-time; only ever fed public values.
pub(crate) fn is_probable_prime(candidate: &BigUint, rounds: usize) -> bool {
    let two = BigUint::from_u32(2);
    let three = BigUint::from_u32(3);
    if *candidate <= BigUint::ONE {
        return false;
    }
    if bool::from(candidate.is_even()) {
        return *candidate == two;
    }
    if *candidate == three {
        return true;
    }

    // candidate - 1 = d * 2^s with d odd
    let candidate_minus_one = candidate.wrapping_sub(&BigUint::ONE);
    let mut d = candidate_minus_one;
    let mut s = 0_usize;
    while bool::from(d.is_even()) {
        d = d.shr_vartime(1);
        s += 1;
    }

    let params = DynResidueParams::new(candidate);
    // Witnesses are drawn uniformly from [2, candidate - 2].
    let witness_span =
        NonZero::new(candidate.wrapping_sub(&three)).unwrap_or(NonZero::<BigUint>::MAX);
    let mut rng = rand::thread_rng();

    'witness: for _ in 0..rounds {
        let base = BigUint::random_mod(&mut rng, &witness_span).wrapping_add(&two);
        let mut x = DynResidue::new(&base, params).pow(&d);
        let mut value = x.retrieve();
        if value == BigUint::ONE || value == candidate_minus_one {
            continue 'witness;
        }
        for _ in 1..s {
            x = x.square();
            value = x.retrieve();
            if value == candidate_minus_one {
                continue 'witness;
            }
            if value == BigUint::ONE {
                // Non-trivial square root of one.
                return false;
            }
        }
        return false;
    }
    true
}
