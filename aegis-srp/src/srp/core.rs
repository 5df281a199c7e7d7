//! Client-side core of the SRP-6a exchange.
//!
//! ```ignore
//! N    A large safe prime (N = 2q + 1 with q prime); all arithmetic is mod N
//! g    The group generator, fixed to 2
//! k    Multiplier parameter, H(g || N)
//! s    Salt
//! H()  The 256-byte four-way SHA-512 expansion
//! x    Hashed password (derived from the password, s, and N)
//! a,b  Secret ephemeral values of client and server
//! A,B  Public ephemeral values of client and server
//! u    Scrambling parameter, H(A || B)
//! v    The verifier g^x stored by the server
//!
//! |       Client            |   Data transfer   |      Server              |
//! |-------------------------|-------------------|--------------------------|
//! |`A = g^a`                | — `A` —>          | (looks up `s`, `v`)      |
//! |`x = H_pw(p, s)`         | <— `B`, `s` —     | `B = k*v + g^b`          |
//! |`S = (B - k*g^x)^(a+u*x)`|                   | `S = (A*v^u)^b`          |
//! |`M1 = H(A ‖ B ‖ S)`      | — `M1` —>         | verify `M1`              |
//! | verify `M2`             | <— `M2` —         | `M2 = H(A ‖ M1 ‖ S)`     |
//! ```
//!
//! The client aborts when the modulus fails the safe-prime gate, when any
//! public element leaves (1, N-1), or when u hashes to zero. Secret
//! exponents only pass through the Montgomery engine.
use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::RandomMod;
use zeroize::Zeroizing;

use crate::hash::{expand_hash, HashedPassword};
use crate::srp::bigint::{
    decode_le, encode_le, is_probable_prime, prepare_modulus, BigUint, SECRET_FLOOR,
    SRP_BIT_LENGTH, SRP_LEN_BYTES,
};
use crate::SrpError;

use super::SrpProofs;

/// The byte length of a registration salt.
pub const SALT_LEN_BYTES: usize = 10;

/// The group generator, fixed for every provided group.
pub(super) const GENERATOR: BigUint = BigUint::from_u32(2);

/// Maximal number of attempts when sampling an ephemeral secret.
const MAX_SAMPLE_RETRIES: usize = 5;

/// Witness count for the safe-prime gate.
const MILLER_RABIN_ROUNDS: usize = 10;

/// Generates the client proofs for a fresh ephemeral secret.
pub(super) fn generate_client_proofs(
    modulus: &[u8; SRP_LEN_BYTES],
    server_ephemeral: &[u8; SRP_LEN_BYTES],
    hashed_password: &HashedPassword,
    bit_length: usize,
) -> Result<SrpProofs, SrpError> {
    proofs_with_secret(modulus, server_ephemeral, hashed_password, bit_length, None)
}

/// Generates the client proofs for a pinned ephemeral secret; vector tests
/// only.
#[cfg(test)]
pub(super) fn generate_client_proofs_with_secret(
    modulus: &[u8; SRP_LEN_BYTES],
    server_ephemeral: &[u8; SRP_LEN_BYTES],
    hashed_password: &HashedPassword,
    bit_length: usize,
    client_secret: &[u8; SRP_LEN_BYTES],
) -> Result<SrpProofs, SrpError> {
    proofs_with_secret(
        modulus,
        server_ephemeral,
        hashed_password,
        bit_length,
        Some(client_secret),
    )
}

fn proofs_with_secret(
    modulus: &[u8; SRP_LEN_BYTES],
    server_ephemeral: &[u8; SRP_LEN_BYTES],
    hashed_password: &HashedPassword,
    bit_length: usize,
    pinned_secret: Option<&[u8; SRP_LEN_BYTES]>,
) -> Result<SrpProofs, SrpError> {
    if bit_length != SRP_BIT_LENGTH {
        return Err(SrpError::InvalidInput("unsupported SRP group size"));
    }
    let (n, n_minus_one) = prepare_modulus(modulus)?;
    if n.bits() != bit_length {
        return Err(SrpError::ModulusRejected("modulus has the wrong size"));
    }

    let params = DynResidueParams::new(&n);
    let g_res = DynResidue::new(&GENERATOR, params);

    // k = H(g || N), reduced into the group
    let multiplier = hash_pair(&encode_le(&GENERATOR), modulus).rem(&n);
    if multiplier <= BigUint::ONE || multiplier >= *n_minus_one {
        return Err(SrpError::ParameterOutOfBounds("multiplier"));
    }
    if GENERATOR <= BigUint::ONE || GENERATOR >= *n_minus_one {
        return Err(SrpError::ParameterOutOfBounds("generator"));
    }
    let b_pub = decode_le(server_ephemeral)?;
    if b_pub <= BigUint::ONE || b_pub >= *n_minus_one {
        return Err(SrpError::ParameterOutOfBounds("server ephemeral"));
    }

    // 2^(N-1) == 1 (mod N): exact for a prime N by Pocklington, and far
    // cheaper than a full primality test.
    if g_res.pow(&n_minus_one).retrieve() != BigUint::ONE {
        return Err(SrpError::ModulusRejected("modulus is not prime"));
    }
    // (N-1)/2 must itself be prime for a safe-prime group.
    if !is_probable_prime(&n.shr_vartime(1), MILLER_RABIN_ROUNDS) {
        return Err(SrpError::ModulusRejected("modulus is not a safe prime"));
    }

    // Sample a in (2L, N-1), derive A = g^a and u = H(A || B) with u != 0.
    let mut rng = rand::thread_rng();
    let mut accepted = None;
    for _ in 0..MAX_SAMPLE_RETRIES {
        let client_secret = match pinned_secret {
            Some(bytes) => Zeroizing::new(BigUint::from_le_slice(bytes)),
            None => Zeroizing::new(BigUint::random_mod(&mut rng, &n_minus_one)),
        };
        if *client_secret <= SECRET_FLOOR {
            continue;
        }
        let a_pub = g_res.pow(&client_secret).retrieve();
        let u = hash_pair(&encode_le(&a_pub), server_ephemeral);
        if u == BigUint::ZERO {
            continue;
        }
        accepted = Some((client_secret, a_pub, u));
        break;
    }
    let Some((client_secret, a_pub, u)) = accepted else {
        return Err(SrpError::Internal("failed to sample a client secret"));
    };

    let x = Zeroizing::new(BigUint::from_le_slice(hashed_password.as_bytes()));

    // t = B - k*g^x (mod N); the modular subtraction lifts negative values.
    let k_res = DynResidue::new(&multiplier, params);
    let b_res = DynResidue::new(&b_pub, params);
    let base = b_res.sub(&g_res.pow(&x).mul(&k_res));

    // e = (u*x + a) mod (N-1)
    let (ux, _) = BigUint::const_rem_wide(x.mul_wide(&u), &n_minus_one);
    let ux = Zeroizing::new(ux);
    let exponent = Zeroizing::new(client_secret.add_mod(&ux, &n_minus_one));

    // S = t^e
    let shared_session = Zeroizing::new(base.pow(&exponent).retrieve());

    let a_bytes = encode_le(&a_pub);
    let session_bytes = Zeroizing::new(encode_le(&shared_session));
    let client_proof = hash_triple(&a_bytes, server_ephemeral, &session_bytes);
    let server_proof = hash_triple(&a_bytes, &client_proof, &session_bytes);

    Ok(SrpProofs {
        client_ephemeral: a_bytes,
        client_proof,
        expected_server_proof: server_proof,
        shared_session: session_bytes,
    })
}

/// Computes the verifier v = g^x for registration.
pub(super) fn compute_verifier(
    modulus: &[u8; SRP_LEN_BYTES],
    hashed_password: &HashedPassword,
    bit_length: usize,
) -> Result<[u8; SRP_LEN_BYTES], SrpError> {
    if bit_length != SRP_BIT_LENGTH {
        return Err(SrpError::InvalidInput("unsupported SRP group size"));
    }
    let (n, _) = prepare_modulus(modulus)?;
    let params = DynResidueParams::new(&n);
    let g_res = DynResidue::new(&GENERATOR, params);
    let x = Zeroizing::new(BigUint::from_le_slice(hashed_password.as_bytes()));
    Ok(encode_le(&g_res.pow(&x).retrieve()))
}

/// H(first || second) loaded as a group-width integer; used for k and u.
pub(super) fn hash_pair(first: &[u8; SRP_LEN_BYTES], second: &[u8; SRP_LEN_BYTES]) -> BigUint {
    let mut data = [0_u8; 2 * SRP_LEN_BYTES];
    data[..SRP_LEN_BYTES].copy_from_slice(first);
    data[SRP_LEN_BYTES..].copy_from_slice(second);
    BigUint::from_le_slice(expand_hash(&data).as_slice())
}

/// H(first || second || third); used for both proofs.
pub(super) fn hash_triple(
    first: &[u8; SRP_LEN_BYTES],
    second: &[u8; SRP_LEN_BYTES],
    third: &[u8; SRP_LEN_BYTES],
) -> [u8; SRP_LEN_BYTES] {
    let mut data = Zeroizing::new([0_u8; 3 * SRP_LEN_BYTES]);
    data[..SRP_LEN_BYTES].copy_from_slice(first);
    data[SRP_LEN_BYTES..2 * SRP_LEN_BYTES].copy_from_slice(second);
    data[2 * SRP_LEN_BYTES..].copy_from_slice(third);
    *expand_hash(data.as_slice())
}
