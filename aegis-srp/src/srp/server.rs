//! Server side of the SRP-6a exchange.
//!
//! A server instance holds the client's stored verifier for one login
//! attempt: it hands out the challenge `B = k*v + g^b`, checks the client
//! proof, and only then reveals its own proof and the shared session. A
//! rejected proof clears the cached session, so `is_completed` stays false.
//! Instances are single-owner and meant for a single exchange.
use base64::{prelude::BASE64_STANDARD as BASE_64, Engine as _};
use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::subtle::ConstantTimeEq;
use crypto_bigint::{NonZero, RandomMod};
use zeroize::Zeroizing;

use crate::srp::bigint::{
    decode_le, encode_le, prepare_modulus, BigUint, SECRET_FLOOR, SRP_BIT_LENGTH, SRP_LEN_BYTES,
};
use crate::srp::core::{hash_pair, hash_triple, GENERATOR};
use crate::{ModulusSignatureVerifier, SrpError};

/// Maximal number of attempts when sampling the server secret.
const MAX_SAMPLE_RETRIES: usize = 5;

/// State of one SRP exchange from the server's point of view.
#[derive(Debug)]
pub struct SrpServer {
    modulus: NonZero<BigUint>,
    modulus_minus_one: NonZero<BigUint>,
    verifier: BigUint,
    /// The multiplier k = H(g || N), computed once at construction.
    multiplier: BigUint,
    server_secret: Zeroizing<BigUint>,
    server_ephemeral: Option<BigUint>,
    shared_session: Option<Zeroizing<BigUint>>,
}

impl SrpServer {
    /// Creates a server for one exchange, sampling a fresh server secret.
    ///
    /// # Parameters
    ///
    /// * `modulus`    - The raw SRP modulus, little-endian.
    /// * `verifier`   - The client's stored verifier, little-endian.
    /// * `bit_length` - The group size; must match the compiled-in group.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an input has the wrong size, the modulus or the
    /// multiplier is invalid, or no secret could be sampled.
    pub fn new(modulus: &[u8], verifier: &[u8], bit_length: usize) -> Result<Self, SrpError> {
        let (n, n_minus_one, verifier) = Self::decode_group(modulus, verifier, bit_length)?;

        let mut rng = rand::thread_rng();
        let mut secret = None;
        for _ in 0..MAX_SAMPLE_RETRIES {
            let candidate = BigUint::random_mod(&mut rng, &n_minus_one);
            if candidate > SECRET_FLOOR {
                secret = Some(Zeroizing::new(candidate));
                break;
            }
        }
        let Some(server_secret) = secret else {
            return Err(SrpError::Internal("failed to sample a server secret"));
        };

        Self::assemble(n, n_minus_one, verifier, server_secret)
    }

    /// Creates a server with a caller-provided secret.
    ///
    /// The secret is not sampled but still has to clear the same lower
    /// bound as a sampled one.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an input has the wrong size or a parameter is out of
    /// bounds.
    pub fn with_secret(
        modulus: &[u8],
        verifier: &[u8],
        secret: &[u8],
        bit_length: usize,
    ) -> Result<Self, SrpError> {
        let (n, n_minus_one, verifier) = Self::decode_group(modulus, verifier, bit_length)?;
        let server_secret = Zeroizing::new(decode_le(secret)?);
        if *server_secret <= SECRET_FLOOR {
            return Err(SrpError::ParameterOutOfBounds("server secret"));
        }
        Self::assemble(n, n_minus_one, verifier, server_secret)
    }

    /// Creates a server from a cleartext signed modulus message.
    ///
    /// # Errors
    ///
    /// Returns `Err` if modulus extraction or verification fails, or
    /// [`Self::new`] does.
    pub fn from_signed(
        modulus_verifier: &impl ModulusSignatureVerifier,
        signed_modulus: &str,
        verifier: &[u8],
        bit_length: usize,
    ) -> Result<Self, SrpError> {
        let modulus_b64 = modulus_verifier
            .verify_and_extract_modulus(signed_modulus, crate::modulus_public_key())?;
        let modulus = BASE_64.decode(modulus_b64.trim())?;
        Self::new(&modulus, verifier, bit_length)
    }

    /// Creates a server from a cleartext signed modulus message, verifying it
    /// with rPGP.
    ///
    /// # Errors
    ///
    /// See [`Self::from_signed`].
    #[cfg(feature = "pgpinternal")]
    pub fn from_signed_with_pgp(
        signed_modulus: &str,
        verifier: &[u8],
        bit_length: usize,
    ) -> Result<Self, SrpError> {
        Self::from_signed(
            &crate::PgpModulusVerifier::default(),
            signed_modulus,
            verifier,
            bit_length,
        )
    }

    /// Generates the challenge `B = k*v + g^b` and caches it.
    ///
    /// Calling this again replaces the previous challenge; a server value is
    /// meant for a single exchange.
    pub fn generate_challenge(&mut self) -> [u8; SRP_LEN_BYTES] {
        let params = DynResidueParams::new(&self.modulus);
        let g_res = DynResidue::new(&GENERATOR, params);
        let k_res = DynResidue::new(&self.multiplier, params);
        let v_res = DynResidue::new(&self.verifier, params);

        let b_pub = k_res
            .mul(&v_res)
            .add(&g_res.pow(&self.server_secret))
            .retrieve();
        self.server_ephemeral = Some(b_pub);
        encode_le(&b_pub)
    }

    /// Verifies the client proof and, if it matches, caches the shared
    /// session and returns the server proof.
    ///
    /// # Parameters
    ///
    /// * `client_ephemeral` - The client ephemeral A, little-endian.
    /// * `client_proof`     - The client proof M1.
    ///
    /// # Errors
    ///
    /// Returns [`SrpError::ProtocolState`] before [`Self::generate_challenge`],
    /// [`SrpError::ParameterOutOfBounds`] for an invalid A or a zero
    /// scrambling parameter, and [`SrpError::ProofMismatch`] when the proof
    /// does not match. On mismatch the cached shared session is cleared.
    pub fn verify_proofs(
        &mut self,
        client_ephemeral: &[u8],
        client_proof: &[u8],
    ) -> Result<[u8; SRP_LEN_BYTES], SrpError> {
        let Some(server_ephemeral) = self.server_ephemeral else {
            return Err(SrpError::ProtocolState("challenge has not been generated"));
        };

        let client_ephemeral: &[u8; SRP_LEN_BYTES] = client_ephemeral
            .try_into()
            .map_err(|_err| SrpError::InvalidInput("client ephemeral must be 256 bytes"))?;
        let client_proof: &[u8; SRP_LEN_BYTES] = client_proof
            .try_into()
            .map_err(|_err| SrpError::InvalidInput("client proof must be 256 bytes"))?;

        let a_pub = BigUint::from_le_slice(client_ephemeral);
        if a_pub <= BigUint::ONE || a_pub >= *self.modulus_minus_one {
            return Err(SrpError::ParameterOutOfBounds("client ephemeral"));
        }

        let server_ephemeral_bytes = encode_le(&server_ephemeral);
        let u = hash_pair(client_ephemeral, &server_ephemeral_bytes);
        if u == BigUint::ZERO {
            return Err(SrpError::ParameterOutOfBounds("scrambling parameter"));
        }

        // S = (A * v^u)^b
        let params = DynResidueParams::new(&self.modulus);
        let a_res = DynResidue::new(&a_pub, params);
        let v_res = DynResidue::new(&self.verifier, params);
        let shared_session = Zeroizing::new(
            a_res
                .mul(&v_res.pow(&u))
                .pow(&self.server_secret)
                .retrieve(),
        );
        let session_bytes = Zeroizing::new(encode_le(&shared_session));

        let expected_proof = hash_triple(client_ephemeral, &server_ephemeral_bytes, &session_bytes);
        if !bool::from(expected_proof.ct_eq(client_proof)) {
            self.shared_session = None;
            return Err(SrpError::ProofMismatch);
        }

        let server_proof = hash_triple(client_ephemeral, client_proof, &session_bytes);
        self.shared_session = Some(shared_session);
        Ok(server_proof)
    }

    /// Returns true once a client proof has been accepted.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.shared_session.is_some()
    }

    /// Returns the shared session secret of a completed exchange.
    ///
    /// # Errors
    ///
    /// Returns [`SrpError::ProtocolState`] while the exchange is incomplete.
    pub fn shared_session(&self) -> Result<Zeroizing<[u8; SRP_LEN_BYTES]>, SrpError> {
        let Some(shared_session) = &self.shared_session else {
            return Err(SrpError::ProtocolState("exchange is not completed"));
        };
        Ok(Zeroizing::new(encode_le(shared_session)))
    }

    fn decode_group(
        modulus: &[u8],
        verifier: &[u8],
        bit_length: usize,
    ) -> Result<(NonZero<BigUint>, NonZero<BigUint>, BigUint), SrpError> {
        if bit_length != SRP_BIT_LENGTH {
            return Err(SrpError::InvalidInput("unsupported SRP group size"));
        }
        let modulus: &[u8; SRP_LEN_BYTES] = modulus
            .try_into()
            .map_err(|_err| SrpError::InvalidInput("modulus must be 256 bytes"))?;
        let verifier = decode_le(verifier)?;
        let (n, n_minus_one) = prepare_modulus(modulus)?;
        Ok((n, n_minus_one, verifier))
    }

    fn assemble(
        modulus: NonZero<BigUint>,
        modulus_minus_one: NonZero<BigUint>,
        verifier: BigUint,
        server_secret: Zeroizing<BigUint>,
    ) -> Result<Self, SrpError> {
        let modulus_bytes = encode_le(&modulus);
        let multiplier = hash_pair(&encode_le(&GENERATOR), &modulus_bytes).rem(&modulus);
        if multiplier <= BigUint::ONE || multiplier >= *modulus_minus_one {
            return Err(SrpError::ParameterOutOfBounds("multiplier"));
        }

        Ok(Self {
            modulus,
            modulus_minus_one,
            verifier,
            multiplier,
            server_secret,
            server_ephemeral: None,
            shared_session: None,
        })
    }
}
