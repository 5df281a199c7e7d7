use base64::{prelude::BASE64_STANDARD as BASE_64, Engine as _};
use crypto_bigint::subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::{
    hash_password, rng, HashedPassword, ModulusSignatureVerifier, SrpError, SrpVersion,
    DEFAULT_SRP_VERSION,
};

#[cfg(test)]
#[path = "../tests/srp.rs"]
mod tests;

pub(crate) mod bigint;
mod core;
mod server;

pub use self::bigint::{SRP_BIT_LENGTH, SRP_LEN_BYTES};
pub use self::core::SALT_LEN_BYTES;
pub use self::server::SrpServer;

/// The client material produced for one login attempt.
///
/// The shared session stays available for layers that bind further secrets
/// to the login; it never travels on the wire.
#[derive(Clone)]
pub struct SrpProofs {
    /// The client ephemeral A in bytes.
    pub client_ephemeral: [u8; SRP_LEN_BYTES],

    /// The client proof M1 in bytes.
    pub client_proof: [u8; SRP_LEN_BYTES],

    /// The server proof M2 the client expects back.
    pub expected_server_proof: [u8; SRP_LEN_BYTES],

    /// The shared session secret S; zeroed on drop.
    pub shared_session: Zeroizing<[u8; SRP_LEN_BYTES]>,
}

impl SrpProofs {
    /// Compares the received server proof against the expected one in
    /// constant time.
    #[must_use]
    pub fn compare_server_proof(&self, server_proof: &[u8]) -> bool {
        self.expected_server_proof.ct_eq(server_proof).into()
    }
}

/// [`SrpProofs`] with the wire-facing values in base64, as the API carries
/// them. The shared session is deliberately not part of the transport shape.
#[derive(Debug, Clone)]
pub struct SrpProofsB64 {
    /// The client ephemeral as a base64 string.
    pub client_ephemeral: String,

    /// The client proof as a base64 string.
    pub client_proof: String,

    /// The expected server proof as a base64 string.
    pub expected_server_proof: String,
}

impl From<&SrpProofs> for SrpProofsB64 {
    fn from(value: &SrpProofs) -> Self {
        SrpProofsB64 {
            client_ephemeral: BASE_64.encode(value.client_ephemeral),
            client_proof: BASE_64.encode(value.client_proof),
            expected_server_proof: BASE_64.encode(value.expected_server_proof),
        }
    }
}

impl From<SrpProofs> for SrpProofsB64 {
    fn from(value: SrpProofs) -> Self {
        Self::from(&value)
    }
}

impl SrpProofsB64 {
    /// Compares the received server proof against the expected one.
    ///
    /// Decoding is not constant time; the compare of the decoded bytes is.
    #[must_use]
    pub fn compare_server_proof(&self, server_proof: &str) -> bool {
        let Ok(expected_server_proof) = BASE_64.decode(&self.expected_server_proof) else {
            return false;
        };
        let Ok(server_proof) = BASE_64.decode(server_proof) else {
            return false;
        };
        expected_server_proof.ct_eq(&server_proof).into()
    }
}

/// A registration record: the salt and verifier the server stores for a new
/// password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrpVerifier {
    /// The hash version the verifier was derived with.
    pub version: u8,

    /// The randomly generated salt.
    pub salt: [u8; SALT_LEN_BYTES],

    /// The verifier g^x.
    pub verifier: [u8; SRP_LEN_BYTES],
}

/// [`SrpVerifier`] with the byte values in base64, as the API carries them.
#[derive(Debug, Clone)]
pub struct SrpVerifierB64 {
    /// The hash version the verifier was derived with.
    pub version: u8,

    /// The salt as a base64 string.
    pub salt: String,

    /// The verifier as a base64 string.
    pub verifier: String,
}

impl From<&SrpVerifier> for SrpVerifierB64 {
    fn from(value: &SrpVerifier) -> Self {
        Self {
            version: value.version,
            salt: BASE_64.encode(value.salt),
            verifier: BASE_64.encode(value.verifier),
        }
    }
}

impl From<SrpVerifier> for SrpVerifierB64 {
    fn from(value: SrpVerifier) -> Self {
        Self::from(&value)
    }
}

/// Client authentication state for one login attempt.
///
/// Holds the verified modulus, the server challenge, and the hashed
/// password; consumed by [`Self::generate_proofs`].
pub struct SrpAuth {
    modulus: [u8; SRP_LEN_BYTES],
    server_ephemeral: Option<[u8; SRP_LEN_BYTES]>,
    hashed_password: HashedPassword,
    // Lets vector tests pin the client ephemeral secret.
    #[cfg(test)]
    pub(crate) override_client_secret: Option<[u8; SRP_LEN_BYTES]>,
}

impl SrpAuth {
    /// Creates the client state for a login.
    ///
    /// Version, salt, signed modulus, and server ephemeral come from the
    /// login-info response; the password from the user.
    ///
    /// # Parameters
    ///
    /// * `modulus_verifier` - Verifies the signature on `signed_modulus`.
    /// * `version`          - The announced password hash version.
    /// * `username`         - The username; required for versions 0 to 2.
    /// * `password`         - The user password.
    /// * `salt`             - The base64 salt; only decoded for version >= 3.
    /// * `signed_modulus`   - The cleartext signed modulus message.
    /// * `server_ephemeral` - The base64 server ephemeral B.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the version is unknown, an input fails to decode or
    /// verify, or password hashing fails.
    pub fn new(
        modulus_verifier: &impl ModulusSignatureVerifier,
        version: u8,
        username: Option<&str>,
        password: &str,
        salt: &str,
        signed_modulus: &str,
        server_ephemeral: &str,
    ) -> Result<Self, SrpError> {
        let version = SrpVersion::try_from(version)?;
        let modulus = decode_signed_modulus(modulus_verifier, signed_modulus)?;

        let decoded_salt = if version.uses_salt() {
            BASE_64.decode(salt)?
        } else {
            Vec::new()
        };

        let decoded_server_ephemeral = BASE_64.decode(server_ephemeral)?;
        let server_ephemeral: [u8; SRP_LEN_BYTES] = decoded_server_ephemeral
            .as_slice()
            .try_into()
            .map_err(|_err| SrpError::InvalidInput("server ephemeral must be 256 bytes"))?;

        let hashed_password = hash_password(version, username, password, &decoded_salt, &modulus)?;

        Ok(SrpAuth {
            modulus,
            server_ephemeral: Some(server_ephemeral),
            hashed_password,
            #[cfg(test)]
            override_client_secret: None,
        })
    }

    /// Creates the client state for a login, verifying the modulus with rPGP.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    #[cfg(feature = "pgpinternal")]
    pub fn with_pgp(
        version: u8,
        username: Option<&str>,
        password: &str,
        salt: &str,
        signed_modulus: &str,
        server_ephemeral: &str,
    ) -> Result<Self, SrpError> {
        Self::new(
            &crate::PgpModulusVerifier::default(),
            version,
            username,
            password,
            salt,
            signed_modulus,
            server_ephemeral,
        )
    }

    /// Creates client state for enrolling a verifier: no server ephemeral,
    /// always the current hash version.
    ///
    /// # Parameters
    ///
    /// * `modulus_verifier` - Verifies the signature on `signed_modulus`.
    /// * `password`         - The user password.
    /// * `signed_modulus`   - The cleartext signed modulus message.
    /// * `raw_salt`         - The raw registration salt, 10 to 16 bytes.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an input fails to decode or verify, or password
    /// hashing fails.
    pub fn for_verifier(
        modulus_verifier: &impl ModulusSignatureVerifier,
        password: &str,
        signed_modulus: &str,
        raw_salt: &[u8],
    ) -> Result<Self, SrpError> {
        let modulus = decode_signed_modulus(modulus_verifier, signed_modulus)?;
        let hashed_password =
            hash_password(DEFAULT_SRP_VERSION, None, password, raw_salt, &modulus)?;

        Ok(SrpAuth {
            modulus,
            server_ephemeral: None,
            hashed_password,
            #[cfg(test)]
            override_client_secret: None,
        })
    }

    /// Creates client state for enrolling a verifier, verifying the modulus
    /// with rPGP.
    ///
    /// # Errors
    ///
    /// See [`Self::for_verifier`].
    #[cfg(feature = "pgpinternal")]
    pub fn for_verifier_with_pgp(
        password: &str,
        signed_modulus: &str,
        raw_salt: &[u8],
    ) -> Result<Self, SrpError> {
        Self::for_verifier(
            &crate::PgpModulusVerifier::default(),
            password,
            signed_modulus,
            raw_salt,
        )
    }

    /// Generates the client proofs.
    ///
    /// Validates the group (size, safe primality, parameter bounds) before
    /// deriving any secret material.
    ///
    /// # Errors
    ///
    /// Returns `Err` if this state has no server ephemeral, the group is
    /// rejected, or a parameter is out of bounds.
    pub fn generate_proofs(&self, bit_length: usize) -> Result<SrpProofs, SrpError> {
        let Some(server_ephemeral) = &self.server_ephemeral else {
            return Err(SrpError::ProtocolState("no server ephemeral was provided"));
        };

        #[cfg(test)]
        if let Some(client_secret) = &self.override_client_secret {
            return self::core::generate_client_proofs_with_secret(
                &self.modulus,
                server_ephemeral,
                &self.hashed_password,
                bit_length,
                client_secret,
            );
        }

        self::core::generate_client_proofs(
            &self.modulus,
            server_ephemeral,
            &self.hashed_password,
            bit_length,
        )
    }

    /// Computes the verifier g^x for registration.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the group size is unsupported or the modulus is
    /// structurally invalid.
    pub fn generate_verifier(&self, bit_length: usize) -> Result<[u8; SRP_LEN_BYTES], SrpError> {
        self::core::compute_verifier(&self.modulus, &self.hashed_password, bit_length)
    }

    /// Produces a full registration record, generating a fresh salt when
    /// none is supplied.
    ///
    /// # Parameters
    ///
    /// * `modulus_verifier` - Verifies the signature on `signed_modulus`.
    /// * `password`         - The user password.
    /// * `salt`             - Some base64 salt to reuse, or None for a fresh one.
    /// * `signed_modulus`   - The cleartext signed modulus message.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an input fails to decode or verify, or the verifier
    /// computation fails.
    pub fn generate_verifier_record(
        modulus_verifier: &impl ModulusSignatureVerifier,
        password: &str,
        salt: Option<&str>,
        signed_modulus: &str,
    ) -> Result<SrpVerifier, SrpError> {
        let decoded_salt = match salt {
            Some(salt) => BASE_64.decode(salt)?,
            None => rng::random_salt()?.to_vec(),
        };
        let salt: [u8; SALT_LEN_BYTES] = decoded_salt
            .as_slice()
            .try_into()
            .map_err(|_err| SrpError::InvalidInput("registration salt must be 10 bytes"))?;

        let auth = Self::for_verifier(modulus_verifier, password, signed_modulus, &salt)?;
        let verifier = auth.generate_verifier(SRP_BIT_LENGTH)?;

        Ok(SrpVerifier {
            version: DEFAULT_SRP_VERSION.into(),
            salt,
            verifier,
        })
    }
}

fn decode_signed_modulus(
    modulus_verifier: &impl ModulusSignatureVerifier,
    signed_modulus: &str,
) -> Result<[u8; SRP_LEN_BYTES], SrpError> {
    let modulus_b64 =
        modulus_verifier.verify_and_extract_modulus(signed_modulus, crate::modulus_public_key())?;
    let decoded = BASE_64.decode(modulus_b64.trim())?;
    decoded
        .as_slice()
        .try_into()
        .map_err(|_err| SrpError::InvalidInput("modulus must be 256 bytes"))
}
