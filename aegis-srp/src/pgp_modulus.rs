//! Verification of the signed SRP modulus.
//!
//! The server supplies the SRP modulus as an `OpenPGP` cleartext signed
//! message, and the client must check the signature against a key that is
//! pinned at compile time. Because `OpenPGP` is a heavy dependency, the
//! verification is behind the [`ModulusSignatureVerifier`] trait: use the
//! bundled rPGP implementation (feature `pgpinternal`, on by default) or
//! plug in your own.
pub use verify_trait::*;

#[cfg(all(test, feature = "pgpinternal"))]
#[path = "tests/pgp_modulus.rs"]
mod tests;

/// The pinned armored public key the modulus signature is checked against.
const MODULUS_PUBLIC_KEY: &str = include_str!("../resources/modulus_public_key.asc");

/// Final armor line of a cleartext signed message.
const SIGNATURE_END_MARKER: &str = "-----END PGP SIGNATURE-----";

/// Returns the pinned armored public key used to verify signed moduli.
#[must_use]
pub fn modulus_public_key() -> &'static str {
    MODULUS_PUBLIC_KEY
}

/// Errors thrown by SRP modulus verification.
#[derive(Debug, thiserror::Error)]
pub enum ModulusVerifyError {
    #[error("Failed to import the modulus signing key: {0}")]
    KeyImport(String),
    #[error("Failed to process the cleartext message of the modulus: {0}")]
    CleartextParse(String),
    #[error("Modulus signature verification failed: {0}")]
    SignatureVerification(String),
    /// The input continues after the signature armor; nothing may follow it.
    #[error("Unexpected data after the signed modulus")]
    DataAfterModulus,
}

/// Rejects input that carries anything but whitespace after the signature
/// armor.
///
/// # Errors
///
/// Returns [`ModulusVerifyError::DataAfterModulus`] on trailing content and
/// [`ModulusVerifyError::CleartextParse`] if no signature armor is present.
pub fn ensure_no_trailing_data(message: &str) -> Result<(), ModulusVerifyError> {
    let Some(end) = message.rfind(SIGNATURE_END_MARKER) else {
        return Err(ModulusVerifyError::CleartextParse(
            "missing signature end marker".to_owned(),
        ));
    };
    let rest = &message[end + SIGNATURE_END_MARKER.len()..];
    if !rest.trim().is_empty() {
        return Err(ModulusVerifyError::DataAfterModulus);
    }
    Ok(())
}

mod verify_trait {
    use crate::ModulusVerifyError;

    /// Verifies the signature of a server supplied SRP modulus.
    ///
    /// Implementations must check the cleartext signature against the given
    /// armored key, reject input with data trailing the signature block, and
    /// return the inner text, which is the base64 encoded modulus.
    pub trait ModulusSignatureVerifier {
        /// Verifies the signature of the modulus message and extracts the
        /// base64 encoded modulus.
        ///
        /// # Parameters
        ///
        /// * `modulus`    - A cleartext signed message carrying the modulus.
        /// * `server_key` - The armored public key to verify against.
        ///
        /// # Errors
        /// Returns a [`ModulusVerifyError`] if any verification step fails.
        fn verify_and_extract_modulus(
            &self,
            modulus: &str,
            server_key: &str,
        ) -> Result<String, ModulusVerifyError>;
    }
}

#[cfg(feature = "pgpinternal")]
pub use rpgp_impl::*;

#[cfg(feature = "pgpinternal")]
mod rpgp_impl {
    use pgp::composed::cleartext::CleartextSignedMessage;
    use pgp::composed::{Deserializable, SignedPublicKey};

    use crate::{ensure_no_trailing_data, ModulusSignatureVerifier, ModulusVerifyError};

    /// Implements [`ModulusSignatureVerifier`] with [`pgp`].
    #[derive(Default, Debug)]
    pub struct PgpModulusVerifier {}

    impl ModulusSignatureVerifier for PgpModulusVerifier {
        fn verify_and_extract_modulus(
            &self,
            modulus: &str,
            server_key: &str,
        ) -> Result<String, ModulusVerifyError> {
            ensure_no_trailing_data(modulus)?;
            let (signing_key, _) = SignedPublicKey::from_string(server_key)
                .map_err(|err| ModulusVerifyError::KeyImport(err.to_string()))?;
            let (signed_modulus, _) = CleartextSignedMessage::from_string(modulus)
                .map_err(|err| ModulusVerifyError::CleartextParse(err.to_string()))?;
            signed_modulus
                .verify(&signing_key)
                .map_err(|err| ModulusVerifyError::SignatureVerification(err.to_string()))?;
            Ok(signed_modulus.text().to_owned())
        }
    }
}
