//! Password hashing for the SRP handshake.
//!
//! The SRP exponent is derived from the password with bcrypt and then widened
//! to the group size with a four-way SHA-512 expansion. Five hash versions
//! exist; versions 0 to 2 are legacy derivations that salt bcrypt with the
//! username, versions 3 and 4 use an explicit random salt framed with a fixed
//! ASCII suffix. All versions must stay byte-exact: the server stores
//! verifiers derived from them.
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, prelude::BASE64_STANDARD as BASE_64, Engine as _};
use md5::{Digest as _, Md5};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{srp::SRP_LEN_BYTES, MailboxHashError, SrpError, SrpVersion};

/// bcrypt's dot-slash base64 alphabet, unpadded, as crypt strings frame
/// their salts. Decoding tolerates the dangling bits of a 22 character salt.
const B64_DOT_SLASH: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The byte length of the expanded hash, equal to the group width.
pub const EXPAND_HASH_LEN: usize = 256;

/// The byte length of one SHA-512 part of the expanded hash.
const EXPAND_HASH_PART_LEN: usize = 64;

/// ASCII suffix framed into the bcrypt salt for hash versions 3 and 4.
const SALT_SUFFIX: &[u8] = b"proton";

/// The raw salt length consumed by bcrypt.
pub const BCRYPT_SALT_LEN: usize = 16;

/// The fixed bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// A bcrypt hash in crypt(3) format, `$2y$10$[22 char salt][31 char hash]`.
///
/// Automatically zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MailboxHashedPassword(Vec<u8>);

#[allow(clippy::must_use_candidate)]
impl MailboxHashedPassword {
    /// Returns the full crypt-format string as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for MailboxHashedPassword {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// An expanded password hash, interpreted as the SRP exponent x.
///
/// Automatically zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct HashedPassword(Box<[u8; EXPAND_HASH_LEN]>);

#[allow(clippy::must_use_candidate)]
impl HashedPassword {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for HashedPassword {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Returns `Sha512(data || 0) || Sha512(data || 1) || Sha512(data || 2) || Sha512(data || 3)`.
///
/// The result is heap allocated so callers can hand it over without copies
/// when the output is sensitive and must be zeroed.
pub(crate) fn expand_hash(data: &[u8]) -> Box<[u8; EXPAND_HASH_LEN]> {
    let mut hash = Box::new([0_u8; EXPAND_HASH_LEN]);
    for (part_id, chunk) in hash.chunks_mut(EXPAND_HASH_PART_LEN).enumerate() {
        let mut hasher = Sha512::new_with_prefix(data);
        hasher.update([u8::try_from(part_id).unwrap_or_default()]);
        chunk.copy_from_slice(&hasher.finalize());
    }
    hash
}

/// Hashes a password with bcrypt given the salt in bcrypt's dot-slash base64
/// alphabet, as it appears inside a crypt string.
///
/// Only the first 22 characters of the encoded salt carry salt material;
/// longer inputs (such as the 32 hex characters of the legacy versions) are
/// truncated exactly like crypt(3) would.
///
/// # Errors
///
/// Returns `Err` if the salt does not decode to at least 16 bytes or bcrypt
/// fails.
pub fn bcrypt_hash(password: &str, encoded_salt: &str) -> Result<MailboxHashedPassword, SrpError> {
    let decoded = B64_DOT_SLASH.decode(encoded_salt)?;
    let salt: [u8; BCRYPT_SALT_LEN] = decoded
        .get(..BCRYPT_SALT_LEN)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(SrpError::InvalidInput(
            "bcrypt salt must encode at least 16 bytes",
        ))?;
    bcrypt_hash_raw(password, salt).map_err(SrpError::Bcrypt)
}

/// Produces a mailbox password hash for protecting the account key passphrase.
///
/// # Parameters
///
/// * `password` - The user password.
/// * `salt`     - The 16 byte salt for hashing the password.
///
/// # Errors
///
/// Returns `Err` if the salt has the wrong size or bcrypt fails.
pub fn mailbox_password_hash(
    password: &str,
    salt: &[u8],
) -> Result<MailboxHashedPassword, MailboxHashError> {
    let salt: [u8; BCRYPT_SALT_LEN] = salt
        .try_into()
        .map_err(|_err| MailboxHashError::InvalidSalt)?;
    bcrypt_hash_raw(password, salt).map_err(MailboxHashError::Bcrypt)
}

/// Hashes the password for the SRP exchange with the given hash version.
///
/// # Parameters
///
/// * `version`  - The announced hash version.
/// * `username` - The username, required for versions 0, 1, and 2.
/// * `password` - The user password.
/// * `salt`     - The raw salt, 10 to 16 bytes, used by versions 3 and 4.
/// * `modulus`  - The raw SRP modulus.
///
/// # Errors
///
/// Returns `Err` if an input has the wrong size, a required username is
/// missing, or bcrypt fails.
pub fn hash_password(
    version: SrpVersion,
    username: Option<&str>,
    password: &str,
    salt: &[u8],
    modulus: &[u8],
) -> Result<HashedPassword, SrpError> {
    let username = version.unpack_username(username)?;
    let modulus: &[u8; SRP_LEN_BYTES] = modulus
        .try_into()
        .map_err(|_err| SrpError::InvalidInput("modulus must be 256 bytes"))?;
    match version {
        SrpVersion::V0 => hash_version_zero(password, username, modulus),
        SrpVersion::V1 => hash_version_one(password, username, modulus),
        SrpVersion::V2 => hash_version_one(password, &clean_username(username), modulus),
        SrpVersion::V3 | SrpVersion::V4 => hash_version_three(password, salt, modulus),
    }
}

fn bcrypt_hash_raw(
    password: &str,
    salt: [u8; BCRYPT_SALT_LEN],
) -> Result<MailboxHashedPassword, bcrypt::BcryptError> {
    let hashed = bcrypt::hash_with_salt(password, BCRYPT_COST, salt)?
        .format_for_version(bcrypt::Version::TwoY)
        .into_bytes();
    Ok(MailboxHashedPassword(hashed))
}

/// Computes `H(bcrypt(password, salt || "proton") || N)`.
///
/// bcrypt consumes exactly 128 salt bits, so the suffix fills whatever room a
/// 10 to 16 byte salt leaves in the frame.
fn hash_version_three(
    password: &str,
    salt: &[u8],
    modulus: &[u8; SRP_LEN_BYTES],
) -> Result<HashedPassword, SrpError> {
    if salt.len() < crate::srp::SALT_LEN_BYTES || salt.len() > BCRYPT_SALT_LEN {
        return Err(SrpError::InvalidInput("salt must be 10 to 16 bytes"));
    }
    let mut framed = [0_u8; BCRYPT_SALT_LEN];
    framed[..salt.len()].copy_from_slice(salt);
    framed[salt.len()..].copy_from_slice(&SALT_SUFFIX[..BCRYPT_SALT_LEN - salt.len()]);

    let crypt = bcrypt_hash_raw(password, framed)?;
    Ok(expand_with_modulus(&crypt, modulus))
}

/// Computes `H(bcrypt(password, hex(md5(lowercase(username)))) || N)`.
fn hash_version_one(
    password: &str,
    username: &str,
    modulus: &[u8; SRP_LEN_BYTES],
) -> Result<HashedPassword, SrpError> {
    let prehashed = Md5::digest(username.to_lowercase().as_bytes());

    // The hex string itself acts as the encoded bcrypt salt; its first 22
    // characters carry the 16 salt bytes. Legacy mistake, keep byte-exact.
    let decoded = B64_DOT_SLASH.decode(hex::encode(prehashed))?;
    let salt: [u8; BCRYPT_SALT_LEN] = decoded
        .get(..BCRYPT_SALT_LEN)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(SrpError::Internal("legacy salt decoding failed"))?;

    let crypt = bcrypt_hash_raw(password, salt).map_err(SrpError::Bcrypt)?;
    Ok(expand_with_modulus(&crypt, modulus))
}

/// Version 0 prehashes the password with SHA-512 and feeds the standard
/// base64 encoding of the digest into the version 1 derivation.
fn hash_version_zero(
    password: &str,
    username: &str,
    modulus: &[u8; SRP_LEN_BYTES],
) -> Result<HashedPassword, SrpError> {
    let mut prehashed = Zeroizing::new([0_u8; EXPAND_HASH_PART_LEN]);
    prehashed.copy_from_slice(&Sha512::digest(password.as_bytes()));
    let b64_hash = Zeroizing::new(BASE_64.encode(prehashed.as_slice()));
    hash_version_one(&b64_hash, username, modulus)
}

fn expand_with_modulus(
    crypt: &MailboxHashedPassword,
    modulus: &[u8; SRP_LEN_BYTES],
) -> HashedPassword {
    let mut input = Zeroizing::new(Vec::with_capacity(crypt.len() + modulus.len()));
    input.extend_from_slice(crypt.as_bytes());
    input.extend_from_slice(modulus);
    HashedPassword(expand_hash(input.as_slice()))
}

/// Strips `-`, `.` and `_` and lowercases, as version 2 requires.
fn clean_username(username: &str) -> String {
    username
        .chars()
        .filter(|c| *c != '-' && *c != '.' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
