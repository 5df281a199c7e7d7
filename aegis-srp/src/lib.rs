//! Client and server halves of the Aegis SRP-6a login handshake.
//!
//! The server publishes a signed 2048-bit safe-prime modulus and a per-user
//! salt; the client derives a password hash from them, and both sides run the
//! SRP-6a exchange to prove knowledge of the password without ever sending
//! it. All group elements travel little-endian at the fixed group width.
//!
//! ## Feature flags
//! - `pgpinternal`: enabled by default, verifies the signed modulus
//!   internally with rPGP. Without it, callers provide their own
//!   [`ModulusSignatureVerifier`].
mod errors;
mod hash;
mod pgp_modulus;
mod rng;
mod srp;

pub use errors::*;
pub use hash::bcrypt_hash;
pub use hash::hash_password;
pub use hash::mailbox_password_hash;
pub use hash::HashedPassword;
pub use hash::MailboxHashedPassword;
pub use hash::EXPAND_HASH_LEN;
pub use pgp_modulus::*;
pub use rng::{random_bits, random_bytes};
pub use srp::*;

/// The version of the password hash used to derive the SRP exponent.
///
/// The server announces the version to use; all legacy versions must remain
/// computable because stored verifiers were created with them.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SrpVersion {
    V0 = 0,
    V1 = 1,
    V2 = 2,
    V3 = 3,
    #[default]
    V4 = 4,
}

impl TryFrom<u8> for SrpVersion {
    type Error = SrpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SrpVersion::V0),
            1 => Ok(SrpVersion::V1),
            2 => Ok(SrpVersion::V2),
            3 => Ok(SrpVersion::V3),
            4 => Ok(SrpVersion::V4),
            _ => Err(SrpError::UnsupportedVersion),
        }
    }
}

impl From<SrpVersion> for u8 {
    fn from(version: SrpVersion) -> Self {
        version as u8
    }
}

impl SrpVersion {
    /// Versions 0 to 2 salt the password hash with the username.
    pub(crate) fn unpack_username(self, username: Option<&str>) -> Result<&str, SrpError> {
        match self {
            SrpVersion::V0 | SrpVersion::V1 | SrpVersion::V2 => {
                username.ok_or(SrpError::MissingUsername(self.into()))
            }
            _ => Ok(""),
        }
    }

    /// Versions 3 and 4 carry an explicit salt; earlier versions derive it.
    pub(crate) fn uses_salt(self) -> bool {
        matches!(self, SrpVersion::V3 | SrpVersion::V4)
    }
}

/// The password hash version used for newly created verifiers.
pub const DEFAULT_SRP_VERSION: SrpVersion = SrpVersion::V4;
