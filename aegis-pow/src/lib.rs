//! Solvers for the proof-of-work challenges that gate abuse-prone endpoints.
//!
//! The server issues a challenge whose expected solving cost it controls
//! through the target probability; the client must burn CPU to find the
//! preimage before it may proceed. Two puzzle families exist: an
//! elliptic-curve discrete-log search over X25519 and an Argon2id preimage
//! search, both bracketed by HMAC-SHA256 so the search order is forced.
//!
//! Solvers run against an absolute wall-clock deadline in Unix milliseconds;
//! a negative deadline removes the limit.
mod errors;
pub mod solver;

use std::time::Duration;

pub use errors::PowError;

/// Default solving budget applied by [`PowChallenge::solve`].
pub const DEFAULT_SOLVE_BUDGET: Duration = Duration::from_secs(10);

/// A proof-of-work challenge of a certain type, base64 encoded as received
/// from the server.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum PowChallenge {
    Ecdlp(String),
    Argon2Preimage(String),
}

impl PowChallenge {
    /// Solves the challenge within the default budget and returns the base64
    /// encoded solution.
    ///
    /// # Errors
    ///
    /// Returns a [`PowError`] if the deadline expires or the challenge is
    /// malformed.
    pub fn solve(&self) -> Result<String, PowError> {
        self.solve_within(DEFAULT_SOLVE_BUDGET)
    }

    /// Solves the challenge within the given budget, measured from now.
    ///
    /// # Errors
    ///
    /// Returns a [`PowError`] if the deadline expires or the challenge is
    /// malformed.
    pub fn solve_within(&self, budget: Duration) -> Result<String, PowError> {
        let budget_millis = i64::try_from(budget.as_millis()).unwrap_or(i64::MAX);
        self.solve_before(solver::unix_millis_now().saturating_add(budget_millis))
    }

    /// Solves the challenge before an absolute deadline in Unix milliseconds.
    /// A negative deadline removes the time limit.
    ///
    /// # Errors
    ///
    /// Returns a [`PowError`] if the deadline expires or the challenge is
    /// malformed.
    pub fn solve_before(&self, deadline_unix_millis: i64) -> Result<String, PowError> {
        match self {
            PowChallenge::Ecdlp(challenge) => {
                solver::solve_ecdlp_challenge(challenge, deadline_unix_millis)
            }
            PowChallenge::Argon2Preimage(challenge) => {
                solver::solve_argon2_preimage_challenge(challenge, deadline_unix_millis)
            }
        }
    }
}
