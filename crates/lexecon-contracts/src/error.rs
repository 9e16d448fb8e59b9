//! Error types for the Lexecon governance core.
//!
//! All fallible operations in the core return `LexeconResult<T>`. Integrity
//! failures found by ledger verification are NOT errors; they are reported
//! through `VerificationReport`.

use thiserror::Error;

/// The unified error type for the Lexecon core.
#[derive(Debug, Error)]
pub enum LexeconError {
    /// The decision request is malformed (missing actor or action, or a
    /// context value with no canonical encoding).
    ///
    /// Recoverable by the caller; no state was mutated.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// A policy graph failed its structural checks at load time.
    ///
    /// The previously active graph, if any, stays in effect.
    #[error("invalid policy graph: {reason}")]
    InvalidPolicyGraph { reason: String },

    /// A ledger read was given bounds with `start > end`.
    #[error("invalid range: start {start} is greater than end {end}")]
    InvalidRange { start: u64, end: u64 },

    /// The ledger could not record an evaluated decision.
    ///
    /// Fatal for the request. Never retried, since a retry could record the
    /// same decision twice.
    #[error("ledger append failed: {reason}")]
    LedgerAppendFailed { reason: String },

    /// A policy document could not be read or parsed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl LexeconError {
    /// True for errors caused by caller input (`InvalidRequest`,
    /// `InvalidRange`). Everything else is a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LexeconError::InvalidRequest { .. } | LexeconError::InvalidRange { .. }
        )
    }
}

/// Convenience alias used throughout the Lexecon crates.
pub type LexeconResult<T> = Result<T, LexeconError>;
