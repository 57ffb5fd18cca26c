//! Error types for polygon assembly.

use thiserror::Error;

/// Result type for assembly operations.
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Errors that can occur while assembling loops or polygons.
///
/// Residual (unused) edges are *not* errors: they are always returned as
/// data alongside the assembled loops.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Contradictory or out-of-range configuration values.
    ///
    /// Detected before any geometry processing begins.
    #[error("invalid assembler options: {reason}")]
    InvalidOptions {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// Vertex clustering failed to reach a fixed point within the
    /// configured number of rounds.
    #[error("vertex merging did not converge within {limit} rounds")]
    MergeLimitExceeded {
        /// The configured round limit.
        limit: usize,
    },

    /// Edge splicing exceeded its split budget.
    ///
    /// Splitting can cascade (each split creates edges that may be split
    /// again); the budget turns a potential infinite loop into an error.
    #[error("edge splicing exceeded the split budget of {limit}")]
    SpliceLimitExceeded {
        /// The configured split budget.
        limit: usize,
    },

    /// An internal consistency check failed with validation enabled.
    #[error("assembly invariant violated: {details}")]
    InvariantViolation {
        /// Description of the violated invariant.
        details: String,
    },
}
