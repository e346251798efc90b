//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qprep_ir::IrError),

    /// Amplitude vector length is not a power of two (or is below two).
    #[error("Invalid amplitude vector length {len}: expected a power of two of at least 2")]
    InvalidLength {
        /// The rejected length.
        len: usize,
    },

    /// Probabilities do not sum to one within tolerance.
    #[error("Invalid norm: probabilities sum to {norm}, expected 1 within {tolerance}")]
    InvalidNorm {
        /// The computed sum of squared magnitudes.
        norm: f64,
        /// The tolerance that was exceeded.
        tolerance: f64,
    },

    /// A rotation angle came out non-finite.
    #[error("Decomposition failed on qubit {qubit}: {reason}")]
    Decomposition {
        /// Target qubit of the offending rotation.
        qubit: u32,
        /// What went wrong.
        reason: String,
    },

    /// Pass execution failed.
    #[error("Pass '{name}' failed: {reason}")]
    PassFailed { name: String, reason: String },

    /// Invalid pass or stage configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
