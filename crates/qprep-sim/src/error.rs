//! Simulator errors.

use thiserror::Error;

/// Errors raised while simulating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Circuit is wider than the statevector.
    #[error("Circuit has {circuit} qubits but the statevector has {state}")]
    QubitCountMismatch { circuit: u32, state: u32 },

    /// Statevector size would overflow memory limits.
    #[error("Too many qubits to simulate: {0}")]
    TooManyQubits(u32),

    /// Gate with malformed operands or parameters.
    #[error("Invalid gate: {0}")]
    InvalidGate(#[from] qprep_ir::IrError),

    /// A rotation gate without an angle.
    #[error("Gate '{0}' is missing its angle")]
    MissingAngle(String),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
