//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index is outside the circuit's quantum register.
    #[error("Qubit {qubit} out of range for {num_qubits}-qubit circuit{}", format_gate_context(.gate_name))]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Size of the quantum register.
        num_qubits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit index is outside the circuit's classical register.
    #[error("Classical bit {clbit} out of range for {num_clbits}-bit register")]
    ClbitOutOfRange {
        /// The offending classical bit.
        clbit: ClbitId,
        /// Size of the classical register.
        num_clbits: u32,
    },

    /// The same qubit appears twice in one gate.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// A rotation gate was built without an angle.
    #[error("Gate '{0}' requires an angle")]
    MissingAngle(String),

    /// A non-parametric gate was given an angle.
    #[error("Gate '{0}' does not take an angle")]
    UnexpectedAngle(String),

    /// Gate has the wrong number of target qubits.
    #[error("Gate '{gate_name}' requires {expected} target qubits, got {got}")]
    TargetCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of targets.
        expected: usize,
        /// Actual number of targets.
        got: usize,
    },
}

#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
