//! Reference statevector simulator for qprep circuits.
//!
//! Applies the gates of a [`qprep_ir::Circuit`] to `|0…0⟩` and exposes the
//! resulting amplitudes. Measurements are recorded in the circuit but do not
//! act on the state: there is no sampling or collapse, only the unitary part
//! needed to check that a prepared state matches its target.

mod error;
mod statevector;

pub use error::{SimError, SimResult};
pub use statevector::{MAX_QUBITS, Statevector, equal_up_to_global_phase};
