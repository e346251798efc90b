//! qprep Circuit Intermediate Representation
//!
//! This crate provides the data structures shared by every qprep stage: the
//! state-preparation decomposer builds a [`Circuit`], the optimizer rewrites
//! its gate list, and the emitter serializes it.
//!
//! # Overview
//!
//! Unlike a DAG-based IR, a [`Circuit`] here is a plain ordered list of
//! [`Gate`]s followed by a list of [`Measurement`]s. State preparation emits
//! a strictly sequential program, so order is the only structure needed.
//!
//! # Qubit ordering
//!
//! Qubit `k` is bit `k` of a basis-state index: for two qubits the amplitude
//! vector is ordered `|q1 q0⟩ = |00⟩, |01⟩, |10⟩, |11⟩`.
//!
//! # Example
//!
//! ```rust
//! use qprep_ir::{Circuit, QubitId};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit.ry(PI / 2.0, QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_gates(), 2);
//! assert!(circuit.measures_all_in_order());
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `Ry(θ)`, `Rz(θ)` | 1 + controls | Rotation gates |
//! | `X` | 1 + controls | Pauli-X; one control gives CNOT |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{Gate, GateKind};
pub use qubit::{ClbitId, Measurement, QubitId};
