//! `OpenQASM` 2.0 Emitter and Reader for qprep
//!
//! This crate serializes a qprep [`Circuit`](qprep_ir::Circuit) into the
//! `OpenQASM` 2.0 listing produced by the state-preparation pipeline, and
//! reads that listing back.
//!
//! # Listing Layout
//!
//! ```text
//! // Code generated by <generator>
//! OPENQASM 2.0;
//!
//! include "qelib1.inc";
//!
//! gate <kernel>(param0)  {
//! }
//!
//! qreg var0[<n>];
//! <gate lines>
//! creg var1[<n>];
//! measure var0 -> var1;
//! ```
//!
//! Angles are printed like C's `%.6e` (`7.853982e-01`).
//!
//! # Example: Emitting QASM
//!
//! ```rust
//! use qprep_ir::{Circuit, QubitId};
//! use qprep_qasm2::{EmitOptions, emit};
//!
//! let mut circuit = Circuit::with_size("kernel", 2, 0);
//! circuit.ry(std::f64::consts::FRAC_PI_4, QubitId(0)).unwrap();
//! circuit.cx(QubitId(1), QubitId(0)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! let qasm = emit(&circuit, &EmitOptions::default()).unwrap();
//! assert!(qasm.contains("ry(7.853982e-01) var0[0];"));
//! assert!(qasm.contains("cx var0[1], var0[0];"));
//! assert!(qasm.ends_with("measure var0 -> var1;\n"));
//! ```
//!
//! # Example: Round-Trip
//!
//! ```rust
//! use qprep_ir::{Circuit, QubitId};
//! use qprep_qasm2::{EmitOptions, emit, parse};
//!
//! let mut circuit = Circuit::with_size("kernel", 3, 0);
//! circuit.x(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(2)).unwrap();
//!
//! let emitted = emit(&circuit, &EmitOptions::default()).unwrap();
//! let reparsed = parse(&emitted).unwrap();
//! assert_eq!(reparsed.num_qubits(), 3);
//! assert_eq!(reparsed.gates(), circuit.gates());
//! ```
//!
//! # Supported Gates
//!
//! `x`, `cx`, `ccx`, `ry(θ)`, `rz(θ)`, `crz(θ)`

mod emitter;
mod error;
mod lexer;
mod parser;

pub use emitter::{EmitOptions, emit, format_angle, kernel_gate_name};
pub use error::{EmitError, EmitResult, ParseError, ParseResult};
pub use parser::parse;
