//! qprep State-Preparation Lowering
//!
//! This crate turns a target amplitude vector into a gate-level circuit that
//! prepares it from `|0…0⟩`, and cleans that circuit up before emission.
//!
//! # Overview
//!
//! ```text
//! &[Complex64]
//!       │
//!       ▼
//! normalize ──► AmplitudeVector (power-of-two length, unit norm)
//!       │
//!       ▼
//! decompose ──► Circuit (Ry/Rz multiplexor cascades, CX ladders, measure all)
//!       │
//!       ▼
//! PassManager
//!       └── CancelRedundantGates (zero rotations, merges, inverse pairs)
//!       │
//!       ▼
//! Circuit (ready for emission)
//! ```
//!
//! Every stage is a pure function of its input; stages share no state, so
//! independent compilations may run concurrently.
//!
//! # Example
//!
//! ```rust
//! use qprep_compile::{AmplitudeVector, PassManagerBuilder, decompose, DEFAULT_NORM_TOLERANCE};
//! use std::f64::consts::FRAC_1_SQRT_2;
//!
//! let state = AmplitudeVector::from_real(
//!     &[FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0],
//!     DEFAULT_NORM_TOLERANCE,
//! ).unwrap();
//!
//! let mut circuit = decompose(&state, "kernel").unwrap();
//! assert_eq!(circuit.num_gates(), 5);
//!
//! let pm = PassManagerBuilder::new().with_optimization_level(1).build().unwrap();
//! pm.run(&mut circuit).unwrap();
//! assert_eq!(circuit.num_gates(), 4); // the ry(0) on qubit 1 is gone
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to add a circuit rewrite:
//!
//! ```rust
//! use qprep_compile::{CompileResult, Pass};
//! use qprep_ir::Circuit;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!
//!     fn run(&self, circuit: &mut Circuit) -> CompileResult<()> {
//!         Ok(())
//!     }
//! }
//! ```

pub mod decompose;
pub mod error;
pub mod manager;
pub mod normalize;
pub mod pass;
pub mod passes;

pub use decompose::decompose;
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use normalize::{AmplitudeVector, DEFAULT_NORM_TOLERANCE, normalize};
pub use pass::Pass;
pub use passes::{CancelRedundantGates, DEFAULT_ZERO_TOLERANCE};
