//! qprep: state preparation to OpenQASM 2.0
//!
//! Turns a target amplitude vector into an OpenQASM 2.0 listing of `ry`,
//! `rz` and `cx` gates that prepares it from `|0…0⟩` (up to global phase)
//! and then measures every qubit.
//!
//! # Example
//!
//! ```rust
//! use qprep::{CompileConfig, Complex64, compile};
//! use std::f64::consts::FRAC_1_SQRT_2;
//!
//! let amplitudes = [FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0].map(|x| Complex64::new(x, 0.0));
//! let qasm = compile(&amplitudes, &CompileConfig::default()).unwrap();
//!
//! assert!(qasm.contains("qreg var0[2];"));
//! assert!(qasm.contains("ry(7.853982e-01) var0[0];"));
//! assert!(qasm.ends_with("measure var0 -> var1;\n"));
//! ```
//!
//! # Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `qprep-ir` | Gates, circuits, measurements |
//! | `qprep-compile` | Normalizer, decomposer, optimizer passes |
//! | `qprep-qasm2` | Emitter and reader |
//! | `qprep-sim` | Reference statevector simulator |

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use config::{CompileConfig, ConfigError, EmitConfig, LoggingConfig, OptimizerConfig};
pub use error::{ErrorKind, PipelineError, Stage};
pub use pipeline::{Pipeline, compile};

pub use num_complex::Complex64;
pub use qprep_ir::Circuit;
