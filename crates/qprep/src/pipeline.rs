//! The state-preparation pipeline.
//!
//! ```text
//! amplitudes ─► normalize ─► decompose ─► PassManager ─► emit ─► listing
//! ```
//!
//! Stages run strictly in order and the first failure aborts the run.

use num_complex::Complex64;
use qprep_compile::{PassManager, PassManagerBuilder, decompose, normalize};
use qprep_ir::Circuit;
use qprep_qasm2::{EmitOptions, emit};
use tracing::{info, instrument};

use crate::config::{CompileConfig, ConfigError};
use crate::error::PipelineError;

/// A validated, reusable pipeline.
pub struct Pipeline {
    config: CompileConfig,
    passes: PassManager,
    emit_options: EmitOptions,
}

impl Pipeline {
    /// Validate the configuration and set up the stages.
    pub fn new(config: CompileConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let passes = PassManagerBuilder::new()
            .with_optimization_level(config.optimization_level)
            .with_zero_tolerance(config.optimizer.zero_tolerance)
            .build()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        let emit_options = config.emit_options();
        Ok(Self {
            config,
            passes,
            emit_options,
        })
    }

    /// The configuration this pipeline was built from.
    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Run every stage except emission and return the optimized circuit.
    #[instrument(skip_all, fields(kernel = %self.config.kernel_name, len = amplitudes.len()))]
    pub fn lower(&self, amplitudes: &[Complex64]) -> Result<Circuit, PipelineError> {
        let state =
            normalize(amplitudes, self.config.norm_tolerance).map_err(PipelineError::Normalize)?;
        let mut circuit =
            decompose(&state, &self.config.kernel_name).map_err(PipelineError::Decompose)?;
        self.passes
            .run(&mut circuit)
            .map_err(PipelineError::Optimize)?;
        Ok(circuit)
    }

    /// Lower and emit the OpenQASM 2.0 listing.
    pub fn compile(&self, amplitudes: &[Complex64]) -> Result<String, PipelineError> {
        let circuit = self.lower(amplitudes)?;
        let listing = emit(&circuit, &self.emit_options).map_err(PipelineError::Emit)?;
        info!(
            kernel = %self.config.kernel_name,
            qubits = circuit.num_qubits(),
            gates = circuit.num_gates(),
            "compiled state preparation"
        );
        Ok(listing)
    }

    /// [`compile`](Self::compile) for real amplitudes.
    pub fn compile_real(&self, amplitudes: &[f64]) -> Result<String, PipelineError> {
        let complex: Vec<Complex64> = amplitudes
            .iter()
            .map(|&re| Complex64::new(re, 0.0))
            .collect();
        self.compile(&complex)
    }
}

/// Compile an amplitude vector to an OpenQASM 2.0 listing in one call.
pub fn compile(amplitudes: &[Complex64], config: &CompileConfig) -> Result<String, PipelineError> {
    Pipeline::new(config.clone())?.compile(amplitudes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Stage};
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_lower_level_one_drops_zero_rotation() {
        let pipeline = Pipeline::new(CompileConfig::default()).unwrap();
        let circuit = pipeline
            .lower(&[FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0].map(|x| Complex64::new(x, 0.0)))
            .unwrap();
        assert_eq!(circuit.num_gates(), 4);
        assert_eq!(circuit.name(), "kernel");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = CompileConfig::default();
        config.optimization_level = 3;
        assert!(Pipeline::new(config.clone()).is_err());

        let err = compile(&[Complex64::new(1.0, 0.0); 2], &config).unwrap_err();
        assert_eq!(err.stage(), Stage::Configure);
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn test_invalid_norm() {
        let pipeline = Pipeline::new(CompileConfig::default()).unwrap();
        let err = pipeline.compile_real(&[1.0, 1.0]).unwrap_err();
        assert_eq!(err.stage(), Stage::Normalize);
        assert_eq!(err.kind(), ErrorKind::InvalidNorm);
    }
}
