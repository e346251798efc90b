//! Pipeline error types.

use std::fmt;

use qprep_compile::CompileError;
use qprep_qasm2::EmitError;
use thiserror::Error;

use crate::config::ConfigError;

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Configuration validation, before any input is read.
    Configure,
    /// Amplitude validation and rescaling.
    Normalize,
    /// State-preparation decomposition.
    Decompose,
    /// Gate sequence optimization.
    Optimize,
    /// Listing emission.
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configure => "configure",
            Stage::Normalize => "normalize",
            Stage::Decompose => "decompose",
            Stage::Optimize => "optimize",
            Stage::Emit => "emit",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Amplitude count is not a power of two of at least 2.
    InvalidLength,
    /// Total probability is off by more than the tolerance, or non-finite.
    InvalidNorm,
    /// Decomposition produced an unusable angle.
    Decomposition,
    /// The circuit cannot be written as OpenQASM 2.0.
    Emission,
    /// Rejected configuration value.
    InvalidConfiguration,
    /// A violated internal invariant.
    Internal,
}

/// Errors returned by the pipeline. No text is produced when one occurs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("normalize failed: {0}")]
    Normalize(#[source] CompileError),

    #[error("decompose failed: {0}")]
    Decompose(#[source] CompileError),

    #[error("optimize failed: {0}")]
    Optimize(#[source] CompileError),

    #[error("emit failed: {0}")]
    Emit(#[source] EmitError),
}

impl PipelineError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Config(_) => Stage::Configure,
            PipelineError::Normalize(_) => Stage::Normalize,
            PipelineError::Decompose(_) => Stage::Decompose,
            PipelineError::Optimize(_) => Stage::Optimize,
            PipelineError::Emit(_) => Stage::Emit,
        }
    }

    /// What went wrong, independent of the stage.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Config(_) => ErrorKind::InvalidConfiguration,
            PipelineError::Emit(_) => ErrorKind::Emission,
            PipelineError::Normalize(e) | PipelineError::Decompose(e) | PipelineError::Optimize(e) => {
                match e {
                    CompileError::InvalidLength { .. } => ErrorKind::InvalidLength,
                    CompileError::InvalidNorm { .. } => ErrorKind::InvalidNorm,
                    CompileError::Decomposition { .. } => ErrorKind::Decomposition,
                    CompileError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
                    _ => ErrorKind::Internal,
                }
            }
        }
    }
}
