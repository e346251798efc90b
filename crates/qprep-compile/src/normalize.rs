//! Amplitude vector validation and normalization.

use num_complex::Complex64;
use serde::Serialize;
use tracing::debug;

use crate::error::{CompileError, CompileResult};

/// Default tolerance on the total probability of an input vector.
pub const DEFAULT_NORM_TOLERANCE: f64 = 1e-6;

/// A validated state vector of `2^n` amplitudes with unit norm.
///
/// Only constructible through [`normalize`], so holding one guarantees a
/// power-of-two length of at least 2 and a norm of exactly 1 up to rounding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmplitudeVector {
    amplitudes: Vec<Complex64>,
    num_qubits: u32,
}

impl AmplitudeVector {
    /// Validate and normalize complex amplitudes.
    pub fn new(amplitudes: &[Complex64], tolerance: f64) -> CompileResult<Self> {
        normalize(amplitudes, tolerance)
    }

    /// Validate and normalize real amplitudes.
    pub fn from_real(amplitudes: &[f64], tolerance: f64) -> CompileResult<Self> {
        let complex: Vec<Complex64> = amplitudes
            .iter()
            .map(|&re| Complex64::new(re, 0.0))
            .collect();
        normalize(&complex, tolerance)
    }

    /// Number of qubits, `log2(len)`.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of amplitudes.
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Always false; a validated vector has at least two amplitudes.
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// The amplitudes, indexed by basis state.
    pub fn as_slice(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Iterate over the amplitudes.
    pub fn iter(&self) -> std::slice::Iter<'_, Complex64> {
        self.amplitudes.iter()
    }

    /// Magnitude of each amplitude.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm()).collect()
    }

    /// Phase of each amplitude in `(-π, π]`.
    pub fn phases(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.arg()).collect()
    }

    /// Consume the vector, returning the amplitudes.
    pub fn into_inner(self) -> Vec<Complex64> {
        self.amplitudes
    }
}

impl<'a> IntoIterator for &'a AmplitudeVector {
    type Item = &'a Complex64;
    type IntoIter = std::slice::Iter<'a, Complex64>;

    fn into_iter(self) -> Self::IntoIter {
        self.amplitudes.iter()
    }
}

/// Validate an amplitude vector and rescale it to exact unit norm.
///
/// Fails with [`CompileError::InvalidLength`] unless the length is a power of
/// two and at least 2, and with [`CompileError::InvalidNorm`] if the sum of
/// squared magnitudes is non-finite or differs from 1 by more than
/// `tolerance`. Accepted vectors are always divided by their norm, so the
/// result does not depend on how close to 1 the input already was.
pub fn normalize(amplitudes: &[Complex64], tolerance: f64) -> CompileResult<AmplitudeVector> {
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        return Err(CompileError::InvalidConfiguration(format!(
            "norm tolerance must be finite and non-negative, got {tolerance}"
        )));
    }

    let len = amplitudes.len();
    if len < 2 || !len.is_power_of_two() {
        return Err(CompileError::InvalidLength { len });
    }

    let total: f64 = amplitudes.iter().map(Complex64::norm_sqr).sum();
    // NaN fails this comparison and is rejected with it.
    if !((total - 1.0).abs() <= tolerance) {
        return Err(CompileError::InvalidNorm {
            norm: total,
            tolerance,
        });
    }

    let scale = total.sqrt().recip();
    if (scale - 1.0).abs() > f64::EPSILON {
        debug!(total, "rescaling amplitude vector to unit norm");
    }

    Ok(AmplitudeVector {
        amplitudes: amplitudes.iter().map(|a| *a * scale).collect(),
        num_qubits: len.trailing_zeros(),
    })
}
