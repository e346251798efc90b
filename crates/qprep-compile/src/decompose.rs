//! State-preparation decomposition.
//!
//! Lowers a normalized amplitude vector to a circuit of `Ry`, `Rz` and `CX`
//! gates that maps `|0…0⟩` to the vector, up to global phase (Möttönen et
//! al., "Transformation of quantum states using uniformly controlled
//! rotations", 2004).
//!
//! The amplitude vector is treated as a binary tree whose level `t` splits on
//! bit `t` of the basis index. Qubit `n-1` is fixed first by a single
//! rotation, then each lower qubit `t` receives a rotation multiplexed on the
//! already-fixed qubits `t+1 .. n-1`. Magnitudes are prepared with an `Ry`
//! cascade; if the amplitudes carry relative phases an `Rz` cascade follows.
//!
//! Every multiplexed rotation with `k` controls lowers to `2^k` single-qubit
//! rotations interleaved with `2^k` CX gates whose controls follow a Gray
//! code. Zero angles are kept; removing them is the optimizer's job.

use std::f64::consts::PI;

use qprep_ir::{Circuit, Gate, GateKind, QubitId};
use tracing::{debug, info, instrument};

use crate::error::{CompileError, CompileResult};
use crate::normalize::AmplitudeVector;

/// Phases closer than this (mod 2π) count as equal when deciding whether the
/// `Rz` cascade is needed.
const PHASE_TOLERANCE: f64 = 1e-12;

/// Decompose a normalized amplitude vector into a state-preparation circuit.
///
/// The circuit has `n` qubits and `n` classical bits and ends by measuring
/// every qubit `k` into classical bit `k`.
#[instrument(skip(state), fields(num_qubits = state.num_qubits()))]
pub fn decompose(state: &AmplitudeVector, name: &str) -> CompileResult<Circuit> {
    let n = state.num_qubits();
    let mut circuit = Circuit::with_size(name, n, n);

    let magnitudes = state.magnitudes();
    for target in (0..n).rev() {
        let angles = magnitude_angles(&magnitudes, target)?;
        append_multiplexed(&mut circuit, GateKind::Ry, &angles, target)?;
    }

    let phases = aligned_phases(state);
    if phases.iter().any(|&w| w != phases[0]) {
        debug!("amplitudes carry relative phases, adding Rz cascade");
        for target in (0..n).rev() {
            let angles = phase_angles(&phases, target)?;
            append_multiplexed(&mut circuit, GateKind::Rz, &angles, target)?;
        }
    }

    circuit.measure_all()?;

    info!(
        "Decomposed {}-qubit state into {} gates ({} CX)",
        n,
        circuit.num_gates(),
        circuit.count_ops("cx")
    );
    Ok(circuit)
}

/// `Ry` angles for target qubit `target`, one per control pattern.
///
/// For the block of amplitudes sharing the control prefix `j`, the angle is
/// `2·atan2(‖ones‖, ‖zeros‖)` where `zeros`/`ones` are the halves with bit
/// `target` clear/set. An all-zero block yields exactly 0.
fn magnitude_angles(magnitudes: &[f64], target: u32) -> CompileResult<Vec<f64>> {
    let half = 1usize << target;
    magnitudes
        .chunks_exact(half << 1)
        .map(|block| {
            let zeros = l2_norm(&block[..half]);
            let ones = l2_norm(&block[half..]);
            let angle = if zeros == 0.0 && ones == 0.0 {
                0.0
            } else {
                2.0 * ones.atan2(zeros)
            };
            check_finite(angle, target)
        })
        .collect()
}

/// `Rz` angles for target qubit `target`, one per control pattern.
///
/// The angle is the difference between the summed phases of the `ones` and
/// `zeros` halves, divided by the half size.
#[allow(clippy::cast_precision_loss)]
fn phase_angles(phases: &[f64], target: u32) -> CompileResult<Vec<f64>> {
    let half = 1usize << target;
    phases
        .chunks_exact(half << 1)
        .map(|block| {
            let zeros: f64 = block[..half].iter().sum();
            let ones: f64 = block[half..].iter().sum();
            check_finite((ones - zeros) / half as f64, target)
        })
        .collect()
}

/// Amplitude phases, with zero-magnitude entries and entries equal to the
/// reference phase (mod 2π) snapped to the reference.
///
/// Phases of zero amplitudes are arbitrary, so they take the phase of the
/// first non-zero amplitude. A vector whose non-zero amplitudes share one
/// phase therefore comes out uniform and needs no `Rz` cascade.
fn aligned_phases(state: &AmplitudeVector) -> Vec<f64> {
    let reference = state
        .iter()
        .find(|a| a.norm_sqr() > 0.0)
        .map_or(0.0, |a| a.arg());

    state
        .iter()
        .map(|a| {
            if a.norm_sqr() == 0.0 {
                return reference;
            }
            let phase = a.arg();
            let delta = (phase - reference + PI).rem_euclid(2.0 * PI) - PI;
            if delta.abs() <= PHASE_TOLERANCE {
                reference
            } else {
                phase
            }
        })
        .collect()
}

/// Append a rotation on `target` multiplexed on qubits `target+1 ..`.
///
/// `angles[j]` is applied when the controls hold the value `j`, with control
/// bit `p` being qubit `target + 1 + p`.
fn append_multiplexed(
    circuit: &mut Circuit,
    kind: GateKind,
    angles: &[f64],
    target: u32,
) -> CompileResult<()> {
    let target_qubit = QubitId(target);
    let num_controls = angles.len().trailing_zeros();

    if num_controls == 0 {
        circuit.add_gate(rotation(kind, angles[0], target_qubit)?)?;
        return Ok(());
    }

    let thetas = gray_code_angles(angles);
    let last = thetas.len() - 1;
    for (i, &theta) in thetas.iter().enumerate() {
        circuit.add_gate(rotation(kind, check_finite(theta, target)?, target_qubit)?)?;
        let control_bit = if i == last {
            num_controls - 1
        } else {
            (i + 1).trailing_zeros()
        };
        circuit.cx(QubitId(target + 1 + control_bit), target_qubit)?;
    }
    Ok(())
}

/// Convert multiplexor angles into the angles of the Gray-code CX ladder.
///
/// `θ_i = 2^-k Σ_j (-1)^{popcount(j & gray(i))} α_j`. Before step `i` the
/// ladder has flipped the target's rotation sign for exactly the control
/// patterns `j` with odd overlap with `gray(i)`, so the ladder applies
/// `Σ_i (-1)^{popcount(j & gray(i))} θ_i = α_j` for pattern `j`.
///
/// The signed sums are the Walsh-Hadamard transform of `α`, computed in place
/// with butterflies in `O(k·2^k)`.
#[allow(clippy::cast_precision_loss)]
fn gray_code_angles(alpha: &[f64]) -> Vec<f64> {
    let mut spectrum = alpha.to_vec();
    let mut width = 1;
    while width < spectrum.len() {
        for block in spectrum.chunks_exact_mut(width << 1) {
            let (low, high) = block.split_at_mut(width);
            for (a, b) in low.iter_mut().zip(high.iter_mut()) {
                let (sum, diff) = (*a + *b, *a - *b);
                *a = sum;
                *b = diff;
            }
        }
        width <<= 1;
    }

    let scale = (spectrum.len() as f64).recip();
    (0..spectrum.len())
        .map(|i| spectrum[i ^ (i >> 1)] * scale)
        .collect()
}

fn rotation(kind: GateKind, angle: f64, target: QubitId) -> CompileResult<Gate> {
    Ok(Gate::new(kind, Some(angle), vec![target], vec![])?)
}

fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

fn check_finite(angle: f64, qubit: u32) -> CompileResult<f64> {
    if angle.is_finite() {
        Ok(angle)
    } else {
        Err(CompileError::Decomposition {
            qubit,
            reason: format!("non-finite rotation angle {angle}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

    fn real_state(amplitudes: &[f64]) -> AmplitudeVector {
        AmplitudeVector::from_real(amplitudes, 1e-6).unwrap()
    }

    fn assert_gates_close(actual: &[Gate], expected: &[Gate]) {
        assert_eq!(actual.len(), expected.len(), "gate count differs");
        for (a, e) in actual.iter().zip(expected) {
            assert!(a.same_operation(e), "expected {e:?}, got {a:?}");
            match (a.angle, e.angle) {
                (Some(x), Some(y)) => assert!((x - y).abs() < 1e-12, "angle {x} != {y}"),
                (None, None) => {}
                _ => panic!("angle presence differs: {a:?} vs {e:?}"),
            }
        }
    }

    #[test]
    fn test_known_answer_two_qubits() {
        let state = real_state(&[FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0]);
        let circuit = decompose(&state, "kernel").unwrap();

        let expected = [
            Gate::ry(0.0, QubitId(1)),
            Gate::ry(FRAC_PI_4, QubitId(0)),
            Gate::cx(QubitId(1), QubitId(0)),
            Gate::ry(FRAC_PI_4, QubitId(0)),
            Gate::cx(QubitId(1), QubitId(0)),
        ];
        assert_gates_close(circuit.gates(), &expected);
        assert_eq!(circuit.gates()[0].angle, Some(0.0));
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert!(circuit.measures_all_in_order());
    }

    #[test]
    fn test_single_qubit_is_one_rotation() {
        let state = real_state(&[FRAC_1_SQRT_2, FRAC_1_SQRT_2]);
        let circuit = decompose(&state, "k").unwrap();
        assert_eq!(circuit.num_gates(), 1);
        assert_eq!(circuit.num_multi_qubit_gates(), 0);
        assert_gates_close(circuit.gates(), &[Gate::ry(FRAC_PI_2, QubitId(0))]);
    }

    #[test]
    fn test_zero_block_angle_is_exactly_zero() {
        let angles = magnitude_angles(&[1.0, 0.0, 0.0, 0.0], 0).unwrap();
        assert_eq!(angles, vec![0.0, 0.0]);
        assert!(angles.iter().all(|a| a.to_bits() == 0));
    }

    #[test]
    fn test_global_phase_needs_no_rz() {
        let state = real_state(&[-0.6, -0.8]);
        let circuit = decompose(&state, "k").unwrap();
        assert_eq!(circuit.count_ops("rz"), 0);
    }

    #[test]
    fn test_relative_phase_adds_rz() {
        let state = AmplitudeVector::new(
            &[
                Complex64::new(FRAC_1_SQRT_2, 0.0),
                Complex64::new(0.0, FRAC_1_SQRT_2),
            ],
            1e-6,
        )
        .unwrap();
        let circuit = decompose(&state, "k").unwrap();
        assert_eq!(circuit.count_ops("rz"), 1);
        let rz = &circuit.gates()[1];
        assert!((rz.angle.unwrap() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_gate_counts_three_qubits() {
        let amps = [1.0 / 8f64.sqrt(); 8];
        let circuit = decompose(&real_state(&amps), "k").unwrap();
        // 1 + 2 + 4 rotations, 0 + 2 + 4 CX.
        assert_eq!(circuit.count_ops("ry"), 7);
        assert_eq!(circuit.count_ops("cx"), 6);
    }

    #[test]
    fn test_non_finite_angles_are_decomposition_errors() {
        assert!(matches!(
            magnitude_angles(&[f64::NAN, 0.0], 0),
            Err(CompileError::Decomposition { qubit: 0, .. })
        ));
        assert!(matches!(
            phase_angles(&[0.0, f64::NAN], 0),
            Err(CompileError::Decomposition { qubit: 0, .. })
        ));
        assert!(matches!(
            phase_angles(&[0.0, f64::INFINITY], 0),
            Err(CompileError::Decomposition { qubit: 0, .. })
        ));
        assert!(matches!(
            phase_angles(&[0.0, 0.0, 0.0, f64::NAN], 1),
            Err(CompileError::Decomposition { qubit: 1, .. })
        ));
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_gray_code_angles_match_signed_sums() {
        let alpha: Vec<f64> = (0..16).map(|j| (j as f64 * 0.37).sin()).collect();
        let thetas = gray_code_angles(&alpha);
        for (i, theta) in thetas.iter().enumerate() {
            let gray = i ^ (i >> 1);
            let expected: f64 = alpha
                .iter()
                .enumerate()
                .map(|(j, &a)| if (j & gray).count_ones() % 2 == 0 { a } else { -a })
                .sum::<f64>()
                / 16.0;
            assert!((theta - expected).abs() < 1e-12, "step {i}: {theta} != {expected}");
        }
    }

    #[test]
    fn test_gray_code_angles_single_control() {
        let thetas = gray_code_angles(&[1.0, 0.5]);
        assert_eq!(thetas, vec![0.75, 0.25]);
    }
}
