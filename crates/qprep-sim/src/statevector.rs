//! Statevector simulation engine.

use num_complex::Complex64;
use tracing::trace;

use qprep_ir::{Circuit, Gate, GateKind};

use crate::error::{SimError, SimResult};

/// Largest register the simulator will allocate (2^24 amplitudes).
pub const MAX_QUBITS: u32 = 24;

/// A statevector representing a quantum state.
///
/// Amplitude `i` belongs to the basis state whose bit `k` is qubit `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: u32,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: u32) -> SimResult<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(SimError::TooManyQubits(num_qubits));
        }
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Simulate a circuit's gates from |0...0⟩.
    pub fn run(circuit: &Circuit) -> SimResult<Self> {
        let mut sv = Self::new(circuit.num_qubits())?;
        sv.apply_circuit(circuit)?;
        Ok(sv)
    }

    /// Apply every gate of a circuit. Measurements are ignored.
    pub fn apply_circuit(&mut self, circuit: &Circuit) -> SimResult<()> {
        if circuit.num_qubits() > self.num_qubits {
            return Err(SimError::QubitCountMismatch {
                circuit: circuit.num_qubits(),
                state: self.num_qubits,
            });
        }
        for gate in circuit.gates() {
            self.apply_gate(gate)?;
        }
        trace!(gates = circuit.num_gates(), "circuit applied");
        Ok(())
    }

    /// Apply a single gate.
    pub fn apply_gate(&mut self, gate: &Gate) -> SimResult<()> {
        gate.validate()?;
        let widest = gate.qubits().map(|q| q.0 + 1).max().unwrap_or(0);
        if widest > self.num_qubits {
            return Err(SimError::QubitCountMismatch {
                circuit: widest,
                state: self.num_qubits,
            });
        }
        let target = gate.target().mask();
        let controls = gate.controls.iter().fold(0usize, |m, q| m | q.mask());

        match gate.kind {
            GateKind::X => self.apply_x(target, controls),
            GateKind::Ry => {
                let theta = gate.angle.ok_or_else(|| SimError::MissingAngle(gate.name()))?;
                self.apply_ry(target, controls, theta);
            }
            GateKind::Rz => {
                let theta = gate.angle.ok_or_else(|| SimError::MissingAngle(gate.name()))?;
                self.apply_rz(target, controls, theta);
            }
        }
        Ok(())
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The amplitudes, indexed by basis state.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Outcome probabilities, indexed by basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// State fidelity `|⟨target|ψ⟩|²`.
    pub fn fidelity(&self, target: &[Complex64]) -> f64 {
        inner(target, &self.amplitudes).norm_sqr()
    }

    // =========================================================================
    // Gate implementations
    // =========================================================================

    fn apply_x(&mut self, target: usize, controls: usize) {
        for i in pairs(self.amplitudes.len(), target, controls) {
            self.amplitudes.swap(i, i | target);
        }
    }

    fn apply_ry(&mut self, target: usize, controls: usize, theta: f64) {
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in pairs(self.amplitudes.len(), target, controls) {
            let j = i | target;
            let a = self.amplitudes[i];
            let b = self.amplitudes[j];
            self.amplitudes[i] = c * a - s * b;
            self.amplitudes[j] = s * a + c * b;
        }
    }

    fn apply_rz(&mut self, target: usize, controls: usize, theta: f64) {
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for i in pairs(self.amplitudes.len(), target, controls) {
            self.amplitudes[i] *= phase_0;
            self.amplitudes[i | target] *= phase_1;
        }
    }
}

/// Indices `i < len` with the target bit clear and every control bit set.
fn pairs(len: usize, target: usize, controls: usize) -> impl Iterator<Item = usize> {
    (0..len).filter(move |i| i & target == 0 && i & controls == controls)
}

/// `⟨a|b⟩`.
fn inner(a: &[Complex64], b: &[Complex64]) -> Complex64 {
    a.iter().zip(b).map(|(x, y)| x.conj() * y).sum()
}

/// Whether `a = e^{iφ}·b` for some global phase `φ`, element-wise within
/// `eps`.
pub fn equal_up_to_global_phase(a: &[Complex64], b: &[Complex64], eps: f64) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let overlap = inner(b, a);
    let phase = if overlap.norm() > 0.0 {
        overlap / overlap.norm()
    } else {
        Complex64::new(1.0, 0.0)
    };
    a.iter()
        .zip(b)
        .all(|(x, y)| (x - phase * y).norm() <= eps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qprep_ir::{IrError, QubitId};
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2).unwrap();
        assert!(approx_eq(sv.amplitudes()[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(sv.amplitudes()[3], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_ry_half_turn() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        circuit.ry(PI / 2.0, QubitId(0)).unwrap();
        let sv = Statevector::run(&circuit).unwrap();

        assert!(approx_eq(sv.amplitudes()[0], Complex64::new(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(sv.amplitudes()[1], Complex64::new(FRAC_1_SQRT_2, 0.0)));
    }

    #[test]
    fn test_bell_state() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit.ry(PI / 2.0, QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let sv = Statevector::run(&circuit).unwrap();

        let p = sv.probabilities();
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!(p[1].abs() < 1e-12);
        assert!(p[2].abs() < 1e-12);
        assert!((p[3] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cx_respects_control() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit.cx(QubitId(1), QubitId(0)).unwrap();
        let sv = Statevector::run(&circuit).unwrap();
        assert!(approx_eq(sv.amplitudes()[0], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_toffoli() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        circuit.x(QubitId(0)).unwrap();
        circuit.x(QubitId(1)).unwrap();
        circuit
            .add_gate(Gate::x(QubitId(2)).controlled_by([QubitId(0), QubitId(1)]))
            .unwrap();
        let sv = Statevector::run(&circuit).unwrap();
        assert!(approx_eq(sv.amplitudes()[0b111], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_rz_relative_phase() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        circuit.ry(PI / 2.0, QubitId(0)).unwrap();
        circuit.rz(PI / 2.0, QubitId(0)).unwrap();
        let sv = Statevector::run(&circuit).unwrap();

        let target = [
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.0, FRAC_1_SQRT_2),
        ];
        assert!(equal_up_to_global_phase(sv.amplitudes(), &target, 1e-12));
        assert!((sv.fidelity(&target) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_global_phase_comparison() {
        let a = [Complex64::new(0.6, 0.0), Complex64::new(0.8, 0.0)];
        let b = [Complex64::new(-0.6, 0.0), Complex64::new(-0.8, 0.0)];
        let c = [Complex64::new(0.8, 0.0), Complex64::new(0.6, 0.0)];
        assert!(equal_up_to_global_phase(&a, &b, 1e-12));
        assert!(!equal_up_to_global_phase(&a, &c, 1e-6));
        assert!(!equal_up_to_global_phase(&a, &a[..1], 1e-6));
    }

    #[test]
    fn test_gate_outside_register() {
        let mut sv = Statevector::new(1).unwrap();
        let err = sv.apply_gate(&Gate::cx(QubitId(0), QubitId(2))).unwrap_err();
        assert!(matches!(err, SimError::QubitCountMismatch { circuit: 3, state: 1 }));
    }

    #[test]
    fn test_malformed_gate_is_rejected() {
        let mut sv = Statevector::new(2).unwrap();
        let no_target = Gate {
            kind: GateKind::X,
            angle: None,
            targets: vec![],
            controls: vec![QubitId(1)],
        };
        let err = sv.apply_gate(&no_target).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidGate(IrError::TargetCountMismatch { got: 0, .. })
        ));

        let no_angle = Gate {
            kind: GateKind::Ry,
            angle: None,
            targets: vec![QubitId(0)],
            controls: vec![],
        };
        assert!(matches!(
            sv.apply_gate(&no_angle),
            Err(SimError::InvalidGate(IrError::MissingAngle(_)))
        ));
        assert!((sv.amplitudes()[0].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_many_qubits() {
        assert!(matches!(
            Statevector::new(MAX_QUBITS + 1),
            Err(SimError::TooManyQubits(_))
        ));
    }
}
