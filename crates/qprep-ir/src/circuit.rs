//! Circuit builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::qubit::{ClbitId, Measurement, QubitId};

/// A quantum circuit: an ordered gate list plus register metadata and
/// measurements.
///
/// Gate order is semantically significant and is never changed by the
/// circuit itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Size of the quantum register.
    num_qubits: u32,
    /// Size of the classical register.
    num_clbits: u32,
    /// Gates in application order.
    gates: Vec<Gate>,
    /// Measurements, applied after all gates.
    measurements: Vec<Measurement>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_size(name, 0, 0)
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            gates: vec![],
            measurements: vec![],
        }
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Append a gate after validating it against the register size.
    pub fn add_gate(&mut self, gate: Gate) -> IrResult<&mut Self> {
        gate.validate()?;
        for &q in gate.qubits() {
            self.check_qubit(q, Some(gate.name()))?;
        }
        self.gates.push(gate);
        Ok(self)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.add_gate(Gate::ry(theta, qubit))
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.add_gate(Gate::rz(theta, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add_gate(Gate::x(qubit))
    }

    /// Apply CX (CNOT) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.add_gate(Gate::cx(control, target))
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit, None)?;
        if clbit.0 >= self.num_clbits {
            return Err(IrError::ClbitOutOfRange {
                clbit,
                num_clbits: self.num_clbits,
            });
        }
        self.measurements.push(Measurement::new(qubit, clbit));
        Ok(self)
    }

    /// Measure every qubit `k` into classical bit `k`, growing the classical
    /// register if it is too small.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        self.num_clbits = self.num_clbits.max(self.num_qubits);
        for k in 0..self.num_qubits {
            self.measure(QubitId(k), ClbitId(k))?;
        }
        Ok(self)
    }

    /// Whether the measurements are exactly `q[k] -> c[k]` for every qubit,
    /// in order, with matching register sizes.
    pub fn measures_all_in_order(&self) -> bool {
        self.num_qubits > 0
            && self.num_qubits == self.num_clbits
            && self.measurements.len() == self.num_qubits as usize
            && self
                .measurements
                .iter()
                .enumerate()
                .all(|(k, m)| m.qubit.index() == k && m.clbit.0 as usize == k)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Measurements in declaration order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Take the gate list out of the circuit, leaving it empty.
    ///
    /// Used by passes that rebuild the gate list in one sweep.
    pub fn take_gates(&mut self) -> Vec<Gate> {
        std::mem::take(&mut self.gates)
    }

    /// Replace the gate list.
    ///
    /// Every gate is validated against the register; on error the circuit
    /// is left without gates.
    pub fn set_gates(&mut self, gates: Vec<Gate>) -> IrResult<()> {
        self.gates = Vec::with_capacity(gates.len());
        for gate in gates {
            self.add_gate(gate)?;
        }
        Ok(())
    }

    /// Number of gates.
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Number of gates with the given name (`"ry"`, `"cx"`, ...).
    pub fn count_ops(&self, name: &str) -> usize {
        self.gates.iter().filter(|g| g.name() == name).count()
    }

    /// Number of gates acting on more than one qubit.
    pub fn num_multi_qubit_gates(&self) -> usize {
        self.gates.iter().filter(|g| !g.is_single_qubit()).count()
    }

    fn check_qubit(&self, qubit: QubitId, gate_name: Option<String>) -> IrResult<()> {
        if qubit.0 >= self.num_qubits {
            return Err(IrError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
                gate_name,
            });
        }
        Ok(())
    }
}
