//! Gate types.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::qubit::QubitId;

/// The operation a gate performs on its target qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    /// Rotation around the Y axis: `Ry(θ) = exp(-iθY/2)`.
    Ry,
    /// Rotation around the Z axis: `Rz(θ) = exp(-iθZ/2)`.
    Rz,
    /// Pauli-X (bit flip). With one control this is CNOT.
    X,
}

impl GateKind {
    /// Base name of the operation, without control prefixes.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            GateKind::Ry => "ry",
            GateKind::Rz => "rz",
            GateKind::X => "x",
        }
    }

    /// Whether this kind carries a rotation angle.
    #[inline]
    pub fn is_rotation(self) -> bool {
        matches!(self, GateKind::Ry | GateKind::Rz)
    }
}

/// A gate instance: an operation, its angle, and its operands.
///
/// Rotation kinds always carry `Some(angle)` in radians, `X` carries `None`.
/// Every gate has exactly one target. Controls are applied on the
/// computational `|1⟩` state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The operation.
    pub kind: GateKind,
    /// Rotation angle in radians, present only for rotation kinds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub angle: Option<f64>,
    /// Target qubits.
    pub targets: Vec<QubitId>,
    /// Control qubits.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub controls: Vec<QubitId>,
}

impl Gate {
    /// Create a gate, validating angle presence and operand shape.
    pub fn new(
        kind: GateKind,
        angle: Option<f64>,
        targets: Vec<QubitId>,
        controls: Vec<QubitId>,
    ) -> IrResult<Self> {
        let gate = Self {
            kind,
            angle,
            targets,
            controls,
        };
        gate.validate()?;
        Ok(gate)
    }

    /// Single-qubit Y rotation.
    pub fn ry(theta: f64, target: QubitId) -> Self {
        Self::rotation(GateKind::Ry, theta, target)
    }

    /// Single-qubit Z rotation.
    pub fn rz(theta: f64, target: QubitId) -> Self {
        Self::rotation(GateKind::Rz, theta, target)
    }

    /// Pauli-X.
    pub fn x(target: QubitId) -> Self {
        Self {
            kind: GateKind::X,
            angle: None,
            targets: vec![target],
            controls: vec![],
        }
    }

    /// Controlled-X (CNOT).
    pub fn cx(control: QubitId, target: QubitId) -> Self {
        Self::x(target).controlled_by([control])
    }

    fn rotation(kind: GateKind, theta: f64, target: QubitId) -> Self {
        Self {
            kind,
            angle: Some(theta),
            targets: vec![target],
            controls: vec![],
        }
    }

    /// Add control qubits to this gate.
    #[must_use]
    pub fn controlled_by(mut self, controls: impl IntoIterator<Item = QubitId>) -> Self {
        self.controls.extend(controls);
        self
    }

    /// Check the structural invariants of the gate.
    pub fn validate(&self) -> IrResult<()> {
        match (self.kind.is_rotation(), self.angle) {
            (true, None) => return Err(IrError::MissingAngle(self.name())),
            (false, Some(_)) => return Err(IrError::UnexpectedAngle(self.name())),
            _ => {}
        }
        if self.targets.len() != 1 {
            return Err(IrError::TargetCountMismatch {
                gate_name: self.name(),
                expected: 1,
                got: self.targets.len(),
            });
        }
        let mut seen: Vec<QubitId> = Vec::with_capacity(self.controls.len() + 1);
        for &q in self.qubits() {
            if seen.contains(&q) {
                return Err(IrError::DuplicateQubit {
                    qubit: q,
                    gate_name: Some(self.name()),
                });
            }
            seen.push(q);
        }
        Ok(())
    }

    /// Name with one `c` prefix per control, e.g. `cx`, `ccx`, `crz`.
    pub fn name(&self) -> String {
        let mut name = "c".repeat(self.controls.len());
        name.push_str(self.kind.name());
        name
    }

    /// The single target qubit.
    #[inline]
    pub fn target(&self) -> QubitId {
        self.targets[0]
    }

    /// All operands, controls first.
    pub fn qubits(&self) -> impl Iterator<Item = &QubitId> {
        self.controls.iter().chain(self.targets.iter())
    }

    /// Whether the gate has no controls.
    #[inline]
    pub fn is_single_qubit(&self) -> bool {
        self.controls.is_empty()
    }

    /// The inverse gate. Rotations negate their angle, X is self-inverse.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inv = self.clone();
        inv.angle = self.angle.map(|a| -a);
        inv
    }

    /// Whether `other` acts on exactly the same operands with the same kind.
    pub fn same_operation(&self, other: &Gate) -> bool {
        self.kind == other.kind && self.targets == other.targets && self.controls == other.controls
    }

    /// Whether `self` followed by `other` is exactly the identity.
    pub fn is_inverse_of(&self, other: &Gate) -> bool {
        if !self.same_operation(other) {
            return false;
        }
        match (self.angle, other.angle) {
            (None, None) => true,
            (Some(a), Some(b)) => a + b == 0.0,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_gate_names() {
        assert_eq!(Gate::ry(PI, QubitId(0)).name(), "ry");
        assert_eq!(Gate::cx(QubitId(1), QubitId(0)).name(), "cx");
        assert_eq!(
            Gate::x(QubitId(0))
                .controlled_by([QubitId(1), QubitId(2)])
                .name(),
            "ccx"
        );
        assert_eq!(
            Gate::rz(0.5, QubitId(0)).controlled_by([QubitId(1)]).name(),
            "crz"
        );
    }

    #[test]
    fn test_new_validates_angle() {
        let err = Gate::new(GateKind::Ry, None, vec![QubitId(0)], vec![]).unwrap_err();
        assert!(matches!(err, IrError::MissingAngle(_)));

        let err = Gate::new(GateKind::X, Some(1.0), vec![QubitId(0)], vec![]).unwrap_err();
        assert!(matches!(err, IrError::UnexpectedAngle(_)));
    }

    #[test]
    fn test_new_rejects_duplicate_operands() {
        let err = Gate::new(GateKind::X, None, vec![QubitId(0)], vec![QubitId(0)]).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_new_rejects_multiple_targets() {
        let err =
            Gate::new(GateKind::X, None, vec![QubitId(0), QubitId(1)], vec![]).unwrap_err();
        assert!(matches!(
            err,
            IrError::TargetCountMismatch {
                expected: 1,
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_inverse() {
        let g = Gate::ry(0.25, QubitId(2));
        assert!(g.is_inverse_of(&g.inverse()));
        assert!(!g.is_inverse_of(&g));

        let cx = Gate::cx(QubitId(0), QubitId(1));
        assert!(cx.is_inverse_of(&cx));
        assert!(!cx.is_inverse_of(&Gate::cx(QubitId(1), QubitId(0))));
    }

    #[test]
    fn test_serde_skips_absent_fields() {
        let json = serde_json::to_string(&Gate::x(QubitId(0))).unwrap();
        assert!(!json.contains("angle"));
        assert!(!json.contains("controls"));

        let back: Gate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Gate::x(QubitId(0)));
    }
}
