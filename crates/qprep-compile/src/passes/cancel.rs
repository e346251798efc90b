//! Redundant gate removal.

use qprep_ir::{Circuit, Gate};
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::Pass;

/// Default tolerance below which a rotation angle is treated as zero.
pub const DEFAULT_ZERO_TOLERANCE: f64 = 1e-9;

/// Gate sequence optimizer.
///
/// Sweeps the gate list once, left to right, keeping the output on a stack:
///
/// - rotations with `|θ| <= tolerance` are dropped,
/// - a rotation following a rotation of the same kind on the same operands
///   is merged into it (`R(a)·R(b) = R(a+b)`), and the pair disappears if the
///   sum is within tolerance,
/// - a gate that exactly inverts the previous output gate cancels it
///   (`CX·CX = I`).
///
/// Gates are never reordered. Because cancellation exposes the gate beneath
/// on the stack, chains such as `CX ry(0) CX` collapse completely, and the
/// output contains no adjacent reducible pair, so a second run is a no-op.
pub struct CancelRedundantGates {
    tolerance: f64,
}

/// Counts reported by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Gates dropped as zero rotations.
    pub zero_rotations: usize,
    /// Rotation pairs merged.
    pub merged: usize,
    /// Inverse pairs cancelled.
    pub cancelled: usize,
}

impl CancelRedundantGates {
    /// Create a new pass with the given zero-angle tolerance.
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn is_identity(&self, gate: &Gate) -> bool {
        gate.angle.is_some_and(|a| a.abs() <= self.tolerance)
    }

    /// Reduce a gate list.
    pub fn sweep(&self, gates: Vec<Gate>) -> (Vec<Gate>, SweepStats) {
        let mut stats = SweepStats::default();
        let mut out: Vec<Gate> = Vec::with_capacity(gates.len());

        for gate in gates {
            if self.is_identity(&gate) {
                stats.zero_rotations += 1;
                continue;
            }

            let Some(prev) = out.last_mut() else {
                out.push(gate);
                continue;
            };

            if prev.is_inverse_of(&gate) {
                out.pop();
                stats.cancelled += 1;
            } else if gate.kind.is_rotation() && prev.same_operation(&gate) {
                let merged = prev.angle.unwrap_or(0.0) + gate.angle.unwrap_or(0.0);
                stats.merged += 1;
                if merged.abs() <= self.tolerance {
                    out.pop();
                } else {
                    prev.angle = Some(merged);
                }
            } else {
                out.push(gate);
            }
        }

        (out, stats)
    }
}

impl Default for CancelRedundantGates {
    fn default() -> Self {
        Self::new(DEFAULT_ZERO_TOLERANCE)
    }
}

impl Pass for CancelRedundantGates {
    fn name(&self) -> &'static str {
        "CancelRedundantGates"
    }

    fn run(&self, circuit: &mut Circuit) -> CompileResult<()> {
        let before = circuit.num_gates();
        let (gates, stats) = self.sweep(circuit.take_gates());
        circuit.set_gates(gates)?;
        debug!(
            before,
            after = circuit.num_gates(),
            zero_rotations = stats.zero_rotations,
            merged = stats.merged,
            cancelled = stats.cancelled,
            "redundant gates removed"
        );
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit) -> bool {
        circuit.num_gates() > 0
    }
}
