//! Pass trait for circuit transformations.

use qprep_ir::Circuit;

use crate::error::CompileResult;

/// A compilation pass that rewrites a circuit in place.
///
/// Passes must be deterministic: the same input circuit always yields the
/// same output circuit.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Run the pass on the given circuit.
    fn run(&self, circuit: &mut Circuit) -> CompileResult<()>;

    /// Check if this pass should run on the current circuit.
    ///
    /// This can be overridden to skip passes that are not needed.
    fn should_run(&self, _circuit: &Circuit) -> bool {
        true
    }
}
