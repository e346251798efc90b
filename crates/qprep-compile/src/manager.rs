//! Pass manager for orchestrating circuit optimization.

use tracing::{debug, info, instrument};

use qprep_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{CancelRedundantGates, DEFAULT_ZERO_TOLERANCE};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given circuit.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} gates",
            self.passes.len(),
            circuit.num_gates()
        );

        for pass in &self.passes {
            if pass.should_run(circuit) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit)?;
                debug!("Pass {} completed, gates: {}", pass.name(), circuit.num_gates());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, gates: {}, cx: {}",
            circuit.num_gates(),
            circuit.count_ops("cx")
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating pass managers with preset configurations.
pub struct PassManagerBuilder {
    /// Optimization level (0-1).
    optimization_level: u8,
    /// Tolerance below which a rotation angle counts as zero.
    zero_tolerance: f64,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            optimization_level: 1,
            zero_tolerance: DEFAULT_ZERO_TOLERANCE,
        }
    }

    /// Set the optimization level.
    ///
    /// - Level 0: No optimization, the decomposer output is kept verbatim
    /// - Level 1: Redundant gate removal (default)
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(1);
        self
    }

    /// Set the zero-angle tolerance used by the optimizer.
    #[must_use]
    pub fn with_zero_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_tolerance = tolerance;
        self
    }

    /// Build the pass manager.
    pub fn build(self) -> CompileResult<PassManager> {
        if !(self.zero_tolerance.is_finite() && self.zero_tolerance >= 0.0) {
            return Err(CompileError::InvalidConfiguration(format!(
                "zero tolerance must be finite and non-negative, got {}",
                self.zero_tolerance
            )));
        }

        let mut pm = PassManager::new();
        if self.optimization_level >= 1 {
            pm.add_pass(CancelRedundantGates::new(self.zero_tolerance));
        }
        Ok(pm)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
