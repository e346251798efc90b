//! Built-in compilation passes.

mod cancel;

pub use cancel::{CancelRedundantGates, DEFAULT_ZERO_TOLERANCE, SweepStats};
