//! Qubit and classical bit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit in the circuit's quantum register.
///
/// Qubit `k` corresponds to bit `k` of a basis-state index, so qubit 0 is
/// the least significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Bit mask selecting this qubit in a basis-state index.
    #[inline]
    pub fn mask(self) -> usize {
        1usize << self.0
    }

    /// Index as `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Index of a bit in the circuit's classical register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A measurement of one qubit into one classical bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Measurement {
    /// The measured qubit.
    pub qubit: QubitId,
    /// The classical bit receiving the outcome.
    pub clbit: ClbitId,
}

impl Measurement {
    /// Create a new measurement.
    pub fn new(qubit: QubitId, clbit: ClbitId) -> Self {
        Self { qubit, clbit }
    }
}
