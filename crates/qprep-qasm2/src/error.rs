//! Error types for the OpenQASM 2.0 emitter and reader.

use thiserror::Error;

/// Errors that can occur while emitting a circuit.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EmitError {
    /// The gate has no OpenQASM 2.0 spelling in `qelib1.inc`.
    #[error("Gate '{gate}' with {controls} control(s) cannot be expressed in OpenQASM 2.0")]
    UnsupportedGate { gate: String, controls: usize },

    /// A rotation angle is NaN or infinite.
    #[error("Gate '{gate}' has non-finite angle {angle}")]
    NonFiniteAngle { gate: String, angle: f64 },
}

/// Result type for emission.
pub type EmitResult<T> = Result<T, EmitError>;

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Lexer error at line {line}: {message}")]
    LexerError { line: usize, message: String },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// Invalid version.
    #[error("Invalid OPENQASM version: {0}")]
    InvalidVersion(String),

    /// Undefined register.
    #[error("Undefined register: {0}")]
    UndefinedRegister(String),

    /// Duplicate declaration.
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// Gate not in the supported subset.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// Wrong number of arguments.
    #[error("Gate '{gate}' expects {expected} qubits, got {got}")]
    WrongQubitCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Wrong number of parameters.
    #[error("Gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Index out of bounds.
    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: u32,
        size: u32,
    },

    /// Declared registers hold more bits than a circuit can address.
    #[error("Register '{0}' overflows the total register size")]
    RegisterOverflow(String),

    /// Statement outside the supported subset.
    #[error("Unsupported statement at line {line}: {message}")]
    Unsupported { line: usize, message: String },

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] qprep_ir::IrError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
