//! Parser for the `OpenQASM` 2.0 subset produced by the emitter.
//!
//! Accepts a version header, `include` lines, empty `gate` declarations,
//! `qreg`/`creg` declarations, the gates `x`, `cx`, `ccx`, `ry`, `rz` and
//! `crz`, and broadcast or indexed `measure`. Several registers of one kind
//! are flattened in declaration order.

use rustc_hash::FxHashMap;
use tracing::debug;

use qprep_ir::{Circuit, ClbitId, Gate, GateKind, QubitId};

use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse an `OpenQASM` 2.0 source string into a Circuit.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let mut parser = Parser::new(source)?;
    let program = parser.parse_program()?;
    lower_to_circuit(&program)
}

/// A register operand: `q` or `q[3]`.
#[derive(Debug, Clone, PartialEq)]
struct Operand {
    register: String,
    index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
enum Statement {
    QReg {
        name: String,
        size: u32,
    },
    CReg {
        name: String,
        size: u32,
    },
    Gate {
        name: String,
        params: Vec<f64>,
        args: Vec<Operand>,
        line: usize,
    },
    Measure {
        qubit: Operand,
        clbit: Operand,
    },
}

#[derive(Debug, Clone)]
struct Program {
    kernel_gates: Vec<String>,
    statements: Vec<Statement>,
}

/// Parser state.
struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from source.
    fn new(source: &str) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((line, message)) => return Err(ParseError::LexerError { line, message }),
            }
        }
        Ok(Self { tokens, pos: 0 })
    }

    /// Line of the current token, or of the last one at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    /// Peek at the current token.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Advance and return the current token.
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    fn unexpected(&self, expected: &str, found: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            line: self.line(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {expected}")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// Check if current token matches.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<Program> {
        self.expect(Token::OpenQasm)?;
        self.parse_version()?;
        self.expect(Token::Semicolon)?;

        let mut program = Program {
            kernel_gates: vec![],
            statements: vec![],
        };
        while let Some(token) = self.peek().cloned() {
            match token {
                Token::Include => self.parse_include()?,
                Token::Gate => {
                    let name = self.parse_gate_def()?;
                    program.kernel_gates.push(name);
                }
                Token::QReg => {
                    let (name, size) = self.parse_register_decl()?;
                    program.statements.push(Statement::QReg { name, size });
                }
                Token::CReg => {
                    let (name, size) = self.parse_register_decl()?;
                    program.statements.push(Statement::CReg { name, size });
                }
                Token::Measure => program.statements.push(self.parse_measure()?),
                Token::Identifier(_) => program.statements.push(self.parse_gate_call()?),
                other => return Err(self.unexpected("statement", &other)),
            }
        }
        Ok(program)
    }

    /// Parse the version number; only 2.x is accepted.
    fn parse_version(&mut self) -> ParseResult<()> {
        let version = match self.advance() {
            Some(Token::FloatLiteral(v)) => v,
            #[allow(clippy::cast_precision_loss)]
            Some(Token::IntLiteral(v)) => v as f64,
            Some(other) => return Err(ParseError::InvalidVersion(other.to_string())),
            None => return Err(ParseError::UnexpectedEof("version".into())),
        };
        if version.trunc() != 2.0 {
            return Err(ParseError::InvalidVersion(version.to_string()));
        }
        Ok(())
    }

    /// Parse an include statement. The file itself is not read.
    fn parse_include(&mut self) -> ParseResult<()> {
        self.expect(Token::Include)?;
        match self.advance() {
            Some(Token::StringLiteral(file)) => debug!(file, "include"),
            Some(other) => return Err(self.unexpected("file name", &other)),
            None => return Err(ParseError::UnexpectedEof("file name".into())),
        }
        self.expect(Token::Semicolon)
    }

    /// Parse `gate name(params) args { }`. Only empty bodies are supported.
    fn parse_gate_def(&mut self) -> ParseResult<String> {
        self.expect(Token::Gate)?;
        let name = self.parse_identifier()?;
        if self.consume(&Token::LParen) {
            if !self.check(&Token::RParen) {
                self.parse_identifier_list()?;
            }
            self.expect(Token::RParen)?;
        }
        if !self.check(&Token::LBrace) {
            self.parse_identifier_list()?;
        }
        self.expect(Token::LBrace)?;
        if !self.consume(&Token::RBrace) {
            return Err(ParseError::Unsupported {
                line: self.line(),
                message: format!("gate '{name}' has a non-empty body"),
            });
        }
        Ok(name)
    }

    /// Parse `qreg name[size];` or `creg name[size];`.
    fn parse_register_decl(&mut self) -> ParseResult<(String, u32)> {
        self.advance();
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.parse_index()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok((name, size))
    }

    /// Parse `measure q[i] -> c[j];` or `measure q -> c;`.
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Measure)?;
        let qubit = self.parse_operand()?;
        self.expect(Token::Arrow)?;
        let clbit = self.parse_operand()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Measure { qubit, clbit })
    }

    /// Parse `name(params) args;`.
    fn parse_gate_call(&mut self) -> ParseResult<Statement> {
        let line = self.line();
        let name = self.parse_identifier()?;
        let mut params = vec![];
        if self.consume(&Token::LParen) {
            if !self.check(&Token::RParen) {
                params.push(self.parse_expression()?);
                while self.consume(&Token::Comma) {
                    params.push(self.parse_expression()?);
                }
            }
            self.expect(Token::RParen)?;
        }
        let mut args = vec![self.parse_operand()?];
        while self.consume(&Token::Comma) {
            args.push(self.parse_operand()?);
        }
        self.expect(Token::Semicolon)?;
        Ok(Statement::Gate {
            name,
            params,
            args,
            line,
        })
    }

    fn parse_operand(&mut self) -> ParseResult<Operand> {
        let register = self.parse_identifier()?;
        let index = if self.consume(&Token::LBracket) {
            let index = self.parse_index()?;
            self.expect(Token::RBracket)?;
            Some(index)
        } else {
            None
        };
        Ok(Operand { register, index })
    }

    /// Parse an additive expression.
    fn parse_expression(&mut self) -> ParseResult<f64> {
        let mut value = self.parse_term()?;
        loop {
            if self.consume(&Token::Plus) {
                value += self.parse_term()?;
            } else if self.consume(&Token::Minus) {
                value -= self.parse_term()?;
            } else {
                return Ok(value);
            }
        }
    }

    /// Parse a multiplicative expression.
    fn parse_term(&mut self) -> ParseResult<f64> {
        let mut value = self.parse_unary()?;
        loop {
            if self.consume(&Token::Star) {
                value *= self.parse_unary()?;
            } else if self.consume(&Token::Slash) {
                value /= self.parse_unary()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_unary(&mut self) -> ParseResult<f64> {
        if self.consume(&Token::Minus) {
            return Ok(-self.parse_unary()?);
        }
        if self.consume(&Token::Plus) {
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<f64> {
        match self.advance() {
            Some(Token::FloatLiteral(v)) => Ok(v),
            #[allow(clippy::cast_precision_loss)]
            Some(Token::IntLiteral(v)) => Ok(v as f64),
            Some(Token::Pi) => Ok(std::f64::consts::PI),
            Some(Token::LParen) => {
                let value = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(other) => Err(self.unexpected("expression", &other)),
            None => Err(ParseError::UnexpectedEof("expression".into())),
        }
    }

    /// Parse identifier list.
    fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    /// Parse an identifier.
    fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(self.unexpected("identifier", &other)),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    /// Parse a register size or index.
    fn parse_index(&mut self) -> ParseResult<u32> {
        match self.advance() {
            Some(Token::IntLiteral(v)) => u32::try_from(v).map_err(|_| ParseError::Unsupported {
                line: self.line(),
                message: format!("index {v} is too large"),
            }),
            Some(other) => Err(self.unexpected("integer", &other)),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }
}

/// A declared register, flattened into the circuit's index space.
#[derive(Debug, Clone, Copy)]
struct Register {
    offset: u32,
    size: u32,
}

/// Lower a parsed program into a Circuit.
fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut qregs: FxHashMap<&str, Register> = FxHashMap::default();
    let mut cregs: FxHashMap<&str, Register> = FxHashMap::default();
    let mut num_qubits: u32 = 0;
    let mut num_clbits: u32 = 0;

    for stmt in &program.statements {
        let (name, size, quantum) = match stmt {
            Statement::QReg { name, size } => (name.as_str(), *size, true),
            Statement::CReg { name, size } => (name.as_str(), *size, false),
            _ => continue,
        };
        if qregs.contains_key(name) || cregs.contains_key(name) {
            return Err(ParseError::DuplicateDeclaration(name.into()));
        }
        let (registers, total) = if quantum {
            (&mut qregs, &mut num_qubits)
        } else {
            (&mut cregs, &mut num_clbits)
        };
        let offset = *total;
        *total = offset
            .checked_add(size)
            .ok_or_else(|| ParseError::RegisterOverflow(name.into()))?;
        registers.insert(name, Register { offset, size });
    }

    let name = program
        .kernel_gates
        .first()
        .map_or("circuit", String::as_str);
    let mut circuit = Circuit::with_size(name, num_qubits, num_clbits);

    for stmt in &program.statements {
        match stmt {
            Statement::Gate {
                name,
                params,
                args,
                line,
            } => {
                lower_gate_call(&mut circuit, &qregs, name, params, args, *line)?;
            }
            Statement::Measure { qubit, clbit } => {
                let qubits = resolve(&qregs, qubit)?;
                let clbits = resolve(&cregs, clbit)?;
                if qubits.len() != clbits.len() {
                    return Err(ParseError::WrongQubitCount {
                        gate: "measure".into(),
                        expected: clbits.len(),
                        got: qubits.len(),
                    });
                }
                for (q, c) in qubits.into_iter().zip(clbits) {
                    circuit.measure(QubitId(q), ClbitId(c))?;
                }
            }
            Statement::QReg { .. } | Statement::CReg { .. } => {}
        }
    }

    Ok(circuit)
}

/// Resolve an operand to flat indices: one for `r[i]`, all for `r`.
fn resolve(registers: &FxHashMap<&str, Register>, operand: &Operand) -> ParseResult<Vec<u32>> {
    let register = registers
        .get(operand.register.as_str())
        .ok_or_else(|| ParseError::UndefinedRegister(operand.register.clone()))?;
    match operand.index {
        Some(index) if index >= register.size => Err(ParseError::IndexOutOfBounds {
            register: operand.register.clone(),
            index,
            size: register.size,
        }),
        Some(index) => Ok(vec![register.offset + index]),
        None => Ok((register.offset..register.offset + register.size).collect()),
    }
}

/// Lower a gate call. Single-qubit gates broadcast over whole registers.
fn lower_gate_call(
    circuit: &mut Circuit,
    qregs: &FxHashMap<&str, Register>,
    name: &str,
    params: &[f64],
    args: &[Operand],
    line: usize,
) -> ParseResult<()> {
    let (kind, num_params, num_qubits) = match name {
        "x" => (GateKind::X, 0, 1),
        "cx" | "CX" => (GateKind::X, 0, 2),
        "ccx" => (GateKind::X, 0, 3),
        "ry" => (GateKind::Ry, 1, 1),
        "rz" => (GateKind::Rz, 1, 1),
        "crz" => (GateKind::Rz, 1, 2),
        _ => return Err(ParseError::UnknownGate(name.into())),
    };
    if params.len() != num_params {
        return Err(ParseError::WrongParameterCount {
            gate: name.into(),
            expected: num_params,
            got: params.len(),
        });
    }
    if args.len() != num_qubits {
        return Err(ParseError::WrongQubitCount {
            gate: name.into(),
            expected: num_qubits,
            got: args.len(),
        });
    }

    let angle = params.first().copied();
    if num_qubits == 1 {
        for q in resolve(qregs, &args[0])? {
            circuit.add_gate(Gate::new(kind, angle, vec![QubitId(q)], vec![])?)?;
        }
        return Ok(());
    }

    let mut qubits = Vec::with_capacity(num_qubits);
    for arg in args {
        match resolve(qregs, arg)?.as_slice() {
            [q] => qubits.push(QubitId(*q)),
            _ => {
                return Err(ParseError::Unsupported {
                    line,
                    message: format!("register broadcast in multi-qubit gate '{name}'"),
                });
            }
        }
    }
    let target = qubits.pop().into_iter().collect();
    circuit.add_gate(Gate::new(kind, angle, target, qubits)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_4, PI};

    #[test]
    fn test_parse_emitted_listing() {
        let source = r#"// Code generated by qprep
OPENQASM 2.0;

include "qelib1.inc";

gate kernel(param0)  {
}

qreg var0[2];
ry(0.000000e+00) var0[1];
ry(7.853982e-01) var0[0];
cx var0[1], var0[0];
ry(7.853982e-01) var0[0];
cx var0[1], var0[0];
creg var1[2];
measure var0 -> var1;
"#;
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.name(), "kernel");
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.num_gates(), 5);
        assert_eq!(circuit.count_ops("cx"), 2);
        assert!(circuit.measures_all_in_order());

        let cx = &circuit.gates()[2];
        assert_eq!(cx.controls, vec![QubitId(1)]);
        assert_eq!(cx.target(), QubitId(0));
        assert!((circuit.gates()[1].angle.unwrap() - FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_parse_pi_expressions() {
        let source = "OPENQASM 2.0;\nqreg q[1];\nrz(-pi/2) q[0];\nry(2*pi/4 + 0.5) q[0];\nrz((1+1)*pi) q[0];";
        let circuit = parse(source).unwrap();
        let angles: Vec<f64> = circuit.gates().iter().filter_map(|g| g.angle).collect();
        assert!((angles[0] + PI / 2.0).abs() < 1e-12);
        assert!((angles[1] - (PI / 2.0 + 0.5)).abs() < 1e-12);
        assert!((angles[2] - 2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_parse_multiple_registers() {
        let source = "OPENQASM 2.0;\nqreg a[2];\nqreg b[1];\ncreg c[1];\nccx a[0], a[1], b[0];\ncrz(0.5) b[0], a[1];\nmeasure b[0] -> c[0];";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.gates()[0].target(), QubitId(2));
        assert_eq!(circuit.gates()[0].name(), "ccx");
        assert_eq!(circuit.gates()[1].name(), "crz");
        assert_eq!(circuit.measurements()[0].qubit, QubitId(2));
    }

    #[test]
    fn test_parse_broadcast_single_qubit_gate() {
        let circuit = parse("OPENQASM 2.0;\nqreg q[3];\nx q;").unwrap();
        assert_eq!(circuit.count_ops("x"), 3);
    }

    #[test]
    fn test_parse_indexed_measure() {
        let source = "OPENQASM 2.0;\nqreg q[2];\ncreg c[2];\nmeasure q[1] -> c[0];";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.measurements().len(), 1);
        assert!(!circuit.measures_all_in_order());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("OPENQASM 3.0;"),
            Err(ParseError::InvalidVersion(_))
        ));
        assert!(matches!(
            parse("OPENQASM 2.0;\nqreg q[1];\nh q[0];"),
            Err(ParseError::UnknownGate(ref g)) if g == "h"
        ));
        assert!(matches!(
            parse("OPENQASM 2.0;\nqreg q[1];\nx r[0];"),
            Err(ParseError::UndefinedRegister(_))
        ));
        assert!(matches!(
            parse("OPENQASM 2.0;\nqreg q[1];\nx q[1];"),
            Err(ParseError::IndexOutOfBounds { index: 1, size: 1, .. })
        ));
        assert!(matches!(
            parse("OPENQASM 2.0;\nqreg q[1];\nqreg q[2];"),
            Err(ParseError::DuplicateDeclaration(_))
        ));
        assert!(matches!(
            parse("OPENQASM 2.0;\nqreg q[1];\nry q[0];"),
            Err(ParseError::WrongParameterCount { .. })
        ));
        assert!(matches!(
            parse("OPENQASM 2.0;\nqreg q[2];\ncx q[0];"),
            Err(ParseError::WrongQubitCount { .. })
        ));
        assert!(matches!(
            parse("OPENQASM 2.0;\nqreg q[2];\ncx q[0], q[0];"),
            Err(ParseError::CircuitError(_))
        ));
        assert!(matches!(
            parse("OPENQASM 2.0;\ngate g a { x a; }"),
            Err(ParseError::Unsupported { .. })
        ));
        assert!(matches!(
            parse("OPENQASM 2.0;\nqreg q[1];\nx q[0]"),
            Err(ParseError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn test_multi_qubit_broadcast_is_unsupported() {
        let err = parse("OPENQASM 2.0;\nqreg a[2];\nqreg b[2];\ncx a, b;").unwrap_err();
        assert!(matches!(err, ParseError::Unsupported { line: 4, .. }));
    }

    #[test]
    fn test_unexpected_token_reports_line() {
        let err = parse("OPENQASM 2.0;\nqreg q[1];\n\nx q[0] q[0];").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { line: 4, .. }));
    }

    #[test]
    fn test_register_total_overflow() {
        let err = parse("OPENQASM 2.0;\nqreg a[4000000000];\nqreg b[4000000000];\n").unwrap_err();
        assert!(matches!(err, ParseError::RegisterOverflow(ref name) if name == "b"));

        let err = parse("OPENQASM 2.0;\ncreg c[4294967295];\ncreg d[1];\n").unwrap_err();
        assert!(matches!(err, ParseError::RegisterOverflow(ref name) if name == "d"));
    }
}
