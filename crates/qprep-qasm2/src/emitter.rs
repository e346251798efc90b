//! OpenQASM 2.0 emitter for serializing circuits.

use qprep_ir::{Circuit, Gate, GateKind};
use tracing::{debug, instrument};

use crate::error::{EmitError, EmitResult};

/// Options controlling the emitted listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Kernel name, declared as an empty gate in the listing.
    pub kernel_name: String,
    /// Tool name written in the leading `// Code generated by` comment.
    pub generator: String,
    /// Library file named in the `include` line.
    pub include: String,
    /// Prefix of the generated register names (`var0`, `var1`, ...).
    pub register_prefix: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            kernel_name: "kernel".into(),
            generator: "qprep".into(),
            include: "qelib1.inc".into(),
            register_prefix: "var".into(),
        }
    }
}

/// Emit a circuit as an OpenQASM 2.0 listing.
///
/// The quantum register takes the first generated name and the classical
/// register the next. Identical input always yields byte-identical output.
#[instrument(skip_all, fields(circuit = circuit.name(), gates = circuit.num_gates()))]
pub fn emit(circuit: &Circuit, options: &EmitOptions) -> EmitResult<String> {
    let mut emitter = Qasm2Emitter::new(options);
    emitter.emit_circuit(circuit)?;
    debug!(bytes = emitter.output.len(), "emitted listing");
    Ok(emitter.output)
}

/// Format an angle like C's `%.6e`: `7.853982e-01`, `0.000000e+00`.
///
/// Rounds half away from zero on the shortest decimal representation that
/// round-trips to `value`. Negative zero prints as zero. The caller must
/// reject non-finite values.
pub fn format_angle(value: f64) -> String {
    if value == 0.0 {
        return "0.000000e+00".into();
    }

    // `{:e}` gives the shortest round-trip digits, e.g. `7.853981633974483e-1`.
    let shortest = format!("{:e}", value.abs());
    let (mantissa, exponent) = shortest.split_once('e').unwrap_or((shortest.as_str(), "0"));
    let mut exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: Vec<u8> = mantissa
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();

    let mut kept = [0u8; 7];
    for (slot, &d) in kept.iter_mut().zip(&digits) {
        *slot = d;
    }
    if digits.get(7).is_some_and(|&d| d >= 5) && round_up(&mut kept) {
        kept = [1, 0, 0, 0, 0, 0, 0];
        exponent += 1;
    }

    let mut out = String::with_capacity(14);
    if value < 0.0 {
        out.push('-');
    }
    out.push(char::from(b'0' + kept[0]));
    out.push('.');
    out.extend(kept[1..].iter().map(|&d| char::from(b'0' + d)));
    out.push('e');
    out.push(if exponent < 0 { '-' } else { '+' });
    out.push_str(&format!("{:02}", exponent.unsigned_abs()));
    out
}

/// Add one unit in the last place. Returns true on overflow past `9.999999`.
fn round_up(digits: &mut [u8; 7]) -> bool {
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            return false;
        }
    }
    true
}

/// Kernel name restricted to `[A-Za-z0-9_]`, starting with a letter.
pub fn kernel_gate_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !sanitized.starts_with(|c: char| c.is_ascii_alphabetic()) {
        sanitized.insert(0, 'k');
    }
    sanitized
}

/// Deterministic register namer: `var0`, `var1`, ...
struct RegisterNames<'a> {
    prefix: &'a str,
    next: u32,
}

impl RegisterNames<'_> {
    fn fresh(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}

/// OpenQASM 2.0 emitter.
struct Qasm2Emitter<'a> {
    options: &'a EmitOptions,
    names: RegisterNames<'a>,
    output: String,
}

impl<'a> Qasm2Emitter<'a> {
    fn new(options: &'a EmitOptions) -> Self {
        Self {
            options,
            names: RegisterNames {
                prefix: &options.register_prefix,
                next: 0,
            },
            output: String::new(),
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) -> EmitResult<()> {
        // Header
        self.writeln(&format!("// Code generated by {}", self.options.generator));
        self.writeln("OPENQASM 2.0;");
        self.writeln("");
        self.writeln(&format!("include \"{}\";", self.options.include));
        self.writeln("");

        // Kernel declaration
        let kernel = kernel_gate_name(&self.options.kernel_name);
        self.writeln(&format!("gate {kernel}(param0)  {{"));
        self.writeln("}");
        self.writeln("");

        let qreg = self.names.fresh();
        if circuit.num_qubits() > 0 {
            self.writeln(&format!("qreg {qreg}[{}];", circuit.num_qubits()));
        }

        for gate in circuit.gates() {
            let line = gate_line(gate, &qreg)?;
            self.writeln(&line);
        }

        if circuit.num_clbits() > 0 {
            let creg = self.names.fresh();
            self.writeln(&format!("creg {creg}[{}];", circuit.num_clbits()));

            if circuit.measures_all_in_order() {
                self.writeln(&format!("measure {qreg} -> {creg};"));
            } else {
                for m in circuit.measurements() {
                    self.writeln(&format!(
                        "measure {qreg}[{}] -> {creg}[{}];",
                        m.qubit.0, m.clbit.0
                    ));
                }
            }
        }

        Ok(())
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// One gate instance line, e.g. `cx var0[1], var0[0];`.
fn gate_line(gate: &Gate, qreg: &str) -> EmitResult<String> {
    let controls = gate.controls.len();
    let name = match (gate.kind, controls) {
        (GateKind::X, 0..=2) | (GateKind::Ry, 0) | (GateKind::Rz, 0..=1) => gate.name(),
        _ => {
            return Err(EmitError::UnsupportedGate {
                gate: gate.name(),
                controls,
            });
        }
    };

    let operands = gate
        .qubits()
        .map(|q| format!("{qreg}[{}]", q.0))
        .collect::<Vec<_>>()
        .join(", ");

    match gate.angle {
        Some(angle) if !angle.is_finite() => Err(EmitError::NonFiniteAngle {
            gate: name,
            angle,
        }),
        Some(angle) => Ok(format!("{name}({}) {operands};", format_angle(angle))),
        None => Ok(format!("{name} {operands};")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qprep_ir::{ClbitId, QubitId};
    use std::f64::consts::{FRAC_PI_4, PI};

    #[test]
    fn test_format_angle() {
        assert_eq!(format_angle(FRAC_PI_4), "7.853982e-01");
        assert_eq!(format_angle(0.0), "0.000000e+00");
        assert_eq!(format_angle(-0.0), "0.000000e+00");
        assert_eq!(format_angle(PI), "3.141593e+00");
        assert_eq!(format_angle(-PI / 2.0), "-1.570796e+00");
        assert_eq!(format_angle(1.0), "1.000000e+00");
        assert_eq!(format_angle(12345.0), "1.234500e+04");
        assert_eq!(format_angle(1e-120), "1.000000e-120");
    }

    #[test]
    fn test_format_angle_rounds_half_away_from_zero() {
        assert_eq!(format_angle(1.0000005), "1.000001e+00");
        assert_eq!(format_angle(-1.0000005), "-1.000001e+00");
        assert_eq!(format_angle(1.0000004999), "1.000000e+00");
        assert_eq!(format_angle(9.9999995), "1.000000e+01");
    }

    #[test]
    fn test_kernel_gate_name() {
        assert_eq!(kernel_gate_name("kernel"), "kernel");
        assert_eq!(kernel_gate_name("my-kernel::v2"), "my_kernel__v2");
        assert_eq!(kernel_gate_name("_ZN6kernel"), "k_ZN6kernel");
        assert_eq!(kernel_gate_name("9lives"), "k9lives");
        assert_eq!(kernel_gate_name(""), "k");
    }

    #[test]
    fn test_emit_layout() {
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.ry(PI / 2.0, QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure_all().unwrap();

        let qasm = emit(&circuit, &EmitOptions::default()).unwrap();
        let expected = "\
// Code generated by qprep
OPENQASM 2.0;

include \"qelib1.inc\";

gate kernel(param0)  {
}

qreg var0[2];
ry(1.570796e+00) var0[0];
cx var0[0], var0[1];
creg var1[2];
measure var0 -> var1;
";
        assert_eq!(qasm, expected);
    }

    #[test]
    fn test_emit_partial_measurement() {
        let mut circuit = Circuit::with_size("t", 2, 1);
        circuit.x(QubitId(1)).unwrap();
        circuit.measure(QubitId(1), ClbitId(0)).unwrap();

        let qasm = emit(&circuit, &EmitOptions::default()).unwrap();
        assert!(qasm.contains("creg var1[1];\n"));
        assert!(qasm.contains("measure var0[1] -> var1[0];\n"));
        assert!(!qasm.contains("measure var0 -> var1;"));
    }

    #[test]
    fn test_emit_without_clbits() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        circuit.x(QubitId(0)).unwrap();
        let qasm = emit(&circuit, &EmitOptions::default()).unwrap();
        assert!(qasm.ends_with("x var0[0];\n"));
        assert!(!qasm.contains("creg"));
    }

    #[test]
    fn test_emit_controlled_gates() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        circuit
            .add_gate(Gate::x(QubitId(2)).controlled_by([QubitId(0), QubitId(1)]))
            .unwrap();
        circuit
            .add_gate(Gate::rz(PI, QubitId(0)).controlled_by([QubitId(2)]))
            .unwrap();

        let qasm = emit(&circuit, &EmitOptions::default()).unwrap();
        assert!(qasm.contains("ccx var0[0], var0[1], var0[2];\n"));
        assert!(qasm.contains("crz(3.141593e+00) var0[2], var0[0];\n"));
    }

    #[test]
    fn test_emit_custom_options() {
        let circuit = Circuit::with_size("t", 1, 1);
        let options = EmitOptions {
            kernel_name: "prep".into(),
            generator: "unit test".into(),
            include: "stdgates.inc".into(),
            register_prefix: "r".into(),
        };
        let qasm = emit(&circuit, &options).unwrap();
        assert!(qasm.starts_with("// Code generated by unit test\n"));
        assert!(qasm.contains("include \"stdgates.inc\";\n"));
        assert!(qasm.contains("gate prep(param0)  {\n}\n"));
        assert!(qasm.contains("qreg r0[1];\n"));
        assert!(qasm.contains("creg r1[1];\n"));
    }

    #[test]
    fn test_emit_rejects_unsupported_gates() {
        let mut circuit = Circuit::with_size("t", 4, 0);
        circuit
            .add_gate(Gate::ry(1.0, QubitId(0)).controlled_by([QubitId(1)]))
            .unwrap();
        let err = emit(&circuit, &EmitOptions::default()).unwrap_err();
        assert!(matches!(err, EmitError::UnsupportedGate { ref gate, controls: 1 } if gate == "cry"));

        let mut circuit = Circuit::with_size("t", 4, 0);
        circuit
            .add_gate(Gate::x(QubitId(0)).controlled_by([QubitId(1), QubitId(2), QubitId(3)]))
            .unwrap();
        assert!(matches!(
            emit(&circuit, &EmitOptions::default()),
            Err(EmitError::UnsupportedGate { controls: 3, .. })
        ));
    }

    #[test]
    fn test_emit_rejects_non_finite_angle() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        circuit.rz(f64::NAN, QubitId(0)).unwrap();
        assert!(matches!(
            emit(&circuit, &EmitOptions::default()),
            Err(EmitError::NonFiniteAngle { .. })
        ));
    }

    #[test]
    fn test_emit_is_deterministic() {
        let mut circuit = Circuit::with_size("t", 2, 2);
        circuit.ry(0.3, QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(0)).unwrap();
        circuit.measure_all().unwrap();
        let options = EmitOptions::default();
        assert_eq!(emit(&circuit, &options), emit(&circuit, &options));
    }
}
