//! Benchmarks for state-preparation lowering
//!
//! Run with: cargo bench -p qprep-compile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use num_complex::Complex64;
use qprep_compile::{AmplitudeVector, PassManagerBuilder, decompose};

/// A deterministic complex state with distinct magnitudes and phases.
#[allow(clippy::cast_precision_loss)]
fn spiral_state(num_qubits: u32) -> Vec<Complex64> {
    let len = 1usize << num_qubits;
    let raw: Vec<Complex64> = (0..len)
        .map(|i| Complex64::from_polar(1.0 + i as f64, 0.37 * i as f64))
        .collect();
    let norm = raw.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt();
    raw.into_iter().map(|a| a / norm).collect()
}

/// Benchmark validation and rescaling
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for num_qubits in &[4u32, 8, 12] {
        let amplitudes = spiral_state(*num_qubits);
        group.bench_with_input(
            BenchmarkId::new("complex", num_qubits),
            &amplitudes,
            |b, amplitudes| {
                b.iter(|| AmplitudeVector::new(black_box(amplitudes), 1e-6).unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark the multiplexor cascades
fn bench_decompose(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompose");

    for num_qubits in &[2u32, 4, 6, 8, 10] {
        let state = AmplitudeVector::new(&spiral_state(*num_qubits), 1e-6).unwrap();
        group.bench_with_input(
            BenchmarkId::new("complex", num_qubits),
            &state,
            |b, state| {
                b.iter(|| decompose(black_box(state), "bench").unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark the redundant-gate sweep on freshly decomposed circuits
fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    let pm = PassManagerBuilder::new().build().unwrap();

    for num_qubits in &[4u32, 8, 10] {
        let state = AmplitudeVector::new(&spiral_state(*num_qubits), 1e-6).unwrap();
        let circuit = decompose(&state, "bench").unwrap();
        group.bench_with_input(
            BenchmarkId::new("cancel_redundant", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    let mut circuit = circuit.clone();
                    pm.run(&mut circuit).unwrap();
                    circuit
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_decompose, bench_optimize);

criterion_main!(benches);
