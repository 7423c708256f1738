use super::*;
use crate::{Complex32, Complex64, Real, jacobi::singular_values};

fn synthesize<T: Scalar>(rows: usize, cols: usize, spectrum: Spectrum<T::Real>) -> Vec<T> {
    let mut m = vec![T::zero(); rows * cols];
    let layout = BatchLayout::single(MatrixLayout::dense(rows, cols).unwrap());
    Synthesizer::new(spectrum)
        .seed(2024)
        .generate(&mut m, layout, None)
        .unwrap();
    m
}

fn condition_of<T: Scalar>(rows: usize, cols: usize, m: &[T]) -> f64 {
    let sv = singular_values(rows, cols, m, rows);
    sv[0] / sv[sv.len() - 1]
}

#[test]
fn condition_number_is_recovered() {
    for (rows, cols) in [(100, 100), (60, 40), (40, 60)] {
        let m = synthesize::<f64>(rows, cols, Spectrum::Condition(1e6));
        let cond = condition_of(rows, cols, &m);
        let rel = (cond / 1e6 - 1.).abs();
        assert!(rel < 1e-6, "{rows}x{cols}: cond = {cond:e}");
    }
}

#[test]
fn condition_number_is_recovered_complex() {
    let m = synthesize::<Complex64>(30, 20, Spectrum::Condition(1e4));
    let cond = condition_of(30, 20, &m);
    assert!((cond / 1e4 - 1.).abs() < 1e-6, "cond = {cond:e}");
}

#[test]
fn condition_number_single_precision() {
    let m = synthesize::<f32>(30, 30, Spectrum::Condition(1e3));
    let cond = condition_of(30, 30, &m);
    assert!((cond / 1e3 - 1.).abs() < 1e-2, "cond = {cond:e}");

    let m = synthesize::<Complex32>(20, 24, Spectrum::Condition(1e2));
    let cond = condition_of(20, 24, &m);
    assert!((cond / 1e2 - 1.).abs() < 1e-2, "cond = {cond:e}");
}

#[test]
fn exponential_decay_is_recovered() {
    const RATE: f64 = 0.3;
    let m = synthesize::<f64>(40, 25, Spectrum::ExpDecay(RATE));
    let sv = singular_values(40, 25, &m, 40);
    assert_eq!(sv.len(), 25);
    for (i, s) in sv.iter().enumerate() {
        let expect = (-RATE * i as f64).exp();
        assert!((s / expect - 1.).abs() < 1e-8, "σ{i} = {s:e}, expect {expect:e}");
    }
}

fn batch<T: Scalar>(threads: usize, key: StreamKey) -> Vec<T> {
    const ROWS: usize = 12;
    const COLS: usize = 9;
    const OPS: usize = 7;
    let matrix = MatrixLayout::dense(ROWS, COLS).unwrap();
    let layout = BatchLayout::new(matrix, ROWS * COLS, OPS).unwrap();
    let mut m = vec![T::zero(); layout.required_len()];
    Synthesizer::new(Spectrum::Condition(T::Real::of(50.)))
        .seed(11)
        .threads(threads)
        .stream_key(key)
        .generate(&mut m, layout, None)
        .unwrap();
    m
}

#[test]
fn same_seed_same_threads_is_bit_identical() {
    assert_eq!(
        batch::<f64>(3, StreamKey::Worker),
        batch::<f64>(3, StreamKey::Worker)
    );
    assert_eq!(
        batch::<Complex32>(2, StreamKey::Worker),
        batch::<Complex32>(2, StreamKey::Worker)
    );
}

#[test]
fn matrix_keyed_streams_ignore_thread_count() {
    let one = batch::<f64>(1, StreamKey::Matrix);
    assert_eq!(one, batch::<f64>(4, StreamKey::Matrix));
    assert_eq!(one, batch::<f64>(16, StreamKey::Matrix));
}

#[test]
fn worker_keyed_streams_depend_on_thread_count() {
    // 允许的行为：线程数不同，结果不同
    assert_ne!(
        batch::<f64>(1, StreamKey::Worker),
        batch::<f64>(4, StreamKey::Worker)
    );
}

#[test]
fn every_matrix_in_the_batch_is_conditioned() {
    let m = batch::<f64>(3, StreamKey::Worker);
    for (i, a) in m.chunks(12 * 9).enumerate() {
        let cond = condition_of(12, 9, a);
        assert!((cond / 50. - 1.).abs() < 1e-8, "matrix {i}: {cond}");
    }
    // 不同矩阵各不相同
    assert_ne!(m[..12 * 9], m[12 * 9..2 * 12 * 9]);
}

#[test]
fn padding_and_gaps_are_untouched() {
    const SENTINEL: f64 = -7.;
    let matrix = MatrixLayout::new(5, 4, 8).unwrap();
    let layout = BatchLayout::new(matrix, 40, 3).unwrap();
    let mut m = vec![SENTINEL; layout.required_len()];
    Synthesizer::new(Spectrum::ExpDecay(1.))
        .threads(2)
        .generate(&mut m, layout, None)
        .unwrap();
    for (idx, x) in m.iter().enumerate() {
        let local = idx % 40;
        let written = local < matrix.span() && local % 8 < 5;
        assert_eq!(*x == SENTINEL, !written, "element {idx}");
    }
}

#[test]
fn singular_values_are_emitted() {
    let mut m = vec![0.0f64; 3 * 20];
    let mut svals = vec![-1.0f64; 2 * 6 + 4];
    generate_random_matrices(
        &mut m,
        20,
        Some(&mut svals),
        6,
        5,
        4,
        0.,
        0.5,
        1,
        3,
        2,
    )
    .unwrap();
    for op in 0..3 {
        let s = &svals[op * 6..][..4];
        for (i, s) in s.iter().enumerate() {
            assert_eq!(*s, (-0.5 * i as f64).exp());
        }
        if op < 2 {
            assert_eq!(svals[op * 6 + 4..op * 6 + 6], [-1., -1.]);
        }
    }
}

#[test]
fn invalid_configuration_writes_nothing() {
    let mut m = vec![0.0f32; 64];
    let run = |m: &mut [f32], cond, decay, ops, threads| {
        generate_random_matrices(m, 16, None, 0, 4, 4, cond, decay, 0, ops, threads)
    };
    assert_eq!(run(&mut m, 10., 0., 4, 0), Err(ConfigError::NoThreads));
    assert_eq!(run(&mut m, 10., 0., 0, 1), Err(ConfigError::EmptyBatch));
    assert_eq!(run(&mut m, 0.5, 0., 4, 1), Err(ConfigError::Condition(0.5)));
    assert_eq!(run(&mut m, 0., -1., 4, 1), Err(ConfigError::Decay(-1.)));
    assert_eq!(
        run(&mut m, 10., 0., 5, 1),
        Err(ConfigError::BufferTooShort {
            len: 64,
            required: 80
        })
    );
    assert!(m.iter().all(|&x| x == 0.));

    let mut svals = vec![0.0f32; 4];
    assert_eq!(
        generate_random_matrices(&mut m, 16, Some(&mut svals), 4, 4, 4, 10., 0., 0, 2, 1),
        Err(ConfigError::BufferTooShort {
            len: 4,
            required: 8
        })
    );
    assert!(m.iter().all(|&x| x == 0.));
}

#[test]
fn every_worker_gets_work() {
    assert_eq!(runs(5, 4), [2, 1, 1, 1]);
    assert_eq!(runs(7, 3), [3, 2, 2]);
    assert_eq!(runs(8, 4), [2, 2, 2, 2]);
    assert_eq!(runs(2, 6), [1, 1]);
    assert_eq!(runs(1, 1), [1]);
}
