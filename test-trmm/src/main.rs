mod batch;
mod trmm;

#[cfg(nvidia)]
mod gpu;

use anyhow::{Result, ensure};
use batch::{operands, operands_mut};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{debug, error, info, warn};
use num_traits::{Float, Zero};
use std::{io::Write, process::ExitCode};
use test_utils::{
    BatchLayout, Complex32, Complex64, MatrixLayout, Real, Scalar, TestOptions, Verdict,
    avg_and_stdev, generate_random, get_max_error_matrix, gettime, write_matrix,
};
use trmm::{Blocked, Reference, Trmm, TrmmConfig, TrmmParams, flops};

const ALPHA: f64 = 0.29;

/// Tests triangular matrix multiply against a host reference.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    opts: TestOptions,
    /// Element type
    #[arg(long, value_enum, default_value_t = Precision::D)]
    precision: Precision,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Precision {
    /// f32
    S,
    /// f64
    D,
    /// Complex<f32>
    C,
    /// Complex<f64>
    Z,
}

#[cfg(nvidia)]
trait Element: Scalar + cublas::TrmmScalar {}
#[cfg(nvidia)]
impl<T: Scalar + cublas::TrmmScalar> Element for T {}

#[cfg(not(nvidia))]
trait Element: Scalar {}
#[cfg(not(nvidia))]
impl<T: Scalar> Element for T {}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let Args { opts, precision } = Args::parse();
    opts.validate()?;
    debug!("{opts:#?}");
    match precision {
        Precision::S => run_with::<f32>(&opts),
        Precision::D => run_with::<f64>(&opts),
        Precision::C => run_with::<Complex32>(&opts),
        Precision::Z => run_with::<Complex64>(&opts),
    }
}

fn run_with<T: Element>(opts: &TestOptions) -> Result<()> {
    let alpha = T::from_real(T::Real::of(ALPHA));

    #[cfg(nvidia)]
    if let Some(ans) = gpu_sweep(opts, alpha) {
        return ans;
    }

    let config = TrmmConfig {
        nb: opts.nb,
        db: opts.db,
        custom: opts.custom,
    };
    info!("testing the host blocked kernel with {config:?}");
    if opts.nstream > 1 {
        warn!("--nstream {} has no effect on the host kernel", opts.nstream)
    }
    sweep(opts, alpha, &mut [Blocked::new(config)])
}

#[cfg(nvidia)]
fn gpu_sweep<T: Element>(opts: &TestOptions, alpha: T) -> Option<Result<()>> {
    if let Err(cuda::NoDevice) = cuda::init() {
        warn!("no gpu found");
        return None;
    }
    let devices = opts.devices();
    let id = devices[0];
    if usize::try_from(id).map_or(true, |i| i >= cuda::Device::count()) {
        warn!("device {id} does not exist");
        return None;
    }
    if devices.len() > 1 {
        warn!("{} devices requested, only device {id} is used", devices.len());
    }

    let dev = cuda::Device::new(id);
    info!(
        "testing cuBLAS on device {id}: {} (compute {}, {} MiB)",
        dev.name(),
        dev.compute_capability(),
        dev.total_memory() >> 20
    );
    Some(dev.context().apply(|ctx| {
        let streams = (0..opts.nstream).map(|_| ctx.stream()).collect::<Vec<_>>();
        let mut kernels = streams.iter().map(gpu::CublasTrmm::new).collect::<Vec<_>>();
        sweep(opts, alpha, &mut kernels)
    }))
}

/// Matrix `i` of every batch runs on `kernels[i % kernels.len()]`.
fn sweep<T: Scalar>(opts: &TestOptions, alpha: T, kernels: &mut [impl Trmm<T>]) -> Result<()> {
    let p = TrmmParams {
        side: opts.side,
        uplo: opts.uplo,
        trans: opts.trans_a,
        diag: opts.diag,
    };
    let tolerance = T::Real::of(opts.tolerance);
    let start = gettime();
    info!(
        "{p:?}, alpha = {alpha:e}, batch = {} ({}), {} kernel(s)",
        opts.batch,
        if opts.strided { "strided" } else { "array of pointers" },
        kernels.len()
    );
    println!("    M     N |  kernel ms (   ±   )  GFlop/s | ref ms  GFlop/s |    error");

    let mut failures = 0;
    for size in opts.tests() {
        let (m, n) = (size.m, size.n);
        let k = p.order(m, n);
        let a_layout = BatchLayout::new(MatrixLayout::dense(k, k)?, k * k, opts.batch)?;
        let b_layout = BatchLayout::new(MatrixLayout::dense(m, n)?, m * n, opts.batch)?;
        let mut a = vec![T::zero(); a_layout.required_len()];
        let mut b = vec![T::zero(); b_layout.required_len()];
        let mut result = b.clone();
        let flops = flops::<T>(&p, m, n) * opts.batch as f64;

        for iter in 0..opts.niter as u64 {
            let seed = opts.seed.wrapping_add(iter);
            opts.synthesizer::<T::Real>()?
                .seed(seed)
                .generate(&mut a, a_layout, None)?;
            generate_random(&mut b, m * n, opts.batch, !seed)?;

            let mut times = Vec::with_capacity(opts.nruns);
            for run in 0..opts.nruns {
                result.copy_from_slice(&b);
                let mut ms = 0.;
                for (i, (a, b)) in operands(&a, a_layout, opts.strided)?
                    .into_iter()
                    .zip(operands_mut(&mut result, b_layout, opts.strided)?)
                    .enumerate()
                {
                    let kernel = &mut kernels[i % kernels.len()];
                    ms += kernel.trmm(&p, m, n, alpha, a, k, b, m)
                }
                if opts.time {
                    info!("{size} run {run}: {ms:.3} ms");
                }
                times.push(ms)
            }
            let (avg, sd) = avg_and_stdev(&times, opts.warmup);
            let mut row = format!(
                "{m:5} {n:5} | {avg:10.3} ({sd:7.3}) {:8.2} |",
                flops / avg / 1e6
            );

            if !(opts.check || opts.lapack) {
                println!("{row}   -        -    |    -");
                continue;
            }
            let mut expect = b.clone();
            let ref_ms = operands(&a, a_layout, opts.strided)?
                .into_iter()
                .zip(operands_mut(&mut expect, b_layout, opts.strided)?)
                .map(|(a, b)| Reference.trmm(&p, m, n, alpha, a, k, b, m))
                .sum::<f64>();
            if opts.lapack {
                row += &format!(" {ref_ms:6.1} {:8.2} |", flops / ref_ms / 1e6);
            } else {
                row += "   -        -    |";
            }
            if !opts.check {
                println!("{row}    -");
                continue;
            }

            let mut error = T::Real::zero();
            for (e, r) in operands(&expect, b_layout, opts.strided)?
                .into_iter()
                .zip(operands(&result, b_layout, opts.strided)?)
            {
                error = error.max(get_max_error_matrix(e, r, m, n, m)?);
            }
            let verdict = Verdict::judge(error, tolerance);
            println!("{row} {error:8.2e} {verdict}");
            if !verdict.passed() {
                failures += 1;
                warn!("{size}: error {error:e} exceeds {tolerance:e}");
                if opts.verbose > 0 {
                    let mut to = std::io::stderr().lock();
                    writeln!(to, "reference:")?;
                    write_matrix(&mut to, m, n, &expect, m)?;
                    writeln!(to, "result:")?;
                    write_matrix(&mut to, m, n, &result, m)?;
                }
            }
        }
    }

    info!("done in {:.3} s", gettime() - start);
    ensure!(failures == 0, "{failures} checks failed");
    Ok(())
}
