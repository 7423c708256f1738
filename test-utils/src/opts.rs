use crate::{
    ConfigError, Real, Result, Spectrum, StreamKey, Synthesizer,
    flags::{Diag, Side, Trans, Uplo},
};
use clap::{ArgAction, Parser};
use std::{fmt, str::FromStr};

/// Problem sizes swept when neither `--range` nor `-N` is given.
pub const DEFAULT_RANGE: SizeRange = SizeRange {
    start: 128,
    stop: 1024,
    step: 128,
};

/// Command line of the test drivers.
#[derive(Parser, Clone, Debug)]
pub struct TestOptions {
    /// Square sizes `start:stop:step`, repeatable
    #[arg(long, value_name = "START:STOP:STEP")]
    pub range: Vec<SizeRange>,
    /// One size `m[:n[:k]]`, repeatable; a missing n is m, a missing k is n
    #[arg(short = 'N', long = "size", value_name = "M[:N[:K]]")]
    pub sizes: Vec<Size>,

    /// Device ids, comma separated; defaults to 0..ngpu
    #[arg(long = "dev", value_delimiter = ',')]
    pub devices: Vec<i32>,
    #[arg(long, default_value_t = 1)]
    pub ngpu: usize,
    /// Streams the matrices of a batch are spread over
    #[arg(long, default_value_t = 1)]
    pub nstream: usize,
    /// Repetitions per size
    #[arg(long, default_value_t = 1)]
    pub niter: usize,
    /// Timed runs per repetition
    #[arg(long, default_value_t = 1)]
    pub nruns: usize,
    /// Leading runs left out of the timing statistics
    #[arg(long, default_value_t = 0)]
    pub warmup: usize,

    /// Largest accepted error
    #[arg(long, default_value_t = 1e-10)]
    pub tolerance: f64,
    /// Compare against the reference implementation
    #[arg(short, long)]
    pub check: bool,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    /// Print every timed run, not only the statistics
    #[arg(short = 't', long)]
    pub time: bool,
    /// Time the host reference implementation as well
    #[arg(long)]
    pub lapack: bool,

    /// Block size of the blocked kernel
    #[arg(long, default_value_t = 128)]
    pub nb: usize,
    /// Width of the independent panels of the right-hand side in the blocked kernel
    #[arg(long, default_value_t = 512)]
    pub db: usize,
    /// Split the triangular operand recursively instead of into fixed blocks
    #[arg(long)]
    pub custom: bool,

    #[arg(long, default_value_t = 1)]
    pub batch: usize,
    /// Cut batch operands at a fixed stride instead of reading them through an array of pointers
    #[arg(long)]
    pub strided: bool,
    /// Host worker threads for input synthesis
    #[arg(long, default_value_t = 1)]
    pub omp_threads: usize,

    #[arg(long, value_enum, default_value_t)]
    pub uplo: Uplo,
    #[arg(long, value_enum, default_value_t)]
    pub trans_a: Trans,
    #[arg(long, value_enum, default_value_t)]
    pub trans_b: Trans,
    #[arg(long, value_enum, default_value_t)]
    pub side: Side,
    #[arg(long, value_enum, default_value_t)]
    pub diag: Diag,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Condition number of synthesized operands; 0 selects exponential decay
    #[arg(long, default_value_t = 1e6)]
    pub cond: f64,
    /// Singular value decay rate used when `--cond 0`
    #[arg(long, default_value_t = 0.5)]
    pub exp_decay: f64,
    /// Key random streams by matrix so results do not depend on the thread count
    #[arg(long)]
    pub stable_streams: bool,
}

impl TestOptions {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("ngpu", self.ngpu),
            ("nstream", self.nstream),
            ("niter", self.niter),
            ("nruns", self.nruns),
            ("nb", self.nb),
            ("db", self.db),
            ("batch", self.batch),
            ("omp-threads", self.omp_threads),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::Option(format!("--{name} must be at least 1")));
            }
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.) {
            return Err(ConfigError::Option(format!(
                "--tolerance {} must be a finite value > 0",
                self.tolerance
            )));
        }
        if !self.devices.is_empty() && self.devices.len() < self.ngpu {
            return Err(ConfigError::Option(format!(
                "{} devices listed for --ngpu {}",
                self.devices.len(),
                self.ngpu
            )));
        }
        Spectrum::from_params(self.cond, self.exp_decay).map(|_| ())
    }

    /// Every size to test, ranges first.
    pub fn tests(&self) -> Vec<Size> {
        if self.range.is_empty() && self.sizes.is_empty() {
            return DEFAULT_RANGE.iter().collect();
        }
        self.range
            .iter()
            .flat_map(SizeRange::iter)
            .chain(self.sizes.iter().copied())
            .collect()
    }

    /// Device ids in use, `ngpu` of them.
    pub fn devices(&self) -> Vec<i32> {
        if self.devices.is_empty() {
            (0..self.ngpu as i32).collect()
        } else {
            self.devices[..self.ngpu.min(self.devices.len())].to_vec()
        }
    }

    /// The input synthesizer these options describe.
    pub fn synthesizer<R: Real>(&self) -> Result<Synthesizer<R>> {
        let spectrum = Spectrum::from_params(R::of(self.cond), R::of(self.exp_decay))?;
        Ok(Synthesizer::new(spectrum)
            .seed(self.seed)
            .threads(self.omp_threads)
            .stream_key(if self.stable_streams {
                StreamKey::Matrix
            } else {
                StreamKey::Worker
            }))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Size {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SizeRange {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

impl SizeRange {
    /// `start, start + step, ..` up to and including `stop`.
    pub fn iter(&self) -> impl Iterator<Item = Size> + use<> {
        (self.start..=self.stop)
            .step_by(self.step)
            .map(|s| Size { m: s, n: s, k: s })
    }
}

fn parse_dim(s: &str) -> std::result::Result<usize, String> {
    let s = s.trim();
    match s.parse() {
        Ok(0) => Err("sizes must be at least 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("`{s}`: {e}")),
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let dims = s.split(':').map(parse_dim).collect::<std::result::Result<Vec<_>, _>>()?;
        match *dims {
            [m] => Ok(Self { m, n: m, k: m }),
            [m, n] => Ok(Self { m, n, k: n }),
            [m, n, k] => Ok(Self { m, n, k }),
            _ => Err(format!("`{s}` is not m[:n[:k]]")),
        }
    }
}

impl FromStr for SizeRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let dims = s.split(':').map(parse_dim).collect::<std::result::Result<Vec<_>, _>>()?;
        let [start, stop, step] = *dims else {
            return Err(format!("`{s}` is not start:stop:step"));
        };
        if start > stop {
            return Err(format!("range `{s}` is empty"));
        }
        Ok(Self { start, stop, step })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}x{}", self.m, self.n, self.k)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> TestOptions {
        TestOptions::try_parse_from(std::iter::once("test").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let opts = parse(&[]);
        opts.validate().unwrap();
        let tests = opts.tests();
        assert_eq!(tests.len(), 8);
        assert_eq!(tests[0], Size { m: 128, n: 128, k: 128 });
        assert_eq!(tests[7].m, 1024);
        assert_eq!(opts.devices(), [0]);
        assert_eq!(opts.uplo, Uplo::Lower);
        assert_eq!(opts.trans_a, Trans::NoTrans);
        assert!(!opts.check && opts.verbose == 0);
    }

    #[test]
    fn test_sizes() {
        let opts = parse(&["--range", "10:35:10", "-N", "7", "-N", "3:4", "--size", "5:6:7"]);
        let tests = opts.tests();
        assert_eq!(
            tests,
            [
                Size { m: 10, n: 10, k: 10 },
                Size { m: 20, n: 20, k: 20 },
                Size { m: 30, n: 30, k: 30 },
                Size { m: 7, n: 7, k: 7 },
                Size { m: 3, n: 4, k: 4 },
                Size { m: 5, n: 6, k: 7 },
            ]
        );
        assert_eq!(tests[5].to_string(), "5x6x7");
    }

    #[test]
    fn test_flags() {
        let opts = parse(&[
            "-c", "-vv", "--uplo", "u", "--trans-a", "c", "--side", "right", "--diag", "u",
            "--nb", "64", "--custom", "--dev", "2,3", "--ngpu", "2", "--omp-threads", "4",
            "--seed", "9", "--cond", "0", "--exp-decay", "0.25", "--stable-streams",
        ]);
        opts.validate().unwrap();
        assert!(opts.check && opts.custom);
        assert_eq!(opts.verbose, 2);
        assert_eq!(opts.uplo, Uplo::Upper);
        assert_eq!(opts.trans_a, Trans::ConjTrans);
        assert_eq!(opts.side, Side::Right);
        assert_eq!(opts.diag, Diag::Unit);
        assert_eq!(opts.nb, 64);
        assert_eq!(opts.devices(), [2, 3]);

        let synth = opts.synthesizer::<f64>().unwrap();
        assert_eq!(
            synth,
            Synthesizer::new(Spectrum::ExpDecay(0.25))
                .seed(9)
                .threads(4)
                .stream_key(StreamKey::Matrix)
        );
    }

    #[test]
    fn test_rejected() {
        for args in [
            &["--range", "10:5:1"][..],
            &["--range", "1:5"],
            &["--range", "1:5:0"],
            &["-N", "0"],
            &["-N", "1:2:3:4"],
            &["-N", "x"],
            &["--uplo", "x"],
        ] {
            let args = std::iter::once("test").chain(args.iter().copied());
            assert!(TestOptions::try_parse_from(args).is_err());
        }

        for args in [
            &["--ngpu", "0"][..],
            &["--tolerance=-1"],
            &["--dev", "1", "--ngpu", "2"],
            &["--cond", "0.5"],
            &["--cond", "0", "--exp-decay", "0"],
        ] {
            assert!(parse(args).validate().is_err(), "{args:?}");
        }
    }
}
