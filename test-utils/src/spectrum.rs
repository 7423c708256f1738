use crate::{ConfigError, Real, Result};

/// Singular value law of a synthesized matrix. The largest singular value is always 1.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Spectrum<R> {
    /// `σ_max / σ_min` equals the given value; values are spaced geometrically.
    Condition(R),
    /// `σ_i = exp(-rate * i)`.
    ExpDecay(R),
}

impl<R: Real> Spectrum<R> {
    /// `cond == 0` selects exponential decay, anything else a fixed condition number.
    pub fn from_params(cond: R, exp_decay: R) -> Result<Self> {
        let ans = if cond.is_zero() {
            Self::ExpDecay(exp_decay)
        } else {
            Self::Condition(cond)
        };
        ans.validate()?;
        Ok(ans)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Condition(c) if !(c.is_finite() && c >= R::one()) => {
                Err(ConfigError::Condition(c.as_f64()))
            }
            Self::ExpDecay(d) if !(d.is_finite() && d > R::zero()) => {
                Err(ConfigError::Decay(d.as_f64()))
            }
            _ => Ok(()),
        }
    }

    /// Fills `out` with the first `out.len()` singular values, largest first.
    pub fn singular_values(&self, out: &mut [R]) {
        let k = out.len();
        match *self {
            Self::Condition(cond) => {
                if k == 1 {
                    out[0] = R::one();
                    return;
                }
                let last = R::of((k - 1) as _);
                for (i, s) in out.iter_mut().enumerate() {
                    *s = cond.powf(-R::of(i as _) / last);
                }
                // 两端精确
                out[0] = R::one();
                out[k - 1] = cond.recip();
            }
            Self::ExpDecay(rate) => {
                for (i, s) in out.iter_mut().enumerate() {
                    *s = (-rate * R::of(i as _)).exp();
                }
            }
        }
    }
}

#[test]
fn test_params() {
    assert_eq!(Spectrum::from_params(1e3, 0.5), Ok(Spectrum::Condition(1e3)));
    assert_eq!(Spectrum::from_params(0., 0.5), Ok(Spectrum::ExpDecay(0.5)));
    assert_eq!(
        Spectrum::from_params(0.5f64, 0.),
        Err(ConfigError::Condition(0.5))
    );
    assert_eq!(Spectrum::from_params(0., 0.), Err(ConfigError::Decay(0.)));
    assert_eq!(
        Spectrum::from_params(f64::INFINITY, 1.),
        Err(ConfigError::Condition(f64::INFINITY))
    );
    assert!(Spectrum::from_params(0., f64::NAN).is_err());
}

#[test]
fn test_values() {
    let mut s = [0.0f64; 7];
    Spectrum::Condition(1e6).singular_values(&mut s);
    assert_eq!(s[0], 1.);
    assert_eq!(s[6], 1e-6);
    for w in s.windows(2) {
        assert!((w[0] / w[1] - 10.).abs() < 1e-12);
    }

    let mut s = [0.0f32; 1];
    Spectrum::Condition(100.).singular_values(&mut s);
    assert_eq!(s, [1.]);

    let mut s = [0.0f64; 5];
    Spectrum::ExpDecay(0.25).singular_values(&mut s);
    for (i, s) in s.iter().enumerate() {
        assert_eq!(*s, (-0.25 * i as f64).exp());
    }
}
