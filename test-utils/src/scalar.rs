use num_complex::Complex;
use num_traits::{Float, NumAssign};
use rand::Rng;
use rand_distr::StandardNormal;
use std::{fmt, iter::Sum, ops::Neg};

pub use num_complex::{Complex32, Complex64};

/// Matrix element type: `f32`, `f64`, `Complex32` or `Complex64`.
pub trait Scalar:
    Copy
    + Send
    + Sync
    + PartialEq
    + fmt::Debug
    + fmt::LowerExp
    + NumAssign
    + Neg<Output = Self>
    + 'static
{
    /// The precision errors and singular values are reported in.
    type Real: Real;

    const IS_COMPLEX: bool;

    fn conj(self) -> Self;
    /// |x|, computed without intermediate overflow.
    fn modulus(self) -> Self::Real;
    fn re(self) -> Self::Real;
    fn im(self) -> Self::Real;
    fn from_real(r: Self::Real) -> Self;
    fn scale(self, r: Self::Real) -> Self;
    fn unscale(self, r: Self::Real) -> Self;

    /// Uniform on `[0, 1)`, real and imaginary parts independent.
    fn sample_uniform<G: Rng + ?Sized>(rng: &mut G) -> Self;
    /// Standard normal, real and imaginary parts independent.
    fn sample_normal<G: Rng + ?Sized>(rng: &mut G) -> Self;

    #[inline]
    fn norm_sqr(self) -> Self::Real {
        (self.conj() * self).re()
    }
}

pub trait Real: Scalar<Real = Self> + Float + Sum + fmt::Display {
    fn of(x: f64) -> Self;
    fn as_f64(self) -> f64;
}

macro_rules! impl_real {
    ($ty:ty) => {
        impl Scalar for $ty {
            type Real = $ty;

            const IS_COMPLEX: bool = false;

            #[inline]
            fn conj(self) -> Self {
                self
            }
            #[inline]
            fn modulus(self) -> Self {
                self.abs()
            }
            #[inline]
            fn re(self) -> Self {
                self
            }
            #[inline]
            fn im(self) -> Self {
                0.
            }
            #[inline]
            fn from_real(r: Self) -> Self {
                r
            }
            #[inline]
            fn scale(self, r: Self) -> Self {
                self * r
            }
            #[inline]
            fn unscale(self, r: Self) -> Self {
                self / r
            }
            #[inline]
            fn sample_uniform<G: Rng + ?Sized>(rng: &mut G) -> Self {
                rng.random()
            }
            #[inline]
            fn sample_normal<G: Rng + ?Sized>(rng: &mut G) -> Self {
                rng.sample(StandardNormal)
            }
        }

        impl Real for $ty {
            #[inline]
            fn of(x: f64) -> Self {
                x as _
            }
            #[inline]
            fn as_f64(self) -> f64 {
                self as _
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);

impl<R: Real> Scalar for Complex<R> {
    type Real = R;

    const IS_COMPLEX: bool = true;

    #[inline]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }
    #[inline]
    fn modulus(self) -> R {
        self.norm()
    }
    #[inline]
    fn re(self) -> R {
        self.re
    }
    #[inline]
    fn im(self) -> R {
        self.im
    }
    #[inline]
    fn from_real(r: R) -> Self {
        Complex::new(r, R::zero())
    }
    #[inline]
    fn scale(self, r: R) -> Self {
        Complex::scale(&self, r)
    }
    #[inline]
    fn unscale(self, r: R) -> Self {
        Complex::unscale(&self, r)
    }
    #[inline]
    fn sample_uniform<G: Rng + ?Sized>(rng: &mut G) -> Self {
        Complex::new(R::sample_uniform(rng), R::sample_uniform(rng))
    }
    #[inline]
    fn sample_normal<G: Rng + ?Sized>(rng: &mut G) -> Self {
        Complex::new(R::sample_normal(rng), R::sample_normal(rng))
    }
    #[inline]
    fn norm_sqr(self) -> R {
        Complex::norm_sqr(&self)
    }
}

#[test]
fn test_complex_ops() {
    let z = Complex64::new(3., -4.);
    assert_eq!(z.modulus(), 5.);
    assert_eq!(Scalar::conj(z), Complex64::new(3., 4.));
    assert_eq!(Scalar::norm_sqr(z), 25.);
    assert_eq!(Scalar::scale(z, 2.), Complex64::new(6., -8.));
    assert_eq!(Scalar::unscale(z, 2.), Complex64::new(1.5, -2.));
    assert_eq!(<Complex64 as Scalar>::from_real(1.5), Complex64::new(1.5, 0.));
}

#[test]
fn test_real_ops() {
    assert_eq!((-2.5f32).modulus(), 2.5);
    assert_eq!(Scalar::conj(-2.5f64), -2.5);
    assert_eq!(Scalar::im(7.0f64), 0.);
    assert_eq!(Scalar::norm_sqr(-3.0f64), 9.);
    assert_eq!(f32::of(0.5).as_f64(), 0.5);
}
