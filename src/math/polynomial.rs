use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{QuizError, Result};

/// Shorthand for an exact rational built from an integer.
pub fn q(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

pub fn to_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or(f64::NAN)
}

/// Dense univariate polynomial in `x` with exact rational coefficients.
///
/// `coeffs[i]` is the coefficient of `x^i`. Trailing zeros are always
/// trimmed, so the zero polynomial has no coefficients at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Polynomial {
    coeffs: Vec<BigRational>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<BigRational>) -> Self {
        let mut poly = Polynomial { coeffs };
        poly.trim();
        poly
    }

    pub fn from_ints(coeffs: &[i64]) -> Self {
        Polynomial::new(coeffs.iter().map(|&c| q(c)).collect())
    }

    pub fn zero() -> Self {
        Polynomial { coeffs: Vec::new() }
    }

    pub fn one() -> Self {
        Polynomial::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Self {
        Polynomial::new(vec![c])
    }

    pub fn x() -> Self {
        Polynomial::from_ints(&[0, 1])
    }

    /// `c * x^degree`
    pub fn monomial(c: BigRational, degree: usize) -> Self {
        let mut coeffs = vec![BigRational::zero(); degree + 1];
        coeffs[degree] = c;
        Polynomial::new(coeffs)
    }

    /// The linear factor `(x - root)`.
    pub fn linear_factor(root: &BigRational) -> Self {
        Polynomial::new(vec![-root.clone(), BigRational::one()])
    }

    pub fn from_roots(leading: BigRational, roots: &[BigRational]) -> Self {
        roots
            .iter()
            .fold(Polynomial::constant(leading), |acc, r| {
                &acc * &Polynomial::linear_factor(r)
            })
    }

    fn trim(&mut self) {
        while let Some(c) = self.coeffs.last() {
            if c.is_zero() {
                self.coeffs.pop();
            } else {
                break;
            }
        }
    }

    pub fn coeffs(&self) -> &[BigRational] {
        &self.coeffs
    }

    pub fn coeff(&self, power: usize) -> BigRational {
        self.coeffs
            .get(power)
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// True for nonzero constants and for the zero polynomial.
    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    /// Degree of the polynomial; the zero polynomial reports 0.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn leading_coeff(&self) -> BigRational {
        self.coeffs.last().cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn scale(&self, factor: &BigRational) -> Self {
        Polynomial::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    /// Scaled copy with leading coefficient 1. Zero stays zero.
    pub fn monic(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        let inv = BigRational::one() / self.leading_coeff();
        self.scale(&inv)
    }

    pub fn pow(&self, exp: u32) -> Self {
        (0..exp).fold(Polynomial::one(), |acc, _| &acc * self)
    }

    pub fn derivative(&self) -> Self {
        Polynomial::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * q(i as i64))
                .collect(),
        )
    }

    pub fn eval(&self, x: &BigRational) -> BigRational {
        self.coeffs
            .iter()
            .rev()
            .fold(BigRational::zero(), |acc, c| acc * x + c)
    }

    pub fn eval_f64(&self, x: f64) -> f64 {
        self.coeffs
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + to_f64(c))
    }

    pub fn float_coeffs(&self) -> Vec<f64> {
        self.coeffs.iter().map(to_f64).collect()
    }

    /// Polynomial long division: `self = quotient * divisor + remainder`.
    pub fn div_rem(&self, divisor: &Polynomial) -> Result<(Polynomial, Polynomial)> {
        if divisor.is_zero() {
            return Err(QuizError::ZeroDenominator);
        }

        if self.is_zero() || self.degree() < divisor.degree() {
            return Ok((Polynomial::zero(), self.clone()));
        }

        let divisor_deg = divisor.degree();
        let divisor_lc = divisor.leading_coeff();
        let mut quotient = vec![BigRational::zero(); self.degree() - divisor_deg + 1];
        let mut remainder = self.clone();

        while !remainder.is_zero() && remainder.degree() >= divisor_deg {
            let shift = remainder.degree() - divisor_deg;
            let factor = remainder.leading_coeff() / &divisor_lc;
            let term = Polynomial::monomial(factor.clone(), shift);
            remainder = &remainder - &(&term * divisor);
            quotient[shift] = factor;
        }

        Ok((Polynomial::new(quotient), remainder))
    }

    /// Exact division; the remainder is discarded.
    pub fn div_exact(&self, divisor: &Polynomial) -> Result<Polynomial> {
        self.div_rem(divisor).map(|(quotient, _)| quotient)
    }

    /// Monic greatest common divisor. `gcd(0, 0)` is the zero polynomial.
    pub fn gcd(&self, other: &Polynomial) -> Polynomial {
        let mut a = self.monic();
        let mut b = other.monic();

        while !b.is_zero() {
            let Ok((_, remainder)) = a.div_rem(&b) else {
                break;
            };
            a = b;
            b = remainder.monic();
        }

        a.monic()
    }

    /// LaTeX rendering, e.g. `3x^{2} - \frac{1}{2}x + 4`.
    pub fn latex(&self) -> String {
        self.render(|c| {
            if c.is_integer() {
                c.to_integer().to_string()
            } else {
                format!("\\frac{{{}}}{{{}}}", c.numer(), c.denom())
            }
        }, |power| format!("x^{{{}}}", power))
    }

    fn render(
        &self,
        coeff_fmt: impl Fn(&BigRational) -> String,
        power_fmt: impl Fn(usize) -> String,
    ) -> String {
        if self.is_zero() {
            return "0".to_string();
        }

        let mut out = String::new();
        for (power, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }

            let negative = c.is_negative();
            if out.is_empty() {
                if negative {
                    out.push('-');
                }
            } else {
                out.push_str(if negative { " - " } else { " + " });
            }

            let magnitude = c.abs();
            let variable = match power {
                0 => String::new(),
                1 => "x".to_string(),
                p => power_fmt(p),
            };

            if magnitude.is_one() && power > 0 {
                out.push_str(&variable);
            } else {
                out.push_str(&coeff_fmt(&magnitude));
                out.push_str(&variable);
            }
        }
        out
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.render(
            |c| {
                if c.is_integer() {
                    c.to_integer().to_string()
                } else {
                    format!("({}/{})", c.numer(), c.denom())
                }
            },
            |power| format!("x^{}", power),
        );
        write!(f, "{}", rendered)
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    fn add(self, other: &Polynomial) -> Polynomial {
        let len = self.coeffs.len().max(other.coeffs.len());
        Polynomial::new((0..len).map(|i| self.coeff(i) + other.coeff(i)).collect())
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, other: &Polynomial) -> Polynomial {
        let len = self.coeffs.len().max(other.coeffs.len());
        Polynomial::new((0..len).map(|i| self.coeff(i) - other.coeff(i)).collect())
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    fn mul(self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero();
        }

        let mut coeffs = vec![BigRational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Polynomial::new(coeffs)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial::new(self.coeffs.iter().map(|c| -c).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[i64]) -> Polynomial {
        Polynomial::from_ints(coeffs)
    }

    #[test]
    fn test_trims_trailing_zeros() {
        let p = poly(&[1, 2, 0, 0]);
        assert_eq!(p.degree(), 1);
        assert_eq!(p.coeffs().len(), 2);
        assert!(poly(&[0, 0]).is_zero());
    }

    #[test]
    fn test_from_roots_expands() {
        // (x - 1)(x + 2) = x^2 + x - 2
        let p = Polynomial::from_roots(q(1), &[q(1), q(-2)]);
        assert_eq!(p, poly(&[-2, 1, 1]));
    }

    #[test]
    fn test_div_rem() {
        // (x^2 - 1) / (x - 1) = x + 1
        let (quot, rem) = poly(&[-1, 0, 1]).div_rem(&poly(&[-1, 1])).unwrap();
        assert_eq!(quot, poly(&[1, 1]));
        assert!(rem.is_zero());

        // (x^2 + 1) / (x - 1) = x + 1 remainder 2
        let (quot, rem) = poly(&[1, 0, 1]).div_rem(&poly(&[-1, 1])).unwrap();
        assert_eq!(quot, poly(&[1, 1]));
        assert_eq!(rem, poly(&[2]));
    }

    #[test]
    fn test_div_by_zero_fails() {
        assert!(matches!(
            poly(&[1, 1]).div_rem(&Polynomial::zero()),
            Err(QuizError::ZeroDenominator)
        ));
    }

    #[test]
    fn test_gcd_is_monic() {
        // 2(x - 1)(x + 3) and 4(x - 1)(x - 5) share (x - 1)
        let a = Polynomial::from_roots(q(2), &[q(1), q(-3)]);
        let b = Polynomial::from_roots(q(4), &[q(1), q(5)]);
        assert_eq!(a.gcd(&b), poly(&[-1, 1]));

        let coprime = poly(&[1, 1]).gcd(&poly(&[-1, 1]));
        assert_eq!(coprime, Polynomial::one());
    }

    #[test]
    fn test_eval_and_derivative() {
        let p = poly(&[2, -3, 1]);
        assert_eq!(p.eval(&q(3)), q(2));
        assert_eq!(p.eval_f64(0.5), 0.75);
        assert_eq!(p.derivative(), poly(&[-3, 2]));
    }

    #[test]
    fn test_display() {
        assert_eq!(poly(&[2, -3, 1]).to_string(), "x^2 - 3x + 2");
        assert_eq!(poly(&[0, 0, -1]).to_string(), "-x^2");
        assert_eq!(poly(&[-5]).to_string(), "-5");
        assert_eq!(Polynomial::zero().to_string(), "0");
        let half = Polynomial::new(vec![BigRational::new(1.into(), 2.into()), q(1)]);
        assert_eq!(half.to_string(), "x + (1/2)");
    }

    #[test]
    fn test_latex() {
        let p = Polynomial::new(vec![q(4), BigRational::new((-1).into(), 2.into()), q(3)]);
        assert_eq!(p.latex(), "3x^{2} - \\frac{1}{2}x + 4");
    }
}
