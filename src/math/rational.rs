use std::fmt;

use num_rational::BigRational;
use num_traits::{One, Zero};

use super::polynomial::Polynomial;
use crate::error::{QuizError, Result};

/// A quotient `N(x) / D(x)` exactly as it was built.
///
/// Common factors are kept so that holes survive; use [`reduce`] to get the
/// canceled form. The denominator is never the zero polynomial.
///
/// [`reduce`]: RationalFunction::reduce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalFunction {
    numerator: Polynomial,
    denominator: Polynomial,
}

/// Result of canceling `gcd(N, D)` out of a rational function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduced {
    pub function: RationalFunction,
    pub common_factor: Polynomial,
}

impl RationalFunction {
    pub fn new(numerator: Polynomial, denominator: Polynomial) -> Result<Self> {
        if denominator.is_zero() {
            return Err(QuizError::ZeroDenominator);
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> &Polynomial {
        &self.numerator
    }

    pub fn denominator(&self) -> &Polynomial {
        &self.denominator
    }

    /// Cancel the monic gcd of numerator and denominator.
    ///
    /// The reduced denominator is scaled to be monic so that the reduced form
    /// is unique; `N = N' * g` and `D = D' * g` hold up to that scaling.
    pub fn reduce(&self) -> Result<Reduced> {
        let common_factor = if self.numerator.is_zero() {
            self.denominator.monic()
        } else {
            self.numerator.gcd(&self.denominator)
        };

        let numerator = self.numerator.div_exact(&common_factor)?;
        let denominator = self.denominator.div_exact(&common_factor)?;

        let lead = denominator.leading_coeff();
        let function = RationalFunction::new(
            numerator.scale(&(BigRational::one() / &lead)),
            denominator.monic(),
        )?;

        Ok(Reduced {
            function,
            common_factor: common_factor.scale(&lead),
        })
    }

    /// Exact value, or `None` where the denominator vanishes.
    pub fn eval(&self, x: &BigRational) -> Option<BigRational> {
        let den = self.denominator.eval(x);
        if den.is_zero() {
            None
        } else {
            Some(self.numerator.eval(x) / den)
        }
    }

    pub fn eval_f64(&self, x: f64) -> f64 {
        self.numerator.eval_f64(x) / self.denominator.eval_f64(x)
    }

    pub fn latex(&self) -> String {
        if self.denominator == Polynomial::one() {
            return self.numerator.latex();
        }
        format!(
            "\\frac{{{}}}{{{}}}",
            self.numerator.latex(),
            self.denominator.latex()
        )
    }
}

impl fmt::Display for RationalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == Polynomial::one() {
            return write!(f, "{}", self.numerator);
        }

        let numerator = if self.numerator.coeffs().iter().filter(|c| !c.is_zero()).count() > 1 {
            format!("({})", self.numerator)
        } else {
            self.numerator.to_string()
        };
        let denominator = if self.denominator.is_constant() {
            self.denominator.to_string()
        } else {
            format!("({})", self.denominator)
        };
        write!(f, "{}/{}", numerator, denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polynomial::q;

    fn poly(coeffs: &[i64]) -> Polynomial {
        Polynomial::from_ints(coeffs)
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert!(matches!(
            RationalFunction::new(poly(&[1]), Polynomial::zero()),
            Err(QuizError::ZeroDenominator)
        ));
    }

    #[test]
    fn test_reduce_cancels_common_factor() {
        // 3(x - 1)(x + 2) / 2(x - 1)(x - 4)
        let num = Polynomial::from_roots(q(3), &[q(1), q(-2)]);
        let den = Polynomial::from_roots(q(2), &[q(1), q(4)]);
        let f = RationalFunction::new(num.clone(), den.clone()).unwrap();

        let reduced = f.reduce().unwrap();
        assert_eq!(reduced.function.denominator(), &poly(&[-4, 1]));
        assert_eq!(
            reduced.function.numerator(),
            &Polynomial::from_roots(BigRational::new(3.into(), 2.into()), &[q(-2)])
        );

        // Canceling and multiplying back reproduces the original fraction.
        assert_eq!(&reduced.function.numerator().clone() * &reduced.common_factor, num);
        assert_eq!(&reduced.function.denominator().clone() * &reduced.common_factor, den);
    }

    #[test]
    fn test_reduce_zero_numerator() {
        let f = RationalFunction::new(Polynomial::zero(), poly(&[-1, 1])).unwrap();
        let reduced = f.reduce().unwrap();
        assert!(reduced.function.numerator().is_zero());
        assert_eq!(reduced.function.denominator(), &Polynomial::one());
    }

    #[test]
    fn test_eval() {
        let f = RationalFunction::new(poly(&[1, 1]), poly(&[-2, 1])).unwrap();
        assert_eq!(f.eval(&q(3)), Some(q(4)));
        assert_eq!(f.eval(&q(2)), None);
        assert!(f.eval_f64(2.0).is_infinite());
    }

    #[test]
    fn test_display_and_latex() {
        let f = RationalFunction::new(poly(&[-1, 0, 1]), poly(&[0, 2])).unwrap();
        assert_eq!(f.to_string(), "(x^2 - 1)/(2x)");
        assert_eq!(f.latex(), "\\frac{x^{2} - 1}{2x}");

        let g = RationalFunction::new(poly(&[3, 1]), Polynomial::one()).unwrap();
        assert_eq!(g.to_string(), "x + 3");
    }
}
