//! Real root finding for exact polynomials.
//!
//! Rational roots come out exactly via the rational root theorem. Whatever
//! is left after deflation is split into square-free parts (Yun) and its
//! real roots are located numerically between consecutive critical points.

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::polynomial::{to_f64, Polynomial};

/// Bisection steps per isolated root; far beyond f64 resolution.
const BISECTION_STEPS: usize = 200;

/// Constant terms larger than this skip rational candidate enumeration.
const MAX_DIVISOR_SEARCH: i64 = 1_000_000_000_000;

/// A real number that is either exact or a float approximation.
#[derive(Debug, Clone, PartialEq)]
pub enum Real {
    Exact(BigRational),
    Approx(f64),
}

impl Real {
    pub fn to_f64(&self) -> f64 {
        match self {
            Real::Exact(r) => to_f64(r),
            Real::Approx(v) => *v,
        }
    }

    pub fn exact(&self) -> Option<&BigRational> {
        match self {
            Real::Exact(r) => Some(r),
            Real::Approx(_) => None,
        }
    }

    pub fn approx_eq(&self, other: &Real) -> bool {
        match (self, other) {
            (Real::Exact(a), Real::Exact(b)) => a == b,
            _ => (self.to_f64() - other.to_f64()).abs() < 1e-7,
        }
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Real::Exact(r) if r.is_integer() => write!(f, "{}", r.to_integer()),
            Real::Exact(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Real::Approx(v) => write!(f, "{:.3}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    pub value: Real,
    pub multiplicity: u32,
}

/// All distinct real roots of `p`, ascending, with multiplicities.
///
/// Constants (including zero) have no roots.
pub fn real_roots(p: &Polynomial) -> Vec<Root> {
    if p.is_constant() {
        return Vec::new();
    }

    let (mut roots, residual) = rational_roots(p);

    if !residual.is_constant() {
        for (factor, multiplicity) in square_free_decomposition(&residual) {
            for value in numeric_roots(&factor.float_coeffs()) {
                roots.push(Root {
                    value: Real::Approx(value),
                    multiplicity,
                });
            }
        }
    }

    roots.sort_by(|a, b| a.value.to_f64().total_cmp(&b.value.to_f64()));
    roots
}

/// Exact rational roots with multiplicity, plus the deflated residual.
pub fn rational_roots(p: &Polynomial) -> (Vec<Root>, Polynomial) {
    let mut roots = Vec::new();
    let mut residual = p.clone();

    if residual.is_constant() {
        return (roots, residual);
    }

    // x = 0 shows up as low-order zero coefficients.
    let zero_mult = residual.coeffs().iter().take_while(|c| c.is_zero()).count();
    if zero_mult > 0 {
        residual = Polynomial::new(residual.coeffs()[zero_mult..].to_vec());
        roots.push(Root {
            value: Real::Exact(BigRational::zero()),
            multiplicity: zero_mult as u32,
        });
    }

    for candidate in rational_root_candidates(&residual) {
        let mut multiplicity = 0;
        while !residual.is_constant() && residual.eval(&candidate).is_zero() {
            match residual.div_exact(&Polynomial::linear_factor(&candidate)) {
                Ok(quotient) => residual = quotient,
                Err(_) => break,
            }
            multiplicity += 1;
        }
        if multiplicity > 0 {
            roots.push(Root {
                value: Real::Exact(candidate),
                multiplicity,
            });
        }
        if residual.is_constant() {
            break;
        }
    }

    (roots, residual)
}

/// Integer coefficients of `p` scaled by the lcm of its denominators.
fn integer_coeffs(p: &Polynomial) -> Vec<BigInt> {
    let lcm = p
        .coeffs()
        .iter()
        .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
    p.coeffs()
        .iter()
        .map(|c| (c * BigRational::from_integer(lcm.clone())).to_integer())
        .collect()
}

/// Candidates `±p/q` with `p | a0` and `q | an`, deduplicated.
fn rational_root_candidates(p: &Polynomial) -> Vec<BigRational> {
    let ints = integer_coeffs(p);
    let (Some(a0), Some(an)) = (ints.first(), ints.last()) else {
        return Vec::new();
    };

    let (Some(a0), Some(an)) = (a0.abs().to_i64(), an.abs().to_i64()) else {
        return Vec::new();
    };
    if a0 == 0 || a0 > MAX_DIVISOR_SEARCH || an > MAX_DIVISOR_SEARCH {
        return Vec::new();
    }

    let mut candidates: Vec<BigRational> = Vec::new();
    for num in divisors(a0) {
        for den in divisors(an) {
            for sign in [1, -1] {
                let c = BigRational::new(BigInt::from(sign * num), BigInt::from(den));
                if !candidates.contains(&c) {
                    candidates.push(c);
                }
            }
        }
    }
    candidates
}

fn divisors(n: i64) -> Vec<i64> {
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut i = 1;
    while i * i <= n {
        if n % i == 0 {
            small.push(i);
            if i != n / i {
                large.push(n / i);
            }
        }
        i += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

/// Yun's algorithm: `p = c * prod(a_i ^ i)` with each `a_i` square-free.
///
/// Returns the non-constant `(a_i, i)` pairs.
pub fn square_free_decomposition(p: &Polynomial) -> Vec<(Polynomial, u32)> {
    let mut factors = Vec::new();
    if p.is_constant() {
        return factors;
    }

    let f = p.monic();
    let df = f.derivative();
    let b = f.gcd(&df);
    let (Ok(mut c), Ok(mut d)) = (f.div_exact(&b), df.div_exact(&b)) else {
        return factors;
    };
    d = &d - &c.derivative();
    let mut i = 1;

    while !c.is_constant() {
        let a = c.gcd(&d);
        let (Ok(next_c), Ok(next_d)) = (c.div_exact(&a), d.div_exact(&a)) else {
            break;
        };
        if !a.is_constant() {
            factors.push((a, i));
        }
        c = next_c;
        d = &next_d - &c.derivative();
        i += 1;
    }

    factors
}

fn horner(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn float_derivative(coeffs: &[f64]) -> Vec<f64> {
    coeffs
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| c * i as f64)
        .collect()
}

/// Real roots of a square-free polynomial given by float coefficients.
///
/// Roots are separated by the critical points, which are the roots of the
/// derivative, so each interval between them holds at most one root.
fn numeric_roots(coeffs: &[f64]) -> Vec<f64> {
    let mut coeffs = coeffs.to_vec();
    while coeffs.last().is_some_and(|c| *c == 0.0) {
        coeffs.pop();
    }

    match coeffs.len() {
        0 | 1 => return Vec::new(),
        2 => return vec![-coeffs[0] / coeffs[1]],
        _ => {}
    }

    let lead = coeffs[coeffs.len() - 1];
    let bound = 1.0
        + coeffs[..coeffs.len() - 1]
            .iter()
            .map(|c| (c / lead).abs())
            .fold(0.0, f64::max);

    let mut fences = vec![-bound];
    fences.extend(
        numeric_roots(&float_derivative(&coeffs))
            .into_iter()
            .filter(|c| c.abs() < bound),
    );
    fences.push(bound);

    let mut roots: Vec<f64> = Vec::new();
    for window in fences.windows(2) {
        if let Some(root) = bisect(&coeffs, window[0], window[1]) {
            if roots.last().map_or(true, |last| (root - last).abs() > 1e-9) {
                roots.push(root);
            }
        }
    }
    roots
}

fn bisect(coeffs: &[f64], mut lo: f64, mut hi: f64) -> Option<f64> {
    let mut f_lo = horner(coeffs, lo);
    let f_hi = horner(coeffs, hi);

    if f_lo == 0.0 {
        return Some(lo);
    }
    if f_hi == 0.0 {
        return Some(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return None;
    }

    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        let f_mid = horner(coeffs, mid);
        if f_mid == 0.0 {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polynomial::q;

    fn exact_roots(p: &Polynomial) -> Vec<(BigRational, u32)> {
        real_roots(p)
            .into_iter()
            .map(|r| (r.value.exact().cloned().unwrap(), r.multiplicity))
            .collect()
    }

    #[test]
    fn test_integer_roots_with_multiplicity() {
        // (x - 2)^2 (x + 3) x
        let p = Polynomial::from_roots(q(1), &[q(2), q(2), q(-3), q(0)]);
        assert_eq!(
            exact_roots(&p),
            vec![(q(-3), 1), (q(0), 1), (q(2), 2)]
        );
    }

    #[test]
    fn test_fractional_root() {
        // 2x - 1
        let p = Polynomial::from_ints(&[-1, 2]);
        let half = BigRational::new(1.into(), 2.into());
        assert_eq!(exact_roots(&p), vec![(half, 1)]);
    }

    #[test]
    fn test_irrational_roots_are_approximated() {
        // x^2 - 2
        let roots = real_roots(&Polynomial::from_ints(&[-2, 0, 1]));
        assert_eq!(roots.len(), 2);
        assert!((roots[0].value.to_f64() + 2f64.sqrt()).abs() < 1e-9);
        assert!((roots[1].value.to_f64() - 2f64.sqrt()).abs() < 1e-9);
        assert!(roots[0].value.exact().is_none());
    }

    #[test]
    fn test_repeated_irrational_root() {
        // (x^2 - 3)^2
        let base = Polynomial::from_ints(&[-3, 0, 1]);
        let roots = real_roots(&base.pow(2));
        assert_eq!(roots.len(), 2);
        assert!(roots.iter().all(|r| r.multiplicity == 2));
    }

    #[test]
    fn test_no_real_roots() {
        assert!(real_roots(&Polynomial::from_ints(&[1, 0, 1])).is_empty());
        assert!(real_roots(&Polynomial::from_ints(&[7])).is_empty());
        assert!(real_roots(&Polynomial::zero()).is_empty());
    }

    #[test]
    fn test_square_free_decomposition() {
        // (x - 1) (x + 2)^3
        let p = Polynomial::from_roots(q(1), &[q(1), q(-2), q(-2), q(-2)]);
        let parts = square_free_decomposition(&p);
        assert_eq!(
            parts,
            vec![
                (Polynomial::from_ints(&[-1, 1]), 1),
                (Polynomial::from_ints(&[2, 1]), 3),
            ]
        );
    }

    #[test]
    fn test_real_display() {
        assert_eq!(Real::Exact(q(-4)).to_string(), "-4");
        assert_eq!(
            Real::Exact(BigRational::new(3.into(), 2.into())).to_string(),
            "3/2"
        );
        assert_eq!(Real::Approx(1.41421).to_string(), "1.414");
    }
}
