use clap::ValueEnum;
use rand::Rng;
use tracing::debug;

use crate::analyzer::{analyze, Analysis};
use crate::error::{QuizError, Result};
use crate::math::{q, Polynomial, RationalFunction};
use crate::models::{Difficulty, GeneratorLimits};

/// Roots and stray coefficients are drawn from `-ROOT_RANGE..=ROOT_RANGE`.
pub const ROOT_RANGE: i64 = 5;
pub const MAX_ATTEMPTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HolePolicy {
    /// Insert a shared factor with the difficulty's hole probability.
    #[default]
    Random,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub difficulty: Difficulty,
    pub holes: HolePolicy,
}

impl GenerationRequest {
    pub fn new(difficulty: Difficulty, holes: HolePolicy) -> Self {
        Self { difficulty, holes }
    }
}

/// A generated function together with its ground-truth analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFunction {
    pub function: RationalFunction,
    pub analysis: Analysis,
}

pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    request: GenerationRequest,
) -> Result<GeneratedFunction> {
    let limits = request.difficulty.limits();

    for attempt in 1..=MAX_ATTEMPTS {
        let mut numerator = random_polynomial(rng, &limits);
        let mut denominator = random_polynomial(rng, &limits);

        let add_hole = match request.holes {
            HolePolicy::Random => rng.gen_bool(limits.holes_prob),
            HolePolicy::Always => true,
            HolePolicy::Never => false,
        };
        if add_hole {
            let shared = random_linear_factor(rng);
            numerator = &numerator * &shared;
            denominator = &denominator * &shared;
        }

        let function = RationalFunction::new(numerator, denominator)?;
        let analysis = analyze(&function)?;

        if analysis.reduced.denominator().is_constant() {
            debug!(attempt, %function, "denominator cancels to a constant, regenerating");
            continue;
        }
        if request.holes == HolePolicy::Always && analysis.holes.is_empty() {
            debug!(attempt, %function, "shared factor did not leave a hole, regenerating");
            continue;
        }

        return Ok(GeneratedFunction { function, analysis });
    }

    Err(QuizError::GenerationExhausted {
        attempts: MAX_ATTEMPTS,
    })
}

/// Product of 1..=min(max_factors, degree) linear factors, padded up to the
/// sampled degree with a `c * x^r` term.
fn random_polynomial<R: Rng + ?Sized>(rng: &mut R, limits: &GeneratorLimits) -> Polynomial {
    let degree = rng.gen_range(1..=limits.max_degree);
    let factors = rng.gen_range(1..=limits.max_factors.min(degree));

    let mut poly = Polynomial::one();
    for _ in 0..factors {
        poly = &poly * &random_linear_factor(rng);
    }

    let remaining = degree - factors;
    if remaining > 0 {
        let mut coeff = rng.gen_range(-ROOT_RANGE..=ROOT_RANGE);
        if coeff == 0 {
            coeff = 1;
        }
        poly = &poly * &Polynomial::monomial(q(coeff), remaining);
    }

    poly
}

fn random_linear_factor<R: Rng + ?Sized>(rng: &mut R) -> Polynomial {
    Polynomial::linear_factor(&q(rng.gen_range(-ROOT_RANGE..=ROOT_RANGE)))
}
