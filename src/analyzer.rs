//! Graph analysis of rational functions.
//!
//! Everything is derived from the reduced fraction `N'/D'` and the canceled
//! common factor `g`:
//!
//! - vertical asymptotes are the real roots of `D'`
//! - holes are the real roots of `g` that are not roots of `D'`
//! - x-intercepts are the real roots of `N'` that are not holes
//! - the horizontal asymptote and end behaviour follow from the degree gap

use std::fmt;

use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::error::{QuizError, Result};
use crate::math::{parse_constant, real_roots, to_f64, Polynomial, RationalFunction, Real};

/// Samples with |y| above this are treated as off the chart.
pub const PLOT_CLIP: f64 = 1000.0;
pub const DEFAULT_SAMPLES: usize = 1000;
pub const DEFAULT_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    pub x: Real,
    pub y: Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    fn flipped(self) -> Self {
        match self {
            Trend::Up => Trend::Down,
            Trend::Down => Trend::Up,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Trend::Up => "+infinity",
            Trend::Down => "-infinity",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EndBehavior {
    /// f(x) -> c as x -> ±infinity.
    Horizontal(BigRational),
    /// f(x) approaches the slant line y = slope * x + intercept.
    Oblique {
        slope: BigRational,
        intercept: BigRational,
    },
    Unbounded { left: Trend, right: Trend },
}

impl fmt::Display for EndBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndBehavior::Horizontal(c) => {
                write!(f, "f(x) -> {} as x -> ±infinity", Real::Exact(c.clone()))
            }
            EndBehavior::Oblique { slope, intercept } => {
                let line = Polynomial::new(vec![intercept.clone(), slope.clone()]);
                write!(f, "f(x) follows the slant asymptote y = {}", line)
            }
            EndBehavior::Unbounded { left, right } => write!(
                f,
                "f(x) -> {} as x -> -infinity, f(x) -> {} as x -> +infinity",
                left.describe(),
                right.describe()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub vertical_asymptotes: Vec<Real>,
    pub holes: Vec<Hole>,
    pub horizontal_asymptote: Option<BigRational>,
    pub end_behavior: EndBehavior,
    pub x_intercepts: Vec<Real>,
    pub y_intercept: Option<BigRational>,
    pub reduced: RationalFunction,
    pub common_factor: Polynomial,
}

pub fn analyze(f: &RationalFunction) -> Result<Analysis> {
    let reduced = f.reduce()?;
    let num = reduced.function.numerator();
    let den = reduced.function.denominator();

    let vertical_asymptotes: Vec<Real> = real_roots(den).into_iter().map(|r| r.value).collect();

    let mut holes = Vec::new();
    for root in real_roots(&reduced.common_factor) {
        if vertical_asymptotes.iter().any(|va| va.approx_eq(&root.value)) {
            continue;
        }
        let y = match &root.value {
            Real::Exact(x) => reduced
                .function
                .eval(x)
                .map(Real::Exact)
                .ok_or(QuizError::ZeroDenominator)?,
            Real::Approx(x) => Real::Approx(reduced.function.eval_f64(*x)),
        };
        holes.push(Hole { x: root.value, y });
    }

    let x_intercepts: Vec<Real> = real_roots(num)
        .into_iter()
        .map(|r| r.value)
        .filter(|x| !holes.iter().any(|h| h.x.approx_eq(x)))
        .collect();

    let horizontal_asymptote = horizontal_asymptote(f.numerator(), f.denominator());
    let end_behavior = end_behavior(num, den)?;

    let zero = BigRational::zero();
    let zero_excluded = vertical_asymptotes
        .iter()
        .chain(holes.iter().map(|h| &h.x))
        .any(|x| x.exact().is_some_and(|v| v.is_zero()));
    let y_intercept = if zero_excluded {
        None
    } else {
        reduced.function.eval(&zero)
    };

    Ok(Analysis {
        vertical_asymptotes,
        holes,
        horizontal_asymptote,
        end_behavior,
        x_intercepts,
        y_intercept,
        common_factor: reduced.common_factor,
        reduced: reduced.function,
    })
}

/// Degree comparison: `deg N < deg D` gives `y = 0`, equal degrees give the
/// ratio of leading coefficients, and `deg N > deg D` gives none.
pub fn horizontal_asymptote(num: &Polynomial, den: &Polynomial) -> Option<BigRational> {
    if num.is_zero() || num.degree() < den.degree() {
        Some(BigRational::zero())
    } else if num.degree() == den.degree() {
        Some(num.leading_coeff() / den.leading_coeff())
    } else {
        None
    }
}

fn end_behavior(num: &Polynomial, den: &Polynomial) -> Result<EndBehavior> {
    if let Some(c) = horizontal_asymptote(num, den) {
        return Ok(EndBehavior::Horizontal(c));
    }

    let gap = num.degree() - den.degree();
    if gap == 1 {
        let (quotient, _) = num.div_rem(den)?;
        return Ok(EndBehavior::Oblique {
            slope: quotient.coeff(1),
            intercept: quotient.coeff(0),
        });
    }

    let ratio = num.leading_coeff() / den.leading_coeff();
    let right = if ratio.is_positive() { Trend::Up } else { Trend::Down };
    let left = if gap % 2 == 0 { right } else { right.flipped() };
    Ok(EndBehavior::Unbounded { left, right })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    XIntercept,
    YIntercept,
    Hole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub x: f64,
    pub y: f64,
}

/// Sampled curve plus the annotations drawn over it.
///
/// `points` holds `None` wherever the curve is off the chart, undefined, or
/// crosses a vertical asymptote, so renderers never join across a break.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub points: Vec<Option<(f64, f64)>>,
    pub vertical_lines: Vec<f64>,
    pub horizontal_line: Option<f64>,
    pub markers: Vec<Marker>,
}

pub fn plot(
    f: &RationalFunction,
    analysis: &Analysis,
    x_range: (f64, f64),
    y_range: (f64, f64),
    samples: usize,
) -> Plot {
    let samples = samples.max(2);
    let (lo, hi) = x_range;
    let step = (hi - lo) / (samples - 1) as f64;
    let vertical_lines: Vec<f64> = analysis.vertical_asymptotes.iter().map(Real::to_f64).collect();

    let mut points = Vec::with_capacity(samples + vertical_lines.len());
    let mut prev_x: Option<f64> = None;
    for i in 0..samples {
        let x = lo + step * i as f64;
        if let Some(px) = prev_x {
            if vertical_lines.iter().any(|va| *va > px && *va <= x) {
                points.push(None);
            }
        }
        prev_x = Some(x);

        let y = f.eval_f64(x);
        if y.is_finite() && y.abs() <= PLOT_CLIP {
            points.push(Some((x, y)));
        } else {
            points.push(None);
        }
    }

    let mut markers: Vec<Marker> = analysis
        .x_intercepts
        .iter()
        .map(|x| Marker {
            kind: MarkerKind::XIntercept,
            x: x.to_f64(),
            y: 0.0,
        })
        .collect();
    if let Some(y) = &analysis.y_intercept {
        markers.push(Marker {
            kind: MarkerKind::YIntercept,
            x: 0.0,
            y: to_f64(y),
        });
    }
    markers.extend(analysis.holes.iter().map(|h| Marker {
        kind: MarkerKind::Hole,
        x: h.x.to_f64(),
        y: h.y.to_f64(),
    }));

    Plot {
        x_range,
        y_range,
        points,
        vertical_lines,
        horizontal_line: analysis.horizontal_asymptote.as_ref().map(to_f64),
        markers,
    }
}

fn join_or_none(items: Vec<String>) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

/// Human-readable summary rows, in display order.
pub fn summary(analysis: &Analysis) -> Vec<(&'static str, String)> {
    vec![
        (
            "Vertical Asymptotes",
            join_or_none(
                analysis
                    .vertical_asymptotes
                    .iter()
                    .map(|x| format!("x = {}", x))
                    .collect(),
            ),
        ),
        (
            "Horizontal Asymptote",
            analysis
                .horizontal_asymptote
                .as_ref()
                .map(|y| format!("y = {}", Real::Exact(y.clone())))
                .unwrap_or_else(|| "None".to_string()),
        ),
        (
            "X-intercepts",
            join_or_none(
                analysis
                    .x_intercepts
                    .iter()
                    .map(|x| format!("({}, 0)", x))
                    .collect(),
            ),
        ),
        (
            "Y-intercept",
            analysis
                .y_intercept
                .as_ref()
                .map(|y| format!("(0, {})", Real::Exact(y.clone())))
                .unwrap_or_else(|| "None".to_string()),
        ),
        (
            "Holes",
            join_or_none(
                analysis
                    .holes
                    .iter()
                    .map(|h| format!("({}, {})", h.x, h.y))
                    .collect(),
            ),
        ),
        ("End Behavior", analysis.end_behavior.to_string()),
    ]
}

/// A parsed answer: either "none" or a list of numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Nothing,
    Values(Vec<f64>),
}

impl AnswerValue {
    pub fn from_reals(values: &[Real]) -> Self {
        if values.is_empty() {
            AnswerValue::Nothing
        } else {
            AnswerValue::Values(values.iter().map(Real::to_f64).collect())
        }
    }

    pub fn from_optional(value: Option<&BigRational>) -> Self {
        match value {
            Some(v) => AnswerValue::Values(vec![to_f64(v)]),
            None => AnswerValue::Nothing,
        }
    }
}

/// Parse free-form answers such as `none`, `1, -2`, `x = 1, x = -2`,
/// `[1, -2]` or `y = 3/2`.
pub fn parse_answer(input: &str) -> Result<AnswerValue> {
    let invalid = || QuizError::InvalidAnswer(input.trim().to_string());

    let mut text = input.trim().to_lowercase();
    if (text.starts_with('[') && text.ends_with(']'))
        || (text.starts_with('{') && text.ends_with('}'))
    {
        text = text[1..text.len() - 1].trim().to_string();
    }

    if matches!(text.as_str(), "none" | "no" | "dne" | "n/a" | "nothing") {
        return Ok(AnswerValue::Nothing);
    }
    if text.is_empty() {
        return Err(invalid());
    }

    let mut values = Vec::new();
    for part in text.split([',', ';']) {
        let mut part = part.trim();
        for prefix in ["x", "y"] {
            if let Some(rest) = part.strip_prefix(prefix) {
                if let Some(value) = rest.trim_start().strip_prefix('=') {
                    part = value.trim();
                }
            }
        }
        values.push(parse_number(part).ok_or_else(invalid)?);
    }
    Ok(AnswerValue::Values(values))
}

fn parse_number(text: &str) -> Option<f64> {
    if let Ok(v) = text.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    parse_constant(text).map(|v| to_f64(&v))
}

/// Compare answers with a numeric tolerance; lists are compared sorted.
pub fn validate_answer(user: &AnswerValue, correct: &AnswerValue, tolerance: f64) -> bool {
    match (user, correct) {
        (AnswerValue::Nothing, AnswerValue::Nothing) => true,
        (AnswerValue::Values(u), AnswerValue::Values(c)) => {
            if u.len() != c.len() {
                return false;
            }
            let mut u = u.clone();
            let mut c = c.clone();
            u.sort_by(f64::total_cmp);
            c.sort_by(f64::total_cmp);
            u.iter().zip(&c).all(|(a, b)| (a - b).abs() <= tolerance)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{parse_rational, q};

    fn analysis_of(text: &str) -> Analysis {
        analyze(&parse_rational(text).unwrap()).unwrap()
    }

    fn exact(values: &[Real]) -> Vec<BigRational> {
        values.iter().map(|v| v.exact().cloned().unwrap()).collect()
    }

    #[test]
    fn test_hole_and_asymptote() {
        // (x - 1)(x + 2) / (x - 1)(x - 3): hole at 1, VA at 3
        let a = analysis_of("(x - 1)(x + 2)/((x - 1)(x - 3))");
        assert_eq!(exact(&a.vertical_asymptotes), vec![q(3)]);
        assert_eq!(a.holes.len(), 1);
        assert_eq!(a.holes[0].x, Real::Exact(q(1)));
        // (1 + 2) / (1 - 3)
        assert_eq!(
            a.holes[0].y,
            Real::Exact(BigRational::new((-3).into(), 2.into()))
        );
        assert_eq!(exact(&a.x_intercepts), vec![q(-2)]);
        assert_eq!(a.horizontal_asymptote, Some(q(1)));
        assert_eq!(a.end_behavior, EndBehavior::Horizontal(q(1)));
        // (0 + 2) / (0 - 3)
        assert_eq!(
            a.y_intercept,
            Some(BigRational::new((-2).into(), 3.into()))
        );
    }

    #[test]
    fn test_partial_cancellation_is_asymptote_not_hole() {
        // (x - 2) / (x - 2)^2 keeps a pole at 2
        let a = analysis_of("(x - 2)/(x - 2)^2");
        assert_eq!(exact(&a.vertical_asymptotes), vec![q(2)]);
        assert!(a.holes.is_empty());
        assert!(a.x_intercepts.is_empty());
    }

    #[test]
    fn test_hole_is_not_an_x_intercept() {
        // (x - 1) stays in N' after canceling, but f is undefined at 1
        let a = analysis_of("(x - 1)^2 (x - 3)/((x - 1)(x + 2))");
        assert_eq!(a.holes.len(), 1);
        assert_eq!(a.holes[0].x, Real::Exact(q(1)));
        assert_eq!(a.holes[0].y, Real::Exact(q(0)));
        assert_eq!(exact(&a.x_intercepts), vec![q(3)]);

        let b = analysis_of("x^2/(x^2 - 4x)");
        assert_eq!(b.holes[0].x, Real::Exact(q(0)));
        assert!(b.x_intercepts.is_empty());
        assert_eq!(b.y_intercept, None);
    }

    #[test]
    fn test_degree_rules() {
        assert_eq!(analysis_of("x/(x^2 + 1)").horizontal_asymptote, Some(q(0)));
        assert_eq!(
            analysis_of("3x^2/(2x^2 - 8)").horizontal_asymptote,
            Some(BigRational::new(3.into(), 2.into()))
        );
        assert_eq!(analysis_of("x^3/(x - 1)").horizontal_asymptote, None);
    }

    #[test]
    fn test_oblique_end_behavior() {
        // (x^2 + 1)/(x - 1) = x + 1 + 2/(x - 1)
        let a = analysis_of("(x^2 + 1)/(x - 1)");
        assert_eq!(
            a.end_behavior,
            EndBehavior::Oblique {
                slope: q(1),
                intercept: q(1)
            }
        );
        assert!(a.x_intercepts.is_empty());
    }

    #[test]
    fn test_unbounded_end_behavior() {
        let even = analysis_of("-x^3/(x - 4)");
        assert_eq!(
            even.end_behavior,
            EndBehavior::Unbounded {
                left: Trend::Down,
                right: Trend::Down
            }
        );

        let odd = analysis_of("x^4/(x + 1)");
        assert_eq!(
            odd.end_behavior,
            EndBehavior::Unbounded {
                left: Trend::Down,
                right: Trend::Up
            }
        );
    }

    #[test]
    fn test_y_intercept_undefined_at_asymptote_or_hole() {
        assert_eq!(analysis_of("1/x").y_intercept, None);
        assert_eq!(analysis_of("x(x + 1)/(x(x - 2))").y_intercept, None);
    }

    #[test]
    fn test_irrational_asymptotes() {
        let a = analysis_of("1/(x^2 - 2)");
        assert_eq!(a.vertical_asymptotes.len(), 2);
        assert!((a.vertical_asymptotes[1].to_f64() - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_every_denominator_root_classified_once() {
        let a = analysis_of("x^2(x - 1)(x + 4)/(x^3 (x - 1)(x + 5))");
        let den = parse_rational("x^3 (x - 1)(x + 5)").unwrap();
        let den_roots = real_roots(den.numerator());
        for root in den_roots {
            let is_va = a.vertical_asymptotes.iter().any(|v| v.approx_eq(&root.value));
            let is_hole = a.holes.iter().any(|h| h.x.approx_eq(&root.value));
            assert!(
                is_va ^ is_hole,
                "root {} classified as va={} hole={}",
                root.value,
                is_va,
                is_hole
            );
        }
    }

    #[test]
    fn test_plot_breaks_at_asymptote() {
        let f = parse_rational("1/(x - 0.5)").unwrap();
        let a = analyze(&f).unwrap();
        let p = plot(&f, &a, (-2.0, 2.0), (-10.0, 10.0), 9);
        // samples at -2, -1.5, ..., 2; the asymptote falls between 0 and 0.5
        assert_eq!(p.points.len(), 10);
        assert!(p.points.contains(&None));
        assert_eq!(p.vertical_lines, vec![0.5]);
        assert_eq!(p.horizontal_line, Some(0.0));
    }

    #[test]
    fn test_plot_markers() {
        let f = parse_rational("(x - 1)(x + 2)/((x - 1)(x - 3))").unwrap();
        let a = analyze(&f).unwrap();
        let p = plot(&f, &a, (-10.0, 10.0), (-10.0, 10.0), DEFAULT_SAMPLES);
        assert!(p.markers.iter().any(|m| m.kind == MarkerKind::Hole && m.x == 1.0));
        assert!(p.markers.iter().any(|m| m.kind == MarkerKind::XIntercept && m.x == -2.0));
        assert!(p.markers.iter().any(|m| m.kind == MarkerKind::YIntercept));
        assert!(p
            .points
            .iter()
            .flatten()
            .all(|(_, y)| y.abs() <= PLOT_CLIP));
    }

    #[test]
    fn test_summary_rows() {
        let rows = summary(&analysis_of("x^3/(x - 1)"));
        assert_eq!(rows[0], ("Vertical Asymptotes", "x = 1".to_string()));
        assert_eq!(rows[1], ("Horizontal Asymptote", "None".to_string()));
        assert_eq!(rows[2], ("X-intercepts", "(0, 0)".to_string()));
        assert_eq!(rows[4], ("Holes", "None".to_string()));
    }

    #[test]
    fn test_parse_answer_forms() {
        assert_eq!(parse_answer(" None ").unwrap(), AnswerValue::Nothing);
        assert_eq!(
            parse_answer("x = 1, x = -2").unwrap(),
            AnswerValue::Values(vec![1.0, -2.0])
        );
        assert_eq!(
            parse_answer("[1, -2]").unwrap(),
            AnswerValue::Values(vec![1.0, -2.0])
        );
        assert_eq!(parse_answer("y = 3/2").unwrap(), AnswerValue::Values(vec![1.5]));
        assert_eq!(parse_answer("x = 1/-2").unwrap(), AnswerValue::Values(vec![-0.5]));
        assert!(matches!(parse_answer("two"), Err(QuizError::InvalidAnswer(_))));
        assert!(matches!(parse_answer(""), Err(QuizError::InvalidAnswer(_))));
        assert!(matches!(parse_answer("1/0"), Err(QuizError::InvalidAnswer(_))));
    }

    #[test]
    fn test_validate_answer() {
        let correct = AnswerValue::Values(vec![3.0, -1.0]);
        let check = |user: AnswerValue| validate_answer(&user, &correct, DEFAULT_TOLERANCE);
        assert!(check(AnswerValue::Values(vec![-1.0, 3.05])));
        assert!(!check(AnswerValue::Values(vec![-1.0])));
        assert!(!check(AnswerValue::Values(vec![-1.0, 3.5])));
        assert!(!check(AnswerValue::Nothing));
        assert!(validate_answer(&AnswerValue::Nothing, &AnswerValue::Nothing, DEFAULT_TOLERANCE));
    }
}
