use std::fmt;

use clap::ValueEnum;
use num_rational::BigRational;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analyzer::{self, AnswerValue, Analysis, DEFAULT_TOLERANCE};
use crate::error::{QuizError, Result};
use crate::generator::GeneratedFunction;
use crate::math::{q, Real};

pub const CHOICE_COUNT: usize = 4;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    VerticalAsymptotes,
    HorizontalAsymptote,
    XIntercepts,
    Holes,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 4] = [
        QuestionKind::VerticalAsymptotes,
        QuestionKind::HorizontalAsymptote,
        QuestionKind::XIntercepts,
        QuestionKind::Holes,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            QuestionKind::VerticalAsymptotes => "Vertical Asymptotes",
            QuestionKind::HorizontalAsymptote => "Horizontal Asymptote",
            QuestionKind::XIntercepts => "X-intercepts",
            QuestionKind::Holes => "Holes",
        }
    }

    pub fn is_asymptote(&self) -> bool {
        matches!(
            self,
            QuestionKind::VerticalAsymptotes | QuestionKind::HorizontalAsymptote
        )
    }

    pub fn hint(&self) -> &'static str {
        match self {
            QuestionKind::VerticalAsymptotes => {
                "Vertical asymptotes occur where the denominator equals zero but the numerator doesn't. Factor both numerator and denominator first!"
            }
            QuestionKind::HorizontalAsymptote => {
                "Compare the degrees of the numerator and denominator. If the denominator degree is larger, the asymptote is y = 0. If they are equal, it is the ratio of leading coefficients."
            }
            QuestionKind::XIntercepts => {
                "X-intercepts occur where the numerator equals zero and the denominator doesn't. Set the numerator equal to zero and solve!"
            }
            QuestionKind::Holes => {
                "Holes occur where numerator and denominator share a factor. Factor both and look for factors that cancel!"
            }
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            QuestionKind::VerticalAsymptotes => {
                "Vertical asymptotes occur where the denominator equals zero but the numerator doesn't."
            }
            QuestionKind::HorizontalAsymptote => {
                "Horizontal asymptotes depend on the degrees of numerator and denominator."
            }
            QuestionKind::XIntercepts => {
                "X-intercepts occur where the numerator equals zero but the denominator doesn't."
            }
            QuestionKind::Holes => "Holes occur where both numerator and denominator equal zero.",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Steps shown with a full worked solution.
pub const SOLUTION_STEPS: [&str; 6] = [
    "Factor both numerator and denominator completely",
    "Identify common factors - these create holes",
    "Find vertical asymptotes - where the denominator is 0 after canceling",
    "Find the horizontal asymptote - compare degrees of numerator and denominator",
    "Find x-intercepts - where the numerator is 0 after canceling",
    "Find the y-intercept - substitute x = 0",
];

/// A player's reply to a multiple-choice question.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Zero-based index into `Question::choices`.
    Choice(usize),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub kind: QuestionKind,
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct_index: usize,
    pub correct_value: AnswerValue,
    pub explanation: &'static str,
}

impl Question {
    pub fn correct_choice(&self) -> &str {
        &self.choices[self.correct_index]
    }

    /// Check a response; malformed text or out-of-range choices are errors
    /// so callers can ask again.
    pub fn check(&self, response: &Response) -> Result<bool> {
        match response {
            Response::Choice(i) if *i < self.choices.len() => Ok(*i == self.correct_index),
            Response::Choice(i) => Err(QuizError::InvalidAnswer((i + 1).to_string())),
            Response::Text(text) => {
                let value = analyzer::parse_answer(text)?;
                Ok(analyzer::validate_answer(
                    &value,
                    &self.correct_value,
                    DEFAULT_TOLERANCE,
                ))
            }
        }
    }

    /// The response rendered for history and results screens.
    pub fn describe(&self, response: &Response) -> String {
        match response {
            Response::Choice(i) => self
                .choices
                .get(*i)
                .cloned()
                .unwrap_or_else(|| format!("choice {}", i + 1)),
            Response::Text(text) => text.trim().to_string(),
        }
    }
}

fn format_x_list(values: &[Real]) -> String {
    if values.is_empty() {
        return "None".to_string();
    }
    values
        .iter()
        .map(|v| format!("x = {}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_y(value: Option<&BigRational>) -> String {
    match value {
        Some(v) => format!("y = {}", Real::Exact(v.clone())),
        None => "None".to_string(),
    }
}

/// Build a multiple-choice question about `generated`.
pub fn build_question<R: Rng + ?Sized>(
    rng: &mut R,
    generated: &GeneratedFunction,
    kind: QuestionKind,
) -> Question {
    let analysis = &generated.analysis;
    let function = &generated.function;

    let (prompt, correct, correct_value, distractors) = match kind {
        QuestionKind::HorizontalAsymptote => {
            let correct = format_y(analysis.horizontal_asymptote.as_ref());
            (
                format!("What is the horizontal asymptote of f(x) = {}?", function),
                correct.clone(),
                AnswerValue::from_optional(analysis.horizontal_asymptote.as_ref()),
                horizontal_distractors(rng, analysis, &correct),
            )
        }
        list_kind => {
            let values = list_values(analysis, list_kind);
            let correct = format_x_list(&values);
            let prompt = match list_kind {
                QuestionKind::VerticalAsymptotes => {
                    format!("What are the vertical asymptotes of f(x) = {}?", function)
                }
                QuestionKind::XIntercepts => {
                    format!("What are the x-intercepts of f(x) = {}?", function)
                }
                _ => format!("Where are the holes in f(x) = {}?", function),
            };
            (
                prompt,
                correct.clone(),
                AnswerValue::from_reals(&values),
                list_distractors(rng, &correct),
            )
        }
    };

    let mut choices = distractors;
    choices.push(correct.clone());
    choices.shuffle(rng);
    let correct_index = choices.iter().position(|c| *c == correct).unwrap_or(0);

    Question {
        kind,
        prompt,
        choices,
        correct_index,
        correct_value,
        explanation: kind.explanation(),
    }
}

fn list_values(analysis: &Analysis, kind: QuestionKind) -> Vec<Real> {
    match kind {
        QuestionKind::VerticalAsymptotes => analysis.vertical_asymptotes.clone(),
        QuestionKind::XIntercepts => analysis.x_intercepts.clone(),
        _ => analysis.holes.iter().map(|h| h.x.clone()).collect(),
    }
}

fn list_distractors<R: Rng + ?Sized>(rng: &mut R, correct: &str) -> Vec<String> {
    if correct == "None" {
        return [-1, 0, 1]
            .iter()
            .map(|v| format_x_list(&[Real::Exact(q(*v))]))
            .collect();
    }

    let mut wrong: Vec<String> = Vec::new();
    while wrong.len() < CHOICE_COUNT - 1 {
        let candidate = format_x_list(&[Real::Exact(q(rng.gen_range(-5..=5)))]);
        if candidate != correct && !wrong.contains(&candidate) {
            wrong.push(candidate);
        }
    }
    wrong
}

fn horizontal_distractors<R: Rng + ?Sized>(
    rng: &mut R,
    analysis: &Analysis,
    correct: &str,
) -> Vec<String> {
    let Some(value) = &analysis.horizontal_asymptote else {
        return [0, 1, -1].iter().map(|v| format_y(Some(&q(*v)))).collect();
    };

    let mut wrong: Vec<String> = Vec::new();
    while wrong.len() < CHOICE_COUNT - 1 {
        let offset = rng.gen_range(-3..=3);
        if offset == 0 {
            continue;
        }
        let candidate = format_y(Some(&(value + q(offset))));
        if candidate != correct && !wrong.contains(&candidate) {
            wrong.push(candidate);
        }
    }
    wrong
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::math::parse_rational;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generated(text: &str) -> GeneratedFunction {
        let function = parse_rational(text).unwrap();
        let analysis = analyze(&function).unwrap();
        GeneratedFunction { function, analysis }
    }

    #[test]
    fn test_choices_are_distinct_and_contain_answer() {
        let g = generated("(x - 1)(x + 2)/((x - 1)(x - 3))");
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for kind in QuestionKind::ALL {
                let question = build_question(&mut rng, &g, kind);
                assert_eq!(question.choices.len(), CHOICE_COUNT);
                let mut sorted = question.choices.clone();
                sorted.sort();
                sorted.dedup();
                assert_eq!(sorted.len(), CHOICE_COUNT, "{:?}", question.choices);
                assert!(question.check(&Response::Choice(question.correct_index)).unwrap());
            }
        }
    }

    #[test]
    fn test_correct_answers() {
        let g = generated("(x - 1)(x + 2)/((x - 1)(x - 3))");
        let mut rng = StdRng::seed_from_u64(7);

        let va = build_question(&mut rng, &g, QuestionKind::VerticalAsymptotes);
        assert_eq!(va.correct_choice(), "x = 3");

        let ha = build_question(&mut rng, &g, QuestionKind::HorizontalAsymptote);
        assert_eq!(ha.correct_choice(), "y = 1");

        let holes = build_question(&mut rng, &g, QuestionKind::Holes);
        assert_eq!(holes.correct_choice(), "x = 1");
        assert!(holes.prompt.starts_with("Where are the holes"));
    }

    #[test]
    fn test_none_answers_use_fixed_distractors() {
        let g = generated("x^3/(x^2 + 1)");
        let mut rng = StdRng::seed_from_u64(1);

        let va = build_question(&mut rng, &g, QuestionKind::VerticalAsymptotes);
        assert_eq!(va.correct_choice(), "None");
        assert!(va.choices.contains(&"x = 0".to_string()));

        let ha = build_question(&mut rng, &g, QuestionKind::HorizontalAsymptote);
        assert_eq!(ha.correct_choice(), "None");
        assert!(ha.choices.contains(&"y = -1".to_string()));
    }

    #[test]
    fn test_text_responses() {
        let g = generated("(x + 4)/((x - 2)(x + 1))");
        let mut rng = StdRng::seed_from_u64(3);
        let va = build_question(&mut rng, &g, QuestionKind::VerticalAsymptotes);

        assert!(va.check(&Response::Text("x = 2, x = -1".into())).unwrap());
        assert!(va.check(&Response::Text("-1, 2".into())).unwrap());
        assert!(!va.check(&Response::Text("2".into())).unwrap());
        assert!(va.check(&Response::Text("banana".into())).is_err());
        assert!(va.check(&Response::Choice(9)).is_err());
    }
}
