//! Game modes. Each one is a plain state machine driven by the CLI; callers
//! pass in the current `Instant` and an RNG so the modes never read the
//! clock or global randomness themselves.

pub mod multiplayer;
pub mod practice;
pub mod timed;

use rand::Rng;

use crate::error::Result;
use crate::generator::{generate, GeneratedFunction, GenerationRequest, HolePolicy};
use crate::models::Difficulty;
use crate::question::{build_question, Question, QuestionKind};

/// A generated function with the question asked about it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizItem {
    pub generated: GeneratedFunction,
    pub question: Question,
    pub difficulty: Difficulty,
}

impl QuizItem {
    /// `kind` of `None` picks a question kind at random.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        difficulty: Difficulty,
        kind: Option<QuestionKind>,
        holes: HolePolicy,
    ) -> Result<Self> {
        let generated = generate(rng, GenerationRequest::new(difficulty, holes))?;
        let kind = kind.unwrap_or_else(|| QuestionKind::random(rng));
        let question = build_question(rng, &generated, kind);
        Ok(Self {
            generated,
            question,
            difficulty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_quiz_item_respects_kind() {
        let mut rng = StdRng::seed_from_u64(5);
        let item = QuizItem::generate(
            &mut rng,
            Difficulty::Advanced,
            Some(QuestionKind::Holes),
            HolePolicy::Always,
        )
        .unwrap();
        assert_eq!(item.question.kind, QuestionKind::Holes);
        assert_eq!(item.difficulty, Difficulty::Advanced);
        assert_ne!(item.question.correct_choice(), "None");
    }
}
