use rand::Rng;
use rand::seq::SliceRandom as _;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    /// Nominally easy / medium / hard; kept as the model wrote it.
    pub difficulty: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyEntities {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

/// The model-derived half of a quiz record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizContent {
    pub quiz: Vec<QuizQuestion>,
    #[serde(default)]
    pub related_topics: Vec<String>,
    #[serde(default)]
    pub key_entities: KeyEntities,
}

/// Parses raw model output and shuffles every question's options.
///
/// Fails closed: anything that does not deserialize into [`QuizContent`] is a
/// [`QuizError::MalformedResponse`]. No repair is attempted.
pub fn normalize<R: Rng + ?Sized>(raw: &str, rng: &mut R) -> Result<QuizContent> {
    let mut content: QuizContent =
        serde_json::from_str(raw).map_err(QuizError::MalformedResponse)?;

    for question in &mut content.quiz {
        let options = std::mem::take(&mut question.options);
        question.options = shuffle_options(options, &question.answer, rng);
    }

    tracing::debug!(
        questions = content.quiz.len(),
        related_topics = content.related_topics.len(),
        "normalized quiz"
    );
    Ok(content)
}

/// Reorders `options` so the correct answer is not always in the same slot.
///
/// The returned options always contain `answer`:
/// - empty options become `[answer]`;
/// - options that lack `answer` are left unshuffled with `answer` written into slot 0;
/// - otherwise the result is a permutation of the input.
pub fn shuffle_options<R: Rng + ?Sized>(
    mut options: Vec<String>,
    answer: &str,
    rng: &mut R,
) -> Vec<String> {
    if options.is_empty() {
        tracing::warn!(answer, "question has no options; using the answer alone");
        return vec![answer.to_owned()];
    }

    if !options.iter().any(|o| o == answer) {
        tracing::warn!(answer, "answer missing from options; forcing it into slot 0");
        options[0] = answer.to_owned();
        return options;
    }

    options.shuffle(rng);
    options
}
