use anyhow::Context as _;
use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::error::{QuizError, Result};
use crate::openai;

/// Text-completion service that turns an article excerpt into raw quiz JSON.
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    async fn request_quiz(&self, excerpt: &str) -> Result<String>;
}

pub fn quiz_prompt(excerpt: &str) -> String {
    format!(
        "You are an educational quiz generator.\n\
\n\
Use ONLY the content below. Do NOT add outside knowledge.\n\
\n\
Generate:\n\
- 5-10 multiple-choice questions\n\
- 4 options per question\n\
- correct answer (copied exactly from one of the options)\n\
- difficulty (easy / medium / hard)\n\
- short explanation\n\
- related Wikipedia topics\n\
- key entities (people, organizations, locations) mentioned in the content\n\
\n\
Return STRICT JSON in this format (no markdown fences, no commentary):\n\
{{\n\
  \"quiz\": [\n\
    {{\n\
      \"question\": \"\",\n\
      \"options\": [\"\", \"\", \"\", \"\"],\n\
      \"answer\": \"\",\n\
      \"difficulty\": \"\",\n\
      \"explanation\": \"\"\n\
    }}\n\
  ],\n\
  \"related_topics\": [],\n\
  \"key_entities\": {{\n\
    \"people\": [],\n\
    \"organizations\": [],\n\
    \"locations\": []\n\
  }}\n\
}}\n\
\n\
Content:\n\
{excerpt}\n"
    )
}

#[derive(Debug, Clone)]
pub struct OpenAiQuizGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiQuizGenerator {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("build completion http client")?;

        Ok(Self {
            client,
            endpoint: openai::chat_completions_endpoint(&config.base_url),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl QuizGenerator for OpenAiQuizGenerator {
    async fn request_quiz(&self, excerpt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(QuizError::Generation(
                "no API key configured (set WIKIQUIZ_LLM_API_KEY or GROQ_API_KEY)".to_owned(),
            ));
        };

        tracing::info!(
            model = %self.model,
            excerpt_chars = excerpt.chars().count(),
            "requesting quiz"
        );

        openai::chat_completion_text(
            &self.client,
            &self.endpoint,
            api_key,
            &self.model,
            &quiz_prompt(excerpt),
            self.temperature,
        )
        .await
        .map_err(|err| QuizError::Generation(format!("{err:#}")))
    }
}
