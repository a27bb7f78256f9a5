use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;

pub const DEFAULT_DB_PATH: &str = "wikiquiz.sqlite3";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

const API_KEY_VARS: [&str; 3] = ["WIKIQUIZ_LLM_API_KEY", "GROQ_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub llm: LlmConfig,
}

#[derive(Clone)]
pub struct LlmConfig {
    /// `None` when no key is configured; generation then fails while preview/history still work.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let db_path = var("WIKIQUIZ_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_owned());
        let api_key = API_KEY_VARS.iter().find_map(|name| var(name));

        let temperature = match var("WIKIQUIZ_LLM_TEMPERATURE") {
            None => DEFAULT_LLM_TEMPERATURE,
            Some(raw) => parse_temperature(&raw)
                .with_context(|| format!("invalid WIKIQUIZ_LLM_TEMPERATURE={raw:?}"))?,
        };
        let timeout_secs = match var("WIKIQUIZ_LLM_TIMEOUT_SECS") {
            None => DEFAULT_LLM_TIMEOUT_SECS,
            Some(raw) => parse_timeout_secs(&raw)
                .with_context(|| format!("invalid WIKIQUIZ_LLM_TIMEOUT_SECS={raw:?}"))?,
        };

        Ok(Self {
            db_path: PathBuf::from(db_path),
            llm: LlmConfig {
                api_key,
                base_url: var("WIKIQUIZ_LLM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_owned()),
                model: var("WIKIQUIZ_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_owned()),
                temperature,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_temperature(raw: &str) -> anyhow::Result<f32> {
    let value: f32 = raw.parse().context("not a number")?;
    if !(0.0..=2.0).contains(&value) {
        anyhow::bail!("temperature must be within 0..=2");
    }
    Ok(value)
}

fn parse_timeout_secs(raw: &str) -> anyhow::Result<u64> {
    let value: u64 = raw.parse().context("not an integer")?;
    if value == 0 {
        anyhow::bail!("timeout must be > 0");
    }
    Ok(value)
}
