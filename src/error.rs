use thiserror::Error;

/// Failure modes of a single quiz request. None of them are retried.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("parse document {url}: {message}")]
    Parse { url: String, message: String },

    #[error("quiz generation failed: {0}")]
    Generation(String),

    #[error("model returned a malformed quiz: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("quiz store: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl QuizError {
    pub(crate) fn fetch(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.to_owned(),
            message: err.to_string(),
        }
    }

    /// True when the failure was caused by an upstream service (document host or model).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. }
                | Self::Parse { .. }
                | Self::Generation(_)
                | Self::MalformedResponse(_)
        )
    }
}

pub type Result<T, E = QuizError> = std::result::Result<T, E>;
