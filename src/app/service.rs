use std::sync::Arc;

use url::Url;

use crate::app::model::{ArticlePreview, NewQuizRecord, QuizRecord};
use crate::app::quiz_store::QuizStore;
use crate::app::url_lock::UrlLocks;
use crate::error::{QuizError, Result};
use crate::extract;
use crate::generate::QuizGenerator;
use crate::normalize;

/// Cache-or-generate orchestration over the extractor, generator and store.
#[derive(Clone)]
pub struct QuizService {
    http: reqwest::Client,
    generator: Arc<dyn QuizGenerator>,
    store: Arc<dyn QuizStore>,
    locks: UrlLocks,
}

impl QuizService {
    pub fn new(
        http: reqwest::Client,
        generator: Arc<dyn QuizGenerator>,
        store: Arc<dyn QuizStore>,
    ) -> Self {
        Self {
            http,
            generator,
            store,
            locks: UrlLocks::new(),
        }
    }

    pub async fn preview(&self, raw_url: &str) -> Result<ArticlePreview> {
        let url = extract::parse_article_url(raw_url)?;
        let doc = extract::extract(&self.http, &url).await?;
        Ok(ArticlePreview { title: doc.title })
    }

    /// Returns the stored quiz for `raw_url`, generating and saving it on a cache miss.
    pub async fn generate(&self, raw_url: &str) -> Result<QuizRecord> {
        let url = extract::parse_article_url(raw_url)?;
        // Keyed by the caller's string so lookups match what was stored.
        let key = raw_url.trim();

        if let Some(existing) = self.find(key).await? {
            tracing::info!(url = key, id = %existing.id, "quiz cache hit");
            return Ok(existing);
        }

        let _guard = self.locks.lock(key).await;
        if let Some(existing) = self.find(key).await? {
            tracing::info!(url = key, id = %existing.id, "quiz generated by concurrent request");
            return Ok(existing);
        }

        let record = self.build_record(key, &url).await?;
        let saved = self.store.save(record).await.map_err(QuizError::Store)?;
        tracing::info!(url = key, id = %saved.id, questions = saved.quiz.len(), "quiz saved");
        Ok(saved)
    }

    pub async fn history(&self) -> Result<Vec<QuizRecord>> {
        self.store.list_all().await.map_err(QuizError::Store)
    }

    async fn find(&self, key: &str) -> Result<Option<QuizRecord>> {
        self.store.find_by_url(key).await.map_err(QuizError::Store)
    }

    async fn build_record(&self, key: &str, url: &Url) -> Result<NewQuizRecord> {
        let doc = extract::extract(&self.http, url).await?;
        let raw = self.generator.request_quiz(&doc.content).await?;
        let content = normalize::normalize(&raw, &mut rand::thread_rng())?;
        Ok(NewQuizRecord::new(key, doc, content))
    }
}
