use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::ExtractedDocument;
use crate::normalize::{KeyEntities, QuizContent, QuizQuestion};

/// Stored quiz for one article URL. Immutable once saved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub sections: Vec<String>,
    pub quiz: Vec<QuizQuestion>,
    pub related_topics: Vec<String>,
    pub key_entities: KeyEntities,
    pub created_at: DateTime<Utc>,
}

/// Pre-persistence value; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewQuizRecord {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub sections: Vec<String>,
    pub quiz: Vec<QuizQuestion>,
    pub related_topics: Vec<String>,
    pub key_entities: KeyEntities,
}

impl NewQuizRecord {
    pub fn new(url: impl Into<String>, doc: ExtractedDocument, content: QuizContent) -> Self {
        Self {
            url: url.into(),
            title: doc.title,
            summary: doc.summary,
            sections: doc.sections,
            quiz: content.quiz,
            related_topics: content.related_topics,
            key_entities: content.key_entities,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticlePreview {
    pub title: String,
}
