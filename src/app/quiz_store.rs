use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::app::model::{NewQuizRecord, QuizRecord};

/// Persistence gateway for generated quizzes, keyed by article URL.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<QuizRecord>>;

    /// Inserts the record unless one already exists for its URL, and returns the stored
    /// record either way.
    async fn save(&self, record: NewQuizRecord) -> anyhow::Result<QuizRecord>;

    /// All records, oldest first.
    async fn list_all(&self) -> anyhow::Result<Vec<QuizRecord>>;
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS quizzes (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    summary TEXT NOT NULL,
    sections TEXT NOT NULL,
    quiz TEXT NOT NULL,
    related_topics TEXT NOT NULL,
    key_entities TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

const SELECT_COLUMNS: &str =
    "SELECT id, url, title, summary, sections, quiz, related_topics, key_entities, created_at FROM quizzes";

#[derive(Clone)]
pub struct SqliteQuizStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteQuizStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database dir: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open database: {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute(SCHEMA, []).context("create quizzes table")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| anyhow::anyhow!("database connection mutex is poisoned"))?;
            f(&conn)
        })
        .await
        .context("join database task")?
    }
}

#[async_trait]
impl QuizStore for SqliteQuizStore {
    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<QuizRecord>> {
        let url = url.to_owned();
        self.with_conn(move |conn| select_by_url(conn, &url)).await
    }

    async fn save(&self, record: NewQuizRecord) -> anyhow::Result<QuizRecord> {
        self.with_conn(move |conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let created_at = Utc::now().to_rfc3339();
            let inserted = conn
                .execute(
                    "INSERT INTO quizzes (id, url, title, summary, sections, quiz, related_topics, key_entities, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT(url) DO NOTHING",
                    params![
                        id,
                        record.url,
                        record.title,
                        record.summary,
                        serde_json::to_string(&record.sections).context("serialize sections")?,
                        serde_json::to_string(&record.quiz).context("serialize quiz")?,
                        serde_json::to_string(&record.related_topics)
                            .context("serialize related_topics")?,
                        serde_json::to_string(&record.key_entities)
                            .context("serialize key_entities")?,
                        created_at,
                    ],
                )
                .context("insert quiz")?;

            if inserted == 0 {
                tracing::info!(url = %record.url, "quiz already stored for url; keeping existing record");
            }

            select_by_url(conn, &record.url)?
                .ok_or_else(|| anyhow::anyhow!("quiz missing after insert: {}", record.url))
        })
        .await
    }

    async fn list_all(&self) -> anyhow::Result<Vec<QuizRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("{SELECT_COLUMNS} ORDER BY rowid"))
                .context("prepare history query")?;
            let rows = stmt
                .query_map([], StoredRow::from_row)
                .context("query history")?
                .collect::<Result<Vec<_>, _>>()
                .context("read history rows")?;
            rows.into_iter().map(StoredRow::into_record).collect()
        })
        .await
    }
}

fn select_by_url(conn: &Connection, url: &str) -> anyhow::Result<Option<QuizRecord>> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE url = ?1"),
            params![url],
            StoredRow::from_row,
        )
        .optional()
        .with_context(|| format!("query quiz by url: {url}"))?;
    row.map(StoredRow::into_record).transpose()
}

/// Raw column values; JSON columns are decoded outside the rusqlite row callback.
struct StoredRow {
    id: String,
    url: String,
    title: String,
    summary: String,
    sections: String,
    quiz: String,
    related_topics: String,
    key_entities: String,
    created_at: String,
}

impl StoredRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            summary: row.get(3)?,
            sections: row.get(4)?,
            quiz: row.get(5)?,
            related_topics: row.get(6)?,
            key_entities: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_record(self) -> anyhow::Result<QuizRecord> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .with_context(|| format!("parse created_at of {}", self.id))?
            .with_timezone(&Utc);

        Ok(QuizRecord {
            sections: serde_json::from_str(&self.sections).context("parse stored sections")?,
            quiz: serde_json::from_str(&self.quiz).context("parse stored quiz")?,
            related_topics: serde_json::from_str(&self.related_topics)
                .context("parse stored related_topics")?,
            key_entities: serde_json::from_str(&self.key_entities)
                .context("parse stored key_entities")?,
            id: self.id,
            url: self.url,
            title: self.title,
            summary: self.summary,
            created_at,
        })
    }
}
