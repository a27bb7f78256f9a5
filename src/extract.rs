use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, USER_AGENT};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

use crate::error::{QuizError, Result};

pub const FETCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) WikiQuizApp/1.0";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const UNKNOWN_TITLE: &str = "Unknown Title";
const NO_SUMMARY: &str = "No summary available";
const EXCERPT_PARAGRAPHS: usize = 8;
const SUMMARY_CANDIDATES: usize = 5;
const SUMMARY_MIN_CHARS: usize = 50;
const SUMMARY_MAX_CHARS: usize = 300;
const SUMMARY_FALLBACK_CHARS: usize = 200;
const MAX_SECTIONS: usize = 15;
const EDIT_MARKER: &str = "[edit]";
const BOILERPLATE_HEADINGS: [&str; 5] =
    ["contents", "see also", "references", "external links", "notes"];
const GENERIC_SECTIONS: [&str; 4] = ["Introduction", "Main Content", "History", "Legacy"];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub title: String,
    /// Text handed to the model: the leading meaningful paragraphs.
    pub content: String,
    pub summary: String,
    pub sections: Vec<String>,
}

pub fn build_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .context("build document http client")
}

/// Accepts only absolute http(s) URLs with a host.
pub fn parse_article_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| QuizError::InvalidUrl {
        url: raw.to_owned(),
        reason,
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid("url is required".to_owned()));
    }
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("scheme must be http/https".to_owned()));
    }
    if url.host_str().is_none() {
        return Err(invalid("url must include host".to_owned()));
    }
    Ok(url)
}

pub async fn extract(client: &reqwest::Client, url: &Url) -> Result<ExtractedDocument> {
    let html = fetch_html(client, url).await?;
    let doc = extract_from_html(&html);

    tracing::info!(
        url = %url,
        title = %doc.title,
        summary_chars = doc.summary.chars().count(),
        sections = doc.sections.len(),
        "scraped article"
    );
    Ok(doc)
}

async fn fetch_html(client: &reqwest::Client, url: &Url) -> Result<String> {
    let resp = client
        .get(url.clone())
        .header(USER_AGENT, FETCH_USER_AGENT)
        .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|err| QuizError::fetch(url.as_str(), format!("GET failed: {err}")))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(QuizError::fetch(url.as_str(), format!("status {status}")));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|err| QuizError::fetch(url.as_str(), format!("read body: {err}")))?;

    String::from_utf8(bytes.to_vec()).map_err(|err| QuizError::Parse {
        url: url.to_string(),
        message: format!("body is not utf-8 markup: {err}"),
    })
}

pub fn extract_from_html(html: &str) -> ExtractedDocument {
    let document = Html::parse_document(html);

    let paragraphs = meaningful_paragraphs(&document);
    let content = paragraphs
        .iter()
        .take(EXCERPT_PARAGRAPHS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    ExtractedDocument {
        title: extract_title(&document),
        content,
        summary: summarize(&paragraphs),
        sections: extract_sections(&document),
    }
}

fn selector(css: &str) -> Selector {
    // Only called with the literal selectors below.
    Selector::parse(css).expect("valid css selector")
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_owned()
}

fn extract_title(document: &Html) -> String {
    ["h1#firstHeading", "h1"]
        .into_iter()
        .find_map(|css| document.select(&selector(css)).next())
        .map(element_text)
        .unwrap_or_else(|| UNKNOWN_TITLE.to_owned())
}

fn meaningful_paragraphs(document: &Html) -> Vec<String> {
    let p = selector("p");
    let texts: Vec<String> = match document.select(&selector("div#mw-content-text")).next() {
        Some(container) => container.select(&p).map(element_text).collect(),
        None => document.select(&p).map(element_text).collect(),
    };
    texts.into_iter().filter(|t| !t.is_empty()).collect()
}

fn summarize(paragraphs: &[String]) -> String {
    let preferred = paragraphs
        .iter()
        .take(SUMMARY_CANDIDATES)
        .find(|p| p.chars().count() > SUMMARY_MIN_CHARS);

    if let Some(paragraph) = preferred {
        if paragraph.chars().count() > SUMMARY_MAX_CHARS {
            return format!("{}...", truncate_chars(paragraph, SUMMARY_MAX_CHARS));
        }
        return paragraph.clone();
    }

    match paragraphs.first() {
        Some(first) => truncate_chars(first, SUMMARY_FALLBACK_CHARS).to_owned(),
        None => NO_SUMMARY.to_owned(),
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn extract_sections(document: &Html) -> Vec<String> {
    let headline_sections = collect_sections(
        document
            .select(&selector("h2 .mw-headline"))
            .map(element_text),
    );
    if !headline_sections.is_empty() {
        return headline_sections;
    }

    let h2_sections = collect_sections(
        document
            .select(&selector("h2"))
            .map(|h2| element_text(h2).replace(EDIT_MARKER, "").trim().to_owned()),
    );
    if !h2_sections.is_empty() {
        return h2_sections;
    }

    GENERIC_SECTIONS.iter().map(|s| (*s).to_owned()).collect()
}

fn collect_sections(headings: impl Iterator<Item = String>) -> Vec<String> {
    headings
        .filter(|text| !text.is_empty() && !is_boilerplate_heading(text))
        .take(MAX_SECTIONS)
        .collect()
}

fn is_boilerplate_heading(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    BOILERPLATE_HEADINGS.contains(&lower.as_str())
}
