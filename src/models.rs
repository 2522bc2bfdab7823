//! Core data models used throughout the archive.
//!
//! These types represent the articles that flow from the ingestion pipeline
//! into a store, and the scored hits that come back out of it.

use serde::Serialize;

/// Article fields derived from one archive file, before it has an id or
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub filename: String,
    pub title: String,
    pub author: String,
    pub content: String,
    pub publish_date: Option<String>,
}

/// Article as persisted in a store.
///
/// `filename` is the natural key; `id` is assigned once at insert and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: String,
    pub filename: String,
    pub title: String,
    pub author: String,
    pub content: String,
    pub publish_date: Option<String>,
    pub created_at: i64,
    pub last_updated: i64,
}

impl ArticleRecord {
    pub fn from_new(id: String, article: &NewArticle, now: i64) -> Self {
        Self {
            id,
            filename: article.filename.clone(),
            title: article.title.clone(),
            author: article.author.clone(),
            content: article.content.clone(),
            publish_date: article.publish_date.clone(),
            created_at: now,
            last_updated: now,
        }
    }
}

/// An article returned by keyword search with its relevance score
/// (higher is better).
#[derive(Debug, Clone)]
pub struct ScoredArticle {
    pub article: ArticleRecord,
    pub score: f64,
}

/// Reference to the article an answer or excerpt came from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SourceRef {
    pub id: String,
    pub title: String,
    pub author: String,
    pub publish_date: Option<String>,
}

impl From<&ArticleRecord> for SourceRef {
    fn from(article: &ArticleRecord) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            author: article.author.clone(),
            publish_date: article.publish_date.clone(),
        }
    }
}

pub fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
