//! Storage abstraction for archived articles.
//!
//! The [`ArticleStore`] trait defines every storage operation the ingestion
//! pipeline and query surface need, so the SQLite store and the in-memory
//! store are interchangeable behind an `Arc<dyn ArticleStore>`.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`count`](ArticleStore::count) | Number of stored articles |
//! | [`find_by_filename`](ArticleStore::find_by_filename) | Lookup by natural key |
//! | [`insert_many`](ArticleStore::insert_many) | Bulk insert new articles |
//! | [`update_article`](ArticleStore::update_article) | Replace changed fields in place |
//! | [`get`](ArticleStore::get) | Lookup by id |
//! | [`list_page`](ArticleStore::list_page) | Newest-first page of articles |
//! | [`keyword_search`](ArticleStore::keyword_search) | Relevance-ranked keyword search |
//! | [`stats`](ArticleStore::stats) | Aggregate counts for `news stats` |

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ArticleRecord, NewArticle, ScoredArticle};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn count(&self) -> Result<i64>;

    async fn find_by_filename(&self, filename: &str) -> Result<Option<ArticleRecord>>;

    /// Insert every record, or none of them.
    ///
    /// Fails if any `filename` is already stored.
    async fn insert_many(&self, records: &[ArticleRecord]) -> Result<()>;

    /// Overwrite title, author, content, publish date, and `last_updated` of
    /// the article stored under `article.filename`. `id` and `created_at`
    /// are left untouched.
    async fn update_article(&self, article: &NewArticle, last_updated: i64) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<ArticleRecord>>;

    /// Articles ordered by `publish_date` descending (missing dates last),
    /// then by filename.
    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<ArticleRecord>>;

    /// Articles matching any term of `query`, best first.
    async fn keyword_search(&self, query: &str, limit: i64) -> Result<Vec<ScoredArticle>>;

    async fn stats(&self) -> Result<StoreStats>;

    /// Release any held resources. The store must not be used afterwards.
    async fn close(&self) {}
}

/// Aggregate view of a store's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub articles: i64,
    pub dated: i64,
    pub empty_content: i64,
    pub newest_date: Option<String>,
    pub oldest_date: Option<String>,
    pub last_updated: Option<i64>,
}

/// Ordering shared by every backend's `list_page`.
pub(crate) fn newest_first(a: &ArticleRecord, b: &ArticleRecord) -> std::cmp::Ordering {
    b.publish_date
        .cmp(&a.publish_date)
        .then_with(|| a.filename.cmp(&b.filename))
}
