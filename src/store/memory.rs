//! In-memory [`ArticleStore`] used by `backend = "memory"` and tests.
//!
//! Articles live in a `HashMap` keyed by filename behind a `RwLock`.
//! Keyword search scores by summed term frequency over whole words.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::models::{ArticleRecord, NewArticle, ScoredArticle};
use crate::text::tokenize;

use super::{newest_first, ArticleStore, StoreStats};

pub struct InMemoryStore {
    articles: RwLock<HashMap<String, ArticleRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            articles: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory article store lock poisoned")
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn count(&self) -> Result<i64> {
        let articles = self.articles.read().map_err(poisoned)?;
        Ok(articles.len() as i64)
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<ArticleRecord>> {
        let articles = self.articles.read().map_err(poisoned)?;
        Ok(articles.get(filename).cloned())
    }

    async fn insert_many(&self, records: &[ArticleRecord]) -> Result<()> {
        let mut articles = self.articles.write().map_err(poisoned)?;
        for (i, record) in records.iter().enumerate() {
            let repeated = records[..i].iter().any(|r| r.filename == record.filename);
            if repeated || articles.contains_key(&record.filename) {
                bail!("duplicate filename: {}", record.filename);
            }
        }
        for record in records {
            articles.insert(record.filename.clone(), record.clone());
        }
        Ok(())
    }

    async fn update_article(&self, article: &NewArticle, last_updated: i64) -> Result<()> {
        let mut articles = self.articles.write().map_err(poisoned)?;
        let stored = articles
            .get_mut(&article.filename)
            .ok_or_else(|| anyhow!("no article stored for {}", article.filename))?;
        stored.title = article.title.clone();
        stored.author = article.author.clone();
        stored.content = article.content.clone();
        stored.publish_date = article.publish_date.clone();
        stored.last_updated = last_updated;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ArticleRecord>> {
        let articles = self.articles.read().map_err(poisoned)?;
        Ok(articles.values().find(|a| a.id == id).cloned())
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<ArticleRecord>> {
        let articles = self.articles.read().map_err(poisoned)?;
        let mut all: Vec<&ArticleRecord> = articles.values().collect();
        all.sort_by(|a, b| newest_first(a, b));
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn keyword_search(&self, query: &str, limit: i64) -> Result<Vec<ScoredArticle>> {
        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let articles = self.articles.read().map_err(poisoned)?;
        let mut hits: Vec<ScoredArticle> = articles
            .values()
            .filter_map(|article| {
                let words = tokenize(&format!("{} {}", article.title, article.content));
                let tf = words.iter().filter(|w| terms.contains(w)).count();
                (tf > 0).then(|| ScoredArticle {
                    article: article.clone(),
                    score: tf as f64,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.article.filename.cmp(&b.article.filename))
        });
        hits.truncate(limit.max(0) as usize);
        Ok(hits)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let articles = self.articles.read().map_err(poisoned)?;
        let dates = articles.values().filter_map(|a| a.publish_date.as_ref());
        Ok(StoreStats {
            articles: articles.len() as i64,
            dated: dates.clone().count() as i64,
            empty_content: articles.values().filter(|a| a.content.is_empty()).count() as i64,
            newest_date: dates.clone().max().cloned(),
            oldest_date: dates.min().cloned(),
            last_updated: articles.values().map(|a| a.last_updated).max(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(filename: &str, date: Option<&str>, content: &str) -> ArticleRecord {
        ArticleRecord {
            id: format!("id-{}", filename),
            filename: filename.to_string(),
            title: filename.trim_end_matches(".txt").to_string(),
            author: "Unknown".to_string(),
            content: content.to_string(),
            publish_date: date.map(str::to_string),
            created_at: 100,
            last_updated: 100,
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicates_atomically() {
        let store = InMemoryStore::new();
        store
            .insert_many(&[record("a.txt", None, "x")])
            .await
            .unwrap();

        let err = store
            .insert_many(&[record("b.txt", None, "y"), record("a.txt", None, "z")])
            .await;
        assert!(err.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_by_filename("b.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_id_and_created_at() {
        let store = InMemoryStore::new();
        store
            .insert_many(&[record("a.txt", None, "old")])
            .await
            .unwrap();

        let changed = NewArticle {
            filename: "a.txt".to_string(),
            title: "New".to_string(),
            author: "Ed".to_string(),
            content: "new".to_string(),
            publish_date: Some("2001-01-01".to_string()),
        };
        store.update_article(&changed, 200).await.unwrap();

        let stored = store.find_by_filename("a.txt").await.unwrap().unwrap();
        assert_eq!(stored.id, "id-a.txt");
        assert_eq!(stored.created_at, 100);
        assert_eq!(stored.last_updated, 200);
        assert_eq!(stored.content, "new");
        assert_eq!(stored.title, "New");
    }

    #[tokio::test]
    async fn list_page_newest_first_missing_dates_last() {
        let store = InMemoryStore::new();
        store
            .insert_many(&[
                record("old.txt", Some("1999-01-01"), ""),
                record("undated.txt", None, ""),
                record("new.txt", Some("2006-11-17"), ""),
            ])
            .await
            .unwrap();

        let page = store.list_page(0, 10).await.unwrap();
        let names: Vec<&str> = page.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["new.txt", "old.txt", "undated.txt"]);

        let second = store.list_page(1, 1).await.unwrap();
        assert_eq!(second[0].filename, "old.txt");
    }

    #[tokio::test]
    async fn keyword_search_ranks_by_term_frequency() {
        let store = InMemoryStore::new();
        store
            .insert_many(&[
                record("one.txt", None, "The flood reached the bridge."),
                record("two.txt", None, "Flood warnings: flood, flood everywhere."),
                record("three.txt", None, "Sunny weather all week."),
            ])
            .await
            .unwrap();

        let hits = store.keyword_search("FLOOD", 10).await.unwrap();
        let names: Vec<&str> = hits.iter().map(|h| h.article.filename.as_str()).collect();
        assert_eq!(names, vec!["two.txt", "one.txt"]);
        assert!(hits[0].score > hits[1].score);

        assert!(store.keyword_search("  ", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_summarize_contents() {
        let store = InMemoryStore::new();
        assert_eq!(store.stats().await.unwrap(), StoreStats::default());

        store
            .insert_many(&[
                record("a.txt", Some("1999-01-01"), "x"),
                record("b.txt", None, ""),
                record("c.txt", Some("2006-11-17"), "y"),
            ])
            .await
            .unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.articles, 3);
        assert_eq!(stats.dated, 2);
        assert_eq!(stats.empty_content, 1);
        assert_eq!(stats.newest_date.as_deref(), Some("2006-11-17"));
        assert_eq!(stats.oldest_date.as_deref(), Some("1999-01-01"));
        assert_eq!(stats.last_updated, Some(100));
    }
}
