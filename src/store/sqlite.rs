//! SQLite-backed [`ArticleStore`].
//!
//! Articles live in the `articles` table with a UNIQUE `filename`. Title and
//! content are mirrored into the `articles_fts` FTS5 table inside the same
//! transaction as every write, and keyword search ranks with `bm25()`.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::db;
use crate::migrate;
use crate::models::{ArticleRecord, NewArticle, ScoredArticle};
use crate::text::tokenize;

use super::{ArticleStore, StoreStats};

const COLUMNS: &str =
    "a.id, a.filename, a.title, a.author, a.content, a.publish_date, a.created_at, a.last_updated";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect(path).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }
}

fn row_to_record(row: &SqliteRow) -> ArticleRecord {
    ArticleRecord {
        id: row.get("id"),
        filename: row.get("filename"),
        title: row.get("title"),
        author: row.get("author"),
        content: row.get("content"),
        publish_date: row.get("publish_date"),
        created_at: row.get("created_at"),
        last_updated: row.get("last_updated"),
    }
}

/// Turn free text into an FTS5 query that ORs every distinct word.
///
/// Each word is quoted, so operators and punctuation in user input are never
/// interpreted as FTS syntax.
fn fts_query(query: &str) -> Option<String> {
    let mut terms = tokenize(query);
    terms.sort();
    terms.dedup();
    if terms.is_empty() {
        return None;
    }
    Some(
        terms
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<ArticleRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles a WHERE a.filename = ?",
            COLUMNS
        ))
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn insert_many(&self, records: &[ArticleRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO articles (id, filename, title, author, content, publish_date, created_at, last_updated)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.id)
            .bind(&record.filename)
            .bind(&record.title)
            .bind(&record.author)
            .bind(&record.content)
            .bind(&record.publish_date)
            .bind(record.created_at)
            .bind(record.last_updated)
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO articles_fts (article_id, title, content) VALUES (?, ?, ?)")
                .bind(&record.id)
                .bind(&record.title)
                .bind(&record.content)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_article(&self, article: &NewArticle, last_updated: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let id: Option<String> = sqlx::query_scalar("SELECT id FROM articles WHERE filename = ?")
            .bind(&article.filename)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(id) = id else {
            bail!("no article stored for {}", article.filename);
        };

        sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, author = ?, content = ?, publish_date = ?, last_updated = ?
            WHERE id = ?
            "#,
        )
        .bind(&article.title)
        .bind(&article.author)
        .bind(&article.content)
        .bind(&article.publish_date)
        .bind(last_updated)
        .bind(&id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM articles_fts WHERE article_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO articles_fts (article_id, title, content) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&article.title)
            .bind(&article.content)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ArticleRecord>> {
        let row = sqlx::query(&format!("SELECT {} FROM articles a WHERE a.id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<ArticleRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles a ORDER BY a.publish_date DESC, a.filename ASC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn keyword_search(&self, query: &str, limit: i64) -> Result<Vec<ScoredArticle>> {
        let Some(fts) = fts_query(query) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}, bm25(articles_fts) AS rank
            FROM articles_fts
            JOIN articles a ON a.id = articles_fts.article_id
            WHERE articles_fts MATCH ?
            ORDER BY rank, a.filename
            LIMIT ?
            "#,
            COLUMNS
        ))
        .bind(&fts)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let rank: f64 = row.get("rank");
                ScoredArticle {
                    article: row_to_record(row),
                    score: -rank, // negate so higher = better
                }
            })
            .collect())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS articles,
                COUNT(publish_date) AS dated,
                COALESCE(SUM(CASE WHEN content = '' THEN 1 ELSE 0 END), 0) AS empty_content,
                MAX(publish_date) AS newest_date,
                MIN(publish_date) AS oldest_date,
                MAX(last_updated) AS last_updated
            FROM articles
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreStats {
            articles: row.get("articles"),
            dated: row.get("dated"),
            empty_content: row.get("empty_content"),
            newest_date: row.get("newest_date"),
            oldest_date: row.get("oldest_date"),
            last_updated: row.get("last_updated"),
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, filename: &str, date: Option<&str>, content: &str) -> ArticleRecord {
        ArticleRecord {
            id: id.to_string(),
            filename: filename.to_string(),
            title: filename.trim_end_matches(".txt").to_string(),
            author: "Unknown".to_string(),
            content: content.to_string(),
            publish_date: date.map(str::to_string),
            created_at: 10,
            last_updated: 10,
        }
    }

    #[test]
    fn fts_query_quotes_and_ors_terms() {
        assert_eq!(
            fts_query("Flood AND \"bridge\" flood").as_deref(),
            Some("\"and\" OR \"bridge\" OR \"flood\"")
        );
        assert_eq!(fts_query(" ?! "), None);
    }

    #[tokio::test]
    async fn insert_update_search_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::open(&tmp.path().join("news.sqlite"))
            .await
            .unwrap();

        store
            .insert_many(&[
                record("1", "a.txt", Some("2001-05-05"), "The harbor flooded overnight."),
                record("2", "b.txt", None, "Election results were announced."),
            ])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        let hits = store.keyword_search("harbor", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].article.id, "1");

        let changed = NewArticle {
            filename: "a.txt".to_string(),
            title: "Harbor".to_string(),
            author: "Desk".to_string(),
            content: "Election night at the harbor.".to_string(),
            publish_date: Some("2001-05-06".to_string()),
        };
        store.update_article(&changed, 20).await.unwrap();

        let stored = store.get("1").await.unwrap().unwrap();
        assert_eq!(stored.created_at, 10);
        assert_eq!(stored.last_updated, 20);
        assert_eq!(stored.content, "Election night at the harbor.");

        // The FTS row follows the update.
        assert!(store.keyword_search("flooded", 10).await.unwrap().is_empty());
        assert_eq!(store.keyword_search("election", 10).await.unwrap().len(), 2);

        store.close().await;
    }

    #[tokio::test]
    async fn duplicate_filename_rolls_back_batch() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::open(&tmp.path().join("news.sqlite"))
            .await
            .unwrap();

        store
            .insert_many(&[record("1", "a.txt", None, "x")])
            .await
            .unwrap();
        let result = store
            .insert_many(&[record("2", "b.txt", None, "y"), record("3", "a.txt", None, "z")])
            .await;
        assert!(result.is_err());
        assert_eq!(store.count().await.unwrap(), 1);

        store.close().await;
    }

    #[tokio::test]
    async fn list_page_orders_by_date_desc() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::open(&tmp.path().join("news.sqlite"))
            .await
            .unwrap();

        store
            .insert_many(&[
                record("1", "old.txt", Some("1999-01-01"), ""),
                record("2", "undated.txt", None, ""),
                record("3", "new.txt", Some("2006-11-17"), ""),
            ])
            .await
            .unwrap();

        let page = store.list_page(0, 10).await.unwrap();
        let names: Vec<&str> = page.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["new.txt", "old.txt", "undated.txt"]);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.articles, 3);
        assert_eq!(stats.dated, 2);
        assert_eq!(stats.empty_content, 3);
        assert_eq!(stats.newest_date.as_deref(), Some("2006-11-17"));

        store.close().await;
    }
}
