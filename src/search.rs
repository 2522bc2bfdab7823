//! Keyword search over the archive.
//!
//! Ranking is left to the store (FTS5 `bm25()` for SQLite). This module
//! shapes the hits for display: each result carries a preview centred on
//! the first place any query word appears in the article.

use anyhow::Result;
use serde::Serialize;

use crate::context::AppContext;
use crate::error::QueryError;
use crate::text::{first_match, slice_chars, tokenize, truncate_chars};

const PREVIEW_BEFORE: usize = 100;
const PREVIEW_AFTER: usize = 300;
const PREVIEW_FALLBACK: usize = 400;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub score: f64,
    pub publish_date: Option<String>,
    pub author: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total: usize,
    pub query: String,
}

/// Text around the earliest match of any `terms` in `content`, or its
/// opening characters when nothing matches.
pub fn preview(content: &str, terms: &[String]) -> String {
    let context = match first_match(content, terms) {
        Some(pos) => slice_chars(
            content,
            pos.saturating_sub(PREVIEW_BEFORE),
            pos + PREVIEW_AFTER,
        ),
        None => truncate_chars(content, PREVIEW_FALLBACK),
    };
    format!("...{}...", context)
}

pub async fn search_articles(
    ctx: &AppContext,
    query: &str,
    limit: Option<i64>,
) -> Result<SearchResponse, QueryError> {
    let limit = limit.unwrap_or(ctx.config.retrieval.search_limit);
    if limit < 1 {
        return Err(QueryError::BadRequest("limit must be >= 1".to_string()));
    }

    if query.trim().is_empty() {
        return Ok(SearchResponse {
            results: Vec::new(),
            total: 0,
            query: query.to_string(),
        });
    }

    tracing::debug!("search query: {}", query);
    let terms = tokenize(query);
    let hits = ctx.store.keyword_search(query, limit).await?;

    let results: Vec<SearchResultItem> = hits
        .into_iter()
        .map(|hit| SearchResultItem {
            preview: preview(&hit.article.content, &terms),
            id: hit.article.id,
            title: hit.article.title,
            score: hit.score,
            publish_date: hit.article.publish_date,
            author: hit.article.author,
        })
        .collect();

    Ok(SearchResponse {
        total: results.len(),
        results,
        query: query.to_string(),
    })
}

/// CLI entry point for `news search`.
pub async fn run_search(ctx: &AppContext, query: &str, limit: Option<i64>) -> Result<()> {
    let response = search_articles(ctx, query, limit).await?;

    if response.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in response.results.iter().enumerate() {
        println!("{}. [{:.2}] {}", i + 1, result.score, result.title);
        println!(
            "    date: {}",
            result.publish_date.as_deref().unwrap_or("undated")
        );
        println!("    author: {}", result.author);
        println!(
            "    excerpt: \"{}\"",
            result.preview.replace('\n', " ").trim()
        );
        println!("    id: {}", result.id);
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::ArticleRecord;
    use crate::store::{ArticleStore, InMemoryStore};
    use std::sync::Arc;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn preview_centres_on_first_match() {
        let content = format!("{}Mayor resigns{}", "a".repeat(150), "b".repeat(500));
        let p = preview(&content, &terms(&["mayor"]));
        // 100 chars before, the match start, 300 after
        assert_eq!(p.chars().count(), 3 + 400 + 3);
        assert!(p.contains("Mayor resigns"));
        assert!(p.starts_with("...aaa"));
    }

    #[test]
    fn preview_near_start_is_clamped() {
        let p = preview("Mayor resigns today.", &terms(&["today"]));
        assert_eq!(p, "...Mayor resigns today....");
    }

    #[test]
    fn preview_without_match_uses_opening() {
        let content = "z".repeat(1000);
        let p = preview(&content, &terms(&["mayor"]));
        assert_eq!(p.chars().count(), 406);
    }

    #[tokio::test]
    async fn search_shapes_hits_and_handles_blank_queries() {
        let store = InMemoryStore::new();
        store
            .insert_many(&[ArticleRecord {
                id: "a1".to_string(),
                filename: "a.txt".to_string(),
                title: "Bridge reopens".to_string(),
                author: "Desk".to_string(),
                content: "After two years the river bridge reopened.".to_string(),
                publish_date: Some("2006-11-17".to_string()),
                created_at: 0,
                last_updated: 0,
            }])
            .await
            .unwrap();
        let ctx = AppContext::with_store(Config::in_memory("./unused"), Arc::new(store));

        let response = search_articles(&ctx, "bridge", None).await.unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.results[0].id, "a1");
        assert!(response.results[0].preview.contains("bridge"));

        let blank = search_articles(&ctx, "   ", None).await.unwrap();
        assert_eq!(blank.total, 0);

        let none = search_articles(&ctx, "volcano", None).await.unwrap();
        assert!(none.results.is_empty());
    }
}
