//! Article listing and retrieval by id.
//!
//! Used by both the `news articles` / `news get` CLI commands and the
//! `GET /articles` HTTP endpoints.

use anyhow::Result;
use serde::Serialize;

use crate::context::AppContext;
use crate::error::QueryError;
use crate::models::{format_ts_iso, ArticleRecord};
use crate::text::truncate_chars;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;

#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    pub id: String,
    pub filename: String,
    pub title: String,
    pub author: String,
    pub content: String,
    pub publish_date: Option<String>,
    pub created_at: String, // ISO8601
    pub last_updated: String, // ISO8601
}

impl ArticleResponse {
    fn from_record(record: ArticleRecord, max_chars: Option<usize>) -> Self {
        let content = match max_chars {
            Some(n) => truncate_chars(&record.content, n),
            None => record.content,
        };
        Self {
            id: record.id,
            filename: record.filename,
            title: record.title,
            author: record.author,
            content,
            publish_date: record.publish_date,
            created_at: format_ts_iso(record.created_at),
            last_updated: format_ts_iso(record.last_updated),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub results: Vec<ArticleResponse>,
}

/// One page of articles, newest first. Content is cut to
/// `retrieval.preview_chars` characters.
pub async fn list_articles(
    ctx: &AppContext,
    page: i64,
    limit: i64,
) -> Result<ArticlePage, QueryError> {
    if page < 1 {
        return Err(QueryError::BadRequest("page must be >= 1".to_string()));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(QueryError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    let total = ctx.store.count().await?;
    // A page whose offset overflows is past any possible end.
    let records = match (page - 1).checked_mul(limit) {
        Some(offset) => ctx.store.list_page(offset, limit).await?,
        None => Vec::new(),
    };
    let preview = ctx.config.retrieval.preview_chars;

    Ok(ArticlePage {
        total,
        page,
        limit,
        results: records
            .into_iter()
            .map(|r| ArticleResponse::from_record(r, Some(preview)))
            .collect(),
    })
}

pub async fn get_article(ctx: &AppContext, id: &str) -> Result<ArticleResponse, QueryError> {
    match ctx.store.get(id).await? {
        Some(record) => Ok(ArticleResponse::from_record(record, None)),
        None => Err(QueryError::NotFound(id.to_string())),
    }
}

/// CLI entry point for `news articles`.
pub async fn run_list(ctx: &AppContext, page: i64, limit: i64) -> Result<()> {
    let page = list_articles(ctx, page, limit).await?;

    if page.results.is_empty() {
        println!("No articles.");
        return Ok(());
    }

    println!(
        "page {} ({} per page, {} total)",
        page.page, page.limit, page.total
    );
    println!();
    for (i, article) in page.results.iter().enumerate() {
        let n = (page.page - 1) * page.limit + i as i64 + 1;
        println!(
            "{}. {} [{}]",
            n,
            article.title,
            article.publish_date.as_deref().unwrap_or("undated")
        );
        println!("    author: {}", article.author);
        println!("    file: {}", article.filename);
        println!("    id: {}", article.id);
    }

    Ok(())
}

/// CLI entry point for `news get`.
pub async fn run_get(ctx: &AppContext, id: &str) -> Result<()> {
    let article = get_article(ctx, id).await?;

    println!("--- Article ---");
    println!("id:           {}", article.id);
    println!("title:        {}", article.title);
    println!("author:       {}", article.author);
    println!(
        "publish_date: {}",
        article.publish_date.as_deref().unwrap_or("(none)")
    );
    println!("filename:     {}", article.filename);
    println!("created_at:   {}", article.created_at);
    println!("last_updated: {}", article.last_updated);
    println!();
    println!("--- Content ---");
    println!("{}", article.content);

    Ok(())
}
