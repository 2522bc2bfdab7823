//! Question answering over the archive.
//!
//! A question first retrieves candidate articles by keyword search, then a
//! [`Reader`] picks answer spans out of them. The reader is the seam where an
//! extractive QA model plugs in; [`SentenceReader`] is the built-in one and
//! scores whole sentences by how many of the question's words they contain.
//!
//! When the reader finds nothing, the response falls back to excerpts of the
//! best-matching articles.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

use crate::context::AppContext;
use crate::error::QueryError;
use crate::models::{ScoredArticle, SourceRef};
use crate::text::{slice_chars, tokenize, truncate_chars};

pub const NO_MATCH_ANSWER: &str = "I couldn't find any relevant information for your query.";
pub const FALLBACK_ANSWER: &str =
    "I couldn't find a specific answer, but here are relevant passages from the articles:";

const FALLBACK_ARTICLES: usize = 3;
const EXCERPT_CHARS: usize = 1000;

/// An answer span located inside one retrieved article.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSpan {
    pub answer: String,
    /// In `[0, 1]`, higher is better.
    pub score: f64,
    /// Text surrounding the answer.
    pub context: String,
    /// Index into the passages handed to [`Reader::read`].
    pub passage: usize,
}

/// Extracts answer spans for a question from retrieved passages.
pub trait Reader: Send + Sync {
    /// Up to `top_k` spans, best first.
    fn read(&self, question: &str, passages: &[ScoredArticle], top_k: usize) -> Vec<AnswerSpan>;
}

/// Words that carry no signal when matching a question against a sentence.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "did", "do", "does", "for", "from", "had",
    "has", "have", "how", "in", "is", "it", "of", "on", "or", "that", "the", "this", "to", "was",
    "were", "what", "when", "where", "which", "who", "whom", "why", "will", "with",
];

/// Scores each sentence by the fraction of distinct question keywords it
/// contains and returns the best ones with a character window around them.
pub struct SentenceReader {
    pub context_window: usize,
}

impl SentenceReader {
    pub fn new(context_window: usize) -> Self {
        Self { context_window }
    }
}

/// Sentences of `text` as `(start_char, sentence)` pairs.
fn sentences(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let chars: Vec<char> = text.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if current.is_empty() && c.is_whitespace() {
            start = i + 1;
            continue;
        }
        current.push(c);
        let ends_sentence = matches!(c, '.' | '!' | '?')
            && chars.get(i + 1).map_or(true, |next| next.is_whitespace());
        if ends_sentence || c == '\n' {
            let trimmed = current.trim_end().to_string();
            if !trimmed.is_empty() {
                out.push((start, trimmed));
            }
            current.clear();
            start = i + 1;
        }
    }
    let trimmed = current.trim_end().to_string();
    if !trimmed.is_empty() {
        out.push((start, trimmed));
    }
    out
}

impl Reader for SentenceReader {
    fn read(&self, question: &str, passages: &[ScoredArticle], top_k: usize) -> Vec<AnswerSpan> {
        let keywords: HashSet<String> = tokenize(question)
            .into_iter()
            .filter(|w| !STOPWORDS.contains(&w.as_str()))
            .collect();
        if keywords.is_empty() {
            return Vec::new();
        }

        let mut spans: Vec<AnswerSpan> = Vec::new();
        for (passage, hit) in passages.iter().enumerate() {
            let content = &hit.article.content;
            for (start, sentence) in sentences(content) {
                let words: HashSet<String> = tokenize(&sentence).into_iter().collect();
                let found = keywords.iter().filter(|k| words.contains(*k)).count();
                if found == 0 {
                    continue;
                }

                let len = sentence.chars().count();
                let pad = self.context_window.saturating_sub(len) / 2;
                let context_start = start.saturating_sub(pad);
                let context_end = context_start + len.max(self.context_window);
                spans.push(AnswerSpan {
                    score: found as f64 / keywords.len() as f64,
                    context: slice_chars(content, context_start, context_end),
                    answer: sentence,
                    passage,
                });
            }
        }

        // Stable sort keeps retrieval order between equally scored spans.
        spans.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        spans.truncate(top_k);
        spans
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Excerpt {
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub confidence: f64,
    pub context: Option<String>,
    pub source: Option<SourceRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_sources: Vec<Excerpt>,
}

/// Answer `question` from the context's store with the given reader.
pub async fn answer_question(
    ctx: &AppContext,
    reader: &dyn Reader,
    question: &str,
) -> Result<QueryAnswer, QueryError> {
    if question.trim().is_empty() {
        return Err(QueryError::BadRequest("query must not be empty".to_string()));
    }

    let retrieval = &ctx.config.retrieval;
    let passages = ctx
        .store
        .keyword_search(question, retrieval.qa_candidates)
        .await?;
    tracing::debug!("qa: {} candidate articles for {:?}", passages.len(), question);

    if passages.is_empty() {
        return Ok(QueryAnswer {
            answer: NO_MATCH_ANSWER.to_string(),
            confidence: 0.0,
            context: None,
            source: None,
            additional_sources: Vec::new(),
        });
    }

    let spans = reader.read(question, &passages, retrieval.qa_answers);
    if let Some(main) = spans.first() {
        let mut answer = main.answer.clone();
        if spans.len() > 1 {
            let extra: Vec<String> = spans[1..]
                .iter()
                .map(|s| format!("• {}", s.answer))
                .collect();
            answer.push_str("\n\nAdditional context:\n");
            answer.push_str(&extra.join("\n"));
        }
        return Ok(QueryAnswer {
            answer,
            confidence: main.score,
            context: Some(main.context.clone()),
            source: passages.get(main.passage).map(|p| SourceRef::from(&p.article)),
            additional_sources: Vec::new(),
        });
    }

    let excerpts: Vec<Excerpt> = passages
        .iter()
        .take(FALLBACK_ARTICLES)
        .map(|p| Excerpt {
            title: p.article.title.clone(),
            excerpt: truncate_chars(&p.article.content, EXCERPT_CHARS),
            author: p.article.author.clone(),
            date: p.article.publish_date.clone(),
        })
        .collect();
    let context = excerpts
        .iter()
        .map(|e| format!("From '{}':\n{}", e.title, e.excerpt))
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(QueryAnswer {
        answer: FALLBACK_ANSWER.to_string(),
        confidence: 0.0,
        context: Some(context),
        source: Some(SourceRef::from(&passages[0].article)),
        additional_sources: excerpts.into_iter().skip(1).collect(),
    })
}

/// CLI entry point for `news ask`.
pub async fn run_ask(ctx: &AppContext, question: &str) -> Result<()> {
    let reader = SentenceReader::new(ctx.config.retrieval.context_window);
    let answer = answer_question(ctx, &reader, question).await?;

    println!("{}", answer.answer);
    println!();
    println!("confidence: {:.2}", answer.confidence);
    if let Some(source) = &answer.source {
        println!(
            "source: {} / {} ({})",
            source.title,
            source.author,
            source.publish_date.as_deref().unwrap_or("undated")
        );
        println!("id: {}", source.id);
    }
    if let Some(context) = &answer.context {
        println!();
        println!("--- Context ---");
        println!("{}", context);
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

    fn article(id: &str, title: &str, content: &str) -> ArticleRecord {
        ArticleRecord {
            id: id.to_string(),
            filename: format!("{}.txt", id),
            title: title.to_string(),
            author: "Desk".to_string(),
            content: content.to_string(),
            publish_date: Some("2006-11-17".to_string()),
            created_at: 0,
            last_updated: 0,
        }
    }

    async fn context(articles: Vec<ArticleRecord>) -> AppContext {
        let store = InMemoryStore::new();
        store.insert_many(&articles).await.unwrap();
        AppContext::with_store(Config::in_memory("./unused"), Arc::new(store))
    }

    #[test]
    fn sentences_split_on_terminators_and_newlines() {
        let s = sentences("First one. Second one!\nThird line\n\nv2.0 ships? Yes");
        let texts: Vec<&str> = s.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(
            texts,
            vec!["First one.", "Second one!", "Third line", "v2.0 ships?", "Yes"]
        );
        assert_eq!(s[1].0, 11);
    }

    #[test]
    fn reader_prefers_sentence_with_more_keywords() {
        let passages = vec![ScoredArticle {
            article: article(
                "a",
                "Institute",
                "The Tang Institute hosts talks. The Tang Institute was founded in 2014.",
            ),
            score: 1.0,
        }];
        let reader = SentenceReader::new(500);
        let spans = reader.read("When was the Tang Institute founded?", &passages, 3);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].answer, "The Tang Institute was founded in 2014.");
        assert!((spans[0].score - 1.0).abs() < 1e-9);
        assert!(spans[0].context.contains("founded in 2014"));
    }

    #[tokio::test]
    async fn no_candidates_returns_zero_confidence() {
        let ctx = context(vec![article("a", "Weather", "Sunny all week.")]).await;
        let reader = SentenceReader::new(500);
        let answer = answer_question(&ctx, &reader, "volcano eruption")
            .await
            .unwrap();
        assert_eq!(answer.answer, NO_MATCH_ANSWER);
        assert_eq!(answer.confidence, 0.0);
        assert!(answer.source.is_none());
        assert!(answer.context.is_none());
    }

    #[tokio::test]
    async fn answers_combine_additional_context() {
        let ctx = context(vec![
            article("a", "Dam", "The dam was finished in 1962. Tourists visit the dam."),
            article("b", "Town", "The town grew after the dam opened."),
        ])
        .await;
        let reader = SentenceReader::new(500);
        let answer = answer_question(&ctx, &reader, "When was the dam finished?")
            .await
            .unwrap();

        assert!(answer.answer.starts_with("The dam was finished in 1962."));
        assert!(answer.answer.contains("\n\nAdditional context:\n• "));
        assert!((answer.confidence - 1.0).abs() < 1e-9);
        assert_eq!(answer.source.unwrap().id, "a");
    }

    /// Reader that never finds anything, standing in for a model with no
    /// confident span.
    struct SilentReader;

    impl Reader for SilentReader {
        fn read(&self, _: &str, _: &[ScoredArticle], _: usize) -> Vec<AnswerSpan> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn falls_back_to_excerpts() {
        let ctx = context(vec![
            article("a", "Flood", "Flood flood flood."),
            article("b", "River", "The flood receded."),
        ])
        .await;
        let answer = answer_question(&ctx, &SilentReader, "flood")
            .await
            .unwrap();

        assert_eq!(answer.answer, FALLBACK_ANSWER);
        assert_eq!(answer.confidence, 0.0);
        assert_eq!(answer.source.as_ref().unwrap().id, "a");
        assert_eq!(answer.additional_sources.len(), 1);
        assert_eq!(answer.additional_sources[0].title, "River");
        assert!(answer
            .context
            .unwrap()
            .starts_with("From 'Flood':\nFlood flood flood."));
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let ctx = context(Vec::new()).await;
        let result = answer_question(&ctx, &SentenceReader::new(500), " ").await;
        assert!(matches!(result, Err(QueryError::BadRequest(_))));
    }
}
