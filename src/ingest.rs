//! Ingestion pipeline orchestration.
//!
//! Scans the archive directory, normalizes each matching file into an
//! article, and upserts it keyed by filename: new files are inserted in
//! batches, files whose content changed are updated in place, and unchanged
//! files are skipped.
//!
//! Every file produces a typed `Result<FileOutcome, IngestError>` that is
//! logged and folded into an [`ImportSummary`]. A failing file never stops
//! the run and never undoes writes made for earlier files; only a missing
//! archive directory aborts, before anything is read.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::context::AppContext;
use crate::error::IngestError;
use crate::models::{ArticleRecord, NewArticle};
use crate::normalize::normalize;
use crate::store::ArticleStore;

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Inserted,
    Updated,
    /// Stored content already matches; nothing written.
    Unchanged,
}

/// Aggregate counts for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: u64,
    pub updated: u64,
    pub skipped: u64,
    pub empty: u64,
    pub errors: u64,
}

impl ImportSummary {
    fn record(&mut self, filename: &str, result: &Result<FileOutcome, IngestError>) {
        match result {
            Ok(FileOutcome::Inserted) => {
                tracing::info!("Imported {}", filename);
                self.inserted += 1;
            }
            Ok(FileOutcome::Updated) => {
                tracing::info!("Updated {}", filename);
                self.updated += 1;
            }
            Ok(FileOutcome::Unchanged) => {
                tracing::info!("Skipped {} (no changes)", filename);
                self.skipped += 1;
            }
            Err(IngestError::EmptyFile { .. }) => {
                tracing::warn!("Empty file {}", filename);
                self.empty += 1;
            }
            Err(e) => {
                tracing::error!("Error processing {}: {}", filename, e);
                self.errors += 1;
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.inserted + self.updated + self.skipped + self.empty + self.errors
    }
}

/// Knobs for a single import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub include_globs: Vec<String>,
    /// New articles are written in groups of this many. Must be >= 1.
    pub batch_size: usize,
    /// Classify every file without writing anything.
    pub dry_run: bool,
}

/// What the store needs to do for one successfully parsed file.
enum Plan {
    Insert(NewArticle),
    Update(NewArticle),
    Unchanged,
}

/// Import every matching file directly under `root` into `store`.
pub async fn import_directory(
    store: &dyn ArticleStore,
    root: &Path,
    options: &ImportOptions,
) -> Result<ImportSummary, IngestError> {
    if !root.is_dir() {
        return Err(IngestError::DirectoryNotFound(root.to_path_buf()));
    }

    // An unusable pattern set matches nothing rather than failing the run.
    let include = build_globset(&options.include_globs).unwrap_or_else(|e| {
        tracing::error!("Invalid include glob: {:#}", e);
        GlobSet::empty()
    });
    let batch_size = options.batch_size.max(1);

    let mut summary = ImportSummary::default();
    let mut pending: Vec<ArticleRecord> = Vec::with_capacity(batch_size);

    for candidate in list_candidates(root, &include) {
        let (filename, path) = match candidate {
            Ok(found) => found,
            Err(e) => {
                let filename = match &e {
                    IngestError::Io { filename, .. } => filename.clone(),
                    _ => root.display().to_string(),
                };
                summary.record(&filename, &Err(e));
                continue;
            }
        };

        let plan = match plan_file(store, &filename, &path).await {
            Ok(plan) => plan,
            Err(e) => {
                summary.record(&filename, &Err(e));
                continue;
            }
        };

        match plan {
            Plan::Unchanged => summary.record(&filename, &Ok(FileOutcome::Unchanged)),
            Plan::Update(article) => {
                let result = if options.dry_run {
                    Ok(FileOutcome::Updated)
                } else {
                    store
                        .update_article(&article, now())
                        .await
                        .map(|_| FileOutcome::Updated)
                        .map_err(|e| IngestError::store_write(&filename, &e))
                };
                summary.record(&filename, &result);
            }
            Plan::Insert(article) => {
                if options.dry_run {
                    summary.record(&filename, &Ok(FileOutcome::Inserted));
                    continue;
                }
                pending.push(ArticleRecord::from_new(
                    Uuid::new_v4().to_string(),
                    &article,
                    now(),
                ));
                if pending.len() >= batch_size {
                    flush(store, &mut pending, &mut summary).await;
                }
            }
        }
    }

    flush(store, &mut pending, &mut summary).await;
    Ok(summary)
}

/// Write the pending inserts as one batch. If the batch fails, each record is
/// retried on its own so failures are attributed to the right file.
async fn flush(
    store: &dyn ArticleStore,
    pending: &mut Vec<ArticleRecord>,
    summary: &mut ImportSummary,
) {
    if pending.is_empty() {
        return;
    }
    let batch = std::mem::take(pending);

    match store.insert_many(&batch).await {
        Ok(()) => {
            for record in &batch {
                summary.record(&record.filename, &Ok(FileOutcome::Inserted));
            }
        }
        Err(e) => {
            tracing::warn!(
                "Batch insert of {} articles failed ({:#}); retrying individually",
                batch.len(),
                e
            );
            for record in batch {
                let result = store
                    .insert_many(std::slice::from_ref(&record))
                    .await
                    .map(|_| FileOutcome::Inserted)
                    .map_err(|e| IngestError::store_write(&record.filename, &e));
                summary.record(&record.filename, &result);
            }
        }
    }
}

/// Read, parse, and compare one file against the store.
async fn plan_file(
    store: &dyn ArticleStore,
    filename: &str,
    path: &Path,
) -> Result<Plan, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        filename: filename.to_string(),
        source,
    })?;
    let raw = String::from_utf8(bytes).map_err(|source| IngestError::Decode {
        filename: filename.to_string(),
        source,
    })?;

    if raw.trim().is_empty() {
        return Err(IngestError::EmptyFile {
            filename: filename.to_string(),
        });
    }

    let article = normalize(filename, &raw);

    let existing = store
        .find_by_filename(filename)
        .await
        .map_err(|e| IngestError::store_write(filename, &e))?;

    Ok(match existing {
        None => Plan::Insert(article),
        Some(stored) if stored.content != article.content => Plan::Update(article),
        Some(_) => Plan::Unchanged,
    })
}

/// Regular files directly under `root` whose name matches `include`, sorted
/// by name.
fn list_candidates(
    root: &Path,
    include: &GlobSet,
) -> Vec<Result<(String, PathBuf), IngestError>> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => {
                let filename = entry.file_name().to_string_lossy().to_string();
                (entry.file_type().is_file() && include.is_match(&filename))
                    .then(|| Ok((filename, entry.into_path())))
            }
            Err(e) => {
                let filename = e
                    .path()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                Some(Err(IngestError::Io { filename, source }))
            }
        })
        .collect()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl ImportOptions {
    pub fn from_context(ctx: &AppContext, dry_run: bool) -> Self {
        Self {
            include_globs: ctx.config.archive.include_globs.clone(),
            batch_size: ctx.config.archive.batch_size,
            dry_run,
        }
    }
}

/// Import the configured archive into the context's store.
pub async fn import_archive(ctx: &AppContext, dry_run: bool) -> Result<ImportSummary> {
    let options = ImportOptions::from_context(ctx, dry_run);
    let summary = import_directory(ctx.store.as_ref(), &ctx.config.archive.root, &options).await?;
    Ok(summary)
}

/// Load the archive into an empty store, leaving a populated one untouched.
///
/// Returns `None` when the store already held articles.
pub async fn import_if_empty(ctx: &AppContext) -> Result<Option<ImportSummary>> {
    if ctx.store.count().await? > 0 {
        return Ok(None);
    }
    import_archive(ctx, false).await.map(Some)
}

/// CLI entry point: run an import and print the summary to stdout.
pub async fn run_import(ctx: &AppContext, dry_run: bool) -> Result<()> {
    let summary = import_archive(ctx, dry_run).await?;

    let root = ctx.config.archive.root.display();
    if dry_run {
        println!("import {} (dry-run)", root);
    } else {
        println!("import {}", root);
    }
    println!("  files found: {}", summary.total());
    println!("  inserted: {}", summary.inserted);
    println!("  updated: {}", summary.updated);
    println!("  skipped (no changes): {}", summary.skipped);
    println!("  empty: {}", summary.empty);
    println!("  errors: {}", summary.errors);
    println!("ok");

    Ok(())
}
