//! Archive statistics.
//!
//! A quick summary of what has been imported: article counts, date coverage,
//! and when the store was last written. Used by `news stats` to confirm an
//! import did what was expected.

use anyhow::Result;

use crate::context::AppContext;
use crate::models::format_ts_iso;

/// Run the stats command: query the store and print a summary.
pub async fn run_stats(ctx: &AppContext) -> Result<()> {
    let stats = ctx.store.stats().await?;
    let config = &ctx.config;

    println!("News Archive Stats");
    println!("==================");
    println!();
    println!("  Backend:     {}", config.db.backend);
    if !config.db.is_memory() {
        let db_size = std::fs::metadata(&config.db.path)
            .map(|m| m.len())
            .unwrap_or(0);
        println!("  Database:    {}", config.db.path.display());
        println!("  Size:        {}", format_bytes(db_size));
    }
    println!("  Archive:     {}", config.archive.root.display());
    println!();
    println!("  Articles:    {}", stats.articles);
    println!(
        "  Dated:       {} / {} ({}%)",
        stats.dated,
        stats.articles,
        percent(stats.dated, stats.articles)
    );
    println!("  No body:     {}", stats.empty_content);

    if let (Some(oldest), Some(newest)) = (&stats.oldest_date, &stats.newest_date) {
        println!("  Date range:  {} .. {}", oldest, newest);
    }

    let last_import = match stats.last_updated {
        Some(ts) => format_ts_relative(ts),
        None => "never".to_string(),
    };
    println!("  Last write:  {}", last_import);
    println!();

    Ok(())
}

fn percent(part: i64, whole: i64) -> i64 {
    if whole > 0 {
        (part * 100) / whole
    } else {
        0
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}
