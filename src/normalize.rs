//! Turning a parsed archive file into a [`NewArticle`].

use std::path::Path;

use crate::front_matter;
use crate::models::NewArticle;

pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Derive a `YYYY-MM-DD` date from the first `_`-separated token of
/// `filename` that is exactly eight ASCII digits.
///
/// The digits are not checked against the calendar: `20061399` gives
/// `2006-13-99`.
pub fn date_from_filename(filename: &str) -> Option<String> {
    filename
        .split('_')
        .find(|part| part.len() == 8 && part.bytes().all(|b| b.is_ascii_digit()))
        .map(|part| format!("{}-{}-{}", &part[0..4], &part[4..6], &part[6..8]))
}

/// Filename without its final extension, used as the fallback title.
fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string())
}

/// Build the canonical article for `filename` from its raw text.
pub fn normalize(filename: &str, raw: &str) -> NewArticle {
    let parsed = front_matter::parse(raw);

    let title = parsed
        .get("title")
        .map(str::to_string)
        .unwrap_or_else(|| file_stem(filename));
    let author = parsed
        .get("author")
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let publish_date = match parsed.get("date") {
        Some(date) => Some(date.to_string()),
        None => date_from_filename(filename),
    };

    NewArticle {
        filename: filename.to_string(),
        title,
        author,
        content: parsed.body,
        publish_date,
    }
}
