//! Front-matter parsing for archived article files.
//!
//! An article file is a block of `key: value` header lines, a `---`
//! delimiter line, then the article body:
//!
//! ```text
//! title: Council approves new budget
//! author: J. Smith
//! date: 2006-11-17
//! ---
//! The city council voted on Tuesday ...
//! ```
//!
//! Parsing never fails. A file with no delimiter has an empty body and every
//! line is treated as a header candidate.

use std::collections::HashMap;

const DELIMITER: &str = "---";

/// Header keys (lower-cased) and the raw body of an article file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub metadata: HashMap<String, String>,
    pub body: String,
}

impl FrontMatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Split `content` into header metadata and body.
///
/// Every line whose trimmed form is `---` switches to body mode and is itself
/// dropped, including any such line inside the body. Header lines are split
/// on their first colon; a repeated key keeps the last value seen. Body lines
/// are kept verbatim and re-joined with `\n`.
pub fn parse(content: &str) -> FrontMatter {
    let mut metadata = HashMap::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;

    for line in content.split('\n') {
        if line.trim() == DELIMITER {
            in_body = true;
            continue;
        }

        if in_body {
            body_lines.push(line);
        } else if let Some((key, value)) = line.split_once(':') {
            metadata.insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    FrontMatter {
        metadata,
        body: body_lines.join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_body() {
        let fm = parse("Title: Storm hits coast\nAUTHOR:  Ann Lee \n---\nFirst line.\n  indented\n");
        assert_eq!(fm.get("title"), Some("Storm hits coast"));
        assert_eq!(fm.get("author"), Some("Ann Lee"));
        assert_eq!(fm.metadata.len(), 2);
        assert_eq!(fm.body, "First line.\n  indented\n");
    }

    #[test]
    fn body_reproduces_text_after_delimiter() {
        let after = "Para one.\n\nPara two: with a colon.\n";
        let fm = parse(&format!("title: x\n---\n{}", after));
        assert_eq!(fm.body, after);
    }

    #[test]
    fn missing_delimiter_yields_empty_body() {
        let fm = parse("title: Orphan\nJust some text: with colon\nno colon here");
        assert_eq!(fm.body, "");
        assert_eq!(fm.get("title"), Some("Orphan"));
        assert_eq!(fm.get("just some text"), Some("with colon"));
    }

    #[test]
    fn repeated_key_last_wins() {
        let fm = parse("title: A\nauthor: X\ntitle: B\n---\nbody");
        assert_eq!(fm.get("title"), Some("B"));
    }

    #[test]
    fn splits_on_first_colon_only() {
        let fm = parse("source: http://example.com:8080/a\n---\n");
        assert_eq!(fm.get("source"), Some("http://example.com:8080/a"));
    }

    #[test]
    fn delimiter_with_padding_and_repeats() {
        let fm = parse("title: t\n  ---  \nbody one\n---\nbody two");
        assert_eq!(fm.body, "body one\nbody two");
    }

    #[test]
    fn empty_input() {
        let fm = parse("");
        assert!(fm.metadata.is_empty());
        assert_eq!(fm.body, "");
    }

    #[test]
    fn crlf_body_lines_kept_verbatim() {
        let fm = parse("title: t\r\n---\r\nline\r\n");
        assert_eq!(fm.get("title"), Some("t"));
        assert_eq!(fm.body, "line\r\n");
    }
}
