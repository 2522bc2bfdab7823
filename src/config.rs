use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_backend() -> String {
    "sqlite".to_string()
}
fn default_db_path() -> PathBuf {
    PathBuf::from("./data/news.sqlite")
}

impl DbConfig {
    pub fn is_memory(&self) -> bool {
        self.backend == "memory"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_include_globs() -> Vec<String> {
    vec!["*.txt".to_string()]
}
fn default_batch_size() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_search_limit")]
    pub search_limit: i64,
    #[serde(default = "default_qa_candidates")]
    pub qa_candidates: i64,
    #[serde(default = "default_qa_answers")]
    pub qa_answers: usize,
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            qa_candidates: default_qa_candidates(),
            qa_answers: default_qa_answers(),
            context_window: default_context_window(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_search_limit() -> i64 {
    5
}
fn default_qa_candidates() -> i64 {
    5
}
fn default_qa_answers() -> usize {
    3
}
fn default_context_window() -> usize {
    500
}
fn default_preview_chars() -> usize {
    2000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Config {
    /// A config with every default applied, pointing at `root` for the archive
    /// and keeping articles in memory. Used by tests and embedders.
    pub fn in_memory(root: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig {
                backend: "memory".to_string(),
                path: default_db_path(),
            },
            archive: ArchiveConfig {
                root: root.into(),
                include_globs: default_include_globs(),
                batch_size: default_batch_size(),
            },
            retrieval: RetrievalConfig::default(),
            server: ServerConfig {
                bind: "127.0.0.1:8000".to_string(),
            },
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    match config.db.backend.as_str() {
        "sqlite" | "memory" => {}
        other => anyhow::bail!(
            "Unknown db backend: '{}'. Must be sqlite or memory.",
            other
        ),
    }

    if config.archive.batch_size == 0 {
        anyhow::bail!("archive.batch_size must be >= 1");
    }
    if config.archive.include_globs.is_empty() {
        anyhow::bail!("archive.include_globs must not be empty");
    }

    if config.retrieval.search_limit < 1 {
        anyhow::bail!("retrieval.search_limit must be >= 1");
    }
    if config.retrieval.qa_candidates < 1 {
        anyhow::bail!("retrieval.qa_candidates must be >= 1");
    }
    if config.retrieval.qa_answers == 0 {
        anyhow::bail!("retrieval.qa_answers must be >= 1");
    }

    Ok(())
}
