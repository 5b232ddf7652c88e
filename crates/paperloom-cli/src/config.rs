//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use paperloom_arxiv::TopicQuery;

/// Global configuration for paperloom
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub arxiv: ArxivConfig,
    pub categorize: CategorizeConfig,
    pub queries: Vec<QueryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            arxiv: ArxivConfig::default(),
            categorize: CategorizeConfig::default(),
            queries: default_queries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Year partitions and the index live here.
    pub dir: PathBuf,
    pub categories_file: PathBuf,
    pub blocklist_file: PathBuf,
    pub savedlist_file: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            categories_file: PathBuf::from("./categories.json"),
            blocklist_file: PathBuf::from("./blocked.json"),
            savedlist_file: PathBuf::from("./saved.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArxivConfig {
    pub base_url: String,
    /// Minimum milliseconds between API requests.
    pub delay_ms: u64,
    pub page_size: usize,
    /// Per-query result cap for a full collection run.
    pub max_results: usize,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: paperloom_arxiv::DEFAULT_BASE_URL.to_string(),
            delay_ms: 3000,
            page_size: 100,
            max_results: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CategorizeConfig {
    /// Keyword hits required before a category label is assigned.
    pub threshold: usize,
}

impl Default for CategorizeConfig {
    fn default() -> Self {
        Self { threshold: 1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    pub query: String,
    pub description: String,
    pub category: String,
}

impl From<QueryConfig> for TopicQuery {
    fn from(q: QueryConfig) -> Self {
        TopicQuery {
            query: q.query,
            description: q.description,
            category: q.category,
        }
    }
}

fn query(category: &str, description: &str, query: &str) -> QueryConfig {
    QueryConfig {
        query: query.to_string(),
        description: description.to_string(),
        category: category.to_string(),
    }
}

/// Topic queries used when the config file defines none. Order matters:
/// the collector's first-seen rule follows it.
fn default_queries() -> Vec<QueryConfig> {
    vec![
        query(
            "agents",
            "LLM agents",
            r#"all:"LLM agent" OR all:"language agent" OR all:"tool use""#,
        ),
        query(
            "reasoning",
            "Reasoning",
            r#"all:"chain of thought" OR all:"reasoning model""#,
        ),
        query(
            "retrieval",
            "Retrieval-augmented generation",
            r#"all:"retrieval-augmented" OR all:"dense retrieval""#,
        ),
        query(
            "multimodal",
            "Multimodal models",
            r#"all:"vision-language" OR all:"multimodal model""#,
        ),
        query(
            "safety",
            "Safety and alignment",
            r#"all:"AI safety" OR all:"alignment" AND cat:cs.CL"#,
        ),
        query(
            "evaluation",
            "Benchmarks and evaluation",
            r#"all:"benchmark" AND (cat:cs.CL OR cat:cs.AI)"#,
        ),
    ]
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./paperloom.toml (current directory)
    /// 2. ~/.config/paperloom/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("paperloom.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "paperloom") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn index_path(&self) -> PathBuf {
        self.data.dir.join("index.json")
    }

    pub fn topic_queries(&self) -> Vec<TopicQuery> {
        self.queries.iter().cloned().map(Into::into).collect()
    }
}
