use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    /// Product catalog file inside `dir`; skipped when absent on disk.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            include_globs: default_include_globs(),
            catalog_file: default_catalog_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}
fn default_catalog_file() -> String {
    "products_catalog.csv".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Weight of the lexical signal in the hybrid score; the semantic
    /// signal gets `1 - lexical_weight`.
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f64,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum raw cosine similarity a candidate must reach. Unset means
    /// no floor is applied.
    #[serde(default)]
    pub semantic_floor: Option<f64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            lexical_weight: default_lexical_weight(),
            top_k: default_top_k(),
            semantic_floor: None,
        }
    }
}

fn default_lexical_weight() -> f64 {
    0.3
}
fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// One of `hash`, `openai`, `ollama`, `local`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: default_dims(),
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "hash".to_string()
}
fn default_dims() -> usize {
    256
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Hard cap on sentences in an assembled answer.
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
    #[serde(default = "default_sentences_per_chunk")]
    pub sentences_per_chunk: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_sentences: default_max_sentences(),
            max_chunks: default_max_chunks(),
            sentences_per_chunk: default_sentences_per_chunk(),
        }
    }
}

fn default_max_sentences() -> usize {
    4
}
fn default_max_chunks() -> usize {
    3
}
fn default_sentences_per_chunk() -> usize {
    2
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if !(0.0..=1.0).contains(&config.retrieval.lexical_weight) {
        anyhow::bail!("retrieval.lexical_weight must be in [0.0, 1.0]");
    }

    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if let Some(floor) = config.retrieval.semantic_floor {
        if !(-1.0..=1.0).contains(&floor) {
            anyhow::bail!("retrieval.semantic_floor must be in [-1.0, 1.0]");
        }
    }

    if config.embedding.dims == 0 {
        anyhow::bail!("embedding.dims must be > 0");
    }

    match config.embedding.provider.as_str() {
        "hash" | "openai" | "ollama" | "local" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be hash, openai, ollama, or local.",
            other
        ),
    }

    if matches!(config.embedding.provider.as_str(), "openai" | "ollama")
        && config.embedding.model.is_none()
    {
        anyhow::bail!(
            "embedding.model must be specified when provider is '{}'",
            config.embedding.provider
        );
    }

    if config.synthesis.max_sentences == 0 || config.synthesis.max_chunks == 0 {
        anyhow::bail!("synthesis.max_sentences and synthesis.max_chunks must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.retrieval.lexical_weight, 0.3);
        assert_eq!(config.retrieval.top_k, 5);
        assert!(config.retrieval.semantic_floor.is_none());
        assert_eq!(config.embedding.provider, "hash");
        assert_eq!(config.synthesis.max_sentences, 4);
        validate(&config).unwrap();
    }

    #[test]
    fn test_parse_minimal() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.data.catalog_file, "products_catalog.csv");
        assert_eq!(config.data.include_globs, vec!["**/*.md"]);
    }

    #[test]
    fn test_parse_full() {
        let config: Config = toml::from_str(
            r#"
            [data]
            dir = "./corpus"

            [retrieval]
            lexical_weight = 0.5
            top_k = 8
            semantic_floor = 0.25

            [embedding]
            provider = "ollama"
            model = "nomic-embed-text"
            dims = 768

            [synthesis]
            max_sentences = 3
            "#,
        )
        .unwrap();
        validate(&config).unwrap();
        assert_eq!(config.retrieval.semantic_floor, Some(0.25));
        assert_eq!(config.embedding.dims, 768);
        assert_eq!(config.synthesis.max_sentences, 3);
    }

    #[test]
    fn test_weight_out_of_range_rejected() {
        let mut config = Config::default();
        config.retrieval.lexical_weight = 1.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_remote_provider_requires_model() {
        let mut config = Config::default();
        config.embedding.provider = "openai".to_string();
        assert!(validate(&config).is_err());
        config.embedding.model = Some("text-embedding-3-small".to_string());
        validate(&config).unwrap();
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = Config::default();
        config.embedding.provider = "magic".to_string();
        assert!(validate(&config).is_err());
    }
}
