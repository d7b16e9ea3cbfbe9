//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.gapwriter.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".gapwriter.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Web search tool settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Website scraping tool settings.
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Chat API endpoint (Ollama-compatible).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of retries on transport failure.
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Maximum tool-calling iterations per agent.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Max tool results to keep in context (sliding window).
    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,

    /// Use router mode (LLM delegates to specialists as tools).
    /// If false: runs the fixed sequential pipeline directly.
    #[serde(default)]
    pub router_mode: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
            max_iterations: default_max_iterations(),
            max_context_messages: default_max_context_messages(),
            router_mode: false,
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_api_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout() -> u64 {
    300
}

fn default_retries() -> usize {
    3
}

fn default_max_iterations() -> usize {
    12
}

fn default_max_context_messages() -> usize {
    10
}

/// Web search tool settings (Serper-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search API endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// API key. Falls back to the SERPER_API_KEY env var when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Number of organic results returned to the model.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key: None,
            max_results: default_max_results(),
            timeout_seconds: default_search_timeout(),
        }
    }
}

impl SearchConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("SERPER_API_KEY").ok())
    }
}

fn default_search_endpoint() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_max_results() -> usize {
    5
}

fn default_search_timeout() -> u64 {
    10
}

/// Website scraping tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// User-Agent header sent with scrape requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_scrape_timeout")]
    pub timeout_seconds: u64,

    /// Extracted text is truncated to this many characters to keep
    /// the model context bounded.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_scrape_timeout(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_scrape_timeout() -> u64 {
    10
}

fn default_max_chars() -> usize {
    8000
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for analysis runs.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Separator the model is instructed to place between blog posts.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Write a summary.md alongside the blog files.
    #[serde(default = "default_true")]
    pub write_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            separator: default_separator(),
            write_summary: true,
        }
    }
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_separator() -> String {
    "---BLOG_SEPARATOR---".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::AnalyzeArgs) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref api_url) = args.api_url {
            self.model.api_url = api_url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        // Router mode only overridden when a flag is explicitly given
        if args.router {
            self.model.router_mode = true;
        } else if args.no_router {
            self.model.router_mode = false;
        }

        if let Some(ref dir) = args.output_dir {
            self.output.dir = dir.clone();
        }
        if let Some(ref separator) = args.separator {
            self.output.separator = separator.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
