//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GapWriter - LLM agent pipeline for market and content analysis
///
/// Identify competitors for a URL, scrape their sites, find content
/// gaps, draft blog posts, and run AEO/SEO/GEO optimization passes.
///
/// Examples:
///   gapwriter analyze --url https://example.com
///   gapwriter analyze --url https://example.com --competitor https://rival.com
///   gapwriter analyze                       (interactive mode)
///   gapwriter dump --root . --output code_docs.md
///   gapwriter init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the analysis pipeline for a URL
    Analyze(AnalyzeArgs),

    /// Dump a source tree into a single Markdown report
    Dump(DumpArgs),

    /// Generate a default .gapwriter.toml configuration file
    InitConfig,
}

/// Arguments for the `analyze` subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Website URL to analyze
    ///
    /// When omitted, gapwriter enters an interactive loop and prompts
    /// for URLs until 'exit' or 'quit'.
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Known competitor URL (repeatable, up to 3 are used)
    #[arg(long = "competitor", value_name = "URL")]
    pub competitors: Vec<String>,

    /// Reference blog URL to take inspiration from (repeatable, up to 3 are used)
    #[arg(long = "inspiration", value_name = "URL")]
    pub inspirations: Vec<String>,

    /// Model to use for all agents
    ///
    /// Can also be set via GAPWRITER_MODEL env var or .gapwriter.toml.
    #[arg(short, long, env = "GAPWRITER_MODEL")]
    pub model: Option<String>,

    /// Chat API endpoint URL (Ollama-compatible)
    #[arg(long, env = "GAPWRITER_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Root directory for run outputs
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Separator string used to split the final response into posts
    #[arg(long, value_name = "STRING")]
    pub separator: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Let the LLM router delegate to specialists as tools
    ///
    /// Requires a model with reliable tool-calling support.
    #[arg(long, conflicts_with = "no_router")]
    pub router: bool,

    /// Run the fixed sequential pipeline (default)
    #[arg(long, conflicts_with = "router")]
    pub no_router: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .gapwriter.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `dump` subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct DumpArgs {
    /// Root directory to walk
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Output Markdown file
    #[arg(short, long, default_value = "code_docs.md", value_name = "FILE")]
    pub output: PathBuf,

    /// File extensions to include (comma-separated)
    ///
    /// Example: --ext ts,tsx,go,css
    #[arg(long = "ext", value_name = "EXTS", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Directory or file names to ignore (comma-separated)
    ///
    /// Example: --ignore node_modules,dist
    #[arg(long = "ignore", value_name = "NAMES", value_delimiter = ',')]
    pub ignores: Option<Vec<String>>,

    /// Report title placed at the top of the dump
    #[arg(long, default_value = "Code Documentation", value_name = "TITLE")]
    pub title: String,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Analyze(analyze) => analyze.validate(),
            Command::Dump(dump) => dump.validate(),
            Command::InitConfig => Ok(()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

impl AnalyzeArgs {
    /// Validate analyze arguments.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.url {
            if !is_http_url(url) {
                return Err("URL must start with 'http://' or 'https://'".to_string());
            }
        }

        for competitor in &self.competitors {
            if !is_http_url(competitor) {
                return Err(format!("Invalid competitor URL: {}", competitor));
            }
        }

        if let Some(ref api_url) = self.api_url {
            if !is_http_url(api_url) {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }
}

impl DumpArgs {
    /// Validate dump arguments.
    pub fn validate(&self) -> Result<(), String> {
        if !self.root.exists() {
            return Err(format!("Root directory does not exist: {}", self.root.display()));
        }
        if !self.root.is_dir() {
            return Err(format!("Root path is not a directory: {}", self.root.display()));
        }
        Ok(())
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
