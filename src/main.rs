//! GapWriter - LLM agent pipeline for market and content analysis
//!
//! A CLI tool that chains LLM agents to identify competitors for a
//! URL, scrape their sites, find content gaps, draft blog posts, and
//! run AEO/SEO/GEO optimization passes. Also ships a `dump`
//! subcommand that turns a source tree into one Markdown report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, invalid input, etc.)

mod agents;
mod cli;
mod config;
mod docdump;
mod llm;
mod models;
mod output;
mod report;
mod tools;

use agents::{Pipeline, PipelineOptions};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{AnalyzeArgs, Args, Command, DumpArgs};
use config::Config;
use llm::{LlmClient, LlmConfig};
use models::{AnalysisRequest, RunMetadata};
use std::io::Write;
use std::time::Instant;
use tools::WebToolExecutor;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    init_logging(&args);

    info!("GapWriter v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = match args.command.clone() {
        Command::Analyze(analyze_args) => run_analyze(analyze_args).await,
        Command::Dump(dump_args) => run_dump(dump_args),
        Command::InitConfig => unreachable!("handled above"),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .gapwriter.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to customize model, search, scraping, and output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the analysis pipeline, single-shot or interactive.
async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let mode_str = if config.model.router_mode {
        "Router (LLM delegates via tools)"
    } else {
        "Sequential (fixed stage chain)"
    };

    println!("🤖 Initializing agents...");
    println!("   Model: {}", config.model.name);
    println!("   API: {}", config.model.api_url);
    println!("   Mode: {}", mode_str);

    if config.search.resolve_api_key().is_none() {
        warn!("SERPER_API_KEY is not set; the search tool will return errors");
    }

    let llm = LlmClient::new(LlmConfig::from(&config.model))?;
    let executor = WebToolExecutor::new(config.search.clone(), config.scrape.clone());
    let pipeline = Pipeline::new(llm, executor, PipelineOptions::from(&config));

    if let Some(url) = args.url.clone() {
        let request = AnalysisRequest::with_context(
            url,
            args.competitors.clone(),
            args.inspirations.clone(),
        );
        return run_one(&pipeline, &config, &request).await;
    }

    // Interactive loop: errors are printed and the loop continues
    println!("\nEnter a URL to start a full analysis (or 'exit' to quit).");

    loop {
        let input = prompt("\nURL to analyze: ")?;
        let trimmed = input.trim();

        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            eprintln!("URL must start with 'http://' or 'https://'");
            continue;
        }

        let request = AnalysisRequest::with_context(
            trimmed,
            prompt_url_list("competitor")?,
            prompt_url_list("preferred blog")?,
        );

        if let Err(e) = run_one(&pipeline, &config, &request).await {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

/// Execute one analysis run and save its outputs.
async fn run_one(pipeline: &Pipeline, config: &Config, request: &AnalysisRequest) -> Result<()> {
    let start_time = Instant::now();

    let run_dir = output::run_directory(&config.output.dir, &request.url)?;
    println!("📂 Output directory: {}", run_dir.display());

    println!("\n🔬 Running analysis for {}...\n", request.url);
    let response = pipeline.run(request).await?;

    if response.trim().is_empty() {
        anyhow::bail!("The pipeline produced no output");
    }

    let posts = output::split_documents(&response, &config.output.separator);
    let paths = output::save_documents(&run_dir, &posts)?;

    for path in &paths {
        println!("💾 Saved {}", path.display());
    }

    let metadata = RunMetadata {
        url: request.url.clone(),
        run_date: Utc::now(),
        model_used: config.model.name.to_string(),
        mode: if config.model.router_mode {
            "router".to_string()
        } else {
            "sequential".to_string()
        },
        documents_written: posts.len(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    if config.output.write_summary {
        let summary_path = run_dir.join("summary.md");
        std::fs::write(&summary_path, report::generate_run_summary(&metadata, &posts))
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;

        let json_path = run_dir.join("summary.json");
        std::fs::write(&json_path, report::generate_json_summary(&metadata, &posts)?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
    }

    println!(
        "\n✅ Analysis complete: {} document(s) in {:.1}s. Outputs in {}",
        posts.len(),
        metadata.duration_seconds,
        run_dir.display()
    );

    Ok(())
}

/// Run the documentation dump subcommand.
fn run_dump(args: DumpArgs) -> Result<()> {
    let mut dump_config = docdump::DumpConfig::new(args.root.clone(), args.title.clone());

    if let Some(extensions) = args.extensions {
        dump_config.extensions = extensions;
    }
    if let Some(ignores) = args.ignores {
        dump_config.ignores = ignores;
    }

    println!("📄 Dumping {} to {}", args.root.display(), args.output.display());

    let report = docdump::write_dump(&dump_config, &args.output)?;

    println!("✅ Documentation written to {}", args.output.display());
    println!("   Files with content: {}", report.file_count());
    println!("   Empty files: {}", report.empty_count());

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &AnalyzeArgs) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Print a prompt and read one line from stdin.
fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line)
}

/// Ask for up to three URLs of the given kind.
fn prompt_url_list(kind: &str) -> Result<Vec<String>> {
    let answer = prompt(&format!("Add {} URLs? (y/n): ", kind))?;
    if !answer.trim().eq_ignore_ascii_case("y") {
        return Ok(Vec::new());
    }

    let mut urls = Vec::new();
    for i in 1..=3 {
        let url = prompt(&format!("{} URL {} (leave blank to stop): ", kind, i))?;
        let url = url.trim();
        if url.is_empty() {
            break;
        }
        urls.push(url.to_string());
    }

    Ok(urls)
}
