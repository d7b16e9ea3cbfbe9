//! Data models for the analysis pipeline.
//!
//! This module contains the core data structures used throughout
//! the application for representing analysis requests, search
//! results, generated blog posts, and run metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single request to the analysis pipeline.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// The main website URL to analyze.
    pub url: String,
    /// Known competitor URLs supplied by the user (optional).
    pub competitor_urls: Vec<String>,
    /// Reference blogs the user wants drafts to take inspiration from.
    pub preferred_blogs: Vec<String>,
}

impl AnalysisRequest {
    /// At most this many competitor / reference URLs are used per run.
    pub const MAX_CONTEXT_URLS: usize = 3;

    /// Creates a request for a single URL with no extra context.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Creates a request with user-supplied context, keeping at most
    /// [`Self::MAX_CONTEXT_URLS`] URLs of each kind.
    pub fn with_context(
        url: impl Into<String>,
        mut competitor_urls: Vec<String>,
        mut preferred_blogs: Vec<String>,
    ) -> Self {
        competitor_urls.truncate(Self::MAX_CONTEXT_URLS);
        preferred_blogs.truncate(Self::MAX_CONTEXT_URLS);

        let mut request = Self::for_url(url);
        request.competitor_urls = competitor_urls;
        request.preferred_blogs = preferred_blogs;
        request
    }

    /// Renders the user prompt handed to the router / first specialist.
    pub fn to_prompt(&self) -> String {
        let mut parts = vec![format!(
            "Perform a complete analysis and optimization for this URL: {}",
            self.url
        )];

        if !self.competitor_urls.is_empty() {
            parts.push(format!(
                "Also consider the following competitors: {}",
                self.competitor_urls.join(", ")
            ));
        }

        if !self.preferred_blogs.is_empty() {
            parts.push(format!(
                "And take inspiration from these reference blogs: {}",
                self.preferred_blogs.join(", ")
            ));
        }

        parts.join("\n")
    }
}

/// Stages of the analysis pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Identify competitors for the provided URL.
    IdentifyCompetitors,
    /// Scrape competitor sites and analyze their marketing strategy.
    AnalyzeStrategies,
    /// Identify content gaps worth exploring.
    IdentifyGaps,
    /// Write blog drafts covering the gaps.
    WriteDrafts,
    /// Optimize drafts for audience experience (AEO).
    OptimizeAudience,
    /// Optimize drafts for keywords and search (SEO).
    OptimizeSearch,
    /// Adapt drafts for geographic relevance (GEO).
    OptimizeGeo,
    /// Consolidate the final optimized texts.
    Consolidate,
}

impl PipelineStage {
    /// All stages in pipeline order.
    pub const ALL: [PipelineStage; 8] = [
        PipelineStage::IdentifyCompetitors,
        PipelineStage::AnalyzeStrategies,
        PipelineStage::IdentifyGaps,
        PipelineStage::WriteDrafts,
        PipelineStage::OptimizeAudience,
        PipelineStage::OptimizeSearch,
        PipelineStage::OptimizeGeo,
        PipelineStage::Consolidate,
    ];

    /// The specialist agent that handles this stage.
    pub fn agent_name(&self) -> &'static str {
        match self {
            PipelineStage::IdentifyCompetitors => "competitor_identifier",
            PipelineStage::AnalyzeStrategies => "competitor_scraper",
            PipelineStage::IdentifyGaps => "gap_identifier",
            PipelineStage::WriteDrafts => "writer",
            PipelineStage::OptimizeAudience => "aeo_optimizer",
            PipelineStage::OptimizeSearch => "seo_optimizer",
            PipelineStage::OptimizeGeo => "geo_optimizer",
            PipelineStage::Consolidate => "gso_orchestrator",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::IdentifyCompetitors => "Identifying competitors",
            PipelineStage::AnalyzeStrategies => "Analyzing competitor strategies",
            PipelineStage::IdentifyGaps => "Identifying content gaps",
            PipelineStage::WriteDrafts => "Writing blog drafts",
            PipelineStage::OptimizeAudience => "Optimizing for audience experience",
            PipelineStage::OptimizeSearch => "Optimizing for search",
            PipelineStage::OptimizeGeo => "Adapting for geography",
            PipelineStage::Consolidate => "Consolidating final texts",
        };
        write!(f, "{}", label)
    }
}

/// A single organic search result returned by the search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title: {}\nLink: {}\nSnippet: {}\n",
            self.title, self.link, self.snippet
        )
    }
}

/// A generated blog post, one per separator-delimited segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    /// 1-based position in the model output.
    pub index: usize,
    /// Full Markdown content of the post.
    pub content: String,
}

impl BlogPost {
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
        }
    }

    /// File name this post is saved under.
    pub fn file_name(&self) -> String {
        format!("blog_{}.md", self.index)
    }

    /// Title from the first Markdown H1 heading, if present.
    pub fn title(&self) -> Option<String> {
        self.content.lines().find_map(|line| {
            line.strip_prefix("# ")
                .map(|rest| rest.trim().to_string())
                .filter(|t| !t.is_empty())
        })
    }

    /// Word count of the content.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Metadata about a completed analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// The analyzed URL.
    pub url: String,
    /// Date and time the run finished.
    pub run_date: DateTime<Utc>,
    /// Name of the LLM model used.
    pub model_used: String,
    /// Pipeline mode ("sequential" or "router").
    pub mode: String,
    /// Number of documents written.
    pub documents_written: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}
