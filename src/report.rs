//! Run summary generation.
//!
//! After a run, a `summary.md` is written next to the blog files with
//! the run metadata and a table of the generated documents.

use crate::models::{BlogPost, RunMetadata};
use anyhow::Result;

/// Generate the Markdown run summary.
pub fn generate_run_summary(metadata: &RunMetadata, posts: &[BlogPost]) -> String {
    let mut output = String::new();

    output.push_str("# GapWriter Run Summary\n\n");

    // Metadata section
    output.push_str("## Run\n\n");
    output.push_str(&format!("- **URL:** {}\n", metadata.url));
    output.push_str(&format!(
        "- **Date:** {}\n",
        metadata.run_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("- **Model:** `{}`\n", metadata.model_used));
    output.push_str(&format!("- **Mode:** {}\n", metadata.mode));
    output.push_str(&format!(
        "- **Documents:** {}\n",
        metadata.documents_written
    ));
    output.push_str(&format!(
        "- **Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    // Documents table
    output.push_str("## Documents\n\n");

    if posts.is_empty() {
        output.push_str("No documents were produced by this run.\n");
        return output;
    }

    output.push_str("| File | Title | Words |\n");
    output.push_str("|:---|:---|---:|\n");

    for post in posts {
        output.push_str(&format!(
            "| `{}` | {} | {} |\n",
            post.file_name(),
            post.title().unwrap_or_else(|| "(untitled)".to_string()),
            post.word_count()
        ));
    }

    output
}

/// Generate a JSON run summary.
pub fn generate_json_summary(metadata: &RunMetadata, posts: &[BlogPost]) -> Result<String> {
    let value = serde_json::json!({
        "metadata": metadata,
        "documents": posts
            .iter()
            .map(|p| serde_json::json!({
                "file": p.file_name(),
                "title": p.title(),
                "words": p.word_count(),
            }))
            .collect::<Vec<_>>(),
    });

    serde_json::to_string_pretty(&value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_metadata() -> RunMetadata {
        RunMetadata {
            url: "https://example.com".to_string(),
            run_date: Utc::now(),
            model_used: "test-model".to_string(),
            mode: "sequential".to_string(),
            documents_written: 2,
            duration_seconds: 42.5,
        }
    }

    #[test]
    fn test_generate_run_summary() {
        let posts = vec![
            BlogPost::new(1, "# Farm Vaccination Guide\n\ncontent here"),
            BlogPost::new(2, "no heading"),
        ];

        let summary = generate_run_summary(&test_metadata(), &posts);

        assert!(summary.contains("# GapWriter Run Summary"));
        assert!(summary.contains("https://example.com"));
        assert!(summary.contains("`test-model`"));
        assert!(summary.contains("Farm Vaccination Guide"));
        assert!(summary.contains("(untitled)"));
        assert!(summary.contains("blog_2.md"));
    }

    #[test]
    fn test_generate_run_summary_empty() {
        let summary = generate_run_summary(&test_metadata(), &[]);
        assert!(summary.contains("No documents were produced"));
    }

    #[test]
    fn test_generate_json_summary() {
        let posts = vec![BlogPost::new(1, "# T\n\nbody")];
        let json = generate_json_summary(&test_metadata(), &posts).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"documents\""));
        assert!(json.contains("blog_1.md"));
    }
}
