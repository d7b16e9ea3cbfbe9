//! Run output handling: directory naming, response splitting, and
//! per-post file writes.

use crate::models::BlogPost;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Sanitize a URL (or any string) into a directory name.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`, matching the
/// run-directory convention.
pub fn sanitize_run_name(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Create (if needed) and return the output directory for a run.
pub fn run_directory(output_root: &str, url: &str) -> Result<PathBuf> {
    let dir = Path::new(output_root).join(sanitize_run_name(url));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    Ok(dir)
}

/// Split the final model response on the separator into blog posts.
///
/// Blank segments are skipped; indices are assigned from 1 in segment
/// order, so a response with a leading separator still yields posts
/// numbered 1..n.
pub fn split_documents(response: &str, separator: &str) -> Vec<BlogPost> {
    response
        .split(separator)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .enumerate()
        .map(|(i, segment)| BlogPost::new(i + 1, segment))
        .collect()
}

/// Write each post into `dir` and return the written paths.
pub fn save_documents(dir: &Path, posts: &[BlogPost]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(posts.len());

    for post in posts {
        let path = dir.join(post.file_name());
        std::fs::write(&path, &post.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved {}", path.display());
        paths.push(path);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_run_name() {
        assert_eq!(
            sanitize_run_name("https://example.com/pt-br"),
            "https___example_com_pt_br"
        );
        assert_eq!(sanitize_run_name("plain"), "plain");
    }

    #[test]
    fn test_split_documents_counts_segments() {
        let response = "first post---BLOG_SEPARATOR---second post---BLOG_SEPARATOR---third";
        let posts = split_documents(response, "---BLOG_SEPARATOR---");

        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].content, "first post");
        assert_eq!(posts[2].index, 3);
    }

    #[test]
    fn test_split_documents_skips_blanks() {
        let response = "---BLOG_SEPARATOR---only post---BLOG_SEPARATOR---   \n";
        let posts = split_documents(response, "---BLOG_SEPARATOR---");

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].index, 1);
        assert_eq!(posts[0].content, "only post");
    }

    #[test]
    fn test_split_documents_no_separator() {
        let posts = split_documents("a single document", "---BLOG_SEPARATOR---");
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn test_save_documents() {
        let temp_dir = TempDir::new().unwrap();
        let posts = vec![
            BlogPost::new(1, "# One\n\nbody"),
            BlogPost::new(2, "# Two\n\nbody"),
        ];

        let paths = save_documents(temp_dir.path(), &posts).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("blog_1.md"));
        let content = std::fs::read_to_string(&paths[1]).unwrap();
        assert!(content.starts_with("# Two"));
    }

    #[test]
    fn test_run_directory_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("out");

        let dir = run_directory(root.to_str().unwrap(), "https://example.com").unwrap();

        assert!(dir.exists());
        assert!(dir.ends_with("https___example_com"));
    }
}
