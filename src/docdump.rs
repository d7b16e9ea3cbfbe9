//! Source tree documentation dump.
//!
//! Walks a directory tree and emits a single Markdown report with the
//! contents of every matching source file, grouped by folder, plus
//! summary statistics. This is the `dump` subcommand.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for a documentation dump.
#[derive(Debug, Clone)]
pub struct DumpConfig {
    /// Root directory to walk.
    pub root: PathBuf,
    /// Title placed at the top of the report.
    pub title: String,
    /// File extensions to include (without dot).
    pub extensions: Vec<String>,
    /// Directory and file names skipped entirely.
    pub ignores: Vec<String>,
}

impl DumpConfig {
    pub fn new(root: PathBuf, title: String) -> Self {
        Self {
            root,
            title,
            extensions: default_extensions(),
            ignores: default_ignores(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec![
        "tsx", "ts", "jsx", "js", "css", "json", "md", "mjs", "go", "py", "rs", "toml", "yaml",
        "yml",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_ignores() -> Vec<String> {
    vec![
        ".git",
        ".idea",
        ".vscode",
        ".next",
        "node_modules",
        "__pycache__",
        "dist",
        "build",
        "target",
        "vendor",
        "package-lock.json",
        "Cargo.lock",
        "yarn.lock",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// A file included in the dump.
#[derive(Debug, Clone)]
struct FileEntry {
    /// Path relative to the root, with `/` separators.
    rel_path: String,
    /// Relative folder the file lives in (`.` for the root).
    folder: String,
    /// Extension without dot.
    extension: String,
    /// Trimmed file content.
    content: String,
}

/// Collected dump data before rendering.
#[derive(Debug, Default)]
pub struct DumpReport {
    entries: Vec<FileEntry>,
    empty_files: Vec<String>,
}

impl DumpReport {
    /// Number of files with content.
    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of empty files found.
    pub fn empty_count(&self) -> usize {
        self.empty_files.len()
    }
}

/// Walk the tree and collect matching files.
pub fn scan(config: &DumpConfig) -> Result<DumpReport> {
    let mut report = DumpReport::default();

    let walker = WalkDir::new(&config.root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // Never filter the root itself
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !config.ignores.iter().any(|pattern| name.as_ref() == pattern)
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let extension = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if config.extensions.iter().any(|e| e == ext) => ext.to_string(),
            _ => continue,
        };

        let rel_path = path
            .strip_prefix(&config.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c.trim().to_string(),
            Err(e) => {
                warn!("Failed to read {}: {}", rel_path, e);
                continue;
            }
        };

        if content.is_empty() {
            report.empty_files.push(rel_path);
            continue;
        }

        let folder = Path::new(&rel_path)
            .parent()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".to_string());

        report.entries.push(FileEntry {
            rel_path,
            folder,
            extension,
            content,
        });
    }

    report.empty_files.sort();
    Ok(report)
}

/// Render the collected files as a Markdown report.
pub fn render(config: &DumpConfig, report: &DumpReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", config.title));
    md.push_str(&format!(
        "**Files with content:** {}\n",
        report.file_count()
    ));
    md.push_str(&format!("**Empty files:** {}\n\n", report.empty_count()));
    md.push_str("---\n\n");

    // Group by folder, folders and files in sorted order
    let mut by_folder: BTreeMap<&str, Vec<&FileEntry>> = BTreeMap::new();
    for entry in &report.entries {
        by_folder.entry(&entry.folder).or_default().push(entry);
    }

    for (folder, mut files) in by_folder {
        files.sort_by_key(|f| f.rel_path.as_str());

        md.push_str(&format!("## 📁 {}\n\n", folder));

        for file in files {
            md.push_str(&format!("### {}\n\n", file.rel_path));
            md.push_str(&format!("```{}\n", file.extension));
            md.push_str(&file.content);
            md.push_str("\n```\n\n");
            md.push_str("---\n\n");
        }
    }

    md.push_str(&render_summary(report));
    md
}

/// Final summary: file list with sizes, empty files, per-extension stats.
fn render_summary(report: &DumpReport) -> String {
    let mut md = String::new();

    md.push_str("## 📊 Summary\n\n");

    md.push_str("### Files with Content\n\n");
    let mut sorted: Vec<&FileEntry> = report.entries.iter().collect();
    sorted.sort_by_key(|f| f.rel_path.as_str());
    for file in &sorted {
        md.push_str(&format!("- `{}` ({} chars)\n", file.rel_path, file.content.len()));
    }
    md.push_str(&format!("\n**Total:** {} files\n\n", report.file_count()));

    if !report.empty_files.is_empty() {
        md.push_str("### Empty Files\n\n");
        for path in &report.empty_files {
            md.push_str(&format!("- `{}`\n", path));
        }
        md.push_str(&format!("\n**Total:** {} files\n\n", report.empty_count()));
    }

    md.push_str("### Stats by Extension\n\n");
    let mut by_ext: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for entry in &report.entries {
        let stat = by_ext.entry(&entry.extension).or_default();
        stat.0 += 1;
        stat.1 += entry.content.len();
    }
    for (ext, (count, chars)) in by_ext {
        md.push_str(&format!("- **.{}**: {} file(s), {} chars\n", ext, count, chars));
    }

    md
}

/// Scan, render, and write the dump to `output`. Returns the report.
///
/// The output file itself is excluded from the scan, so re-running a
/// dump into the same tree does not ingest the previous report.
pub fn write_dump(config: &DumpConfig, output: &Path) -> Result<DumpReport> {
    let mut config = config.clone();
    if let Some(name) = output.file_name() {
        config.ignores.push(name.to_string_lossy().into_owned());
    }

    let report = scan(&config)?;
    let markdown = render(&config, &report);

    std::fs::write(output, markdown)
        .with_context(|| format!("Failed to write dump to {}", output.display()))?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        std::fs::create_dir_all(root.join("src/components")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();

        std::fs::write(root.join("index.ts"), "export const a = 1;").unwrap();
        std::fs::write(
            root.join("src/components/button.tsx"),
            "export function Button() {}",
        )
        .unwrap();
        std::fs::write(root.join("src/empty.ts"), "").unwrap();
        std::fs::write(root.join("image.png"), [0u8, 1, 2]).unwrap();
        std::fs::write(root.join("node_modules/pkg/index.js"), "ignored").unwrap();

        temp
    }

    fn config_for(root: &Path) -> DumpConfig {
        DumpConfig::new(root.to_path_buf(), "Test Docs".to_string())
    }

    #[test]
    fn test_scan_collects_and_classifies() {
        let temp = setup_tree();
        let report = scan(&config_for(temp.path())).unwrap();

        assert_eq!(report.file_count(), 2);
        assert_eq!(report.empty_count(), 1);
        assert_eq!(report.empty_files[0], "src/empty.ts");
    }

    #[test]
    fn test_scan_respects_ignores() {
        let temp = setup_tree();
        let report = scan(&config_for(temp.path())).unwrap();

        assert!(report
            .entries
            .iter()
            .all(|e| !e.rel_path.contains("node_modules")));
    }

    #[test]
    fn test_render_sections() {
        let temp = setup_tree();
        let config = config_for(temp.path());
        let report = scan(&config).unwrap();
        let md = render(&config, &report);

        assert!(md.starts_with("# Test Docs\n"));
        assert!(md.contains("**Files with content:** 2"));
        assert!(md.contains("## 📁 src/components"));
        assert!(md.contains("### src/components/button.tsx"));
        assert!(md.contains("```tsx\nexport function Button() {}\n```"));
        assert!(md.contains("### Empty Files"));
        assert!(md.contains("- `src/empty.ts`"));
        assert!(md.contains("- **.ts**: 1 file(s)"));
    }

    #[test]
    fn test_write_dump() {
        let temp = setup_tree();
        let config = config_for(temp.path());
        let output = temp.path().join("docs.md");

        let report = write_dump(&config, &output).unwrap();

        assert_eq!(report.file_count(), 2);
        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("## 📊 Summary"));
    }

    #[test]
    fn test_second_dump_ignores_previous_report() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.ts"), "export const a = 1;").unwrap();

        let config = config_for(temp.path());
        let output = temp.path().join("code_docs.md");

        let first = write_dump(&config, &output).unwrap();
        assert_eq!(first.file_count(), 1);

        // The report is .md and sits inside the root; a second run
        // must not pick it up
        let second = write_dump(&config, &output).unwrap();
        assert_eq!(second.file_count(), 1);
    }

    #[test]
    fn test_root_files_grouped_under_dot() {
        let temp = setup_tree();
        let config = config_for(temp.path());
        let report = scan(&config).unwrap();
        let md = render(&config, &report);

        assert!(md.contains("## 📁 .\n"));
        assert!(md.contains("### index.ts"));
    }
}
