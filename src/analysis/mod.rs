// Analysis pipeline: walk the working copy, then project it into a graph

pub mod graph;
pub mod language;
pub mod summarize;
pub mod tree;

pub use graph::*;
pub use language::*;
pub use summarize::*;
pub use tree::*;

use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Result of analyzing one repository
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub repo_name: String,
    pub visual_data: RepoGraph,
    pub file_structure: TreeNode,
}

/// Runs walk + projection over a local directory
#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer {
    progress: bool,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a spinner on stderr while walking
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Analyze the directory at `root`, labelling the graph root `label`
    pub fn analyze(&self, root: &Path, label: &str) -> Result<AnalysisReport> {
        let spinner = self.progress.then(|| {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                pb.set_style(style);
            }
            pb.set_message(format!("Walking {}", root.display()));
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let result = tree::walk(root);
        if let Some(pb) = &spinner {
            pb.finish_and_clear();
        }
        let file_structure = result?;

        let visual_data = graph::project(&file_structure, label);
        let stats = visual_data.stats();
        info!(
            repo = label,
            files = file_structure.file_count(),
            bytes = file_structure.total_size(),
            nodes = stats.nodes,
            edges = stats.edges,
            "analysis complete"
        );

        Ok(AnalysisReport {
            repo_name: label.to_string(),
            visual_data,
            file_structure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.js"), vec![b'x'; 500]).unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        dir
    }

    #[test]
    fn test_analyze_end_to_end() {
        let dir = create_test_repo();
        let report = Analyzer::new().analyze(dir.path(), "demo").unwrap();

        assert_eq!(report.repo_name, "demo");
        let ids: Vec<&str> = report.visual_data.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "root-src", "root-src-index.js"]);
        let edges: Vec<(&str, &str)> = report
            .visual_data
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(edges, vec![("root", "root-src"), ("root-src", "root-src-index.js")]);

        // the tree still records the empty dist directory, but not .git
        assert!(report.file_structure.find("dist").is_some());
        assert!(report.file_structure.find(".git").is_none());
    }

    #[test]
    fn test_analyze_is_repeatable() {
        let dir = create_test_repo();
        let analyzer = Analyzer::new();
        let first = analyzer.analyze(dir.path(), "demo").unwrap();
        let second = analyzer.analyze(dir.path(), "demo").unwrap();
        assert_eq!(first.visual_data, second.visual_data);
    }

    #[test]
    fn test_analyze_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let result = Analyzer::new().analyze(&dir.path().join("nope"), "demo");
        assert!(matches!(result, Err(Error::PathNotFound(_))));
    }

    #[test]
    fn test_report_json_shape() {
        let dir = create_test_repo();
        let report = Analyzer::new().analyze(dir.path(), "demo").unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["repoName"], "demo");
        assert!(json["visualData"]["nodes"].is_array());
        assert_eq!(json["fileStructure"]["type"], "directory");
    }

    #[test]
    fn test_with_progress() {
        let analyzer = Analyzer::new().with_progress(true);
        assert!(analyzer.progress);
    }
}
