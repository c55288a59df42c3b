// Report renderers

pub mod diagrams;
pub mod html;

pub use diagrams::*;
pub use html::*;

use crate::analysis::AnalysisReport;
use crate::config::{DiagramConfig, OutputFormat};
use crate::error::Result;

/// Render a report in the requested format
pub fn render(report: &AnalysisReport, format: OutputFormat, diagrams: &DiagramConfig) -> Result<String> {
    let generator = DiagramGenerator::from_config(diagrams);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Mermaid => Ok(generator.generate(&report.visual_data)),
        OutputFormat::Html => HtmlRenderer::new()?.render(report, &generator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{project, Language, TreeNode};

    fn report() -> AnalysisReport {
        let tree = TreeNode::Directory {
            name: "repo".to_string(),
            children: vec![TreeNode::File {
                name: "main.py".to_string(),
                size: 2048,
                language: Language::Python,
                path: "main.py".to_string(),
            }],
        };
        AnalysisReport {
            repo_name: "demo".to_string(),
            visual_data: project(&tree, "demo"),
            file_structure: tree,
        }
    }

    #[test]
    fn test_render_json() {
        let out = render(&report(), OutputFormat::Json, &DiagramConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["repoName"], "demo");
        assert_eq!(value["visualData"]["nodes"][1]["id"], "root-main.py");
        assert_eq!(value["visualData"]["edges"][0]["source"], "root");
    }

    #[test]
    fn test_render_mermaid() {
        let out = render(&report(), OutputFormat::Mermaid, &DiagramConfig::default()).unwrap();
        assert!(out.starts_with("graph TB"));
        assert!(out.contains("main.py"));
    }

    #[test]
    fn test_render_html() {
        let out = render(&report(), OutputFormat::Html, &DiagramConfig::default()).unwrap();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("Python file (2.0 KB)"));
    }
}
