// Single-page HTML view of an analysis report

use crate::analysis::AnalysisReport;
use crate::error::Result;
use crate::output::diagrams::DiagramGenerator;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ repo_name }} · repomap</title>
  <script type="module">
    import mermaid from "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs";
    mermaid.initialize({ startOnLoad: true });
  </script>
  <style>
    body { font-family: system-ui, sans-serif; margin: 2rem; }
    table { border-collapse: collapse; }
    td, th { border: 1px solid #d0d7de; padding: 0.25rem 0.5rem; text-align: left; }
  </style>
</head>
<body>
  <h1>{{ repo_name }}</h1>
  <p>{{ stats.files | pluralize(singular="file") }}, {{ stats.directories | pluralize(singular="directory", plural="directories") }}, depth {{ stats.max_depth }}</p>
  <pre class="mermaid">
{{ diagram }}
  </pre>
  <table>
    <thead><tr><th>Node</th><th>Path</th><th>Summary</th></tr></thead>
    <tbody>
    {% for node in nodes %}
      <tr><td>{{ node.label }}</td><td>{{ node.path | default(value="") }}</td><td>{{ node.summary }}</td></tr>
    {% endfor %}
    </tbody>
  </table>
</body>
</html>
"#;

/// Renders reports through an embedded Tera template
pub struct HtmlRenderer {
    tera: Tera,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("page.html", PAGE_TEMPLATE)?;
        tera.register_filter("pluralize", pluralize);
        Ok(Self { tera })
    }

    pub fn render(&self, report: &AnalysisReport, diagrams: &DiagramGenerator) -> Result<String> {
        let mut context = Context::new();
        context.insert("repo_name", &report.repo_name);
        context.insert("stats", &report.visual_data.stats());
        context.insert("nodes", &report.visual_data.nodes);
        context.insert("diagram", &diagrams.generate(&report.visual_data));

        Ok(self.tera.render("page.html", &context)?)
    }
}

/// Pluralize a word based on count
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let singular = args
        .get("singular")
        .and_then(|v| v.as_str())
        .unwrap_or("item");
    let default_plural = format!("{}s", singular);
    let plural = args
        .get("plural")
        .and_then(|v| v.as_str())
        .unwrap_or(&default_plural);

    if count == 1 {
        Ok(Value::String(format!("{} {}", count, singular)))
    } else {
        Ok(Value::String(format!("{} {}", count, plural)))
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
                name: "<b>.js".to_string(),
                size: 500,
                language: Language::JavaScript,
                path: "<b>.js".to_string(),
            }],
        };
        AnalysisReport {
            repo_name: "demo".to_string(),
            visual_data: project(&tree, "demo"),
            file_structure: tree,
        }
    }

    #[test]
    fn test_render_page() {
        let html = HtmlRenderer::new()
            .unwrap()
            .render(&report(), &DiagramGenerator::new())
            .unwrap();
        assert!(html.contains("<h1>demo</h1>"));
        assert!(html.contains("1 file, 0 directories"));
        assert!(html.contains("Javascript file (0.5 KB)"));
        assert!(html.contains("graph TB"));
        // labels are escaped
        assert!(html.contains("&lt;b&gt;.js"));
        assert!(!html.contains("<b>.js"));
    }

    #[test]
    fn test_pluralize_singular() {
        let mut args = HashMap::new();
        args.insert("singular".to_string(), Value::String("file".to_string()));
        let result = pluralize(&Value::Number(1.into()), &args).unwrap();
        assert_eq!(result.as_str().unwrap(), "1 file");
    }

    #[test]
    fn test_pluralize_custom_plural() {
        let mut args = HashMap::new();
        args.insert("singular".to_string(), Value::String("directory".to_string()));
        args.insert("plural".to_string(), Value::String("directories".to_string()));
        let result = pluralize(&Value::Number(3.into()), &args).unwrap();
        assert_eq!(result.as_str().unwrap(), "3 directories");
    }
}
