// Mermaid rendering of the repository graph

use crate::analysis::{GraphNode, RepoGraph, ROOT_ID};
use crate::config::DiagramConfig;
use std::collections::HashMap;

/// Diagram generator for creating Mermaid flowcharts
pub struct DiagramGenerator {
    /// Maximum nodes to display before collapsing to directories
    max_nodes: usize,
    /// Layout direction (TB, LR, BT, RL)
    direction: String,
}

impl DiagramGenerator {
    pub fn new() -> Self {
        Self {
            max_nodes: 100,
            direction: "TB".to_string(),
        }
    }

    pub fn from_config(config: &DiagramConfig) -> Self {
        Self::new()
            .with_max_nodes(config.max_nodes)
            .with_direction(&config.direction)
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }

    pub fn with_direction(mut self, dir: &str) -> Self {
        self.direction = dir.to_string();
        self
    }

    /// Render the whole graph, or only its directories when it is too large
    pub fn generate(&self, graph: &RepoGraph) -> String {
        if graph.nodes.len() > self.max_nodes {
            return self.render(graph, |node| !node.is_file());
        }
        self.render(graph, |_| true)
    }

    fn render(&self, graph: &RepoGraph, include: impl Fn(&GraphNode) -> bool) -> String {
        let mut lines = Vec::new();
        lines.push(format!("graph {}", self.direction));

        // Mermaid ids are positional. Graph ids may repeat (`a-b.js` next to
        // `a/b.js`), so an edge source resolves to the nearest preceding node
        // with that id; in pre-order that is always the parent.
        let mut latest: HashMap<&str, usize> = HashMap::new();
        let mut arrows = Vec::new();
        let mut next = 0;
        for (idx, node) in graph.nodes.iter().enumerate() {
            if !include(node) {
                continue;
            }
            let mid = next;
            next += 1;
            lines.push(format!(
                "    n{}[\"{}\"]{}",
                mid,
                escape_label(&node.label),
                node_class(node)
            ));

            // node i (i > 0) is the target of edge i - 1
            let incoming = idx
                .checked_sub(1)
                .and_then(|e| graph.edges.get(e))
                .filter(|e| e.target == node.id);
            if let Some(from) = incoming.and_then(|e| latest.get(e.source.as_str())) {
                arrows.push(format!("    n{} --> n{}", from, mid));
            }
            latest.insert(node.id.as_str(), mid);
        }
        lines.extend(arrows);

        lines.push("    classDef root fill:#1f6feb,color:#fff".to_string());
        lines.push("    classDef dir fill:#d0e2ff".to_string());
        lines.push("    classDef file fill:#f6f8fa".to_string());

        lines.join("\n")
    }
}

impl Default for DiagramGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn node_class(node: &GraphNode) -> &'static str {
    if node.id == ROOT_ID {
        ":::root"
    } else if node.is_file() {
        ":::file"
    } else {
        ":::dir"
    }
}

/// Escape characters Mermaid cannot take inside a quoted label
fn escape_label(s: &str) -> String {
    s.replace('"', "#quot;")
}
