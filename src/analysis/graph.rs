// Graph projection of the repository tree
//
// Flattens a `TreeNode` tree into the node/edge lists the diagram view
// renders. Node ids are path-like (`root-src-index.js`) so they are stable
// across runs over the same tree.

use crate::analysis::language::Language;
use crate::analysis::tree::TreeNode;
use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ROOT_ID: &str = "root";
pub const ROOT_SUMMARY: &str = "Repository root directory";

/// Files smaller than this are candidates for suppression
pub const SMALL_FILE_LIMIT: u64 = 100;

/// Substrings that mark a small file as boilerplate.
///
/// Matched anywhere in the file name, not as extensions, so a tiny
/// `commands.txt` is dropped as well as a tiny `README.md`.
pub const SMALL_FILE_MARKERS: [&str; 3] = ["md", "gitignore", "env"];

/// A visualization-ready node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl GraphNode {
    pub fn is_file(&self) -> bool {
        self.path.is_some()
    }
}

/// Directed parent -> child relation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// Projected graph of a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Graph statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub directories: usize,
    pub files: usize,
    /// Longest root-to-leaf edge count
    pub max_depth: usize,
}

impl RepoGraph {
    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Direct children of a node, in edge order
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source == id)
            .filter_map(move |e| self.node(&e.target))
    }

    /// Build a petgraph view of this graph
    pub fn to_petgraph(&self) -> DiGraph<&GraphNode, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());

        for node in &self.nodes {
            index.insert(node.id.as_str(), graph.add_node(node));
        }
        for edge in &self.edges {
            if let (Some(&from), Some(&to)) =
                (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
            {
                graph.add_edge(from, to, ());
            }
        }

        graph
    }

    pub fn stats(&self) -> GraphStats {
        let files = self.nodes.iter().filter(|n| n.is_file()).count();
        let graph = self.to_petgraph();
        let max_depth = graph
            .node_indices()
            .find(|&i| graph[i].id == ROOT_ID)
            .map(|root| {
                dijkstra(&graph, root, None, |_| 1usize)
                    .values()
                    .copied()
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);

        GraphStats {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            directories: self.nodes.len().saturating_sub(files + 1),
            files,
            max_depth,
        }
    }
}

/// Whether the small-file heuristic drops this file
pub fn is_suppressed(name: &str, size: u64) -> bool {
    size < SMALL_FILE_LIMIT && SMALL_FILE_MARKERS.iter().any(|m| name.contains(m))
}

/// Size in KB with one decimal, halves rounded up ("0.3" for 256 bytes)
pub fn format_kb(size: u64) -> String {
    let tenths = (size as f64 / 1024.0 * 10.0).round();
    format!("{:.1}", tenths / 10.0)
}

fn directory_summary(child_count: usize) -> String {
    format!("Directory containing {} files/subdirectories", child_count)
}

fn file_summary(language: Language, size: u64) -> String {
    format!("{} file ({} KB)", language.capitalized(), format_kb(size))
}

/// Project a walked tree into a graph rooted at a node labelled `repository_label`.
pub fn project(tree: &TreeNode, repository_label: &str) -> RepoGraph {
    let mut graph = RepoGraph::default();
    graph.nodes.push(GraphNode {
        id: ROOT_ID.to_string(),
        label: repository_label.to_string(),
        summary: ROOT_SUMMARY.to_string(),
        language: None,
        path: None,
    });

    match tree {
        TreeNode::Directory { children, .. } => {
            for child in children {
                project_node(child, ROOT_ID, &mut graph);
            }
        }
        TreeNode::File { .. } => project_node(tree, ROOT_ID, &mut graph),
    }

    graph
}

fn project_node(node: &TreeNode, parent_id: &str, graph: &mut RepoGraph) {
    let id = format!("{}-{}", parent_id, node.name());

    match node {
        // Empty directories contribute nothing
        TreeNode::Directory { children, .. } if children.is_empty() => {}
        TreeNode::Directory { name, children } => {
            graph.nodes.push(GraphNode {
                id: id.clone(),
                label: name.clone(),
                summary: directory_summary(children.len()),
                language: None,
                path: None,
            });
            graph.edges.push(GraphEdge {
                source: parent_id.to_string(),
                target: id.clone(),
            });
            for child in children {
                project_node(child, &id, graph);
            }
        }
        TreeNode::File { name, size, .. } if is_suppressed(name, *size) => {}
        TreeNode::File {
            name,
            size,
            language,
            path,
        } => {
            graph.nodes.push(GraphNode {
                id: id.clone(),
                label: name.clone(),
                summary: file_summary(*language, *size),
                language: Some(*language),
                path: Some(path.clone()),
            });
            graph.edges.push(GraphEdge {
                source: parent_id.to_string(),
                target: id,
            });
        }
    }
}
