//! repomap - map the structure of a source repository
//!
//! Clones (or reuses) a working copy, walks it into a file tree and
//! projects that tree into a node/edge graph for visualization.

pub mod acquire;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod service;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use acquire::{Acquirer, FetchHandle, FetchStatus, GithubClient, Materialization, RepoIdentifier};
pub use analysis::{
    project, walk, AnalysisReport, Analyzer, GraphEdge, GraphNode, Language, LlmSummarizer,
    RepoGraph, Summarizer, TreeNode,
};
pub use config::Config;
pub use error::{Error, ErrorKind, ErrorReport, Result};
pub use service::RepoMap;
