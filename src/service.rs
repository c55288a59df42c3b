//! Entry point for the presentation layer.
//!
//! [`RepoMap`] chains acquisition, walking and projection, and serves file
//! contents and summaries out of the working-copy cache.

use crate::acquire::{self, Acquirer, GitFetcher, RepoIdentifier};
use crate::analysis::{AnalysisReport, Analyzer, Summarizer};
use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub struct RepoMap {
    acquirer: Acquirer,
    analyzer: Analyzer,
}

impl RepoMap {
    pub fn new(acquirer: Acquirer) -> Self {
        Self {
            acquirer,
            analyzer: Analyzer::new(),
        }
    }

    /// Build a service that clones with `git`
    pub fn from_config(config: &Config) -> Self {
        let fetcher = Arc::new(GitFetcher::from_config(&config.acquisition));
        Self::new(Acquirer::from_config(&config.acquisition, fetcher))
    }

    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn acquirer(&self) -> &Acquirer {
        &self.acquirer
    }

    /// Materialize a repository and analyze it
    pub async fn analyze(&self, identifier: &str) -> Result<AnalysisReport> {
        let repo = RepoIdentifier::parse(identifier)?;
        let root = self.acquirer.materialize_and_wait(&repo).await?;
        self.scan(root, repo.name()).await
    }

    /// Analyze a local directory without fetching anything
    pub async fn scan(&self, root: PathBuf, label: &str) -> Result<AnalysisReport> {
        debug!(root = %root.display(), label, "scanning");
        let analyzer = self.analyzer;
        let label = label.to_string();
        tokio::task::spawn_blocking(move || analyzer.analyze(&root, &label))
            .await
            .map_err(|e| Error::other(format!("analysis task failed: {}", e)))?
    }

    /// Read a file from a materialized repository
    pub fn read_file(&self, identifier: &str, path: &str) -> Result<String> {
        let repo = RepoIdentifier::parse(identifier)?;
        let root = self.acquirer.cached_path(&repo).ok_or_else(|| {
            Error::not_found(format!("repository {} has not been materialized", repo))
        })?;
        acquire::read_file(&root, path)
    }

    /// Read a file and hand its contents to `summarizer`
    pub async fn summarize_file(
        &self,
        summarizer: &dyn Summarizer,
        identifier: &str,
        path: &str,
    ) -> Result<String> {
        let content = self.read_file(identifier, path)?;
        summarizer.summarize(&content).await
    }
}
