// Repository metadata from the GitHub REST API

use crate::acquire::identifier::RepoIdentifier;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Subset of `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub default_branch: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
}

pub struct GithubClient {
    api_base: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl GithubClient {
    pub fn new() -> Self {
        Self::with_base(GITHUB_API_BASE)
    }

    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            token: std::env::var("GITHUB_TOKEN").ok(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Fetch public metadata for an `owner/name` repository
    pub async fn repository(&self, repo: &RepoIdentifier) -> Result<RepositoryInfo> {
        let slug = repo.slug().ok_or_else(|| {
            Error::invalid_input(format!("{} does not name an owner/repository pair", repo))
        })?;
        let endpoint = format!("{}/repos/{}", self.api_base.trim_end_matches('/'), slug);

        let mut request = self
            .client
            .get(&endpoint)
            .header("User-Agent", concat!("repomap/", env!("CARGO_PKG_VERSION")))
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::acquisition(slug.clone(), format!("GitHub request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(Error::not_found(format!("repository {}", slug))),
            status if !status.is_success() => {
                return Err(Error::acquisition(
                    slug,
                    format!("GitHub returned status {}", status),
                ))
            }
            _ => {}
        }

        response.json().await.map_err(|e| {
            Error::acquisition(slug, format!("Failed to parse GitHub response: {}", e))
        })
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}
