// Remote repository fetching

use crate::acquire::identifier::RepoIdentifier;
use crate::config::AcquisitionConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Produces a working copy of a remote repository at `dest`.
///
/// `dest` does not exist when `fetch` is called. Implementations may leave a
/// partial directory behind on failure; the caller cleans it up.
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    async fn fetch(&self, repo: &RepoIdentifier, dest: &Path) -> Result<()>;
}

/// Fetcher that shells out to `git clone`
#[derive(Debug, Clone)]
pub struct GitFetcher {
    program: OsString,
    base_url: String,
    shallow: bool,
}

impl GitFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            program: OsString::from("git"),
            base_url: base_url.into(),
            shallow: true,
        }
    }

    pub fn from_config(config: &AcquisitionConfig) -> Self {
        Self::new(config.clone_base_url.clone()).with_shallow(config.shallow)
    }

    /// Clone only the latest commit
    pub fn with_shallow(mut self, shallow: bool) -> Self {
        self.shallow = shallow;
        self
    }

    /// Use a different git executable
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    fn clone_args(&self, url: &str, dest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["clone".into(), "--quiet".into()];
        if self.shallow {
            args.push("--depth".into());
            args.push("1".into());
        }
        // keep a URL starting with '-' from being read as an option
        args.push("--".into());
        args.push(url.into());
        args.push(dest.as_os_str().to_os_string());
        args
    }
}

#[async_trait]
impl RepositoryFetcher for GitFetcher {
    async fn fetch(&self, repo: &RepoIdentifier, dest: &Path) -> Result<()> {
        let url = repo.clone_url(&self.base_url);
        debug!(%url, dest = %dest.display(), "running git clone");

        let output = Command::new(&self.program)
            .args(self.clone_args(&url, dest))
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::acquisition(repo.to_string(), format!("failed to run git: {}", e)))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
            .unwrap_or_else(|| format!("git clone exited with {}", output.status));

        Err(Error::acquisition(repo.to_string(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clone_args_shallow() {
        let fetcher = GitFetcher::new("https://github.com");
        let args = fetcher.clone_args("https://github.com/octo/demo.git", Path::new("/tmp/x"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "clone",
                "--quiet",
                "--depth",
                "1",
                "--",
                "https://github.com/octo/demo.git",
                "/tmp/x"
            ]
        );
    }

    #[test]
    fn test_clone_args_full_history() {
        let fetcher = GitFetcher::new("https://github.com").with_shallow(false);
        let args = fetcher.clone_args("u", Path::new("d"));
        assert!(!args.iter().any(|a| a == "--depth"));
    }

    #[test]
    fn test_from_config() {
        let config = AcquisitionConfig {
            shallow: false,
            ..AcquisitionConfig::default()
        };
        let fetcher = GitFetcher::from_config(&config);
        assert!(!fetcher.shallow);
        assert_eq!(fetcher.base_url, "https://github.com");
    }

    #[tokio::test]
    async fn test_missing_program_is_acquisition_failure() {
        let dir = TempDir::new().unwrap();
        let fetcher = GitFetcher::new("https://github.com")
            .with_program("definitely-not-a-real-git-binary");
        let repo = RepoIdentifier::parse("octo/demo").unwrap();

        let err = fetcher.fetch(&repo, &dir.path().join("demo")).await.unwrap_err();
        assert!(matches!(err, Error::AcquisitionFailed { .. }));
        assert!(err.to_string().contains("failed to run git"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_acquisition_failure() {
        let dir = TempDir::new().unwrap();
        let fetcher = GitFetcher::new("https://github.com").with_program("false");
        let repo = RepoIdentifier::parse("octo/demo").unwrap();

        let err = fetcher.fetch(&repo, &dir.path().join("demo")).await.unwrap_err();
        assert!(matches!(err, Error::AcquisitionFailed { .. }));
        assert!(err.to_string().contains("octo/demo"));
    }
}
