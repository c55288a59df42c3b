//! Repository acquisition.
//!
//! [`Acquirer::materialize`] makes sure a local working copy of a repository
//! exists under the cache root. A cache hit resolves immediately; otherwise
//! the fetch is started in the background and the caller gets a
//! [`FetchHandle`] to await completion or cancel it.
//!
//! Fetches land in a staging directory and are renamed into place only once
//! they succeed, so a directory at the cache path is always a complete copy.
//! Calls for a repository that is already being fetched join that fetch.

pub mod fetcher;
pub mod files;
pub mod github;
pub mod identifier;

pub use fetcher::*;
pub use files::*;
pub use github::*;
pub use identifier::*;

use crate::config::AcquisitionConfig;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

const STAGING_DIR: &str = ".staging";

/// Progress of a background fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    InProgress,
    Complete(PathBuf),
    Failed(String),
}

/// Outcome of [`Acquirer::materialize`]
#[derive(Debug)]
pub enum Materialization {
    /// Working copy already present
    Ready(PathBuf),
    /// Fetch accepted and running
    Accepted(FetchHandle),
}

/// Handle on an in-flight fetch
#[derive(Debug)]
pub struct FetchHandle {
    repo: String,
    status: watch::Receiver<FetchStatus>,
    abort: AbortHandle,
}

impl FetchHandle {
    pub fn status(&self) -> FetchStatus {
        self.status.borrow().clone()
    }

    /// Abort the fetch. Every caller waiting on it sees a failure.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Wait for the fetch to finish
    pub async fn wait(mut self) -> Result<PathBuf> {
        loop {
            let current = self.status.borrow_and_update().clone();
            match current {
                FetchStatus::Complete(path) => return Ok(path),
                FetchStatus::Failed(message) => return Err(Error::acquisition(self.repo, message)),
                FetchStatus::InProgress => {}
            }

            if self.status.changed().await.is_err() {
                let last = self.status.borrow().clone();
                return match last {
                    FetchStatus::Complete(path) => Ok(path),
                    FetchStatus::Failed(message) => Err(Error::acquisition(self.repo, message)),
                    FetchStatus::InProgress => {
                        Err(Error::acquisition(self.repo, "fetch was cancelled"))
                    }
                };
            }
        }
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    status: watch::Receiver<FetchStatus>,
    abort: AbortHandle,
}

type Registry = Arc<Mutex<HashMap<String, InFlight>>>;

/// Ensures local working copies of remote repositories
pub struct Acquirer {
    cache_root: PathBuf,
    fetcher: Arc<dyn RepositoryFetcher>,
    timeout: Duration,
    in_flight: Registry,
}

impl Acquirer {
    pub fn new(cache_root: impl Into<PathBuf>, fetcher: Arc<dyn RepositoryFetcher>) -> Self {
        Self {
            cache_root: cache_root.into(),
            fetcher,
            timeout: Duration::from_secs(AcquisitionConfig::default().timeout_secs),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &AcquisitionConfig, fetcher: Arc<dyn RepositoryFetcher>) -> Self {
        Self::new(config.cache_dir.clone(), fetcher)
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// Upper bound on a single fetch
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Cache location for a repository, whether or not it exists yet
    pub fn local_path(&self, repo: &RepoIdentifier) -> PathBuf {
        self.cache_root.join(repo.cache_key())
    }

    /// Cache location if the repository has been materialized
    pub fn cached_path(&self, repo: &RepoIdentifier) -> Option<PathBuf> {
        let path = self.local_path(repo);
        path.is_dir().then_some(path)
    }

    /// Number of fetches currently running
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Return the cached copy, join a running fetch, or start a new one.
    pub fn materialize(&self, repo: &RepoIdentifier) -> Result<Materialization> {
        let key = repo.cache_key();
        let dest = self.cache_root.join(&key);

        let mut registry = self
            .in_flight
            .lock()
            .map_err(|_| Error::other("in-flight registry poisoned"))?;

        if let Some(existing) = registry.get(&key) {
            debug!(repo = %repo, "joining in-flight fetch");
            return Ok(Materialization::Accepted(FetchHandle {
                repo: repo.to_string(),
                status: existing.status.clone(),
                abort: existing.abort.clone(),
            }));
        }

        if dest.is_dir() {
            info!(repo = %repo, path = %dest.display(), "using cached working copy");
            return Ok(Materialization::Ready(dest));
        }

        // Checked before a job exists: a job dropped here would re-lock the registry
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            Error::acquisition(repo.to_string(), "fetch requires a running tokio runtime")
        })?;

        let (tx, rx) = watch::channel(FetchStatus::InProgress);
        let job = FetchJob {
            fetcher: Arc::clone(&self.fetcher),
            repo: repo.clone(),
            staging: self.cache_root.join(STAGING_DIR).join(&key),
            dest,
            timeout: self.timeout,
            tx,
            registration: Registration {
                registry: Arc::clone(&self.in_flight),
                key: key.clone(),
            },
        };

        info!(repo = %repo, "fetch accepted");
        let task = runtime.spawn(job.run());
        let abort = task.abort_handle();
        registry.insert(
            key,
            InFlight {
                status: rx.clone(),
                abort: abort.clone(),
            },
        );

        Ok(Materialization::Accepted(FetchHandle {
            repo: repo.to_string(),
            status: rx,
            abort,
        }))
    }

    /// Materialize and wait for the working copy
    pub async fn materialize_and_wait(&self, repo: &RepoIdentifier) -> Result<PathBuf> {
        match self.materialize(repo)? {
            Materialization::Ready(path) => Ok(path),
            Materialization::Accepted(handle) => handle.wait().await,
        }
    }
}

/// Removes the registry entry when the fetch task ends, however it ends
struct Registration {
    registry: Registry,
    key: String,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.remove(&self.key);
        }
    }
}

/// Deletes the staging directory unless disarmed
struct StagingGuard {
    path: PathBuf,
    armed: bool,
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to clean staging directory");
            }
        }
    }
}

struct FetchJob {
    fetcher: Arc<dyn RepositoryFetcher>,
    repo: RepoIdentifier,
    staging: PathBuf,
    dest: PathBuf,
    timeout: Duration,
    tx: watch::Sender<FetchStatus>,
    registration: Registration,
}

impl FetchJob {
    async fn run(self) {
        let FetchJob {
            fetcher,
            repo,
            staging,
            dest,
            timeout,
            tx,
            registration,
        } = self;

        let status = match fetch_into(fetcher.as_ref(), &repo, &staging, &dest, timeout).await {
            Ok(()) => {
                info!(repo = %repo, path = %dest.display(), "fetch complete");
                FetchStatus::Complete(dest)
            }
            Err(e) => {
                warn!(repo = %repo, error = %e, "fetch failed");
                FetchStatus::Failed(failure_message(e))
            }
        };

        // unregister only after the cache path is final
        let _ = tx.send(status);
        drop(registration);
    }
}

async fn fetch_into(
    fetcher: &dyn RepositoryFetcher,
    repo: &RepoIdentifier,
    staging: &Path,
    dest: &Path,
    timeout: Duration,
) -> Result<()> {
    if let Some(parent) = staging.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if staging.exists() {
        tokio::fs::remove_dir_all(staging).await?;
    }

    let mut guard = StagingGuard {
        path: staging.to_path_buf(),
        armed: true,
    };

    match tokio::time::timeout(timeout, fetcher.fetch(repo, staging)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(Error::acquisition(
                repo.to_string(),
                format!("fetch timed out after {}s", timeout.as_secs_f64()),
            ))
        }
    }

    if !staging.is_dir() {
        return Err(Error::acquisition(
            repo.to_string(),
            "fetcher reported success but produced no directory",
        ));
    }

    tokio::fs::rename(staging, dest).await?;
    guard.armed = false;
    Ok(())
}

fn failure_message(err: Error) -> String {
    match err {
        Error::AcquisitionFailed { message, .. } => message,
        other => other.to_string(),
    }
}
