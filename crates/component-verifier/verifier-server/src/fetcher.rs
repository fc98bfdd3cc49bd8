//! Runtime dependency fetching.
//!
//! [`MavenFetcher`] downloads a single artifact (no transitive resolution)
//! from an ordered list of Maven 2 repositories into a local cache laid out
//! like a Maven repository. Cached artifacts are never fetched again.

use std::{
    path::{
        Path,
        PathBuf,
    },
    str::FromStr,
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{
    Client,
    StatusCode,
};
use thiserror::Error;
use tracing::{
    debug,
    info,
    warn,
};
use url::Url;
use uuid::Uuid;

use crate::coordinates::Coordinates;

/// Maven Central, always consulted first.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2/";

/// Per-repository request timeout, covering the whole download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("refusing to fetch into unsafe path {0:?}")]
    UnsafePath(String),
    #[error("{artifact} not found in {repositories} repositories")]
    NotFound {
        artifact: String,
        repositories: usize,
    },
    #[error("repository {repository} answered {status} for {artifact}")]
    Status {
        repository: String,
        status: StatusCode,
        artifact: String,
    },
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("artifact cache error: {0}")]
    Io(#[from] std::io::Error),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// A named Maven 2 repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub url: Url,
}

impl Repository {
    pub fn new(name: impl Into<String>, mut url: Url) -> Self {
        // `Url::join` replaces the last segment unless the base ends with '/'
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Self {
            name: name.into(),
            url,
        }
    }

    pub fn maven_central() -> Result<Self, url::ParseError> {
        Ok(Self::new("central", Url::parse(MAVEN_CENTRAL)?))
    }

    fn artifact_url(&self, artifact: &str) -> Result<Url, url::ParseError> {
        self.url.join(artifact)
    }
}

/// Parses `name=url`, the form used on the command line.
impl FromStr for Repository {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, url) = s
            .split_once('=')
            .ok_or_else(|| format!("expected name=url, got {s:?}"))?;
        if name.is_empty() {
            return Err(format!("repository name is empty in {s:?}"));
        }
        let url = Url::parse(url).map_err(|e| format!("invalid repository url {url:?}: {e}"))?;
        Ok(Self::new(name, url))
    }
}

/// Where fetched artifacts land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchContext {
    pub target_dir: PathBuf,
}

impl FetchContext {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }
}

/// Fetches a library by coordinates, returning the local artifact path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DependencyFetcher: Send + Sync {
    async fn fetch(
        &self,
        coordinates: &Coordinates,
        context: &FetchContext,
    ) -> Result<PathBuf, FetchError>;
}

pub struct MavenFetcher {
    client: Client,
    repositories: Vec<Repository>,
    timeout: Duration,
}

impl MavenFetcher {
    /// Maven Central followed by `extra`, in order.
    pub fn new(extra: Vec<Repository>) -> Result<Self, FetchError> {
        let mut repositories = vec![Repository::maven_central()?];
        repositories.extend(extra);
        Self::with_repositories(repositories)
    }

    pub fn with_repositories(repositories: Vec<Repository>) -> Result<Self, FetchError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            repositories,
            timeout: DEFAULT_FETCH_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }
}

fn check_artifact_path(artifact: &str) -> Result<(), FetchError> {
    // '%' covers encoded dot-segments, which `Url::join` would resolve.
    let unsafe_component = artifact.split('/').any(|part| {
        part.is_empty()
            || part == "."
            || part == ".."
            || part.contains(['\\', '%', '?', '#'])
    });
    if unsafe_component {
        return Err(FetchError::UnsafePath(artifact.to_string()));
    }
    Ok(())
}

async fn write_artifact(destination: &Path, bytes: &[u8]) -> Result<(), FetchError> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    // Readers only ever see a complete file.
    let partial = destination.with_extension(format!("{}.part", Uuid::new_v4()));
    tokio::fs::write(&partial, bytes).await?;
    tokio::fs::rename(&partial, destination).await?;
    Ok(())
}

#[async_trait]
impl DependencyFetcher for MavenFetcher {
    async fn fetch(
        &self,
        coordinates: &Coordinates,
        context: &FetchContext,
    ) -> Result<PathBuf, FetchError> {
        let artifact = coordinates.repository_path();
        check_artifact_path(&artifact)?;

        let destination = context.target_dir.join(&artifact);
        if tokio::fs::try_exists(&destination).await? {
            debug!(target: "fetcher", %artifact, "Artifact already cached");
            return Ok(destination);
        }

        let mut last_error = None;
        for repository in &self.repositories {
            let url = repository.artifact_url(&artifact)?;
            debug!(target: "fetcher", repository = %repository.name, %url, "Fetching artifact");

            match self.client.get(url).timeout(self.timeout).send().await {
                Ok(response) if response.status().is_success() => {
                    let bytes = response.bytes().await?;
                    write_artifact(&destination, &bytes).await?;
                    info!(
                        target: "fetcher",
                        repository = %repository.name,
                        %artifact,
                        size = bytes.len(),
                        "Fetched artifact"
                    );
                    return Ok(destination);
                }
                Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                    debug!(target: "fetcher", repository = %repository.name, %artifact, "Artifact not in repository");
                }
                Ok(response) => {
                    warn!(target: "fetcher", repository = %repository.name, status = %response.status(), %artifact, "Unexpected repository response");
                    last_error = Some(FetchError::Status {
                        repository: repository.name.clone(),
                        status: response.status(),
                        artifact: artifact.clone(),
                    });
                }
                Err(err) => {
                    warn!(target: "fetcher", repository = %repository.name, error = %err, "Repository request failed");
                    last_error = Some(FetchError::Http(err));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            FetchError::NotFound {
                artifact,
                repositories: self.repositories.len(),
            }
        }))
    }
}
