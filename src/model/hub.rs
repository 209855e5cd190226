//! Remote artifact repositories.
//!
//! [`ArtifactSource`] is the seam the resolver talks through; [`HfHubSource`]
//! backs it with the Hugging Face Hub.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use hf_hub::api::tokio::{Api, ApiBuilder, ApiError};
use thiserror::Error;

use crate::config::ProvisionConfig;
use crate::error::{Error, Result};

/// Errors returned by an [`ArtifactSource`].
#[derive(Error, Debug)]
pub enum HubError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl HubError {
    /// Whether trying the next candidate filename could still succeed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A remote store of model repositories.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// All filenames in the repository, in the order the remote reports them.
    async fn list_files(&self, repo_id: &str) -> std::result::Result<Vec<String>, HubError>;

    /// Download one file and return where it landed locally.
    async fn fetch(&self, repo_id: &str, filename: &str) -> std::result::Result<PathBuf, HubError>;
}

/// [`ArtifactSource`] backed by the Hugging Face Hub.
pub struct HfHubSource {
    api: Api,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl HfHubSource {
    /// Build a hub client from provisioning settings.
    ///
    /// The download cache lives under the models directory so the fetched
    /// blob can be renamed into place without crossing filesystems.
    pub fn new(config: &ProvisionConfig) -> Result<Self> {
        let mut builder = ApiBuilder::from_env()
            .with_cache_dir(config.hub_cache_dir())
            .with_progress(false);

        if let Some(token) = config.hf_token.clone().filter(|t| !t.is_empty()) {
            builder = builder.with_token(Some(token));
        }
        if let Some(endpoint) = config.hf_endpoint.clone() {
            builder = builder.with_endpoint(endpoint);
        }

        let api = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to initialise hub client: {}", e)))?;

        Ok(Self {
            api,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            download_timeout: Duration::from_secs(config.download_timeout_secs),
        })
    }
}

#[async_trait]
impl ArtifactSource for HfHubSource {
    async fn list_files(&self, repo_id: &str) -> std::result::Result<Vec<String>, HubError> {
        let repo = self.api.model(repo_id.to_string());
        let info = tokio::time::timeout(self.request_timeout, repo.info())
            .await
            .map_err(|_| HubError::Timeout(self.request_timeout))?
            .map_err(|e| classify(repo_id, e))?;

        Ok(info.siblings.into_iter().map(|s| s.rfilename).collect())
    }

    async fn fetch(&self, repo_id: &str, filename: &str) -> std::result::Result<PathBuf, HubError> {
        let repo = self.api.model(repo_id.to_string());
        log::debug!("Fetching {}/{}", repo_id, filename);

        tokio::time::timeout(self.download_timeout, repo.get(filename))
            .await
            .map_err(|_| HubError::Timeout(self.download_timeout))?
            .map_err(|e| classify(&format!("{}/{}", repo_id, filename), e))
    }
}

/// Only an explicit 404 counts as not-found; every other failure is transport.
fn classify(what: &str, error: ApiError) -> HubError {
    match &error {
        ApiError::RequestError(e) if e.status().map(|s| s.as_u16()) == Some(404) => {
            HubError::NotFound(what.to_string())
        }
        _ => HubError::Transport(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(HubError::NotFound("a/b".into()).is_not_found());
        assert!(!HubError::Transport("reset".into()).is_not_found());
        assert!(!HubError::Timeout(Duration::from_secs(1)).is_not_found());
    }

    #[test]
    fn test_source_creation() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProvisionConfig {
            models_dir: dir.path().to_path_buf(),
            ..ProvisionConfig::default()
        };
        let source = HfHubSource::new(&config).unwrap();
        assert_eq!(source.request_timeout, Duration::from_secs(30));
    }
}
