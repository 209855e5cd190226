//! Artifact resolution against a remote repository.

use std::path::PathBuf;

use crate::defaults::MAX_LISTED_ARTIFACTS;
use crate::error::{Error, Result};
use crate::model::candidates::candidate_filenames;
use crate::model::hub::ArtifactSource;
use crate::model::reference::ModelReference;

/// A downloaded artifact waiting to be moved into place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// `repo/filename` the artifact came from
    pub source_location: String,
    /// Where the source left the download
    pub fetched_path: PathBuf,
    /// Final location in the models directory
    pub target_path: PathBuf,
}

/// Turns a [`ModelReference`] into a downloaded file.
pub struct ArtifactResolver<'a, S: ArtifactSource + ?Sized> {
    source: &'a S,
    extension: String,
}

impl<'a, S: ArtifactSource + ?Sized> ArtifactResolver<'a, S> {
    pub fn new(source: &'a S, extension: impl Into<String>) -> Self {
        Self {
            source,
            extension: extension.into(),
        }
    }

    /// Resolve and download the artifact for `reference`.
    ///
    /// With a variant, candidate filenames are tried in order and the first
    /// successful download wins. Without one, the repository listing decides.
    pub async fn resolve(
        &self,
        reference: &ModelReference,
        target_path: PathBuf,
    ) -> Result<ResolvedArtifact> {
        let repo = reference.repo_id.as_str();

        let (filename, fetched_path) = match &reference.variant {
            Some(variant) => {
                let candidates = candidate_filenames(repo, variant, &self.extension);
                self.try_candidates(reference, &candidates).await?
            }
            None => self.fetch_first_listed(repo).await?,
        };

        Ok(ResolvedArtifact {
            source_location: format!("{}/{}", repo, filename),
            fetched_path,
            target_path,
        })
    }

    async fn try_candidates(
        &self,
        reference: &ModelReference,
        candidates: &[String],
    ) -> Result<(String, PathBuf)> {
        let repo = reference.repo_id.as_str();

        for candidate in candidates {
            log::info!("Trying {}/{}", repo, candidate);
            match self.source.fetch(repo, candidate).await {
                Ok(path) => {
                    log::info!("Downloaded {}/{}", repo, candidate);
                    return Ok((candidate.clone(), path));
                }
                Err(e) if e.is_not_found() => {
                    log::debug!("{}/{} not found", repo, candidate);
                }
                Err(e) => {
                    return Err(Error::Network {
                        location: format!("{}/{}", repo, candidate),
                        source: e,
                    });
                }
            }
        }

        Err(Error::CandidateExhausted {
            reference: reference.to_string(),
            tried: candidates.to_vec(),
            available: self.available_artifacts(repo).await,
        })
    }

    async fn fetch_first_listed(&self, repo: &str) -> Result<(String, PathBuf)> {
        let files = self.source.list_files(repo).await.map_err(|e| Error::Network {
            location: repo.to_string(),
            source: e,
        })?;

        let filename = files
            .into_iter()
            .find(|f| f.ends_with(&self.extension))
            .ok_or_else(|| Error::EmptyRepository {
                repo: repo.to_string(),
                extension: self.extension.clone(),
            })?;

        log::info!("No variant given, selected {}/{}", repo, filename);

        let path = self
            .source
            .fetch(repo, &filename)
            .await
            .map_err(|e| Error::Network {
                location: format!("{}/{}", repo, filename),
                source: e,
            })?;

        Ok((filename, path))
    }

    /// Best-effort listing for diagnostics; failures are swallowed.
    async fn available_artifacts(&self, repo: &str) -> Option<Vec<String>> {
        match self.source.list_files(repo).await {
            Ok(files) => Some(
                files
                    .into_iter()
                    .filter(|f| f.ends_with(&self.extension))
                    .take(MAX_LISTED_ARTIFACTS)
                    .collect(),
            ),
            Err(e) => {
                log::debug!("Could not list {} for diagnostics: {}", repo, e);
                None
            }
        }
    }
}
