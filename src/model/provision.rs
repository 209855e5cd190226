//! The resolve-download-persist chain.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::model::hub::ArtifactSource;
use crate::model::reference::ModelReference;
use crate::model::resolver::ArtifactResolver;
use crate::model::store::LocalStore;

/// Make sure the model file exists locally, downloading it if needed.
///
/// An existing file short-circuits everything: the reference is not even
/// parsed and `source` is never called.
pub async fn ensure_artifact<S: ArtifactSource + ?Sized>(
    store: &LocalStore,
    reference: &str,
    extension: &str,
    source: &S,
) -> Result<PathBuf> {
    if store.is_present() {
        log::info!("Model already present at {:?}", store.target_path());
        return Ok(store.target_path().to_path_buf());
    }

    let reference = match ModelReference::parse(reference)? {
        Some(reference) => reference,
        None => {
            return Err(Error::NoReference {
                path: store.target_path().to_path_buf(),
            })
        }
    };

    log::info!(
        "Model missing at {:?}, resolving {}",
        store.target_path(),
        reference
    );

    let resolved = ArtifactResolver::new(source, extension)
        .resolve(&reference, store.target_path().to_path_buf())
        .await?;

    let path = store.persist(&resolved.fetched_path)?;
    log::info!("Model {} stored at {:?}", resolved.source_location, path);
    Ok(path)
}
