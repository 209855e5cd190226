//! Local artifact storage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Owns the single model file at `{models_dir}/{filename}`.
///
/// The file goes from absent to present exactly once; readers never see a
/// partial file because every write ends in a rename.
#[derive(Debug, Clone)]
pub struct LocalStore {
    models_dir: PathBuf,
    target: PathBuf,
}

impl LocalStore {
    pub fn new(models_dir: impl Into<PathBuf>, filename: &str) -> Self {
        let models_dir = models_dir.into();
        Self {
            target: models_dir.join(filename),
            models_dir,
        }
    }

    pub fn target_path(&self) -> &Path {
        &self.target
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn is_present(&self) -> bool {
        self.target.is_file()
    }

    /// Move a fetched file into the target path.
    ///
    /// Hub caches hand out symlinks, so the real blob is resolved first. A
    /// same-filesystem rename is tried; otherwise the content is copied into a
    /// temporary file beside the target and that file is renamed over it.
    /// Anything other than a regular file is refused.
    pub fn persist(&self, fetched: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.models_dir).map_err(|e| self.write_error(e))?;

        let source = fs::canonicalize(fetched).map_err(|e| Error::LocalWrite {
            path: fetched.to_path_buf(),
            source: e,
        })?;

        let is_file = fs::metadata(&source)
            .map_err(|e| Error::LocalWrite {
                path: fetched.to_path_buf(),
                source: e,
            })?
            .is_file();
        if !is_file {
            return Err(Error::LocalWrite {
                path: fetched.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        match fs::rename(&source, &self.target) {
            Ok(()) => {
                log::info!("Moved {:?} to {:?}", source, self.target);
                return Ok(self.target.clone());
            }
            Err(e) => {
                log::debug!("Rename from {:?} failed ({}), copying instead", source, e);
            }
        }

        let mut staged = NamedTempFile::new_in(&self.models_dir).map_err(|e| self.write_error(e))?;
        let mut input = fs::File::open(&source).map_err(|e| self.write_error(e))?;
        io::copy(&mut input, staged.as_file_mut()).map_err(|e| self.write_error(e))?;
        staged.as_file().sync_all().map_err(|e| self.write_error(e))?;

        staged
            .persist(&self.target)
            .map_err(|e| self.write_error(e.error))?;

        log::info!("Copied {:?} to {:?}", source, self.target);
        Ok(self.target.clone())
    }

    fn write_error(&self, source: io::Error) -> Error {
        Error::LocalWrite {
            path: self.target.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_path() {
        let store = LocalStore::new("/models", "model.gguf");
        assert_eq!(store.target_path(), Path::new("/models/model.gguf"));
    }

    #[test]
    fn test_persist_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetched = dir.path().join("download.bin");
        fs::write(&fetched, b"weights").unwrap();

        let store = LocalStore::new(dir.path().join("models"), "model.gguf");
        assert!(!store.is_present());

        let path = store.persist(&fetched).unwrap();
        assert_eq!(path, store.target_path());
        assert!(store.is_present());
        assert_eq!(fs::read(&path).unwrap(), b"weights");
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_resolves_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let blob = dir.path().join("blob");
        let link = dir.path().join("link.gguf");
        fs::write(&blob, b"blob").unwrap();
        std::os::unix::fs::symlink(&blob, &link).unwrap();

        let store = LocalStore::new(dir.path().join("models"), "model.gguf");
        let path = store.persist(&link).unwrap();

        let meta = fs::symlink_metadata(&path).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(fs::read(&path).unwrap(), b"blob");
    }

    #[test]
    fn test_persist_missing_source_leaves_no_target() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "model.gguf");

        let err = store.persist(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::LocalWrite { .. }));
        assert!(!store.is_present());
    }

    #[test]
    fn test_persist_refuses_directory() {
        let dir = tempfile::tempdir().unwrap();
        let fetched = dir.path().join("snapshot");
        fs::create_dir(&fetched).unwrap();

        let store = LocalStore::new(dir.path().join("models"), "model.gguf");
        let err = store.persist(&fetched).unwrap_err();

        assert!(matches!(err, Error::LocalWrite { ref path, .. } if path == &fetched));
        assert!(!store.target_path().exists());
        assert!(fetched.is_dir());
    }
}
