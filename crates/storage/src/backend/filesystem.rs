use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;

use crate::config::FilesystemConfig;
use crate::error::{BackendError, Result};

use super::{Backend, ObjectSource, ObjectStream};

/// Cache backend rooted at a mounted directory.
///
/// Writes go directly to the target path without an atomic rename, so an
/// interrupted `put` can leave a partial object behind.
#[derive(Debug)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Validates the cache root once, before any object I/O.
    pub fn new(config: &FilesystemConfig) -> Result<Self> {
        let root = clean(&config.root);
        if root.as_os_str().is_empty() || root.parent().is_none() {
            return Err(BackendError::config(format!(
                "could not use <{}> as cache root, empty or root path given",
                config.root.display()
            )));
        }
        if root.is_relative() {
            return Err(BackendError::config(format!(
                "could not use <{}> as cache root, absolute path required",
                config.root.display()
            )));
        }
        let metadata = std::fs::metadata(&root).map_err(|err| {
            BackendError::config(format!(
                "cache root <{}> unavailable, make sure the volume is mounted: {err}",
                root.display()
            ))
        })?;
        if !metadata.is_dir() {
            return Err(BackendError::config(format!(
                "cache root <{}> is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn full_path(&self, key: &str) -> PathBuf {
        // Keys are root-relative; a leading slash must not escape the root.
        self.root.join(key.trim_start_matches('/'))
    }
}

#[async_trait]
impl Backend for FilesystemBackend {
    async fn get(&self, key: &str) -> Result<ObjectStream> {
        let path = self.full_path(key);
        match File::open(&path).await {
            Ok(file) => Ok(Box::pin(file)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(BackendError::not_found(key)),
            Err(err) => Err(BackendError::transport("open", key, err)),
        }
    }

    async fn put(&self, key: &str, source: &mut dyn ObjectSource) -> Result<()> {
        let path = self.full_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| BackendError::transport("create parent directory", key, err))?;
        }
        let mut file = File::create(&path)
            .await
            .map_err(|err| BackendError::transport("create", key, err))?;
        tokio::io::copy(source, &mut file)
            .await
            .map_err(|err| BackendError::transport("write", key, err))?;
        Ok(())
    }
}

/// Lexically resolves `.` and `..` segments without touching the filesystem.
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() && !cleaned.has_root() {
                    cleaned.push(Component::ParentDir.as_os_str());
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
