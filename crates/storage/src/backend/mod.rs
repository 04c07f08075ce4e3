pub mod filesystem;
pub mod s3;
pub mod sftp;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncSeek};

use crate::config::BackendConfig;
use crate::error::Result;

/// Readable stream over a stored object, positioned at its start.
pub type ObjectStream = Pin<Box<dyn AsyncRead + Send>>;

/// Upload payload, read from its current position to end of stream.
///
/// Sources stay seekable so a backend can re-read the payload, e.g. for
/// request signing.
pub trait ObjectSource: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> ObjectSource for T {}

/// Uniform contract over one configured storage target.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Retrieve the object stored under `key`.
    async fn get(&self, key: &str) -> Result<ObjectStream>;

    /// Store `source` under `key`, replacing any existing object.
    async fn put(&self, key: &str, source: &mut dyn ObjectSource) -> Result<()>;
}

/// Build and eagerly validate the backend described by `config`.
pub async fn initialize(config: &BackendConfig) -> Result<Arc<dyn Backend>> {
    match config {
        BackendConfig::S3(cfg) => Ok(Arc::new(s3::S3Backend::new(cfg).await?)),
        BackendConfig::Filesystem(cfg) => Ok(Arc::new(filesystem::FilesystemBackend::new(cfg)?)),
        BackendConfig::Sftp(cfg) => Ok(Arc::new(sftp::SftpBackend::connect(cfg).await?)),
    }
}
