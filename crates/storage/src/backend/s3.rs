use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{ObjectCannedAcl, ServerSideEncryption};
use tokio::io::AsyncReadExt;
use tracing::warn;

use crate::config::{Acl, Encryption, S3Config};
use crate::error::{BackendError, Result};

use super::{Backend, ObjectSource, ObjectStream};

/// Cache backend over an S3-compatible object store.
#[derive(Debug)]
pub struct S3Backend {
    client: Client,
    bucket: String,
    prefix: String,
    acl: ObjectCannedAcl,
    encryption: Option<ServerSideEncryption>,
}

impl S3Backend {
    pub async fn new(config: &S3Config) -> Result<Self> {
        if config.bucket.is_empty() {
            return Err(BackendError::config("no s3 bucket specified"));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                loader = loader.credentials_provider(Credentials::new(
                    access_key.clone(),
                    secret_key.clone(),
                    None,
                    None,
                    "cachepack",
                ));
            }
            _ => {
                warn!("aws key and/or secret not provided, falling back to anonymous credentials");
                loader = loader.no_credentials();
            }
        }
        let shared = loader.load().await;

        // No SDK-level retries, a failure surfaces once.
        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.path_style)
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone().unwrap_or_default(),
            acl: config.acl.into(),
            encryption: config.encryption.map(Into::into),
        })
    }

    fn full_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{key}", self.prefix)
        }
    }
}

#[async_trait]
impl Backend for S3Backend {
    async fn get(&self, key: &str) -> Result<ObjectStream> {
        let full = self.full_key(key);
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full)
            .send()
            .await
        {
            Ok(output) => Ok(Box::pin(output.body.into_async_read())),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                Err(BackendError::not_found(key))
            }
            Err(err) => Err(BackendError::transport("get object", key, err)),
        }
    }

    async fn put(&self, key: &str, source: &mut dyn ObjectSource) -> Result<()> {
        let full = self.full_key(key);
        let mut payload = Vec::new();
        source
            .read_to_end(&mut payload)
            .await
            .map_err(|err| BackendError::transport("read source", key, err))?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&full)
            .acl(self.acl.clone())
            .body(ByteStream::from(payload));
        if let Some(mode) = &self.encryption {
            request = request.server_side_encryption(mode.clone());
        }
        request
            .send()
            .await
            .map_err(|err| BackendError::transport("put object", key, err))?;
        Ok(())
    }
}

impl From<Acl> for ObjectCannedAcl {
    fn from(acl: Acl) -> Self {
        match acl {
            Acl::Private => ObjectCannedAcl::Private,
            Acl::PublicRead => ObjectCannedAcl::PublicRead,
            Acl::PublicReadWrite => ObjectCannedAcl::PublicReadWrite,
            Acl::AuthenticatedRead => ObjectCannedAcl::AuthenticatedRead,
            Acl::BucketOwnerRead => ObjectCannedAcl::BucketOwnerRead,
            Acl::BucketOwnerFullControl => ObjectCannedAcl::BucketOwnerFullControl,
        }
    }
}

impl From<Encryption> for ServerSideEncryption {
    fn from(mode: Encryption) -> Self {
        match mode {
            Encryption::Aes256 => ServerSideEncryption::Aes256,
            Encryption::AwsKms => ServerSideEncryption::AwsKms,
        }
    }
}
