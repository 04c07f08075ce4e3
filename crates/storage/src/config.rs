use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Selects and configures the storage backend for a cache target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackendConfig {
    #[serde(rename = "s3")]
    S3(S3Config),
    #[serde(rename = "filesystem")]
    Filesystem(FilesystemConfig),
    #[serde(rename = "sftp")]
    Sftp(SftpConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Joined in front of every key inside the bucket.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub acl: Acl,
    #[serde(default)]
    pub encryption: Option<Encryption>,
    /// Overrides the AWS endpoint, e.g. for MinIO. The URL scheme decides
    /// whether the client speaks TLS.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub path_style: bool,
}

/// Canned access policy applied to every stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acl {
    #[default]
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

/// Server-side encryption requested on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encryption {
    #[serde(rename = "AES256")]
    Aes256,
    #[serde(rename = "aws:kms")]
    AwsKms,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// Mounted directory all cache objects live under.
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SftpConfig {
    pub hostname: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    /// OpenSSH or PEM encoded private key material.
    #[serde(default)]
    pub private_key: Option<String>,
    /// Connection timeout in seconds, 0 disables the limit.
    #[serde(default = "default_connect_timeout")]
    pub timeout_secs: u64,
    pub host_verification: HostVerification,
}

/// How the remote host key is checked during the SSH handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum HostVerification {
    /// Accept exactly the given OpenSSH public key line.
    #[serde(rename = "pinned-key")]
    PinnedKey { key: String },
    /// Accept whatever key the host presents. Only for throwaway
    /// environments.
    #[serde(rename = "insecure-accept-any")]
    InsecureAcceptAny,
}

fn default_ssh_port() -> u16 {
    22
}

fn default_connect_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acl_uses_kebab_case_wire_names() {
        let json = serde_json::to_string(&Acl::BucketOwnerFullControl).unwrap();
        assert_eq!(json, r#""bucket-owner-full-control""#);

        let acl: Acl = serde_json::from_str(r#""public-read""#).unwrap();
        assert_eq!(acl, Acl::PublicRead);
    }

    #[test]
    fn acl_defaults_to_private() {
        assert_eq!(Acl::default(), Acl::Private);
    }

    #[test]
    fn encryption_keeps_the_s3_wire_values() {
        assert_eq!(
            serde_json::to_string(&Encryption::Aes256).unwrap(),
            r#""AES256""#
        );
        assert_eq!(
            serde_json::to_string(&Encryption::AwsKms).unwrap(),
            r#""aws:kms""#
        );
    }

    #[test]
    fn backend_config_is_tagged_by_type() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"type": "filesystem", "root": "/var/cache/builds"}"#).unwrap();
        match config {
            BackendConfig::Filesystem(fs) => {
                assert_eq!(fs.root, PathBuf::from("/var/cache/builds"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }

        let config: BackendConfig = serde_json::from_str(
            r#"{"type": "s3", "bucket": "ci-cache", "region": "eu-central-1"}"#,
        )
        .unwrap();
        match config {
            BackendConfig::S3(s3) => assert_eq!(s3.bucket, "ci-cache"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn s3_config_fills_defaults_for_optional_fields() {
        let config: S3Config =
            serde_json::from_str(r#"{"bucket": "ci-cache", "region": "eu-central-1"}"#).unwrap();
        assert_eq!(config.acl, Acl::Private);
        assert!(config.encryption.is_none());
        assert!(config.prefix.is_none());
        assert!(!config.path_style);
    }

    #[test]
    fn sftp_config_fills_port_and_timeout_defaults() {
        let config: SftpConfig = serde_json::from_str(
            r#"{
                "hostname": "cache.internal",
                "username": "ci",
                "password": "secret",
                "host_verification": {"mode": "insecure-accept-any"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.port, 22);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn host_verification_modes_round_trip() {
        let pinned: HostVerification =
            serde_json::from_str(r#"{"mode": "pinned-key", "key": "ssh-ed25519 AAAA host"}"#)
                .unwrap();
        match pinned {
            HostVerification::PinnedKey { key } => assert_eq!(key, "ssh-ed25519 AAAA host"),
            other => panic!("unexpected mode: {other:?}"),
        }

        let json = serde_json::to_string(&HostVerification::InsecureAcceptAny).unwrap();
        assert_eq!(json, r#"{"mode":"insecure-accept-any"}"#);
    }
}
