use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use vellum_core::{ConfigError, ConfigProperties, VellumConfig};

use crate::encryption::{EncryptionAlgorithm, EncryptionConfig};

/// Canned ACL applied to uploaded objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    Private,
    PublicRead,
}

impl ObjectAcl {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectAcl::Private => "private",
            ObjectAcl::PublicRead => "public-read",
        }
    }
}

impl fmt::Display for ObjectAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectAcl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(ObjectAcl::Private),
            "public-read" => Ok(ObjectAcl::PublicRead),
            other => Err(format!("unsupported ACL `{other}` (expected private or public-read)")),
        }
    }
}

/// Storage options of one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStorageOptions {
    /// Key prefix for the collection's uploads.
    pub prefix: Option<String>,
}

impl CollectionStorageOptions {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// The prefix, or `""` when none is configured.
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }
}

/// S3 storage settings, bound from the `storage.s3` section:
///
/// ```yaml
/// storage:
///   s3:
///     bucket: media-bucket
///     region: eu-west-1
///     access_key_id: ${env:AWS_ACCESS_KEY_ID}
///     secret_access_key: ${env:AWS_SECRET_ACCESS_KEY}
///     acl: private
///     encryption:
///       algorithm: aws:kms
///       kms_key_id: alias/uploads
///     collections:
///       media:
///         prefix: uploads
///       documents: true
/// ```
#[derive(Clone)]
pub struct S3StorageConfig {
    pub bucket: String,
    pub acl: Option<ObjectAcl>,
    pub region: String,
    /// Custom endpoint (MinIO, R2, ...). Defaults to the regional AWS endpoint.
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub encryption: Option<EncryptionConfig>,
    pub collections: HashMap<String, CollectionStorageOptions>,
}

pub const DEFAULT_REGION: &str = "us-east-1";

impl fmt::Debug for S3StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3StorageConfig")
            .field("bucket", &self.bucket)
            .field("acl", &self.acl)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("encryption", &self.encryption)
            .field("collections", &self.collections)
            .finish()
    }
}

impl S3StorageConfig {
    fn key(suffix: &str) -> String {
        format!("{}.{suffix}", Self::prefix())
    }
}

fn parse_with<T: FromStr<Err = String>>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|message| ConfigError::Invalid {
        key: key.to_string(),
        message,
    })
}

impl ConfigProperties for S3StorageConfig {
    fn prefix() -> &'static str {
        "storage.s3"
    }

    fn from_config(config: &VellumConfig) -> Result<Self, ConfigError> {
        let acl_key = Self::key("acl");
        let acl = config
            .get_opt::<String>(&acl_key)?
            .map(|raw| parse_with::<ObjectAcl>(&acl_key, &raw))
            .transpose()?;

        let algorithm_key = Self::key("encryption.algorithm");
        let encryption = match config.get_opt::<String>(&algorithm_key)? {
            Some(raw) => Some(EncryptionConfig {
                algorithm: parse_with::<EncryptionAlgorithm>(&algorithm_key, &raw)?,
                kms_key_id: config.get_opt(&Self::key("encryption.kms_key_id"))?,
                bucket_key_enabled: config.get_opt(&Self::key("encryption.bucket_key_enabled"))?,
            }),
            None => None,
        };

        let collections_key = Self::key("collections");
        let mut collections = HashMap::new();
        for slug in config.child_keys(&collections_key) {
            let entry = format!("{collections_key}.{slug}");
            if let Some(prefix) = config.get_opt::<String>(&format!("{entry}.prefix"))? {
                collections.insert(slug, CollectionStorageOptions::with_prefix(prefix));
                continue;
            }
            // `slug: false` disables the collection; any other shape enables it unprefixed.
            if config.get_opt::<bool>(&entry)? == Some(false) {
                continue;
            }
            collections.insert(slug, CollectionStorageOptions::default());
        }

        Ok(Self {
            bucket: config.get(&Self::key("bucket"))?,
            acl,
            region: config.get_or(&Self::key("region"), DEFAULT_REGION.to_string()),
            endpoint: config.get_opt(&Self::key("endpoint"))?,
            access_key_id: config.get(&Self::key("access_key_id"))?,
            secret_access_key: config.get(&Self::key("secret_access_key"))?,
            encryption,
            collections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acl_round_trips_through_str() {
        assert_eq!("public-read".parse(), Ok(ObjectAcl::PublicRead));
        assert_eq!(ObjectAcl::Private.to_string(), "private");
        assert!("authenticated-read".parse::<ObjectAcl>().is_err());
    }

    #[test]
    fn prefix_defaults_to_empty() {
        assert_eq!(CollectionStorageOptions::default().prefix(), "");
        assert_eq!(CollectionStorageOptions::with_prefix("media").prefix(), "media");
    }

    #[test]
    fn debug_redacts_secret() {
        let config = S3StorageConfig {
            bucket: "b".into(),
            acl: None,
            region: DEFAULT_REGION.into(),
            endpoint: None,
            access_key_id: "AKID".into(),
            secret_access_key: "very-secret".into(),
            encryption: None,
            collections: HashMap::new(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("very-secret"));
    }
}
