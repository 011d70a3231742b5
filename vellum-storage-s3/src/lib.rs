//! # vellum-storage-s3: direct-to-S3 client uploads
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`handler`] | [`SignedUrlHandler`] and its `POST /storage-s3-generate-signed-url` router |
//! | [`config`] | [`S3StorageConfig`] bound from `storage.s3`, per-collection options, ACLs |
//! | [`encryption`] | Server-side encryption settings and per-request parameters |
//! | [`key`] | Object key computation below a collection prefix |
//! | [`signer`] | [`SigningClient`] trait and the SigV4 [`SigV4Signer`] |
//!
//! # Quick start
//!
//! ```ignore
//! use vellum_storage_s3::prelude::*;
//!
//! let s3: S3StorageConfig = config.bind()?;
//! let uploads = SignedUrlHandler::from_config(SigV4Signer::from_config(&s3)?, &s3);
//!
//! let app = Router::new()
//!     .merge(uploads.router())
//!     .layer(vellum_core::default_trace());
//! ```

pub mod config;
pub mod encryption;
pub mod handler;
pub mod key;
pub mod signer;

pub use config::{CollectionStorageOptions, ObjectAcl, S3StorageConfig};
pub use encryption::{get_encryption_params, EncryptionAlgorithm, EncryptionConfig, EncryptionParams};
pub use handler::{
    ClientUploadsAccess, SignedUrlError, SignedUrlHandler, SignedUrlRequest, SignedUrlResponse,
    UploadAccess, UploadAccessArgs, SIGNED_URL_EXPIRY, SIGNED_URL_PATH,
};
pub use key::{object_key, KeyError};
pub use signer::{PutObjectRequest, SigV4Signer, SignError, SigningClient};

pub mod prelude {
    //! Re-exports of the most commonly used storage types.
    pub use crate::{
        CollectionStorageOptions, EncryptionConfig, ObjectAcl, S3StorageConfig, SigV4Signer,
        SignedUrlHandler, SigningClient, UploadAccessArgs,
    };
}
