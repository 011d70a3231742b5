use vellum_core::config::{ConfigError, VellumConfig};
use vellum_storage_s3::{
    CollectionStorageOptions, EncryptionAlgorithm, ObjectAcl, S3StorageConfig, SigV4Signer,
    SignedUrlHandler,
};

const YAML: &str = r#"
storage:
  s3:
    bucket: media-bucket
    region: eu-west-1
    endpoint: http://localhost:9000
    access_key_id: AKIDEXAMPLE
    secret_access_key: secret
    acl: public-read
    encryption:
      algorithm: aws:kms
      kms_key_id: alias/uploads
      bucket_key_enabled: true
    collections:
      media:
        prefix: uploads/media
      documents: true
      drafts: false
"#;

#[test]
fn binds_full_section() {
    let config = VellumConfig::from_yaml_str(YAML, "test").unwrap();
    let s3: S3StorageConfig = config.bind().unwrap();

    assert_eq!(s3.bucket, "media-bucket");
    assert_eq!(s3.region, "eu-west-1");
    assert_eq!(s3.endpoint.as_deref(), Some("http://localhost:9000"));
    assert_eq!(s3.acl, Some(ObjectAcl::PublicRead));

    let encryption = s3.encryption.as_ref().unwrap();
    assert_eq!(encryption.algorithm, EncryptionAlgorithm::AwsKms);
    assert_eq!(encryption.kms_key_id.as_deref(), Some("alias/uploads"));
    assert_eq!(encryption.bucket_key_enabled, Some(true));

    assert_eq!(s3.collections.len(), 2);
    assert_eq!(
        s3.collections["media"],
        CollectionStorageOptions::with_prefix("uploads/media")
    );
    assert_eq!(s3.collections["documents"].prefix(), "");
    assert!(!s3.collections.contains_key("drafts"));
}

#[test]
fn minimal_section_uses_defaults() {
    let yaml = r#"
storage:
  s3:
    bucket: b
    access_key_id: AKID
    secret_access_key: secret
"#;
    let s3: S3StorageConfig = VellumConfig::from_yaml_str(yaml, "test").unwrap().bind().unwrap();

    assert_eq!(s3.region, "us-east-1");
    assert_eq!(s3.acl, None);
    assert!(s3.encryption.is_none());
    assert!(s3.collections.is_empty());
}

#[test]
fn missing_bucket_is_reported() {
    let yaml = r#"
storage:
  s3:
    access_key_id: AKID
    secret_access_key: secret
"#;
    let err = VellumConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .bind::<S3StorageConfig>()
        .unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(key) if key == "storage.s3.bucket"));
}

#[test]
fn rejects_unknown_acl_and_algorithm() {
    let yaml = r#"
storage:
  s3:
    bucket: b
    access_key_id: AKID
    secret_access_key: secret
    acl: everyone
"#;
    let err = VellumConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .bind::<S3StorageConfig>()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "storage.s3.acl"));

    let yaml = r#"
storage:
  s3:
    bucket: b
    access_key_id: AKID
    secret_access_key: secret
    encryption:
      algorithm: rot13
"#;
    let err = VellumConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .bind::<S3StorageConfig>()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "storage.s3.encryption.algorithm"));
}

#[tokio::test]
async fn configured_handler_signs_against_endpoint() {
    let s3: S3StorageConfig = VellumConfig::from_yaml_str(YAML, "test").unwrap().bind().unwrap();
    let signer = SigV4Signer::from_config(&s3).unwrap();
    let handler = SignedUrlHandler::from_config(signer, &s3);

    let mut headers = vellum_core::http::HeaderMap::new();
    headers.insert("content-type", "application/json".parse().unwrap());
    let body = serde_json::json!({
        "collectionSlug": "media",
        "filename": "cat.png",
        "mimeType": "image/png",
    })
    .to_string();

    let ctx = vellum_core::RequestContext::new().with_identity(vellum_core::NoIdentity);
    let response = handler.handle(ctx, &headers, body.as_bytes()).await.unwrap();

    assert!(response
        .url
        .starts_with("http://localhost:9000/media-bucket/uploads/media/cat.png?"));
    assert!(response.url.contains("x-amz-acl=public-read"));
    assert!(response.url.contains("x-amz-server-side-encryption=aws%3Akms"));
    assert!(response.url.contains("X-Amz-Expires=600"));
}
