use std::collections::HashMap;

use serial_test::serial;
use vellum_core::config::{ConfigError, ConfigProperties, ConfigValue, DefaultSecretResolver, VellumConfig};

#[test]
fn empty_config_has_no_keys() {
    let config = VellumConfig::empty();
    assert!(matches!(config.get::<String>("missing"), Err(ConfigError::NotFound(_))));
    assert_eq!(config.get_opt::<String>("missing").unwrap(), None);
}

#[test]
fn set_and_get_with_conversions() {
    let mut config = VellumConfig::empty();
    config.set("app.port", ConfigValue::Integer(8080));
    config.set("app.debug", ConfigValue::String("yes".into()));
    config.set("app.ratio", ConfigValue::Integer(2));

    assert_eq!(config.get::<u16>("app.port").unwrap(), 8080);
    assert_eq!(config.get::<String>("app.port").unwrap(), "8080");
    assert!(config.get::<bool>("app.debug").unwrap());
    assert_eq!(config.get::<f64>("app.ratio").unwrap(), 2.0);
    assert!(matches!(
        config.get::<bool>("app.port"),
        Err(ConfigError::TypeMismatch { expected: "bool", .. })
    ));
}

#[test]
fn flattens_nested_yaml() {
    let yaml = r#"
storage:
  s3:
    bucket: media
    collections:
      posts:
        prefix: uploads
      docs: true
"#;
    let config = VellumConfig::from_yaml_str(yaml, "test").unwrap();

    assert_eq!(config.get::<String>("storage.s3.bucket").unwrap(), "media");
    assert_eq!(config.get::<String>("storage.s3.collections.posts.prefix").unwrap(), "uploads");
    assert!(config.get::<bool>("storage.s3.collections.docs").unwrap());

    let slugs: Vec<String> = config.child_keys("storage.s3.collections").into_iter().collect();
    assert_eq!(slugs, vec!["docs".to_string(), "posts".to_string()]);
}

#[test]
fn lists_are_stored_whole_and_indexed() {
    let yaml = r#"
app:
  roles: [admin, editor]
"#;
    let config = VellumConfig::from_yaml_str(yaml, "test").unwrap();
    assert_eq!(
        config.get::<Vec<String>>("app.roles").unwrap(),
        vec!["admin".to_string(), "editor".to_string()]
    );
    assert_eq!(config.get::<String>("app.roles.1").unwrap(), "editor");
}

#[test]
fn comma_separated_strings_become_lists() {
    let mut config = VellumConfig::empty();
    config.set("app.roles", ConfigValue::String("admin, editor".into()));
    assert_eq!(config.get::<Vec<String>>("app.roles").unwrap(), vec!["admin", "editor"]);
}

#[test]
fn invalid_yaml_is_a_load_error() {
    let result = VellumConfig::from_yaml_str("app: [unclosed", "test");
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
#[serial]
fn load_from_dir_applies_profile_and_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "app:\n  name: base\n  region: \"${VELLUM_CFG_TEST_REGION:-eu-west-1}\"\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("application-prod.yaml"), "app:\n  name: prod\n").unwrap();

    unsafe { std::env::remove_var("VELLUM_PROFILE") };
    let config = VellumConfig::load_from_dir(dir.path(), "prod", &DefaultSecretResolver).unwrap();

    assert_eq!(config.profile(), "prod");
    assert_eq!(config.get::<String>("app.name").unwrap(), "prod");
    assert_eq!(config.get::<String>("app.region").unwrap(), "eu-west-1");
}

#[test]
#[serial]
fn environment_overrides_yaml() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("application.yaml"), "vellumcfgtest:\n  bucket: from-yaml\n").unwrap();

    unsafe { std::env::set_var("VELLUMCFGTEST_BUCKET", "from-env") };
    let config = VellumConfig::load_from_dir(dir.path(), "dev", &DefaultSecretResolver).unwrap();
    unsafe { std::env::remove_var("VELLUMCFGTEST_BUCKET") };

    assert_eq!(config.get::<String>("vellumcfgtest.bucket").unwrap(), "from-env");
}

struct PoolConfig {
    size: u32,
    labels: HashMap<String, String>,
}

impl ConfigProperties for PoolConfig {
    fn prefix() -> &'static str {
        "app.pool"
    }

    fn from_config(config: &VellumConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            size: config.get_or("app.pool.size", 4),
            labels: config.get_opt("app.pool.labels")?.unwrap_or_default(),
        })
    }
}

#[test]
fn bind_builds_typed_sections() {
    let mut config = VellumConfig::empty();
    config.set("app.pool.size", ConfigValue::Integer(16));
    let pool: PoolConfig = config.bind().unwrap();
    assert_eq!(PoolConfig::prefix(), "app.pool");
    assert_eq!(pool.size, 16);
    assert!(pool.labels.is_empty());
}
