use super::{ConfigError, VellumConfig};

/// Trait for strongly-typed configuration sections.
///
/// ```ignore
/// impl ConfigProperties for DatabaseConfig {
///     fn prefix() -> &'static str { "app.database" }
///
///     fn from_config(config: &VellumConfig) -> Result<Self, ConfigError> {
///         Ok(Self {
///             url: config.get("app.database.url")?,
///             pool_size: config.get_or("app.database.pool_size", 10),
///         })
///     }
/// }
///
/// let db: DatabaseConfig = config.bind()?;
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"storage.s3"`).
    fn prefix() -> &'static str;

    /// Construct from a loaded configuration.
    fn from_config(config: &VellumConfig) -> Result<Self, ConfigError>;
}
