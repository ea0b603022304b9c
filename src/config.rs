use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

/// Prefix placed in front of every model name in generated URLs.
pub const DEFAULT_URL_PREFIX: &str = "api/crud/";

/// Largest accepted request body, in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

pub const DEFAULT_TITLE: &str = "ezi CRUD API";

/// Prefix of the environment variables read by [`ApiConfig::from_env`].
pub const ENV_PREFIX: &str = "EZI";

/// Settings for a [`crate::CrudApi`].
///
/// Every field has a default, so partial sources are fine:
///
/// ```text
/// EZI_URL_PREFIX=api/v2/
/// EZI_MAX_BODY_BYTES=65536
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url_prefix: String,
    pub max_body_bytes: usize,
    /// Title of the generated OpenAPI document
    pub title: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl ApiConfig {
    /// Reads `EZI_*` environment variables over the defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable cannot be converted to its field type.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Same as [`ApiConfig::from_env`] for an arbitrary environment source.
    ///
    /// # Errors
    ///
    /// Fails when a variable cannot be converted to its field type.
    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    #[must_use]
    pub fn with_url_prefix(mut self, url_prefix: impl Into<String>) -> Self {
        self.url_prefix = url_prefix.into();
        self
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
