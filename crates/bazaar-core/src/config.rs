use anyhow::Result;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ADMIN_ROLE, DEFAULT_USER_ROLE, MEMORY_DATABASE_URL, MIN_SIGNING_SECRET_LEN,
};
use crate::error::{CoreError, CoreResult};
use crate::validation::is_valid_role_name;

/// Prefix for environment overrides, e.g. `BAZAAR_AUTH__JWT_SECRET`.
pub const ENV_PREFIX: &str = "BAZAAR";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

impl DatabaseConfig {
    /// ## Summary
    /// Returns `true` when the in-process store is selected instead of Postgres.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

/// Symmetric key used to sign session tokens.
///
/// Never printed: `Debug` is redacted so the settings can be logged whole.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct SigningSecret(String);

impl SigningSecret {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: SigningSecret,
    pub token_ttl_secs: u64,
    pub default_role: String,
    pub admin_role: String,
    pub unicode_usernames: bool,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// Administrator account ensured at startup.
#[derive(Clone, Deserialize)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_secs)
    }
}

impl Settings {
    /// ## Summary
    /// Returns a builder preloaded with every default value.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be set.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("database.url", MEMORY_DATABASE_URL)?
            .set_default("database.max_connections", 4)?
            .set_default("auth.token_ttl_secs", 86_400)?
            .set_default("auth.default_role", DEFAULT_USER_ROLE)?
            .set_default("auth.admin_role", DEFAULT_ADMIN_ROLE)?
            .set_default("auth.unicode_usernames", false)?
            .set_default("logging.level", "debug")?
            .set_default("cache.ttl_secs", 60)?)
    }

    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `config.toml` into a validated `Settings`.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the
    /// configuration fails.
    pub fn load() -> Result<Self> {
        let settings = Self::builder()?
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Self>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks cross-field constraints that serde cannot express.
    ///
    /// ## Errors
    /// Returns `ConfigError` describing the first violated constraint.
    pub fn validate(&self) -> CoreResult<()> {
        if self.auth.jwt_secret.len() < MIN_SIGNING_SECRET_LEN {
            return Err(CoreError::ConfigError(format!(
                "auth.jwt_secret must be at least {MIN_SIGNING_SECRET_LEN} bytes"
            )));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(CoreError::ConfigError(
                "auth.token_ttl_secs must be positive".to_string(),
            ));
        }
        for (key, role) in [
            ("auth.default_role", &self.auth.default_role),
            ("auth.admin_role", &self.auth.admin_role),
        ] {
            if !is_valid_role_name(role) {
                return Err(CoreError::ConfigError(format!(
                    "{key} is not a valid role name: {role}"
                )));
            }
        }
        if self.server.request_timeout_secs == 0 {
            return Err(CoreError::ConfigError(
                "server.request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
