use std::env;
use std::net::IpAddr;

use auth::Argon2Params;
use auth::TokenSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::auth::models::SessionPolicy;
use crate::domain::auth::models::MIN_REUSE_GRACE_SECONDS;

const MAX_ACCESS_TTL_MINUTES: i64 = 24 * 60;
const MAX_REFRESH_TTL_HOURS: i64 = 24 * 366;
const MAX_REUSE_GRACE_SECONDS: i64 = 300;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Peers whose `X-Forwarded-For` header is honoured
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_hours")]
    pub refresh_ttl_hours: i64,
    #[serde(default = "default_leeway_seconds")]
    pub leeway_seconds: u64,
}

/// Argon2id work factor and input limit.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub max_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let params = Argon2Params::default();
        Self {
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
            max_length: auth::password::DEFAULT_MAX_PASSWORD_LENGTH,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionsConfig {
    /// Interval of the expired-session purge task; 0 disables it
    pub cleanup_interval_seconds: u64,
    pub reuse_grace_seconds: i64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_seconds: 3600,
            reuse_grace_seconds: 10,
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_ttl_minutes() -> i64 {
    15
}

fn default_refresh_ttl_hours() -> i64 {
    720
}

fn default_leeway_seconds() -> u64 {
    auth::jwt::DEFAULT_LEEWAY_SECONDS
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// Fails when the JWT secrets are shorter than 32 bytes or identical, or
    /// when a lifetime or window is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__ACCESS_SECRET=... overrides jwt.access_secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let access = self.jwt.access_secret.as_bytes();
        let refresh = self.jwt.refresh_secret.as_bytes();

        if access.len() < auth::tokens::MIN_SECRET_LENGTH
            || refresh.len() < auth::tokens::MIN_SECRET_LENGTH
        {
            return Err(ConfigError::Message(format!(
                "jwt secrets must be at least {} bytes",
                auth::tokens::MIN_SECRET_LENGTH
            )));
        }

        if access == refresh {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must differ".to_string(),
            ));
        }

        if !(1..=MAX_ACCESS_TTL_MINUTES).contains(&self.jwt.access_ttl_minutes) {
            return Err(ConfigError::Message(format!(
                "jwt.access_ttl_minutes must be between 1 and {}",
                MAX_ACCESS_TTL_MINUTES
            )));
        }

        if !(1..=MAX_REFRESH_TTL_HOURS).contains(&self.jwt.refresh_ttl_hours) {
            return Err(ConfigError::Message(format!(
                "jwt.refresh_ttl_hours must be between 1 and {}",
                MAX_REFRESH_TTL_HOURS
            )));
        }

        if self.jwt.leeway_seconds > auth::jwt::MAX_LEEWAY_SECONDS {
            return Err(ConfigError::Message(format!(
                "jwt.leeway_seconds must not exceed {}",
                auth::jwt::MAX_LEEWAY_SECONDS
            )));
        }

        if !(MIN_REUSE_GRACE_SECONDS..=MAX_REUSE_GRACE_SECONDS)
            .contains(&self.sessions.reuse_grace_seconds)
        {
            return Err(ConfigError::Message(format!(
                "sessions.reuse_grace_seconds must be between {} and {}",
                MIN_REUSE_GRACE_SECONDS, MAX_REUSE_GRACE_SECONDS
            )));
        }

        Ok(())
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            access_secret: self.jwt.access_secret.as_bytes().to_vec(),
            refresh_secret: self.jwt.refresh_secret.as_bytes().to_vec(),
            access_ttl: chrono::Duration::minutes(self.jwt.access_ttl_minutes),
            refresh_ttl: chrono::Duration::hours(self.jwt.refresh_ttl_hours),
            leeway_seconds: self.jwt.leeway_seconds,
        }
    }

    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.password.memory_kib,
            iterations: self.password.iterations,
            parallelism: self.password.parallelism,
        }
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            reuse_grace: chrono::Duration::seconds(self.sessions.reuse_grace_seconds),
        }
    }
}
