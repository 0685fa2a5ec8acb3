use std::env;
use std::time::Duration;

use auth::RedisStoreConfig;
use auth::RunMode;
use auth::WindowPolicy;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default = "default_run_mode")]
    pub run_mode: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Token signing secret (`AUTH__SECRET`); required in production
    #[serde(default)]
    pub secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    /// Without Redis, revocations and sessions stay in this process only
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_redis_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_login_limit")]
    pub login_limit: u64,
    #[serde(default = "default_register_limit")]
    pub register_limit: u64,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_window_policy")]
    pub policy: WindowPolicy,
}

fn default_run_mode() -> String {
    "development".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    16
}

fn default_redis_command_timeout_ms() -> u64 {
    500
}

fn default_login_limit() -> u64 {
    5
}

fn default_register_limit() -> u64 {
    3
}

fn default_window_secs() -> u64 {
    60
}

fn default_window_policy() -> WindowPolicy {
    WindowPolicy::RefreshOnHit
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            command_timeout_ms: default_redis_command_timeout_ms(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_limit: default_login_limit(),
            register_limit: default_register_limit(),
            window_secs: default_window_secs(),
            policy: default_window_policy(),
        }
    }
}

impl RedisConfig {
    pub fn store_config(&self) -> RedisStoreConfig {
        RedisStoreConfig {
            url: self.url.clone(),
            pool_size: self.pool_size,
            command_timeout: Duration::from_millis(self.command_timeout_ms),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, AUTH__SECRET, REDIS__ENABLED, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| default_run_mode());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: REDIS__URL=redis://... overrides redis.url
            .add_source(Environment::with_prefix("").separator("__"))
            .set_override("run_mode", run_mode)?
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode.parse().unwrap_or(RunMode::Development)
    }
}
