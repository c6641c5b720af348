//! Configuration management.

use serde::Deserialize;

use crate::auth::{AuthConfig, IdpType};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthSettings,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Authentication settings as loaded from the environment or a file.
///
/// `issuer_uri` and `jwk_set_uri` feed the token verifier (either or both
/// may be set); `idp_type` selects the role-normalization shape. The HS256
/// secret is a development convenience and must not carry production load.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub idp_type: IdpType,

    pub issuer_uri: Option<String>,

    pub jwk_set_uri: Option<String>,

    pub hs256_secret: Option<String>,

    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            idp_type: IdpType::default(),
            issuer_uri: None,
            jwk_set_uri: None,
            hs256_secret: None,
            leeway_secs: default_leeway_secs(),
        }
    }
}

impl From<AuthSettings> for AuthConfig {
    fn from(settings: AuthSettings) -> Self {
        Self {
            idp_type: settings.idp_type,
            issuer_uri: settings.issuer_uri,
            jwk_set_uri: settings.jwk_set_uri,
            hs256_secret: settings.hs256_secret,
            leeway_secs: settings.leeway_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// OpenTelemetry OTLP endpoint
    pub otlp_endpoint: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_leeway_secs() -> u64 { 60 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ARTIFACT").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with the environment on top.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("ARTIFACT").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }
}
