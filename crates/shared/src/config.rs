//! Layered application configuration.
//!
//! Sources, later ones overriding earlier ones: `config/default`, then
//! `config/{RUN_MODE}`, then `TALLY__`-prefixed environment variables
//! (e.g. `TALLY__DATABASE__URL`). Only `database.url` and `jwt.secret`
//! have no default.

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Database pool settings.
    pub database: DatabaseConfig,
    /// Token signing settings.
    pub jwt: JwtSettings,
    /// Reporting currency assigned at registration when none is requested.
    #[serde(default = "defaults::reporting_currency")]
    pub default_reporting_currency: String,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "defaults::host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "defaults::port")]
    pub port: u16,
}

/// Database pool settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: String,
    /// Pool upper bound.
    #[serde(default = "defaults::max_connections")]
    pub max_connections: u32,
    /// Pool lower bound.
    #[serde(default = "defaults::min_connections")]
    pub min_connections: u32,
}

/// Token signing settings as they appear in config files.
///
/// Distinct from [`crate::jwt::JwtConfig`], which is the runtime shape the
/// service consumes; the server binary converts between them.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// HMAC signing secret.
    pub secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "defaults::access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token lifetime in seconds.
    #[serde(default = "defaults::refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

mod defaults {
    pub fn host() -> String {
        "0.0.0.0".to_string()
    }

    pub fn port() -> u16 {
        8080
    }

    pub fn reporting_currency() -> String {
        "EUR".to_string()
    }

    pub fn max_connections() -> u32 {
        10
    }

    pub fn min_connections() -> u32 {
        1
    }

    pub fn access_token_expiry() -> u64 {
        900
    }

    pub fn refresh_token_expiry() -> u64 {
        604_800
    }
}

impl AppConfig {
    /// Loads configuration from the layered sources.
    ///
    /// # Errors
    ///
    /// Returns an error when a source fails to parse or a required key is
    /// missing.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let toml = r#"
            [server]
            [database]
            url = "postgres://localhost/tally_test"
            [jwt]
            secret = "test-secret"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.access_token_expiry_secs, 900);
        assert_eq!(config.default_reporting_currency, "EUR");
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let toml = r#"
            [server]
            port = 3000
            [database]
            url = "postgres://localhost/tally_test"
            [jwt]
            secret = "test-secret"
            access_token_expiry_secs = 60
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.jwt.access_token_expiry_secs, 60);
    }
}
