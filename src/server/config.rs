//! Server configuration types
//!
//! Contains all configuration structures for the Geogate server.

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthServiceConfig,
    pub anthropic: ModelConfig,
    pub stripe: StripeSettings,
    /// Public site origin used for checkout redirect URLs when the
    /// request carries no Origin header.
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

fn default_site_url() -> String {
    "https://geogate.app".to_string()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
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

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

/// Postgres configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// GoTrue identity service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthServiceConfig {
    pub base_url: String,
    pub anon_key: String,
    pub service_role_key: String,
}

/// Anthropic model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Stripe billing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSettings {
    pub secret_key: String,
    pub price_id: String,
    pub webhook_secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults_bind_all_interfaces() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8787);
    }

    #[test]
    fn deserializes_minimal_toml() {
        let toml = r#"
            [server]

            [database]
            url = "postgres://localhost/geogate"

            [auth]
            base_url = "http://localhost:9999"
            anon_key = ""
            service_role_key = ""

            [anthropic]
            api_key = ""

            [stripe]
            secret_key = ""
            price_id = ""
            webhook_secret = ""
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.site_url, "https://geogate.app");
        assert!(config.anthropic.model.is_none());
    }
}
