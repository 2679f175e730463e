//! Server settings read from the environment.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "app.db";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_DOMAIN: &str = "localhost";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
    pub address: String,
    /// Cookie signing secret; a random key is generated when absent.
    pub secret: Option<String>,
    pub auth_service_url: String,
    pub domain: String,
    /// JSON catalog of known Amazon products.
    pub known_products_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the settings from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let auth_service_url =
            var("AUTH_SERVICE_URL").ok_or(ConfigError::Missing("AUTH_SERVICE_URL"))?;

        let port = match var("PORT").map(|port| port.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(err)) => {
                log::warn!("Invalid PORT ({err}), using {DEFAULT_PORT}");
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            port,
            address: var("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            secret: var("SECRET_KEY"),
            auth_service_url,
            domain: var("DOMAIN").unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            known_products_path: var("KNOWN_PRODUCTS_PATH").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config =
            ServerConfig::from_lookup(lookup(&[("AUTH_SERVICE_URL", "https://auth.local")]))
                .unwrap();

        assert_eq!(config.database_url, "app.db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.domain, "localhost");
        assert_eq!(config.secret, None);
        assert_eq!(config.known_products_path, None);
    }

    #[test]
    fn auth_service_url_is_required() {
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("AUTH_SERVICE_URL"))
        );
    }

    #[test]
    fn invalid_port_falls_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("AUTH_SERVICE_URL", "https://auth.local"),
            ("PORT", "eighty"),
            ("KNOWN_PRODUCTS_PATH", "catalog.json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.known_products_path,
            Some(PathBuf::from("catalog.json"))
        );
    }
}
