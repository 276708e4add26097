//! HTTP server settings

use anyhow::Result;
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Whether auth cookies carry the `Secure` attribute
    pub cookie_secure: bool,
    /// Request body limit for upload endpoints
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load the server configuration from `APP_*` environment variables
    ///
    /// # Environment Variables
    /// - `APP_HOST` (default: "0.0.0.0")
    /// - `APP_PORT` (default: 8000)
    /// - `APP_COOKIE_SECURE` (default: true)
    /// - `APP_MAX_UPLOAD_BYTES` (default: 100 MiB)
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("cookie_secure", true)?
            .set_default("max_upload_bytes", 100 * 1024 * 1024)?
            .add_source(config::Environment::with_prefix("APP").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            std::env::remove_var("APP_HOST");
            std::env::remove_var("APP_PORT");
            std::env::remove_var("APP_COOKIE_SECURE");
            std::env::remove_var("APP_MAX_UPLOAD_BYTES");
        }
    }

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        clear_env();

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert!(config.cookie_secure);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
    }

    #[test]
    #[serial]
    fn test_server_config_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("APP_PORT", "9090");
            std::env::set_var("APP_COOKIE_SECURE", "false");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, 9090);
        assert!(!config.cookie_secure);

        clear_env();
    }
}
