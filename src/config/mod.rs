use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::lookup_host;

use crate::errors::WikiError;

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub pages_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub images_dir: PathBuf,
    pub site_title: String,
    /// Address of the session key-value backend; `None` keeps sessions in memory
    pub session_addr: Option<String>,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            pages_dir: PathBuf::from("pages"),
            templates_dir: PathBuf::from("templates"),
            images_dir: PathBuf::from("images"),
            site_title: "Wiki".to_string(),
            session_addr: None,
        }
    }

    /// Defaults overridden by `WIKI_*` environment variables
    pub fn from_env() -> Result<Self, WikiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `WIKI_*` key
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WikiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        if let Some(host) = lookup("WIKI_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("WIKI_PORT") {
            config.port = port
                .parse()
                .map_err(|_| WikiError::Config(format!("WIKI_PORT must be a port number, got '{}'", port)))?;
        }
        if let Some(dir) = lookup("WIKI_PAGES_DIR") {
            config.pages_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("WIKI_TEMPLATES_DIR") {
            config.templates_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("WIKI_IMAGES_DIR") {
            config.images_dir = PathBuf::from(dir);
        }
        if let Some(title) = lookup("WIKI_TITLE") {
            config.site_title = title;
        }
        config.session_addr = lookup("WIKI_SESSION_ADDR").filter(|addr| !addr.is_empty());
        Ok(config)
    }

    /// Resolve `host:port` to the address to bind. `host` may be an IP
    /// literal or a name such as `localhost`.
    pub async fn socket_addr(&self) -> Result<SocketAddr, WikiError> {
        let mut addrs = lookup_host((self.host.as_str(), self.port)).await.map_err(|e| {
            WikiError::Config(format!("cannot resolve listen host '{}': {}", self.host, e))
        })?;
        addrs
            .next()
            .ok_or_else(|| WikiError::Config(format!("listen host '{}' has no addresses", self.host)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.pages_dir, PathBuf::from("pages"));
        assert!(config.session_addr.is_none());
        assert_eq!(config.socket_addr().await.unwrap().to_string(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("WIKI_HOST", "127.0.0.1"),
            ("WIKI_PORT", "9000"),
            ("WIKI_PAGES_DIR", "/srv/pages"),
            ("WIKI_TITLE", "Notes"),
            ("WIKI_SESSION_ADDR", "10.0.0.5:6379"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().await.unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.pages_dir, PathBuf::from("/srv/pages"));
        assert_eq!(config.site_title, "Notes");
        assert_eq!(config.session_addr.as_deref(), Some("10.0.0.5:6379"));
    }

    #[tokio::test]
    async fn ipv6_host() {
        let config = Config::from_lookup(lookup(&[("WIKI_HOST", "::1")])).unwrap();
        assert_eq!(config.socket_addr().await.unwrap().to_string(), "[::1]:8080");
    }

    #[tokio::test]
    async fn hostname_is_resolved() {
        let config = Config::from_lookup(lookup(&[("WIKI_HOST", "localhost"), ("WIKI_PORT", "9001")])).unwrap();
        let addr = config.socket_addr().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 9001);
    }

    #[test]
    fn bad_port_is_config_error() {
        let err = Config::from_lookup(lookup(&[("WIKI_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, WikiError::Config(_)));
    }

    #[test]
    fn empty_session_addr_means_memory_sessions() {
        let config = Config::from_lookup(lookup(&[("WIKI_SESSION_ADDR", "")])).unwrap();
        assert!(config.session_addr.is_none());
    }
}
