use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Runtime configuration, loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct OutboxConfig {
    pub port: u16,
    /// How long a captured entry may wait before the sweeper evicts it.
    pub ttl: Duration,
    /// Base URL shown on the inspection page and used as the manage
    /// form's target.
    pub callback: String,
    /// Header names allowed to be copied onto a forwarded request.
    /// Lowercased and trimmed at load time.
    pub forward_headers: Vec<String>,
}

impl OutboxConfig {
    pub fn from_env() -> Result<Self> {
        let port = env_string("PORT", "3000")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;
        let ttl_secs = env_string("TTL", "300")
            .parse::<u64>()
            .context("TTL must be a number of seconds")?;
        let hostname = env_string("HOSTNAME", "localhost");
        let callback =
            std::env::var("CALLBACK").unwrap_or_else(|_| format!("http://{hostname}:{port}"));
        let forward_headers = parse_allow_list(&env_string("FORWARD_HEADERS", "Authorization"));

        Ok(Self {
            port,
            ttl: Duration::from_secs(ttl_secs),
            callback,
            forward_headers,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            ttl: Duration::from_secs(300),
            callback: "http://localhost:3000".to_string(),
            forward_headers: vec!["authorization".to_string()],
        }
    }
}

fn parse_allow_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
