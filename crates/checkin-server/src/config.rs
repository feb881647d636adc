//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the check-in server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `8081`, `0` auto-assigns).
    pub port: u16,
    /// A session with no inbound frame for this long is disconnected.
    pub keepalive_interval_secs: u64,
    /// Upper bound on a single outbound write.
    pub write_timeout_secs: u64,
    /// File served at `GET /`.
    pub index_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8081,
            keepalive_interval_secs: 60,
            write_timeout_secs: 10,
            index_path: PathBuf::from("index.html"),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.keepalive_interval(), Duration::from_secs(60));
        assert_eq!(cfg.write_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.index_path, PathBuf::from("index.html"));
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let cfg = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.bind_addr(), "127.0.0.1:0");
    }

    #[test]
    fn deserialize_from_json_string() {
        let json = r#"{"host":"10.0.0.1","port":3000,"keepalive_interval_secs":5,"write_timeout_secs":2,"index_path":"static/index.html"}"#;
        let cfg: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.host, "10.0.0.1");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.keepalive_interval(), Duration::from_secs(5));
        assert_eq!(cfg.index_path, PathBuf::from("static/index.html"));
    }
}
