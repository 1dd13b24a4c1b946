use serde::{Deserialize, Serialize};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// tracing filter directive (default: "info")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }
}
