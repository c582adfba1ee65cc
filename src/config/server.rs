use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::consts::{DEFAULT_BODY_LIMIT, DEFAULT_PORT};

/// How `sensei serve` binds and what it accepts.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
    /// Open the browser client once listening.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            body_limit: DEFAULT_BODY_LIMIT,
            open_browser: false,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// URL a local browser can reach. Unspecified hosts map to localhost.
    pub fn local_url(&self) -> String {
        let host = if self.host.is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
        };
        format!("http://{}", SocketAddr::new(host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.body_limit, 20 * 1024 * 1024);
        assert!(!config.open_browser);
        assert_eq!(config.addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn local_url_maps_unspecified_to_localhost() {
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.local_url(), "http://127.0.0.1:8080");
    }
}
