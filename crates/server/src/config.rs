//! Server configuration: command-line flags with environment fallbacks.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::canary::DEFAULT_CANARY_PATHS;
use crate::error::StartupError;

/// How much storage-failure detail reaches API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPosture {
    /// Storage error messages are returned verbatim.
    Development,
    /// Storage errors collapse to a generic message.
    #[default]
    Production,
}

/// Canary security-event monitor
#[derive(Parser, Debug, Clone)]
#[command(name = "canary-server", version)]
#[command(about = "Records canary-route hits and reported security events behind a query API")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "CANARY_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "CANARY_PORT", default_value_t = 4000)]
    pub port: u16,

    /// SQLite database file (default: <data dir>/canary-monitor/events.db)
    #[arg(long, env = "CANARY_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Decoy path; repeat the flag or pass a comma-separated list
    #[arg(
        long = "canary-path",
        env = "CANARY_PATHS",
        value_delimiter = ',',
        default_values_t = default_canary_paths()
    )]
    pub canary_paths: Vec<String>,

    /// Error detail exposed to API callers on storage failures
    #[arg(long, env = "CANARY_ERROR_POSTURE", value_enum, default_value_t = ErrorPosture::Production)]
    pub error_posture: ErrorPosture,
}

fn default_canary_paths() -> Vec<String> {
    DEFAULT_CANARY_PATHS.iter().map(|p| p.to_string()).collect()
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn database_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("canary-monitor")
                .join("events.db")
        })
    }

    /// Decoy paths must be absolute request paths without a query string.
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.canary_paths.is_empty() {
            return Err(StartupError::Config(
                "at least one canary path is required".to_string(),
            ));
        }
        for path in &self.canary_paths {
            if !path.starts_with('/') || path.contains('?') || path.contains(char::is_whitespace) {
                return Err(StartupError::Config(format!(
                    "canary path must be an absolute path without query or spaces: {:?}",
                    path
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["canary-server"]).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.error_posture, ErrorPosture::Production);
        assert_eq!(config.canary_paths, default_canary_paths());
        assert!(config.validate().is_ok());
        assert!(config.database_path().ends_with("canary-monitor/events.db"));
    }

    #[test]
    fn test_comma_separated_canary_paths() {
        let config = ServerConfig::try_parse_from([
            "canary-server",
            "--canary-path",
            "/admin,/backup.zip",
            "--port",
            "8088",
            "--error-posture",
            "development",
        ])
        .unwrap();

        assert_eq!(config.canary_paths, vec!["/admin", "/backup.zip"]);
        assert_eq!(config.socket_addr().port(), 8088);
        assert_eq!(config.error_posture, ErrorPosture::Development);
    }

    #[test]
    fn test_relative_canary_path_rejected() {
        let config =
            ServerConfig::try_parse_from(["canary-server", "--canary-path", "admin"]).unwrap();
        assert!(matches!(config.validate(), Err(StartupError::Config(_))));
    }
}
