use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        if self.uploads.dir.is_empty() {
            return Err("uploads.dir must not be empty".into());
        }
        if self.uploads.max_file_bytes == 0 {
            return Err("uploads.max_file_bytes must be > 0".into());
        }
        if self.uploads.max_file_bytes > self.server.body_limit_bytes {
            return Err("uploads.max_file_bytes must be <= server.body_limit_bytes".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body, form overhead included.
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Flat content directory holding all stored photo files.
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_body_limit_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_max_file_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Loads the configuration from a TOML file.
///
/// A missing file at the default path falls back to defaults; an explicitly
/// requested path must exist.
pub fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let cfg = match path {
        Some(p) if Path::new(p).exists() => {
            let raw = std::fs::read_to_string(p)?;
            toml::from_str(&raw)?
        }
        Some(p) => anyhow::bail!("config file not found: {p}"),
        None => AppConfig::default(),
    };
    cfg.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.uploads.max_file_bytes, 5 * 1024 * 1024);
        assert_eq!(cfg.uploads.dir, "uploads");
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_uploads_dir() {
        let mut cfg = AppConfig::default();
        cfg.uploads.dir = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [uploads]
            dir = "fotos"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.uploads.dir, "fotos");
        assert_eq!(cfg.logging.level, "info");
    }
}
