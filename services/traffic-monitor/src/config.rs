//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The service-account password is loaded from the MONITOR_PASSWORD env var
//! or `password_file`, never stored in the TOML directly to avoid leaking
//! secrets.

use common::Secret;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub account: AccountConfig,
    pub monitor: MonitorConfig,
}

/// Storefront backend connection settings
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    /// Where the session token pair is persisted between restarts
    pub token_file: PathBuf,
}

/// Service-account credentials used to sign in
#[derive(Debug, Deserialize)]
pub struct AccountConfig {
    pub email: String,
    #[serde(skip)]
    pub password: Option<Secret<String>>,
    /// Path to a file containing the password (alternative to MONITOR_PASSWORD)
    #[serde(default)]
    pub password_file: Option<PathBuf>,
}

/// Polling and serving settings
#[derive(Debug, Deserialize)]
pub struct MonitorConfig {
    pub listen_addr: SocketAddr,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Consecutive poll failures before /health reports degraded
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u64,
}

fn default_poll_interval() -> u64 {
    60
}

fn default_max_connections() -> usize {
    64
}

fn default_failure_threshold() -> u64 {
    3
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Password resolution order:
    /// 1. MONITOR_PASSWORD env var
    /// 2. password_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        // Relative file paths are resolved against the config file's
        // directory, not the process working directory.
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.backend.token_file = resolve_relative(base, &config.backend.token_file);
        if let Some(password_file) = config.account.password_file.take() {
            config.account.password_file = Some(resolve_relative(base, &password_file));
        }

        if !config.backend.base_url.starts_with("http://")
            && !config.backend.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                config.backend.base_url
            )));
        }

        if config.monitor.poll_interval_secs == 0 {
            return Err(common::Error::Config(
                "poll_interval_secs must be greater than 0".into(),
            ));
        }

        if config.monitor.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        if config.monitor.failure_threshold == 0 {
            return Err(common::Error::Config(
                "failure_threshold must be greater than 0".into(),
            ));
        }

        // Resolve password: env var takes precedence over file
        if let Ok(password) = std::env::var("MONITOR_PASSWORD") {
            config.account.password = Some(Secret::new(password));
        } else if let Some(ref password_file) = config.account.password_file {
            let password = std::fs::read_to_string(password_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read password_file {}: {e}",
                    password_file.display()
                ))
            })?;
            let password = password.trim().to_owned();
            if !password.is_empty() {
                config.account.password = Some(Secret::new(password));
            }
        }

        if config.account.password.is_none() {
            return Err(common::Error::Config(
                "no service-account password: set MONITOR_PASSWORD or password_file".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("traffic-monitor.toml")
    }
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        base.join(path)
    }
}
