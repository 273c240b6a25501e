//! Runtime configuration read from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_DATA_DIR: &str = ".paperlens";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_LOG_FILTER: &str = "paperlens=info,tower_http=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    /// Base URL of the summarization backend.
    pub backend_url: Url,
    /// Holds the sled database and the uploaded PDFs.
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup, falling
    /// back to the defaults for anything unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_raw = get("PAPERLENS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.trim().parse().map_err(|e| ConfigError::Invalid {
            var: "PAPERLENS_BIND",
            reason: format!("{}: {}", bind_raw, e),
        })?;

        let backend_raw =
            get("PAPERLENS_BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = parse_backend_url(backend_raw.trim())?;

        let data_dir = PathBuf::from(
            get("PAPERLENS_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let timeout_secs = match get("PAPERLENS_TIMEOUT_SECS") {
            Some(v) => parse_positive(&v, "PAPERLENS_TIMEOUT_SECS")? as u64,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let max_upload_mb = match get("PAPERLENS_MAX_UPLOAD_MB") {
            Some(v) => parse_positive(&v, "PAPERLENS_MAX_UPLOAD_MB")?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };

        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| ConfigError::Invalid {
                var: "PAPERLENS_MAX_UPLOAD_MB",
                reason: format!("{} MB is too large", max_upload_mb),
            })?;

        Ok(Self {
            bind,
            backend_url,
            data_dir,
            request_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes,
        })
    }

    pub fn pdfs_dir(&self) -> PathBuf {
        self.data_dir.join("pdfs")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("db")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.parse().expect("default bind address is valid"),
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "PAPERLENS_BACKEND_URL",
        reason,
    };

    let mut url = Url::parse(raw).map_err(|e| invalid(format!("{}: {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    // Endpoint paths are joined relative to the base, so it must end in '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_positive(raw: &str, var: &'static str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".to_string(),
        }),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: format!("{}: {}", raw, e),
        }),
    }
}
