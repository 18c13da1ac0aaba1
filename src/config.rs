use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api: ApiConfig,
    pub session_file: PathBuf,
    pub download_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = env::var("PORTSEC_API_URL").context("PORTSEC_API_URL must be set")?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let timeout_secs = match env::var("PORTSEC_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("PORTSEC_HTTP_TIMEOUT_SECS must be a number of seconds")?,
            Err(_) => 10,
        };

        let session_file = env::var("PORTSEC_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        let download_dir = env::var("PORTSEC_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")));

        let log_file = env::var("PORTSEC_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("portsec.log"));

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            session_file,
            download_dir,
            log_file,
        })
    }
}

/// `<data dir>/portsec/session.json`, falling back to the working directory
/// on platforms without a data dir.
fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("portsec"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("session.json")
}
