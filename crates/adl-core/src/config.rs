use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Per-fetch transport limits (optional `[fetch]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// Optional wall-clock cap for one whole fetch, in seconds; 0 means none.
    /// Long tracks can take far longer than any sensible cap, so stalls are
    /// caught by the low-speed abort below instead.
    pub timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/sec ...
    pub low_speed_limit: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// User-Agent header sent with page and track requests.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 0,
            low_speed_limit: 1024,
            low_speed_time_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `None` when `timeout_secs` is 0.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn low_speed_time(&self) -> Duration {
        Duration::from_secs(self.low_speed_time_secs)
    }
}

/// Global configuration loaded from `~/.config/adl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdlConfig {
    /// Address the HTTP API listens on.
    pub bind: String,
    /// Root directory for server-mode downloads (one subdirectory per job name).
    pub download_dir: PathBuf,
    /// Concurrent fetches per job when the request does not say.
    pub default_workers: usize,
    /// Upper bound for the per-job concurrency a request may ask for.
    pub max_workers: usize,
    /// Accept page URLs pointing at loopback/private networks. Off by default.
    #[serde(default)]
    pub allow_private_hosts: bool,
    /// Upper bound for sanitized target filenames, in bytes.
    #[serde(default = "default_max_filename_bytes")]
    pub max_filename_bytes: usize,
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_max_filename_bytes() -> usize {
    255
}

impl Default for AdlConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            download_dir: PathBuf::from("downloads"),
            default_workers: 5,
            max_workers: 50,
            allow_private_hosts: false,
            max_filename_bytes: default_max_filename_bytes(),
            fetch: FetchConfig::default(),
        }
    }
}

impl AdlConfig {
    /// Clamp a requested worker count into `1..=max_workers`; `None` means the default.
    pub fn effective_workers(&self, requested: Option<usize>) -> usize {
        let max = self.max_workers.max(1);
        requested.unwrap_or(self.default_workers).clamp(1, max)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("adl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
