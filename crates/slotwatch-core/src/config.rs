use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the service code in URL templates.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Longest wait (seconds) accepted for poll pauses and backoff delays.
pub const MAX_WAIT_SECS: u64 = u32::MAX as u64;

const DEFAULT_SERVICE: &str = "leben-in-deutschland";
const DEFAULT_MARKER: &str = "Leider sind aktuell keine Termine";
const DEFAULT_MAIN_URL: &str = "https://service.berlin.de/terminvereinbarung/termin/all/{code}/";
const DEFAULT_REFRESH_URL: &str = "https://service.berlin.de/terminvereinbarung/termin/restart/?providerList=122626%2C122659%2C122664%2C122666%2C122671%2C325853%2C325987%2C351435%2C351438%2C351444%2C351636&requestList={code}";

/// HTTP client settings (optional `[http]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Client identifier sent as `User-Agent`. Browser strings get blocked by the
    /// target server, so this stays an honest tool name.
    pub user_agent: String,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("slotwatch/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 15,
            timeout_secs: 30,
        }
    }
}

/// Retry policy parameters (optional `[retry]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt within a single fetch.
    pub max_retries: u32,
    /// Backoff factor in seconds (delays are 0, f, 2f, 4f, ...).
    pub backoff_factor_secs: f64,
    /// Upper bound on a single backoff delay.
    pub max_backoff_secs: u64,
    /// Status codes that trigger a retry.
    pub status_forcelist: Vec<u32>,
    /// Honour `Retry-After` (seconds) on retryable responses.
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_factor_secs: 1.0,
            max_backoff_secs: 120,
            status_forcelist: vec![500, 502, 503, 504],
            respect_retry_after: true,
        }
    }
}

/// Inter-poll sleep range (optional `[poll]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub min_sleep_secs: f64,
    pub max_sleep_secs: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            min_sleep_secs: 60.0,
            max_sleep_secs: 90.0,
        }
    }
}

/// Global configuration loaded from `~/.config/slotwatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotwatchConfig {
    /// Service monitored when `--service` is not given.
    pub default_service: String,
    /// Text the page shows while no appointment is available.
    pub no_availability_marker: String,
    /// Page polled for availability; `{code}` is replaced by the service code.
    pub main_url_template: String,
    /// Page that restarts the booking session for a service.
    pub refresh_url_template: Option<String>,
    pub http: HttpConfig,
    pub retry: RetryConfig,
    pub poll: PollConfig,
    /// Service name -> service code.
    pub services: BTreeMap<String, String>,
}

impl Default for SlotwatchConfig {
    fn default() -> Self {
        let mut services = BTreeMap::new();
        services.insert(DEFAULT_SERVICE.to_string(), "351180".to_string());
        services.insert(
            "trade-driving-license-3rd-countries".to_string(),
            "327537".to_string(),
        );
        Self {
            default_service: DEFAULT_SERVICE.to_string(),
            no_availability_marker: DEFAULT_MARKER.to_string(),
            main_url_template: DEFAULT_MAIN_URL.to_string(),
            refresh_url_template: Some(DEFAULT_REFRESH_URL.to_string()),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            poll: PollConfig::default(),
            services,
        }
    }
}

impl SlotwatchConfig {
    /// Check the values that would otherwise fail deep inside the poll loop.
    pub fn validate(&self) -> Result<()> {
        if self.no_availability_marker.is_empty() {
            bail!("no_availability_marker must not be empty");
        }
        if self.http.user_agent.trim().is_empty() {
            bail!("http.user_agent must not be empty");
        }
        check_template("main_url_template", &self.main_url_template)?;
        if let Some(refresh) = &self.refresh_url_template {
            check_template("refresh_url_template", refresh)?;
        }
        if self.services.is_empty() {
            bail!("no services configured");
        }
        if !self.services.contains_key(&self.default_service) {
            bail!(
                "default_service {:?} is not listed in [services]",
                self.default_service
            );
        }
        let poll = &self.poll;
        if !poll.min_sleep_secs.is_finite()
            || !poll.max_sleep_secs.is_finite()
            || poll.min_sleep_secs < 0.0
            || poll.min_sleep_secs > poll.max_sleep_secs
            || poll.max_sleep_secs > MAX_WAIT_SECS as f64
        {
            bail!(
                "invalid poll sleep range [{}, {}]",
                poll.min_sleep_secs,
                poll.max_sleep_secs
            );
        }
        let factor = self.retry.backoff_factor_secs;
        if !factor.is_finite() || factor < 0.0 || factor > MAX_WAIT_SECS as f64 {
            bail!(
                "retry.backoff_factor_secs must be between 0 and {}",
                MAX_WAIT_SECS
            );
        }
        if self.retry.max_backoff_secs > MAX_WAIT_SECS {
            bail!(
                "retry.max_backoff_secs must be at most {}",
                MAX_WAIT_SECS
            );
        }
        if let Some(code) = self
            .retry
            .status_forcelist
            .iter()
            .find(|c| !(100..=599).contains(*c))
        {
            bail!("retry.status_forcelist contains invalid status {}", code);
        }
        Ok(())
    }
}

fn check_template(field: &str, template: &str) -> Result<()> {
    if !template.contains(CODE_PLACEHOLDER) {
        bail!("{} must contain {}", field, CODE_PLACEHOLDER);
    }
    let sample = template.replace(CODE_PLACEHOLDER, "0");
    let parsed = url::Url::parse(&sample).with_context(|| format!("{} is not a valid URL", field))?;
    match parsed.scheme() {
        "https" | "http" => Ok(()),
        other => bail!("{} has unsupported scheme {:?}", field, other),
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("slotwatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SlotwatchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SlotwatchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<SlotwatchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: SlotwatchConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
