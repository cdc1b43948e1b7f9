use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dhlottery.co.kr/gameResult.do";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_OUTPUT_PATH: &str = "data/lotto_numbers.csv";

/// Approximate newest round as of late 2025. Only used when the live lookup
/// fails, and wrong as soon as newer draws exist.
pub const STALE_FALLBACK_LATEST_ROUND: u32 = 1200;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// Pause after every round, in seconds.
    pub request_delay: f64,
    pub max_retries: u32,
    /// First backoff step, in seconds; doubles per attempt.
    pub retry_base_delay: f64,
    /// Per-request timeout, in seconds.
    pub timeout: f64,
    pub user_agent: String,
    pub fallback_latest_round: u32,
    pub output_path: PathBuf,
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay: 1.0,
            max_retries: 3,
            retry_base_delay: 1.0,
            timeout: 10.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fallback_latest_round: STALE_FALLBACK_LATEST_ROUND,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            database_path: None,
        }
    }
}

impl Config {
    pub fn request_delay(&self) -> Duration {
        secs(self.request_delay)
    }

    pub fn retry_base_delay(&self) -> Duration {
        secs(self.retry_base_delay)
    }

    pub fn timeout(&self) -> Duration {
        secs(self.timeout)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Every duration must convert to a [`Duration`]: finite, non-negative and
    /// in range. The timeout must also be non-zero.
    pub fn validate(&self) -> Result<()> {
        check_secs("request_delay", self.request_delay)?;
        check_secs("retry_base_delay", self.retry_base_delay)?;
        if check_secs("timeout", self.timeout)?.is_zero() {
            bail!("timeout must be greater than zero");
        }
        Ok(())
    }

    /// Applies `LOTTO_*` environment overrides through `lookup`.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup("LOTTO_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("LOTTO_USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = lookup("LOTTO_DB_PATH") {
            self.database_path = Some(PathBuf::from(v));
        }
        parse_var(&lookup, "LOTTO_REQUEST_DELAY", &mut self.request_delay)?;
        parse_var(&lookup, "LOTTO_MAX_RETRIES", &mut self.max_retries)?;
        parse_var(&lookup, "LOTTO_TIMEOUT", &mut self.timeout)?;
        parse_var(&lookup, "LOTTO_FALLBACK_LATEST_ROUND", &mut self.fallback_latest_round)?;
        self.validate().context("invalid LOTTO_* environment override")?;
        Ok(self)
    }

    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_with(|key| env::var(key).ok())
    }
}

/// Defaults, then the optional JSON file, then the environment.
pub fn load(config_file: Option<&Path>) -> Result<Config> {
    let base = match config_file {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    base.apply_env()
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value {:?} for {}", raw, key))?;
    }
    Ok(())
}

fn check_secs(name: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("{} must be a finite, non-negative number of seconds, got {}", name, value))
}

/// Callers go through [`Config::validate`] first; an unconvertible value left
/// in place afterwards still maps to zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
