use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

use super::pair::CurrencyPair;
use super::rate::MissingRatePolicy;

pub const DEFAULT_APP_ID: &str = "9b20961d611645749fd22169408be7c2";
pub const DEFAULT_BASE_URL: &str = "https://openexchangerates.org/api";
pub const DEFAULT_OUTPUT_PATH: &str = "ExchangeRates.csv";
pub const DEFAULT_PAIRS: [&str; 4] = ["USD/ILS", "GBP/EUR", "EUR/JPY", "EUR/USD"];

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub app_id: String,
    pub base_url: String,
    pub pairs: Vec<CurrencyPair>,
    pub output_path: PathBuf,
    pub interval_secs: u64,
    pub request_timeout_secs: u64,
    pub missing_rate_policy: MissingRatePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            app_id: DEFAULT_APP_ID.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            pairs: DEFAULT_PAIRS
                .iter()
                .filter_map(|p| p.parse().ok())
                .collect(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            interval_secs: 600,
            request_timeout_secs: 30,
            missing_rate_policy: MissingRatePolicy::ZeroFill,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to the
    /// built-in defaults when no file has been created there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "ratefeed", "ratefeed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    pub fn validate(&self) -> Result<()> {
        if self.pairs.is_empty() {
            anyhow::bail!("At least one currency pair must be configured");
        }
        if self.interval_secs == 0 {
            anyhow::bail!("interval_secs must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
