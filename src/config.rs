use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "athena";
const CONFIG_FILE_NAME: &str = "config.toml";
const SERVER_URL_ENV: &str = "ATHENA_SERVER_URL";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub spotify: SpotifyConfig,
    pub pollers: PollersConfig,
    pub weather: WeatherConfig,
    pub reload: ReloadConfig,
    pub ui: UiConfig,
}

/// Dashboard backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the dashboard backend; the push channel lives on the same host
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Now-playing synchronization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    /// Local progress ticker period
    pub tick_interval_ms: u64,
    /// Force a sync when this long has passed since the last one
    pub resync_after_ms: u64,
    /// Progress differences up to this are not re-rendered
    pub drift_tolerance_ms: u64,
    /// Minimum time between queue fetches for the same track
    pub queue_refresh_ms: u64,
    /// Delay before the single retry after a 5xx
    pub server_retry_delay_ms: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            resync_after_ms: 20_000,
            drift_tolerance_ms: 2000,
            queue_refresh_ms: 300_000,
            server_retry_delay_ms: 30_000,
        }
    }
}

/// One webhook poller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollerConfig {
    pub base_interval_ms: u64,
    /// Backoff starts once failures exceed this
    pub max_failures_before_backoff: u32,
    pub max_interval_ms: u64,
    pub backoff_factor: f64,
    /// Delay before the first poll
    pub initial_delay_ms: u64,
    /// Random extra delay added to the first poll
    pub initial_jitter_ms: u64,
}

impl PollerConfig {
    pub fn spotify() -> Self {
        Self {
            base_interval_ms: 5000,
            max_failures_before_backoff: 5,
            max_interval_ms: 30_000,
            backoff_factor: 1.5,
            initial_delay_ms: 2000,
            initial_jitter_ms: 0,
        }
    }

    pub fn weather() -> Self {
        Self {
            base_interval_ms: 60_000,
            max_failures_before_backoff: 3,
            max_interval_ms: 300_000,
            backoff_factor: 2.0,
            initial_delay_ms: 3000,
            initial_jitter_ms: 2000,
        }
    }
}

/// A `[pollers.*]` table as written; unset keys fall back to that hook's defaults.
#[derive(Debug, Default, Deserialize)]
struct PollerOverrides {
    base_interval_ms: Option<u64>,
    max_failures_before_backoff: Option<u32>,
    max_interval_ms: Option<u64>,
    backoff_factor: Option<f64>,
    initial_delay_ms: Option<u64>,
    initial_jitter_ms: Option<u64>,
}

impl PollerOverrides {
    fn over(self, base: PollerConfig) -> PollerConfig {
        PollerConfig {
            base_interval_ms: self.base_interval_ms.unwrap_or(base.base_interval_ms),
            max_failures_before_backoff: self
                .max_failures_before_backoff
                .unwrap_or(base.max_failures_before_backoff),
            max_interval_ms: self.max_interval_ms.unwrap_or(base.max_interval_ms),
            backoff_factor: self.backoff_factor.unwrap_or(base.backoff_factor),
            initial_delay_ms: self.initial_delay_ms.unwrap_or(base.initial_delay_ms),
            initial_jitter_ms: self.initial_jitter_ms.unwrap_or(base.initial_jitter_ms),
        }
    }
}

fn spotify_poller<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PollerConfig, D::Error> {
    PollerOverrides::deserialize(deserializer).map(|o| o.over(PollerConfig::spotify()))
}

fn weather_poller<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PollerConfig, D::Error> {
    PollerOverrides::deserialize(deserializer).map(|o| o.over(PollerConfig::weather()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollersConfig {
    #[serde(deserialize_with = "spotify_poller")]
    pub spotify: PollerConfig,
    #[serde(deserialize_with = "weather_poller")]
    pub weather: PollerConfig,
}

impl Default for PollersConfig {
    fn default() -> Self {
        Self {
            spotify: PollerConfig::spotify(),
            weather: PollerConfig::weather(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Periodic weather refresh
    pub refresh_interval_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 900_000,
        }
    }
}

/// Full reloads and the backend checks that trigger them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    pub full_reload_interval_ms: u64,
    /// Local time ("HH:MM") of the nightly reload
    pub nightly_reload: String,
    /// How often `/api/config` and `/api/last-update` are checked
    pub check_interval_ms: u64,
    /// Wait this long past a new `last_update` before refetching the weather
    pub last_update_settle_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            full_reload_interval_ms: 3_600_000,
            nightly_reload: "01:10".to_string(),
            check_interval_ms: 60_000,
            last_update_settle_ms: 300_000,
        }
    }
}

/// UI customization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme preset: "dark" or "light"
    pub theme: String,
    /// Show album art
    pub show_album_art: bool,
    /// How long status bar messages stay up
    pub status_message_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            show_album_art: true,
            status_message_ms: 5000,
        }
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(CONFIG_DIR_NAME);

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file, or create default if not exists.
    /// `ATHENA_SERVER_URL` wins over the file.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            config.apply_server_override(&url);
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path).context("Failed to read config file")?;

            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;

            Ok(config)
        } else {
            // Create default config and save it
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            Ok(config)
        }
    }

    fn apply_server_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.server.base_url = url.to_string();
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Generate example config content for documentation
    pub fn example_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
