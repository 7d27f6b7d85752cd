//! `AppConfig` struct, TOML loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail, ensure};
use rankwatch_api::Platform;
use rankwatch_core::SchedulerOptions;
use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Riot account defaults.
    pub riot: RiotConfig,
    /// Riot API request budget.
    pub rate_limit: RateLimitConfig,
    /// Reconciliation loop pacing.
    pub scheduler: SchedulerConfig,
}

/// Riot account defaults.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RiotConfig {
    /// Platform used when a command does not name one (e.g. `"euw1"`).
    pub default_platform: String,
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            default_platform: String::from("euw1"),
        }
    }
}

/// Two-window request budget of the Riot API key.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per short window.
    pub short_window_requests: usize,
    /// Short window length in seconds.
    pub short_window_secs: u64,
    /// Requests allowed per long window.
    pub long_window_requests: usize,
    /// Long window length in seconds.
    pub long_window_secs: u64,
    /// Sleep between capacity checks in milliseconds.
    pub poll_interval_ms: u64,
    /// Pause before retrying a rate-limited request, in seconds.
    pub retry_cooldown_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            short_window_requests: 10,
            short_window_secs: 1,
            long_window_requests: 100,
            long_window_secs: 120,
            poll_interval_ms: 50,
            retry_cooldown_secs: 20,
        }
    }
}

impl RateLimitConfig {
    /// Short window as `(requests, length)`.
    #[must_use]
    pub const fn short_window(&self) -> (usize, Duration) {
        (
            self.short_window_requests,
            Duration::from_secs(self.short_window_secs),
        )
    }

    /// Long window as `(requests, length)`.
    #[must_use]
    pub const fn long_window(&self) -> (usize, Duration) {
        (
            self.long_window_requests,
            Duration::from_secs(self.long_window_secs),
        )
    }

    /// Capacity poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 429 cool-down.
    #[must_use]
    pub const fn retry_cooldown(&self) -> Duration {
        Duration::from_secs(self.retry_cooldown_secs)
    }
}

/// Reconciliation loop pacing.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pause after an idle or failed cycle, in seconds.
    pub idle_interval_secs: u64,
    /// Pause after a successful cycle, in milliseconds.
    pub cycle_interval_ms: u64,
    /// Announce live ranked games of polled summoners.
    pub live_sweep: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_interval_secs: 30,
            cycle_interval_ms: 0,
            live_sweep: true,
        }
    }
}

impl SchedulerConfig {
    /// Converts to scheduler options.
    #[must_use]
    pub const fn options(&self) -> SchedulerOptions {
        SchedulerOptions {
            idle_interval: Duration::from_secs(self.idle_interval_secs),
            cycle_interval: Duration::from_millis(self.cycle_interval_ms),
            live_sweep: self.live_sweep,
        }
    }
}

impl AppConfig {
    /// Resolves the config file path.
    ///
    /// - If `dir` is `Some`, returns `{dir}/config.toml`.
    /// - Otherwise returns `~/.config/rankwatch/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined (when `dir` is `None`).
    pub fn resolve_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(d) = dir {
            return Ok(d.join("config.toml"));
        }

        let home = std::env::var("HOME").context("HOME environment variable is not set")?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("rankwatch")
            .join("config.toml"))
    }

    /// Loads and validates the config under `dir` (or the default location).
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved, or the file cannot be
    /// read, parsed or validated.
    pub fn load_from(dir: Option<&PathBuf>) -> Result<Self> {
        let path = Self::resolve_path(dir).context("failed to resolve config path")?;
        let config = Self::load(&path)?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid key.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.rate_limit;
        ensure!(
            limits.short_window_requests > 0,
            "rate_limit.short_window_requests must be positive"
        );
        ensure!(
            limits.short_window_secs > 0,
            "rate_limit.short_window_secs must be positive"
        );
        ensure!(
            limits.long_window_requests > 0,
            "rate_limit.long_window_requests must be positive"
        );
        ensure!(
            limits.long_window_secs > 0,
            "rate_limit.long_window_secs must be positive"
        );
        ensure!(
            limits.poll_interval_ms > 0,
            "rate_limit.poll_interval_ms must be positive"
        );
        if let Err(e) = self.default_platform() {
            bail!("riot.default_platform: {e}");
        }
        Ok(())
    }

    /// The configured default platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a known platform id.
    pub fn default_platform(&self) -> Result<Platform> {
        self.riot.default_platform.parse()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert_eq!(config.default_platform().unwrap(), Platform::Euw1);
        assert_eq!(config.rate_limit.short_window(), (10, Duration::from_secs(1)));
        assert_eq!(config.rate_limit.long_window(), (100, Duration::from_secs(120)));
        assert_eq!(config.scheduler.options(), SchedulerOptions::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[riot]\ndefault_platform = \"KR\"\n\n[scheduler]\nlive_sweep = false\n",
        )
        .unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.default_platform().unwrap(), Platform::Kr);
        assert!(!config.scheduler.live_sweep);
        assert_eq!(config.scheduler.idle_interval_secs, 30);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_load_empty_file() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        // Arrange
        let mut config = AppConfig::default();
        config.rate_limit.short_window_requests = 0;

        // Act
        let result = config.validate();

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("short_window_requests")
        );
    }

    #[test]
    fn test_validate_rejects_unknown_platform() {
        // Arrange
        let mut config = AppConfig::default();
        config.riot.default_platform = String::from("mars1");

        // Act
        let result = config.validate();

        // Assert
        assert!(result.unwrap_err().to_string().contains("default_platform"));
    }

    #[test]
    fn test_resolve_path() {
        // Arrange
        let dir = PathBuf::from("/tmp/rankwatch-data");

        // Act
        let with_dir = AppConfig::resolve_path(Some(&dir)).unwrap();
        let default = AppConfig::resolve_path(None).unwrap();

        // Assert
        assert_eq!(with_dir, PathBuf::from("/tmp/rankwatch-data/config.toml"));
        assert!(default.ends_with(".config/rankwatch/config.toml"));
    }
}
