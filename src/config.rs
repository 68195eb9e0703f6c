//! Layered settings: built-in defaults, optional file, `OUFLOW_*` environment, then CLI overrides.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::engine::signal::SignalNormalization;

pub const ENV_PREFIX: &str = "OUFLOW";

/// Largest accepted `trader.window`.
pub const MAX_WINDOW: usize = 1_000_000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Immutable for the lifetime of a trader.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraderConfig {
    pub symbol: String,
    /// Samples per side before estimation fires.
    pub window: usize,
    /// Signal magnitude needed to open a position.
    pub threshold: f64,
    /// Discretization step of the OU transition density.
    pub dt: f64,
    /// Signal scaling factor.
    pub theta: f64,
    /// Fixed order size.
    pub qty: f64,
    #[serde(default)]
    pub normalization: SignalNormalization,
}

impl Default for TraderConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            window: 300,
            threshold: 0.5,
            dt: 0.1,
            theta: 0.01,
            qty: 0.001,
            normalization: SignalNormalization::Raw,
        }
    }
}

impl TraderConfig {
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive(key: &'static str, v: f64) -> Result<(), SettingsError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid { key, reason: format!("must be a finite value > 0, got {v}") })
            }
        }

        if self.symbol.trim().is_empty() {
            return Err(SettingsError::Invalid { key: "symbol", reason: "must not be empty".into() });
        }
        if !(2..=MAX_WINDOW).contains(&self.window) {
            return Err(SettingsError::Invalid {
                key: "window",
                reason: format!("must be between 2 and {MAX_WINDOW}, got {}", self.window),
            });
        }
        positive("threshold", self.threshold)?;
        positive("dt", self.dt)?;
        positive("qty", self.qty)?;
        if !self.theta.is_finite() {
            return Err(SettingsError::Invalid { key: "theta", reason: "must be finite".into() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedConfig {
    pub ws_url: String,
    /// Partial book depth: 5, 10 or 20 levels.
    pub depth_levels: u16,
    /// Stream update speed, 100 or 1000 ms.
    pub update_speed_ms: u32,
    /// Snapshots buffered between the feed and the trader before new ones are dropped.
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://stream.binance.com:9443/ws".to_string(),
            depth_levels: 20,
            update_speed_ms: 100,
            channel_capacity: 1024,
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if ![5, 10, 20].contains(&self.depth_levels) {
            return Err(SettingsError::Invalid {
                key: "depth_levels",
                reason: format!("must be 5, 10 or 20, got {}", self.depth_levels),
            });
        }
        if ![100, 1000].contains(&self.update_speed_ms) {
            return Err(SettingsError::Invalid {
                key: "update_speed_ms",
                reason: format!("must be 100 or 1000, got {}", self.update_speed_ms),
            });
        }
        if self.channel_capacity == 0 {
            return Err(SettingsError::Invalid { key: "channel_capacity", reason: "must be > 0".into() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelemetryConfig {
    pub log_filter: String,
    pub metrics_listen: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { log_filter: "info".to_string(), metrics_listen: "0.0.0.0:9000".to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    pub trader: TraderConfig,
    pub feed: FeedConfig,
    pub telemetry: TelemetryConfig,
}

/// Values passed on the command line, applied last.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub symbol: Option<String>,
    pub window: Option<i64>,
    pub threshold: Option<f64>,
    pub dt: Option<f64>,
    pub theta: Option<f64>,
    pub qty: Option<f64>,
    pub normalization: Option<SignalNormalization>,
    pub ws_url: Option<String>,
    pub log_filter: Option<String>,
}

impl Settings {
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self, SettingsError> {
        let trader = TraderConfig::default();
        let feed = FeedConfig::default();
        let telemetry = TelemetryConfig::default();

        let mut builder = Config::builder()
            .set_default("trader.symbol", trader.symbol)?
            .set_default("trader.window", trader.window as i64)?
            .set_default("trader.threshold", trader.threshold)?
            .set_default("trader.dt", trader.dt)?
            .set_default("trader.theta", trader.theta)?
            .set_default("trader.qty", trader.qty)?
            .set_default("trader.normalization", trader.normalization.as_str())?
            .set_default("feed.ws_url", feed.ws_url)?
            .set_default("feed.depth_levels", i64::from(feed.depth_levels))?
            .set_default("feed.update_speed_ms", i64::from(feed.update_speed_ms))?
            .set_default("feed.channel_capacity", feed.channel_capacity as i64)?
            .set_default("telemetry.log_filter", telemetry.log_filter)?
            .set_default("telemetry.metrics_listen", telemetry.metrics_listen)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("_").separator("__").try_parsing(true))
            .set_override_option("trader.symbol", overrides.symbol)?
            .set_override_option("trader.window", overrides.window)?
            .set_override_option("trader.threshold", overrides.threshold)?
            .set_override_option("trader.dt", overrides.dt)?
            .set_override_option("trader.theta", overrides.theta)?
            .set_override_option("trader.qty", overrides.qty)?
            .set_override_option("trader.normalization", overrides.normalization.map(|n| n.as_str()))?
            .set_override_option("feed.ws_url", overrides.ws_url)?
            .set_override_option("telemetry.log_filter", overrides.log_filter)?
            .build()?
            .try_deserialize()?;

        settings.trader.validate()?;
        settings.feed.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_and_validate() {
        let settings = Settings::load(None, Overrides::default()).unwrap();
        assert_eq!(settings.trader.window, 300);
        assert_eq!(settings.trader.threshold, 0.5);
        assert_eq!(settings.trader.normalization, SignalNormalization::Raw);
        assert_eq!(settings.feed.depth_levels, 20);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            window: Some(50),
            threshold: Some(1.0),
            normalization: Some(SignalNormalization::MeanNu),
            symbol: Some("ETHUSDT".into()),
            ..Overrides::default()
        };
        let settings = Settings::load(None, overrides).unwrap();
        assert_eq!(settings.trader.window, 50);
        assert_eq!(settings.trader.threshold, 1.0);
        assert_eq!(settings.trader.symbol, "ETHUSDT");
        assert_eq!(settings.trader.normalization, SignalNormalization::MeanNu);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = Overrides { window: Some(1), ..Overrides::default() };
        let err = Settings::load(None, overrides).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { key: "window", .. }));
    }

    #[test]
    fn test_oversized_window_rejected() {
        let overrides = Overrides { window: Some(i64::MAX), ..Overrides::default() };
        let err = Settings::load(None, overrides).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { key: "window", .. }), "{err}");

        let cfg = TraderConfig { window: MAX_WINDOW, ..TraderConfig::default() };
        assert!(cfg.validate().is_ok());
        let cfg = TraderConfig { window: MAX_WINDOW + 1, ..TraderConfig::default() };
        assert!(matches!(cfg.validate(), Err(SettingsError::Invalid { key: "window", .. })));
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let cfg = TraderConfig { dt: 0.0, ..TraderConfig::default() };
        assert!(matches!(cfg.validate(), Err(SettingsError::Invalid { key: "dt", .. })));
        let cfg = TraderConfig { qty: f64::NAN, ..TraderConfig::default() };
        assert!(matches!(cfg.validate(), Err(SettingsError::Invalid { key: "qty", .. })));
        let cfg = TraderConfig { symbol: " ".into(), ..TraderConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_feed_validation() {
        let feed = FeedConfig { depth_levels: 7, ..FeedConfig::default() };
        assert!(feed.validate().is_err());
        assert!(FeedConfig::default().validate().is_ok());
    }
}
