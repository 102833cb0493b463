//! Configuration loading
//!
//! Configuration is read from a TOML file. Every section is optional and falls
//! back to the clinical defaults used by the data collection screens.
//!
//! ```toml
//! [analysis]
//! trend_threshold = 0.5
//! goal_value = 80.0
//!
//! [recorder]
//! min_trials = 3
//! max_trials = 10
//! require_prompt_level = true
//!
//! [drafts]
//! dir = "/var/lib/trialflux/drafts"
//!
//! [logging]
//! level = "info"
//! ```

use crate::error::CollectionError;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Default noise gate for trend classification
pub const DEFAULT_TREND_THRESHOLD: f64 = 0.5;

/// Default goal line drawn on progress charts (percent)
pub const DEFAULT_GOAL_VALUE: f64 = 80.0;

/// Main configuration struct
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub recorder: RecorderConfig,

    #[serde(default)]
    pub drafts: DraftConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Trend and goal-line tuning
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum absolute half-to-half mean difference that counts as a trend
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,

    /// Goal line for progress charts
    #[serde(default = "default_goal_value")]
    pub goal_value: f64,

    /// Percentage correct at which a skill program is considered mastered
    #[serde(default = "default_goal_value")]
    pub mastery_percentage: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trend_threshold: DEFAULT_TREND_THRESHOLD,
            goal_value: DEFAULT_GOAL_VALUE,
            mastery_percentage: DEFAULT_GOAL_VALUE,
        }
    }
}

impl AnalysisConfig {
    /// Threshold must be a non-negative number; goal and mastery must be finite
    pub fn validate(&self) -> Result<(), CollectionError> {
        if self.trend_threshold.is_nan() || self.trend_threshold < 0.0 {
            return Err(CollectionError::InvalidConfig(format!(
                "trend_threshold must be non-negative, got {}",
                self.trend_threshold
            )));
        }
        for (name, value) in [
            ("goal_value", self.goal_value),
            ("mastery_percentage", self.mastery_percentage),
        ] {
            if !value.is_finite() {
                return Err(CollectionError::InvalidConfig(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn default_trend_threshold() -> f64 {
    DEFAULT_TREND_THRESHOLD
}

fn default_goal_value() -> f64 {
    DEFAULT_GOAL_VALUE
}

/// Limits applied when configuring a recorder
#[derive(Debug, Clone, Deserialize)]
pub struct RecorderConfig {
    #[serde(default = "default_min_trials")]
    pub min_trials: u32,
    #[serde(default = "default_max_trials")]
    pub max_trials: u32,
    #[serde(default = "default_trials")]
    pub default_trials: u32,

    #[serde(default = "default_min_intervals")]
    pub min_intervals: u32,
    #[serde(default = "default_max_intervals")]
    pub max_intervals: u32,
    #[serde(default = "default_intervals")]
    pub default_intervals: u32,

    /// Seconds
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u32,
    /// Seconds
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: u32,
    /// Seconds
    #[serde(default = "default_interval_secs")]
    pub default_interval_secs: u32,

    /// Block finalize while a prompted trial has no prompt level
    #[serde(default = "default_true")]
    pub require_prompt_level: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            min_trials: default_min_trials(),
            max_trials: default_max_trials(),
            default_trials: default_trials(),
            min_intervals: default_min_intervals(),
            max_intervals: default_max_intervals(),
            default_intervals: default_intervals(),
            min_interval_secs: default_min_interval_secs(),
            max_interval_secs: default_max_interval_secs(),
            default_interval_secs: default_interval_secs(),
            require_prompt_level: true,
        }
    }
}

impl RecorderConfig {
    pub fn trial_range(&self) -> RangeInclusive<u32> {
        self.min_trials..=self.max_trials
    }

    pub fn interval_range(&self) -> RangeInclusive<u32> {
        self.min_intervals..=self.max_intervals
    }

    pub fn interval_secs_range(&self) -> RangeInclusive<u32> {
        self.min_interval_secs..=self.max_interval_secs
    }

    /// Check that every range is non-empty and contains its default
    pub fn validate(&self) -> Result<(), CollectionError> {
        let checks = [
            ("trials", self.trial_range(), self.default_trials),
            ("intervals", self.interval_range(), self.default_intervals),
            (
                "interval seconds",
                self.interval_secs_range(),
                self.default_interval_secs,
            ),
        ];

        for (name, range, default) in checks {
            if range.is_empty() {
                return Err(CollectionError::InvalidConfig(format!(
                    "{} range {}..={} is empty",
                    name,
                    range.start(),
                    range.end()
                )));
            }
            if !range.contains(&default) {
                return Err(CollectionError::InvalidConfig(format!(
                    "default {} {} outside {}..={}",
                    name,
                    default,
                    range.start(),
                    range.end()
                )));
            }
        }

        if *self.trial_range().start() == 0 || *self.interval_range().start() == 0 {
            return Err(CollectionError::InvalidConfig(
                "recorders need at least one trial and one interval".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_min_trials() -> u32 {
    3
}
fn default_max_trials() -> u32 {
    10
}
fn default_trials() -> u32 {
    10
}
fn default_min_intervals() -> u32 {
    5
}
fn default_max_intervals() -> u32 {
    30
}
fn default_intervals() -> u32 {
    10
}
fn default_min_interval_secs() -> u32 {
    10
}
fn default_max_interval_secs() -> u32 {
    120
}
fn default_interval_secs() -> u32 {
    30
}
fn default_true() -> bool {
    true
}

/// Draft buffer location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftConfig {
    /// Directory for file-backed drafts; in-memory drafts when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, CollectionError> {
        let config: Config = toml::from_str(text)?;
        config.recorder.validate()?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, CollectionError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CollectionError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CollectionError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
