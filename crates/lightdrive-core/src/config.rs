//! Loop configuration and feature toggles

use crate::error::{LightDriveError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Title used when none is configured
pub const DEFAULT_TITLE: &str = "LightDrive";

/// Update ticks per second used when none is configured
pub const DEFAULT_TICKS_PER_SECOND: f64 = 60.0;

/// Length of one rate-reporting window
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 1000;

/// What the loop does when the state layer fails inside `update` or `render`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Tear the loop down and hand the error to whoever stops it next.
    #[default]
    Stop,
    /// Log the error and keep looping.
    Continue,
}

/// Immutable loop configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Internal (offscreen) resolution in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Fixed simulation rate
    #[serde(default = "default_tps")]
    pub target_ticks_per_second: f64,
    #[serde(default = "default_title")]
    pub title: String,
    /// Upper bound on update ticks run in one iteration; `None` never drops ticks
    #[serde(default)]
    pub max_catch_up_ticks: Option<u32>,
    #[serde(default = "default_report_interval")]
    pub report_interval_ms: u64,
    /// Optional presentation cap; `None` renders as fast as the loop spins
    #[serde(default)]
    pub max_frames_per_second: Option<f64>,
    #[serde(default)]
    pub fault_policy: FaultPolicy,
}

fn default_width() -> u32 {
    640
}
fn default_height() -> u32 {
    360
}
fn default_tps() -> f64 {
    DEFAULT_TICKS_PER_SECOND
}
fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
fn default_report_interval() -> u64 {
    DEFAULT_REPORT_INTERVAL_MS
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::new(default_width(), default_height())
    }
}

impl LoopConfig {
    /// Configuration with the given internal resolution and default everything else
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            target_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            title: DEFAULT_TITLE.to_string(),
            max_catch_up_ticks: None,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
            max_frames_per_second: None,
            fault_policy: FaultPolicy::Stop,
        }
    }

    pub fn with_ticks_per_second(mut self, tps: f64) -> Self {
        self.target_ticks_per_second = tps;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_max_catch_up_ticks(mut self, cap: Option<u32>) -> Self {
        self.max_catch_up_ticks = cap;
        self
    }

    pub fn with_max_frames_per_second(mut self, cap: Option<f64>) -> Self {
        self.max_frames_per_second = cap;
        self
    }

    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// Check every field; the first violation is reported as `Config`.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LightDriveError::Config(format!(
                "dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.target_ticks_per_second.is_finite() && self.target_ticks_per_second > 0.0) {
            return Err(LightDriveError::Config(format!(
                "target_ticks_per_second must be a positive number, got {}",
                self.target_ticks_per_second
            )));
        }
        if self.report_interval_ms == 0 {
            return Err(LightDriveError::Config(
                "report_interval_ms must be positive".into(),
            ));
        }
        if self.max_catch_up_ticks == Some(0) {
            return Err(LightDriveError::Config(
                "max_catch_up_ticks must be at least 1 when set".into(),
            ));
        }
        if let Some(fps) = self.max_frames_per_second {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(LightDriveError::Config(format!(
                    "max_frames_per_second must be a positive number, got {fps}"
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: LoopConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Which input devices the loop polls. Fixed once the loop starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default)]
    pub keyboard: bool,
    #[serde(default)]
    pub mouse: bool,
    #[serde(default)]
    pub gamepads: bool,
}

impl FeatureFlags {
    /// True when at least one device is polled
    pub fn any(&self) -> bool {
        self.keyboard || self.mouse || self.gamepads
    }
}
