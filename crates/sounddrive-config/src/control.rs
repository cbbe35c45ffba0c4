//! Speed thresholds driving volume and playback

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Tunable control parameters.
///
/// Thresholds are in the sensor's native unit (m/s). `unit_conversion_factor`
/// only scales speeds for display and never takes part in control decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Master switch for speed-triggered playback
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Speed at or below which the volume bottoms out
    #[serde(default = "default_low_threshold")]
    pub low_threshold: f32,

    /// Speed at which the volume band ends
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f32,

    /// Speed at which the track starts (and below which it pauses)
    #[serde(default = "default_start_threshold")]
    pub start_threshold: f32,

    /// Multiplier from sensor unit to display unit
    #[serde(default = "default_unit_conversion_factor")]
    pub unit_conversion_factor: f32,

    /// Damping applied to the volume curve (lower = less sensitive)
    #[serde(default = "default_sensitivity_scale")]
    pub sensitivity_scale: f32,
}

fn default_true() -> bool {
    true
}

fn default_low_threshold() -> f32 {
    3.0
}

fn default_high_threshold() -> f32 {
    9.0
}

fn default_start_threshold() -> f32 {
    13.0
}

fn default_unit_conversion_factor() -> f32 {
    4.4
}

fn default_sensitivity_scale() -> f32 {
    0.5
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            low_threshold: default_low_threshold(),
            high_threshold: default_high_threshold(),
            start_threshold: default_start_threshold(),
            unit_conversion_factor: default_unit_conversion_factor(),
            sensitivity_scale: default_sensitivity_scale(),
        }
    }
}

impl Configuration {
    /// Build a configuration and validate it
    pub fn new(
        low_threshold: f32,
        high_threshold: f32,
        start_threshold: f32,
        enabled: bool,
        unit_conversion_factor: f32,
        sensitivity_scale: f32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            enabled,
            low_threshold,
            high_threshold,
            start_threshold,
            unit_conversion_factor,
            sensitivity_scale,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the controller relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("low_threshold", self.low_threshold),
            ("high_threshold", self.high_threshold),
            ("start_threshold", self.start_threshold),
            ("unit_conversion_factor", self.unit_conversion_factor),
            ("sensitivity_scale", self.sensitivity_scale),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{} is not finite", name)));
            }
        }

        if self.low_threshold >= self.high_threshold {
            return Err(ConfigError::InvalidThresholds {
                low: self.low_threshold,
                high: self.high_threshold,
            });
        }

        if self.sensitivity_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sensitivity_scale must be positive, got {}",
                self.sensitivity_scale
            )));
        }

        if self.unit_conversion_factor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "unit_conversion_factor must be positive, got {}",
                self.unit_conversion_factor
            )));
        }

        Ok(())
    }

    /// Convert a sensor speed into the display unit
    pub fn display_speed(&self, speed: f32) -> f32 {
        speed * self.unit_conversion_factor
    }
}
