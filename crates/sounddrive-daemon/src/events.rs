//! Control events and their line format
//!
//! One event per line:
//!
//! ```text
//! 12.5                          speed sample from the sensor
//! speed 12.5 broadcast          speed sample with explicit source
//! enable | disable              toggle speed-triggered playback
//! configure low=3 start=12 ...  change thresholds (unset keys keep their value)
//! quit
//! ```

use sounddrive_config::Configuration;
use sounddrive_core::SampleSource;
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::thread;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid speed: {0}")]
    InvalidSpeed(String),

    #[error("Unknown sample source: {0}")]
    UnknownSource(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// Threshold changes carried by a `configure` line
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfigPatch {
    pub low_threshold: Option<f32>,
    pub high_threshold: Option<f32>,
    pub start_threshold: Option<f32>,
    pub enabled: Option<bool>,
    pub unit_conversion_factor: Option<f32>,
    pub sensitivity_scale: Option<f32>,
}

impl ConfigPatch {
    /// Apply the patch on top of `base`
    pub fn apply(&self, base: Configuration) -> Configuration {
        Configuration {
            enabled: self.enabled.unwrap_or(base.enabled),
            low_threshold: self.low_threshold.unwrap_or(base.low_threshold),
            high_threshold: self.high_threshold.unwrap_or(base.high_threshold),
            start_threshold: self.start_threshold.unwrap_or(base.start_threshold),
            unit_conversion_factor: self
                .unit_conversion_factor
                .unwrap_or(base.unit_conversion_factor),
            sensitivity_scale: self.sensitivity_scale.unwrap_or(base.sensitivity_scale),
        }
    }
}

/// Events processed by the control loop, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Speed { speed: f32, source: SampleSource },
    SetEnabled(bool),
    Configure(ConfigPatch),
    Quit,
}

impl ControlEvent {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(None);
        };

        let event = match head.to_lowercase().as_str() {
            "speed" => {
                let value = parts
                    .next()
                    .ok_or_else(|| ParseError::InvalidSpeed(String::new()))?;
                let source = match parts.next() {
                    Some(name) => SampleSource::parse(name)
                        .ok_or_else(|| ParseError::UnknownSource(name.to_string()))?,
                    None => SampleSource::Sensor,
                };
                ControlEvent::Speed {
                    speed: parse_speed(value)?,
                    source,
                }
            }
            "enable" => ControlEvent::SetEnabled(true),
            "disable" => ControlEvent::SetEnabled(false),
            "configure" => ControlEvent::Configure(parse_patch(parts)?),
            "quit" | "exit" => ControlEvent::Quit,
            _ => {
                if head.parse::<f32>().is_err() {
                    return Err(ParseError::UnknownCommand(head.to_string()));
                }
                ControlEvent::Speed {
                    speed: parse_speed(head)?,
                    source: SampleSource::Sensor,
                }
            }
        };

        Ok(Some(event))
    }
}

fn parse_speed(value: &str) -> Result<f32, ParseError> {
    match value.parse::<f32>() {
        Ok(speed) if speed.is_finite() && speed >= 0.0 => Ok(speed),
        _ => Err(ParseError::InvalidSpeed(value.to_string())),
    }
}

fn parse_patch<'a>(settings: impl Iterator<Item = &'a str>) -> Result<ConfigPatch, ParseError> {
    let mut patch = ConfigPatch::default();

    for setting in settings {
        let (key, value) = setting
            .split_once('=')
            .ok_or_else(|| ParseError::InvalidSetting(setting.to_string()))?;
        let invalid = || ParseError::InvalidSetting(setting.to_string());

        match key {
            "enabled" => patch.enabled = Some(value.parse().map_err(|_| invalid())?),
            "low" | "low_threshold" => {
                patch.low_threshold = Some(value.parse().map_err(|_| invalid())?)
            }
            "high" | "high_threshold" => {
                patch.high_threshold = Some(value.parse().map_err(|_| invalid())?)
            }
            "start" | "start_threshold" => {
                patch.start_threshold = Some(value.parse().map_err(|_| invalid())?)
            }
            "factor" | "unit_conversion_factor" => {
                patch.unit_conversion_factor = Some(value.parse().map_err(|_| invalid())?)
            }
            "sensitivity" | "sensitivity_scale" => {
                patch.sensitivity_scale = Some(value.parse().map_err(|_| invalid())?)
            }
            _ => return Err(invalid()),
        }
    }

    Ok(patch)
}

/// Read events from `input` on a background thread.
///
/// Malformed lines are logged and skipped. End of input is reported as `Quit`.
pub fn spawn_reader<R>(input: R, tx: Sender<ControlEvent>) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for (number, line) in input.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            };

            match ControlEvent::parse(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Line {}: {}", number + 1, e),
            }
        }

        let _ = tx.send(ControlEvent::Quit);
    })
}
