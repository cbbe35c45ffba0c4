//! Effects emitted by one control cycle

use serde::{Deserialize, Serialize};

/// Where a speed sample came from. Both paths use the sensor's native unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleSource {
    /// Direct location provider callback
    #[default]
    Sensor,
    /// Sample forwarded by another process
    Broadcast,
}

impl SampleSource {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sensor" => Some(SampleSource::Sensor),
            "broadcast" => Some(SampleSource::Broadcast),
            _ => None,
        }
    }
}

/// Playback command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackCommand {
    Start,
    Stop,
}

/// Commands issued while processing one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlEffects {
    /// Volume step sent to the sink; `None` when the sink reported no usable range
    pub set_volume: Option<i32>,
    /// Present only when the playback state changed
    pub playback: Option<PlaybackCommand>,
    /// Start threshold reached but the audio focus was denied
    pub focus_denied: bool,
    /// Speed in the display unit, for whoever renders it
    pub display_speed: f32,
    pub source: SampleSource,
}
