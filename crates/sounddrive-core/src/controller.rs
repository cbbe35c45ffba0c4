//! Speed controller
//!
//! Entry point for speed samples. Each sample runs one full cycle:
//! configuration snapshot, volume mapping, volume command, hysteresis (with focus
//! arbitration), playback command.

use crate::effects::{ControlEffects, PlaybackCommand, SampleSource};
use crate::focus::FocusArbiter;
use crate::hysteresis::{FocusState, PlaybackHysteresis, PlaybackState, Transition};
use crate::volume::compute_volume;
use sounddrive_config::{ConfigError, Configuration, SharedConfiguration};
use sounddrive_hal::{AudioSink, ResourceOwnership};

pub struct SpeedController {
    config: SharedConfiguration,
    sink: Box<dyn AudioSink>,
    arbiter: FocusArbiter,
    hysteresis: PlaybackHysteresis,
}

impl SpeedController {
    /// Create a controller with its own configuration
    pub fn new(
        config: Configuration,
        sink: Box<dyn AudioSink>,
        ownership: Box<dyn ResourceOwnership>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_shared(SharedConfiguration::new(config), sink, ownership))
    }

    /// Create a controller reading a configuration another component also writes
    pub fn with_shared(
        config: SharedConfiguration,
        sink: Box<dyn AudioSink>,
        ownership: Box<dyn ResourceOwnership>,
    ) -> Self {
        Self {
            config,
            sink,
            arbiter: FocusArbiter::new(ownership),
            hysteresis: PlaybackHysteresis::new(),
        }
    }

    /// Replace all thresholds at once. On error the previous values stay active.
    pub fn configure(
        &self,
        low_threshold: f32,
        high_threshold: f32,
        start_threshold: f32,
        enabled: bool,
        unit_conversion_factor: f32,
        sensitivity_scale: f32,
    ) -> Result<(), ConfigError> {
        self.config.configure(Configuration {
            enabled,
            low_threshold,
            high_threshold,
            start_threshold,
            unit_conversion_factor,
            sensitivity_scale,
        })
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.config.set_enabled(enabled);
    }

    /// Handle to the configuration for other writers
    pub fn config(&self) -> SharedConfiguration {
        self.config.clone()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.hysteresis.state()
    }

    pub fn focus_state(&self) -> FocusState {
        self.hysteresis.focus()
    }

    /// Process a sample from the location provider
    pub fn on_speed_sample(&mut self, speed: f32) -> ControlEffects {
        self.on_sample(speed, SampleSource::Sensor)
    }

    /// Process a sample from any source.
    ///
    /// Thresholds are always compared with the raw sensor speed; the conversion
    /// factor only produces `display_speed`.
    pub fn on_sample(&mut self, speed: f32, source: SampleSource) -> ControlEffects {
        let config = self.config.snapshot();
        tracing::debug!(speed, ?source, "Speed sample");

        let set_volume = self.apply_volume(speed, &config);

        let transition = self.hysteresis.evaluate(
            speed,
            config.enabled,
            config.start_threshold,
            &mut self.arbiter,
        );
        let playback = self.apply_transition(transition);

        ControlEffects {
            set_volume,
            playback,
            focus_denied: transition == Transition::Denied,
            display_speed: config.display_speed(speed),
            source,
        }
    }

    /// Stop playback and give up focus, e.g. when the host goes to background.
    ///
    /// Runs one disabled evaluation so the normal exit path is taken.
    pub fn halt(&mut self) -> Option<PlaybackCommand> {
        let config = self.config.snapshot();
        let transition = self
            .hysteresis
            .evaluate(0.0, false, config.start_threshold, &mut self.arbiter);
        self.apply_transition(transition)
    }

    fn apply_volume(&mut self, speed: f32, config: &Configuration) -> Option<i32> {
        let max_volume = match self.sink.max_volume() {
            Ok(max) => max,
            Err(e) => {
                tracing::warn!("Skipping volume update: {}", e);
                return None;
            }
        };

        let level = match compute_volume(
            speed,
            config.low_threshold,
            config.high_threshold,
            max_volume,
            config.sensitivity_scale,
        ) {
            Ok(level) => level,
            Err(e) => {
                tracing::warn!("Skipping volume update: {}", e);
                return None;
            }
        };

        if let Err(e) = self.sink.set_volume(level) {
            tracing::warn!("Sink rejected volume {}: {}", level, e);
        }
        Some(level)
    }

    fn apply_transition(&mut self, transition: Transition) -> Option<PlaybackCommand> {
        match transition {
            Transition::Started => {
                if let Err(e) = self.sink.start_playback() {
                    tracing::warn!("Sink failed to start playback: {}", e);
                }
                Some(PlaybackCommand::Start)
            }
            Transition::Stopped => {
                if let Err(e) = self.sink.pause_playback() {
                    tracing::warn!("Sink failed to pause playback: {}", e);
                }
                Some(PlaybackCommand::Stop)
            }
            Transition::Denied | Transition::Unchanged => None,
        }
    }
}

impl Drop for SpeedController {
    fn drop(&mut self) {
        if self.hysteresis.state() == PlaybackState::Playing {
            self.halt();
        }
    }
}
