//! Audio output management
//!
//! Volume goes through the ALSA mixer (`amixer`), playback through an external
//! player process that loops the configured track.

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Audio sink unavailable: {0}")]
    Unavailable(String),

    #[error("Mixer command failed: {0}")]
    CommandFailed(String),

    #[error("Signal delivery failed: {0}")]
    Signal(#[from] nix::errno::Errno),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output side of the device the controller drives.
///
/// Volume levels are device steps in `[0, max_volume()]`; the maximum may change
/// between calls (output route switched, device replugged).
pub trait AudioSink {
    /// Highest volume step the device currently accepts
    fn max_volume(&self) -> Result<i32, SinkError>;

    fn set_volume(&mut self, level: i32) -> Result<(), SinkError>;

    /// Start or resume the track
    fn start_playback(&mut self) -> Result<(), SinkError>;

    /// Pause the track. Pausing a sink that is not playing is a no-op.
    fn pause_playback(&mut self) -> Result<(), SinkError>;
}

/// ALSA mixer and player configuration
#[derive(Debug, Clone)]
pub struct AmixerConfig {
    pub alsa_card: String,
    pub mixer_control: String,
    /// Number of volume steps exposed to the controller
    pub max_volume: i32,
    pub track: Option<PathBuf>,
    pub player: String,
    pub player_args: Vec<String>,
}

impl Default for AmixerConfig {
    fn default() -> Self {
        Self {
            alsa_card: "default".to_string(),
            mixer_control: "Master".to_string(),
            max_volume: 15,
            track: None,
            player: "mpv".to_string(),
            player_args: vec![
                "--loop=inf".to_string(),
                "--no-video".to_string(),
                "--really-quiet".to_string(),
            ],
        }
    }
}

/// Audio sink backed by `amixer` and a looping player process
pub struct AmixerSink {
    config: AmixerConfig,
    player: Option<Child>,
    paused: bool,
}

impl AmixerSink {
    pub fn new(config: AmixerConfig) -> Self {
        Self {
            config,
            player: None,
            paused: false,
        }
    }

    /// Check whether the player process is alive and not stopped
    pub fn is_playing(&self) -> bool {
        self.player.is_some() && !self.paused
    }

    /// Map a device step onto the mixer percentage
    fn step_to_percent(&self, level: i32) -> i32 {
        let max = self.config.max_volume.max(1);
        level.clamp(0, max) * 100 / max
    }

    /// Drop the player handle if the process has already exited
    fn reap_player(&mut self) {
        let exited = match self.player.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(Some(_))),
            None => false,
        };

        if exited {
            tracing::warn!("Player process exited, will respawn on next start");
            self.player = None;
            self.paused = false;
        }
    }

    fn spawn_player(&mut self) -> Result<(), SinkError> {
        let Some(track) = self.config.track.as_ref() else {
            return Err(SinkError::Unavailable("no track configured".to_string()));
        };

        let child = Command::new(&self.config.player)
            .args(&self.config.player_args)
            .arg(track)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        tracing::info!("Started {} (pid {}) for {}", self.config.player, child.id(), track.display());
        self.player = Some(child);
        self.paused = false;
        Ok(())
    }

    fn signal_player(&self, signal: Signal) -> Result<(), SinkError> {
        if let Some(child) = self.player.as_ref() {
            kill(Pid::from_raw(child.id() as i32), signal)?;
        }
        Ok(())
    }
}

impl AudioSink for AmixerSink {
    fn max_volume(&self) -> Result<i32, SinkError> {
        if self.config.max_volume <= 0 {
            return Err(SinkError::Unavailable(format!(
                "invalid mixer range 0..{}",
                self.config.max_volume
            )));
        }
        Ok(self.config.max_volume)
    }

    fn set_volume(&mut self, level: i32) -> Result<(), SinkError> {
        let percent = format!("{}%", self.step_to_percent(level));

        let output = Command::new("amixer")
            .args([
                "-c",
                &self.config.alsa_card,
                "sset",
                &self.config.mixer_control,
                &percent,
            ])
            .output()?;

        if !output.status.success() {
            return Err(SinkError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        tracing::debug!("Volume set to step {} ({})", level, percent);
        Ok(())
    }

    fn start_playback(&mut self) -> Result<(), SinkError> {
        self.reap_player();

        if self.player.is_none() {
            return self.spawn_player();
        }

        if self.paused {
            self.signal_player(Signal::SIGCONT)?;
            self.paused = false;
            tracing::debug!("Player resumed");
        }
        Ok(())
    }

    fn pause_playback(&mut self) -> Result<(), SinkError> {
        self.reap_player();

        if self.player.is_some() && !self.paused {
            self.signal_player(Signal::SIGSTOP)?;
            self.paused = true;
            tracing::debug!("Player paused");
        }
        Ok(())
    }
}

impl Drop for AmixerSink {
    fn drop(&mut self) {
        if let Some(mut child) = self.player.take() {
            // A stopped process must be continued before it can handle SIGKILL cleanly
            let _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGCONT);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amixer_config_default() {
        let config = AmixerConfig::default();
        assert_eq!(config.max_volume, 15);
        assert_eq!(config.mixer_control, "Master");
        assert!(config.track.is_none());
    }

    #[test]
    fn test_step_to_percent() {
        let sink = AmixerSink::new(AmixerConfig::default());
        assert_eq!(sink.step_to_percent(0), 0);
        assert_eq!(sink.step_to_percent(15), 100);
        assert_eq!(sink.step_to_percent(7), 46);
        assert_eq!(sink.step_to_percent(40), 100);
        assert_eq!(sink.step_to_percent(-3), 0);
    }

    #[test]
    fn test_invalid_range_is_unavailable() {
        let sink = AmixerSink::new(AmixerConfig {
            max_volume: 0,
            ..AmixerConfig::default()
        });
        assert!(matches!(sink.max_volume(), Err(SinkError::Unavailable(_))));
    }

    #[test]
    fn test_start_without_track_is_unavailable() {
        let mut sink = AmixerSink::new(AmixerConfig::default());
        assert!(matches!(sink.start_playback(), Err(SinkError::Unavailable(_))));
        assert!(!sink.is_playing());
    }

    #[test]
    fn test_pause_when_idle_is_noop() {
        let mut sink = AmixerSink::new(AmixerConfig::default());
        assert!(sink.pause_playback().is_ok());
        assert!(sink.pause_playback().is_ok());
    }
}
