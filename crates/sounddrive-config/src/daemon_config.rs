//! Host settings for the daemon

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Audio sink backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudioBackend {
    /// In-memory sink, logs commands only
    #[default]
    Mock,
    /// ALSA mixer volume plus a looping player process
    Amixer,
}

/// Audio ownership backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipBackend {
    /// Nothing else competes for the output
    #[default]
    Uncontended,
    /// Exclusive `flock` on a shared lock file
    LockFile,
    /// Every request is denied (dry runs)
    MockDenied,
}

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub audio_backend: AudioBackend,

    #[serde(default)]
    pub ownership_backend: OwnershipBackend,

    #[serde(default = "default_alsa_card")]
    pub alsa_card: String,

    #[serde(default = "default_mixer_control")]
    pub mixer_control: String,

    /// Volume steps exposed by the amixer backend
    #[serde(default = "default_max_volume")]
    pub max_volume: i32,

    /// Track looped while playback is on
    #[serde(default)]
    pub track: Option<PathBuf>,

    #[serde(default = "default_player")]
    pub player: String,

    #[serde(default = "default_player_args")]
    pub player_args: Vec<String>,

    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,
}

fn default_alsa_card() -> String {
    "default".to_string()
}

fn default_mixer_control() -> String {
    "Master".to_string()
}

fn default_max_volume() -> i32 {
    15
}

fn default_player() -> String {
    "mpv".to_string()
}

fn default_player_args() -> Vec<String> {
    vec![
        "--loop=inf".to_string(),
        "--no-video".to_string(),
        "--really-quiet".to_string(),
    ]
}

fn default_lock_file() -> PathBuf {
    std::env::temp_dir().join("sounddrive-audio.lock")
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            audio_backend: AudioBackend::default(),
            ownership_backend: OwnershipBackend::default(),
            alsa_card: default_alsa_card(),
            mixer_control: default_mixer_control(),
            max_volume: default_max_volume(),
            track: None,
            player: default_player(),
            player_args: default_player_args(),
            lock_file: default_lock_file(),
        }
    }
}
