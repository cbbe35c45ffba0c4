//! Mock implementations for testing without real audio hardware
//!
//! This module provides in-memory backends for the audio sink and the ownership
//! subsystem, allowing development and testing on machines without ALSA or a
//! contended audio output.
//!
//! # Usage
//!
//! ```no_run
//! use sounddrive_hal::mock::{MockHal, MockProfile};
//!
//! // A phone-like device with a 15-step music stream
//! let hal = MockHal::new(MockProfile::Phone);
//!
//! // Make every ownership request fail
//! hal.ownership.set_grant(false);
//! ```

use crate::{AudioSink, FocusGrant, OwnershipError, ResourceOwnership, SinkError};
use std::sync::{Arc, RwLock};

/// Pre-defined mock device profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockProfile {
    /// Phone music stream (15 steps)
    Phone,
    /// Car head unit (30 steps)
    HeadUnit,
    /// Older handset with a coarse stream (7 steps)
    Legacy,
    /// Desktop development (percentage volume)
    Desktop,
}

impl MockProfile {
    /// Volume steps exposed by this device
    pub fn max_volume(self) -> i32 {
        match self {
            MockProfile::Phone => 15,
            MockProfile::HeadUnit => 30,
            MockProfile::Legacy => 7,
            MockProfile::Desktop => 100,
        }
    }

    /// Get profile from string name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "phone" => Some(MockProfile::Phone),
            "head_unit" | "headunit" => Some(MockProfile::HeadUnit),
            "legacy" => Some(MockProfile::Legacy),
            "desktop" => Some(MockProfile::Desktop),
            _ => None,
        }
    }

    /// List all available mock profiles
    pub fn all() -> &'static [MockProfile] {
        &[
            MockProfile::Phone,
            MockProfile::HeadUnit,
            MockProfile::Legacy,
            MockProfile::Desktop,
        ]
    }

    /// Read `SOUNDDRIVE_MOCK_DEVICE` or default to Phone
    pub fn from_env() -> Self {
        std::env::var("SOUNDDRIVE_MOCK_DEVICE")
            .ok()
            .and_then(|s| MockProfile::from_name(&s))
            .unwrap_or(MockProfile::Phone)
    }
}

/// Command received by the mock sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCommand {
    SetVolume(i32),
    Start,
    Pause,
}

/// Shared mock sink state for inspection in tests
#[derive(Debug)]
pub struct MockSinkState {
    /// Reported maximum volume
    pub max_volume: i32,
    /// Last applied volume
    pub volume: Option<i32>,
    pub playing: bool,
    /// When false every call fails with `SinkError::Unavailable`
    pub available: bool,
    /// Every accepted command, in order
    pub commands: Vec<SinkCommand>,
}

impl MockSinkState {
    pub fn new(max_volume: i32) -> Self {
        Self {
            max_volume,
            volume: None,
            playing: false,
            available: true,
            commands: Vec::new(),
        }
    }
}

/// Mock audio sink
pub struct MockAudioSink {
    state: Arc<RwLock<MockSinkState>>,
}

impl MockAudioSink {
    pub fn new(profile: MockProfile) -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSinkState::new(profile.max_volume()))),
        }
    }

    /// Simulate the output route changing its volume range
    pub fn set_max_volume(&self, max_volume: i32) {
        if let Ok(mut state) = self.state.write() {
            state.max_volume = max_volume;
        }
    }

    /// Simulate the sink going away or coming back
    pub fn set_available(&self, available: bool) {
        if let Ok(mut state) = self.state.write() {
            state.available = available;
        }
    }

    pub fn volume(&self) -> Option<i32> {
        self.state.read().ok().and_then(|s| s.volume)
    }

    pub fn is_playing(&self) -> bool {
        self.state.read().map(|s| s.playing).unwrap_or(false)
    }

    /// Snapshot of the command log
    pub fn commands(&self) -> Vec<SinkCommand> {
        self.state
            .read()
            .map(|s| s.commands.clone())
            .unwrap_or_default()
    }

    fn apply(&self, command: SinkCommand) -> Result<(), SinkError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| SinkError::Unavailable("mock state poisoned".into()))?;

        if !state.available {
            return Err(SinkError::Unavailable("mock sink offline".into()));
        }

        match command {
            SinkCommand::SetVolume(level) => {
                let max = state.max_volume.max(0);
                state.volume = Some(level.clamp(0, max));
            }
            SinkCommand::Start => state.playing = true,
            SinkCommand::Pause => state.playing = false,
        }
        state.commands.push(command);
        tracing::debug!("[MOCK] {:?}", command);
        Ok(())
    }
}

impl Clone for MockAudioSink {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl AudioSink for MockAudioSink {
    fn max_volume(&self) -> Result<i32, SinkError> {
        let state = self
            .state
            .read()
            .map_err(|_| SinkError::Unavailable("mock state poisoned".into()))?;

        if !state.available {
            return Err(SinkError::Unavailable("mock sink offline".into()));
        }
        Ok(state.max_volume)
    }

    fn set_volume(&mut self, level: i32) -> Result<(), SinkError> {
        self.apply(SinkCommand::SetVolume(level))
    }

    fn start_playback(&mut self) -> Result<(), SinkError> {
        self.apply(SinkCommand::Start)
    }

    fn pause_playback(&mut self) -> Result<(), SinkError> {
        self.apply(SinkCommand::Pause)
    }
}

/// Shared mock ownership state
#[derive(Debug)]
pub struct MockOwnershipState {
    /// Whether requests are granted
    pub grant: bool,
    /// When false requests fail with `OwnershipError::Unavailable`
    pub available: bool,
    pub held: bool,
    pub requests: u32,
    pub abandons: u32,
}

impl MockOwnershipState {
    pub fn new() -> Self {
        Self {
            grant: true,
            available: true,
            held: false,
            requests: 0,
            abandons: 0,
        }
    }
}

impl Default for MockOwnershipState {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock ownership subsystem
pub struct MockOwnership {
    state: Arc<RwLock<MockOwnershipState>>,
}

impl MockOwnership {
    /// Ownership that grants every request
    pub fn granting() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockOwnershipState::new())),
        }
    }

    /// Ownership that denies every request
    pub fn denying() -> Self {
        let ownership = Self::granting();
        ownership.set_grant(false);
        ownership
    }

    /// Simulate another app taking or giving up the output
    pub fn set_grant(&self, grant: bool) {
        if let Ok(mut state) = self.state.write() {
            state.grant = grant;
        }
    }

    pub fn set_available(&self, available: bool) {
        if let Ok(mut state) = self.state.write() {
            state.available = available;
        }
    }

    pub fn is_held(&self) -> bool {
        self.state.read().map(|s| s.held).unwrap_or(false)
    }

    pub fn requests(&self) -> u32 {
        self.state.read().map(|s| s.requests).unwrap_or(0)
    }

    pub fn abandons(&self) -> u32 {
        self.state.read().map(|s| s.abandons).unwrap_or(0)
    }
}

impl Clone for MockOwnership {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl ResourceOwnership for MockOwnership {
    fn request(&mut self) -> Result<FocusGrant, OwnershipError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| OwnershipError::Unavailable("mock state poisoned".into()))?;

        state.requests += 1;
        if !state.available {
            return Err(OwnershipError::Unavailable("mock ownership offline".into()));
        }

        if state.grant {
            state.held = true;
            tracing::debug!("[MOCK] Ownership granted");
            Ok(FocusGrant::Granted)
        } else {
            tracing::debug!("[MOCK] Ownership denied");
            Ok(FocusGrant::Denied)
        }
    }

    fn abandon(&mut self) {
        if let Ok(mut state) = self.state.write() {
            state.abandons += 1;
            state.held = false;
        }
        tracing::debug!("[MOCK] Ownership abandoned");
    }
}

/// Complete mock HAL for testing
pub struct MockHal {
    pub profile: MockProfile,
    pub sink: MockAudioSink,
    pub ownership: MockOwnership,
}

impl MockHal {
    /// Create a mock HAL with the given profile and a granting ownership backend
    pub fn new(profile: MockProfile) -> Self {
        Self {
            profile,
            sink: MockAudioSink::new(profile),
            ownership: MockOwnership::granting(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_profiles() {
        for profile in MockProfile::all() {
            assert!(profile.max_volume() > 0);
        }
    }

    #[test]
    fn test_profile_from_name() {
        assert_eq!(MockProfile::from_name("phone"), Some(MockProfile::Phone));
        assert_eq!(MockProfile::from_name("HeadUnit"), Some(MockProfile::HeadUnit));
        assert_eq!(MockProfile::from_name("invalid"), None);
    }

    #[test]
    fn test_mock_sink_records_commands() {
        let mut sink = MockAudioSink::new(MockProfile::Phone);
        assert_eq!(sink.max_volume().unwrap(), 15);

        sink.set_volume(9).unwrap();
        sink.start_playback().unwrap();
        sink.pause_playback().unwrap();

        assert_eq!(sink.volume(), Some(9));
        assert!(!sink.is_playing());
        assert_eq!(
            sink.commands(),
            vec![SinkCommand::SetVolume(9), SinkCommand::Start, SinkCommand::Pause]
        );
    }

    #[test]
    fn test_mock_sink_clamps_volume() {
        let mut sink = MockAudioSink::new(MockProfile::Legacy);
        sink.set_volume(40).unwrap();
        assert_eq!(sink.volume(), Some(7));
    }

    #[test]
    fn test_mock_sink_offline() {
        let mut sink = MockAudioSink::new(MockProfile::Phone);
        sink.set_available(false);

        assert!(matches!(sink.max_volume(), Err(SinkError::Unavailable(_))));
        assert!(sink.set_volume(3).is_err());
        assert!(sink.commands().is_empty());

        sink.set_available(true);
        assert!(sink.set_volume(3).is_ok());
    }

    #[test]
    fn test_mock_ownership_grant_and_deny() {
        let mut ownership = MockOwnership::granting();
        assert_eq!(ownership.request().unwrap(), FocusGrant::Granted);
        assert!(ownership.is_held());

        ownership.abandon();
        assert!(!ownership.is_held());

        ownership.set_grant(false);
        assert_eq!(ownership.request().unwrap(), FocusGrant::Denied);
        assert!(!ownership.is_held());
        assert_eq!(ownership.requests(), 2);
        assert_eq!(ownership.abandons(), 1);
    }

    #[test]
    fn test_mock_ownership_offline() {
        let mut ownership = MockOwnership::denying();
        ownership.set_available(false);
        assert!(ownership.request().is_err());
    }

    #[test]
    fn test_mock_hal_shares_state() {
        let hal = MockHal::new(MockProfile::HeadUnit);
        let mut sink = hal.sink.clone();
        sink.set_volume(12).unwrap();
        assert_eq!(hal.sink.volume(), Some(12));
    }
}
