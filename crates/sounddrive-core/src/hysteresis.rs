//! Playback state machine
//!
//! One start threshold governs both directions: the track starts once speed
//! reaches it (and focus is granted) and pauses as soon as speed drops below it
//! or playback is disabled. Entering needs permission, leaving never does.

use crate::focus::FocusArbiter;
use serde::Serialize;
use sounddrive_hal::FocusGrant;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

/// Audio focus bookkeeping; `Held` exactly while `Playing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusState {
    #[default]
    Released,
    Held,
}

/// Result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No state change
    Unchanged,
    /// Idle -> Playing, focus granted
    Started,
    /// Start condition met but focus was denied; still Idle
    Denied,
    /// Playing -> Idle, focus released
    Stopped,
}

#[derive(Debug, Default)]
pub struct PlaybackHysteresis {
    state: PlaybackState,
    focus: FocusState,
}

impl PlaybackHysteresis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn focus(&self) -> FocusState {
        self.focus
    }

    /// Advance the state machine by one sample.
    ///
    /// Focus is acquired before entering `Playing` and released on every exit, so
    /// state and focus always change together.
    pub fn evaluate(
        &mut self,
        speed: f32,
        enabled: bool,
        start_threshold: f32,
        arbiter: &mut FocusArbiter,
    ) -> Transition {
        match self.state {
            PlaybackState::Idle => {
                if !(enabled && speed >= start_threshold) {
                    return Transition::Unchanged;
                }

                match arbiter.acquire() {
                    FocusGrant::Granted => {
                        self.state = PlaybackState::Playing;
                        self.focus = FocusState::Held;
                        tracing::info!(speed, start_threshold, "Playback started");
                        Transition::Started
                    }
                    FocusGrant::Denied => {
                        tracing::info!(speed, "Start threshold reached but focus denied");
                        Transition::Denied
                    }
                }
            }
            PlaybackState::Playing => {
                // Written as the negation of the stay condition so NaN speeds exit too
                if enabled && speed >= start_threshold {
                    return Transition::Unchanged;
                }

                arbiter.release();
                self.state = PlaybackState::Idle;
                self.focus = FocusState::Released;
                tracing::info!(speed, enabled, "Playback stopped");
                Transition::Stopped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sounddrive_hal::mock::MockOwnership;

    const START: f32 = 12.0;

    fn arbiter(ownership: &MockOwnership) -> FocusArbiter {
        FocusArbiter::new(Box::new(ownership.clone()))
    }

    fn run(inputs: &[(f32, bool)], ownership: &MockOwnership) -> Vec<PlaybackState> {
        let mut hysteresis = PlaybackHysteresis::new();
        let mut arbiter = arbiter(ownership);
        inputs
            .iter()
            .map(|&(speed, enabled)| {
                hysteresis.evaluate(speed, enabled, START, &mut arbiter);
                hysteresis.state()
            })
            .collect()
    }

    #[test]
    fn test_starts_idle_released() {
        let hysteresis = PlaybackHysteresis::new();
        assert_eq!(hysteresis.state(), PlaybackState::Idle);
        assert_eq!(hysteresis.focus(), FocusState::Released);
    }

    #[test]
    fn test_transition_table() {
        let ownership = MockOwnership::granting();
        let mut arbiter = arbiter(&ownership);
        let mut hysteresis = PlaybackHysteresis::new();

        assert_eq!(hysteresis.evaluate(11.9, true, START, &mut arbiter), Transition::Unchanged);
        assert_eq!(hysteresis.evaluate(20.0, false, START, &mut arbiter), Transition::Unchanged);
        assert_eq!(hysteresis.evaluate(12.0, true, START, &mut arbiter), Transition::Started);
        assert_eq!(hysteresis.evaluate(30.0, true, START, &mut arbiter), Transition::Unchanged);
        assert_eq!(hysteresis.evaluate(11.9, true, START, &mut arbiter), Transition::Stopped);
        assert_eq!(hysteresis.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_reference_sequence() {
        let ownership = MockOwnership::granting();
        let states = run(
            &[(1.0, true), (5.0, true), (9.0, true), (13.0, true), (13.0, true), (5.0, true)],
            &ownership,
        );

        use PlaybackState::*;
        assert_eq!(states, vec![Idle, Idle, Idle, Playing, Playing, Idle]);
        assert_eq!(ownership.requests(), 1);
        assert_eq!(ownership.abandons(), 1);
    }

    #[test]
    fn test_disable_exits_regardless_of_speed() {
        let ownership = MockOwnership::granting();
        let mut arbiter = arbiter(&ownership);
        let mut hysteresis = PlaybackHysteresis::new();

        hysteresis.evaluate(20.0, true, START, &mut arbiter);
        assert_eq!(hysteresis.state(), PlaybackState::Playing);

        assert_eq!(hysteresis.evaluate(50.0, false, START, &mut arbiter), Transition::Stopped);
        assert_eq!(hysteresis.focus(), FocusState::Released);
        assert!(!ownership.is_held());
    }

    #[test]
    fn test_denied_never_plays() {
        let ownership = MockOwnership::denying();
        let inputs: Vec<(f32, bool)> = (0..50).map(|i| (10.0 + i as f32, true)).collect();

        let states = run(&inputs, &ownership);

        assert!(states.iter().all(|s| *s == PlaybackState::Idle));
        // Every sample at or above the threshold retries
        assert_eq!(ownership.requests(), 48);
        assert_eq!(ownership.abandons(), 0);
    }

    #[test]
    fn test_denied_then_granted() {
        let ownership = MockOwnership::denying();
        let mut arbiter = arbiter(&ownership);
        let mut hysteresis = PlaybackHysteresis::new();

        assert_eq!(hysteresis.evaluate(15.0, true, START, &mut arbiter), Transition::Denied);
        assert_eq!(hysteresis.state(), PlaybackState::Idle);

        ownership.set_grant(true);
        assert_eq!(hysteresis.evaluate(15.0, true, START, &mut arbiter), Transition::Started);
    }

    #[test]
    fn test_nan_speed_exits() {
        let ownership = MockOwnership::granting();
        let mut arbiter = arbiter(&ownership);
        let mut hysteresis = PlaybackHysteresis::new();

        hysteresis.evaluate(15.0, true, START, &mut arbiter);
        assert_eq!(hysteresis.evaluate(f32::NAN, true, START, &mut arbiter), Transition::Stopped);
        assert_eq!(hysteresis.evaluate(f32::NAN, true, START, &mut arbiter), Transition::Unchanged);
    }

    #[test]
    fn test_focus_tracks_state() {
        let ownership = MockOwnership::granting();
        let mut arbiter = arbiter(&ownership);
        let mut hysteresis = PlaybackHysteresis::new();

        let speeds = [0.0, 12.0, 11.0, 13.0, 13.0, 2.0, 40.0, 12.0, 11.99, 12.0];
        for (i, speed) in speeds.iter().enumerate() {
            // Flip a denial in the middle of the run
            ownership.set_grant(i != 3);
            hysteresis.evaluate(*speed, i != 7, START, &mut arbiter);

            let playing = hysteresis.state() == PlaybackState::Playing;
            assert_eq!(hysteresis.focus() == FocusState::Held, playing);
            assert_eq!(ownership.is_held(), playing);
        }
    }

    #[test]
    fn test_replay_is_deterministic() {
        let inputs = [
            (3.0, true),
            (12.5, true),
            (12.5, false),
            (12.5, true),
            (11.0, true),
            (14.0, true),
            (0.0, true),
        ];

        let first = run(&inputs, &MockOwnership::granting());
        let second = run(&inputs, &MockOwnership::granting());
        assert_eq!(first, second);
    }
}
