//! Speed-to-audio control logic
//!
//! Turns a stream of vehicle speed samples into volume and playback commands:
//!
//! - `volume`: pure mapping from speed to a device volume step
//! - `hysteresis`: Idle/Playing state machine around a single start threshold
//! - `focus`: acquire/release of the shared audio output
//! - `controller`: runs the above in order for every sample
//!
//! # Example
//!
//! ```no_run
//! use sounddrive_config::Configuration;
//! use sounddrive_core::SpeedController;
//! use sounddrive_hal::mock::{MockHal, MockProfile};
//!
//! fn main() -> Result<(), sounddrive_config::ConfigError> {
//!     let hal = MockHal::new(MockProfile::Phone);
//!     let mut controller = SpeedController::new(
//!         Configuration::default(),
//!         Box::new(hal.sink.clone()),
//!         Box::new(hal.ownership.clone()),
//!     )?;
//!
//!     let effects = controller.on_speed_sample(14.0);
//!     println!("volume {:?}, playback {:?}", effects.set_volume, effects.playback);
//!     Ok(())
//! }
//! ```

pub mod controller;
pub mod effects;
pub mod focus;
pub mod hysteresis;
pub mod volume;

pub use controller::SpeedController;
pub use effects::{ControlEffects, PlaybackCommand, SampleSource};
pub use focus::FocusArbiter;
pub use hysteresis::{FocusState, PlaybackHysteresis, PlaybackState, Transition};
pub use volume::{VolumeError, compute_volume};
