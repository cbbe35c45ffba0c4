//! Hardware Abstraction Layer (HAL)
//!
//! This crate lets the speed controller drive the device's audio output without
//! knowing how volume, playback and audio ownership are implemented on the host.
//!
//! # Backends
//!
//! - `AmixerSink`: ALSA mixer volume plus an external looping player process
//! - `LockFileOwnership`: exclusive audio ownership across processes via `flock`
//! - `UncontendedOwnership`: hosts where nothing else competes for the output
//! - `mock`: in-memory backends for tests and desktop development
//!
//! # Example
//!
//! ```no_run
//! use sounddrive_hal::{AudioSink, FocusGrant, LockFileOwnership, ResourceOwnership};
//! use sounddrive_hal::mock::{MockAudioSink, MockProfile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sink = MockAudioSink::new(MockProfile::Phone);
//!     let mut ownership = LockFileOwnership::new("/tmp/sounddrive-audio.lock");
//!
//!     if ownership.request()? == FocusGrant::Granted {
//!         sink.set_volume(sink.max_volume()?)?;
//!         sink.start_playback()?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod mock;
pub mod ownership;

pub use audio::{AmixerConfig, AmixerSink, AudioSink, SinkError};
pub use ownership::{
    FocusGrant, LockFileOwnership, OwnershipError, ResourceOwnership, UncontendedOwnership,
};
