//! Audio focus arbitration
//!
//! Thin layer over whichever ownership backend the host selected. It keeps no
//! Held/Released bookkeeping of its own; the playback hysteresis owns that.

use sounddrive_hal::{FocusGrant, ResourceOwnership};

pub struct FocusArbiter {
    ownership: Box<dyn ResourceOwnership>,
}

impl FocusArbiter {
    pub fn new(ownership: Box<dyn ResourceOwnership>) -> Self {
        Self { ownership }
    }

    /// Ask for exclusive use of the audio output.
    ///
    /// Backend failures count as `Denied`: the caller only needs to know whether
    /// it may start playback this cycle.
    pub fn acquire(&mut self) -> FocusGrant {
        match self.ownership.request() {
            Ok(FocusGrant::Granted) => {
                tracing::debug!("Audio focus granted");
                FocusGrant::Granted
            }
            Ok(FocusGrant::Denied) => {
                tracing::warn!("Audio focus denied");
                FocusGrant::Denied
            }
            Err(e) => {
                tracing::warn!("Audio focus request failed: {}", e);
                FocusGrant::Denied
            }
        }
    }

    /// Give the audio output back. Safe to call when nothing is held.
    pub fn release(&mut self) {
        self.ownership.abandon();
        tracing::debug!("Audio focus released");
    }
}
