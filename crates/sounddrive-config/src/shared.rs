//! Configuration shared between the controller and a settings writer

use crate::{ConfigError, Configuration};
use std::sync::{Arc, RwLock};

/// Cloneable handle over one `Configuration`.
///
/// Writers go through `configure`, which validates before swapping; readers take
/// a `snapshot` so a whole control cycle sees one consistent threshold set.
#[derive(Debug, Clone, Default)]
pub struct SharedConfiguration {
    inner: Arc<RwLock<Configuration>>,
}

impl SharedConfiguration {
    pub fn new(config: Configuration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> Configuration {
        match self.inner.read() {
            Ok(config) => *config,
            // A writer never leaves a half-written value behind
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replace the configuration. Invalid values leave the previous one in place.
    pub fn configure(&self, config: Configuration) -> Result<(), ConfigError> {
        if let Err(e) = config.validate() {
            tracing::warn!("Rejected configuration: {}", e);
            return Err(e);
        }

        let mut current = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = config;
        tracing::info!(
            low = config.low_threshold,
            high = config.high_threshold,
            start = config.start_threshold,
            enabled = config.enabled,
            "Configuration updated"
        );
        Ok(())
    }

    /// Toggle speed-triggered playback
    pub fn set_enabled(&self, enabled: bool) {
        let mut current = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        current.enabled = enabled;
        tracing::info!("Playback {}", if enabled { "enabled" } else { "disabled" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_configure_replaces() {
        let shared = SharedConfiguration::default();
        let next = Configuration::new(1.0, 5.0, 6.0, true, 3.6, 1.0).unwrap();

        shared.configure(next).unwrap();
        assert_eq!(shared.snapshot(), next);
    }

    #[test]
    fn test_invalid_configure_keeps_previous() {
        let shared = SharedConfiguration::default();
        let invalid = Configuration {
            low_threshold: 9.0,
            high_threshold: 3.0,
            ..Configuration::default()
        };

        assert!(shared.configure(invalid).is_err());
        assert_eq!(shared.snapshot(), Configuration::default());
    }

    #[test]
    fn test_set_enabled() {
        let shared = SharedConfiguration::default();
        shared.set_enabled(false);
        assert!(!shared.snapshot().enabled);
        shared.set_enabled(true);
        assert!(shared.snapshot().enabled);
    }

    #[test]
    fn test_clones_share_state() {
        let shared = SharedConfiguration::default();
        let writer = shared.clone();

        let handle = thread::spawn(move || writer.set_enabled(false));
        handle.join().unwrap();

        assert!(!shared.snapshot().enabled);
    }
}
