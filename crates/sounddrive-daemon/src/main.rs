//! SoundDrive daemon
//!
//! Hosts the speed controller: loads configuration, selects the audio and
//! ownership backends, then processes control events from stdin one at a time.
//! Every processed sample is reported as a JSON line on stdout; logs go to stderr.
//!
//! Usage: `sounddrive [CONFIG_FILE]`

mod events;

use anyhow::{Context, Result};
use serde::Serialize;
use sounddrive_config::{AudioBackend, DaemonConfig, OwnershipBackend, SoundDriveConfig};
use sounddrive_core::{ControlEffects, PlaybackCommand, PlaybackState, SpeedController};
use sounddrive_hal::mock::{MockAudioSink, MockOwnership, MockProfile};
use sounddrive_hal::{
    AmixerConfig, AmixerSink, AudioSink, LockFileOwnership, ResourceOwnership,
    UncontendedOwnership,
};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, channel};
use tracing::{info, warn};

use events::ControlEvent;

/// Line written to stdout
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Report {
    Sample {
        #[serde(flatten)]
        effects: ControlEffects,
        state: PlaybackState,
    },
    Rejected {
        reason: String,
    },
    Halted {
        playback: Option<PlaybackCommand>,
    },
}

fn main() -> Result<()> {
    setup_logging();

    info!("SoundDrive starting...");

    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    let (tx, rx) = channel();
    events::spawn_reader(BufReader::new(io::stdin()), tx);

    let mut stdout = io::stdout();
    run(&mut controller, &rx, &mut stdout)?;

    let playback = controller.halt();
    write_report(&mut stdout, &Report::Halted { playback })?;

    info!("SoundDrive exiting");
    Ok(())
}

/// Setup logging to stderr so stdout stays machine readable
fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

fn load_config() -> Result<SoundDriveConfig> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SoundDriveConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => SoundDriveConfig::load_default().context("Failed to load configuration"),
    }
}

fn build_sink(config: &DaemonConfig) -> Box<dyn AudioSink> {
    match config.audio_backend {
        AudioBackend::Mock => {
            let profile = MockProfile::from_env();
            info!("Using mock audio sink ({:?})", profile);
            Box::new(MockAudioSink::new(profile))
        }
        AudioBackend::Amixer => {
            if config.track.is_none() {
                warn!("No track configured, playback commands will fail");
            }
            info!("Using amixer sink on {}/{}", config.alsa_card, config.mixer_control);
            Box::new(AmixerSink::new(AmixerConfig {
                alsa_card: config.alsa_card.clone(),
                mixer_control: config.mixer_control.clone(),
                max_volume: config.max_volume,
                track: config.track.clone(),
                player: config.player.clone(),
                player_args: config.player_args.clone(),
            }))
        }
    }
}

fn build_ownership(config: &DaemonConfig) -> Box<dyn ResourceOwnership> {
    match config.ownership_backend {
        OwnershipBackend::Uncontended => Box::new(UncontendedOwnership),
        OwnershipBackend::LockFile => {
            info!("Audio ownership via {}", config.lock_file.display());
            Box::new(LockFileOwnership::new(&config.lock_file))
        }
        OwnershipBackend::MockDenied => {
            warn!("Audio ownership requests will always be denied");
            Box::new(MockOwnership::denying())
        }
    }
}

fn build_controller(config: &SoundDriveConfig) -> Result<SpeedController> {
    SpeedController::new(
        config.control,
        build_sink(&config.daemon),
        build_ownership(&config.daemon),
    )
    .context("Invalid control configuration")
}

/// Process events until `Quit` or the sender goes away
fn run<W: Write>(
    controller: &mut SpeedController,
    events: &Receiver<ControlEvent>,
    out: &mut W,
) -> Result<()> {
    for event in events.iter() {
        match event {
            ControlEvent::Speed { speed, source } => {
                let effects = controller.on_sample(speed, source);
                let state = controller.playback_state();
                write_report(out, &Report::Sample { effects, state })?;
            }
            ControlEvent::SetEnabled(enabled) => controller.set_enabled(enabled),
            ControlEvent::Configure(patch) => {
                let shared = controller.config();
                if let Err(e) = shared.configure(patch.apply(shared.snapshot())) {
                    write_report(out, &Report::Rejected { reason: e.to_string() })?;
                }
            }
            ControlEvent::Quit => break,
        }
    }
    Ok(())
}

fn write_report<W: Write>(out: &mut W, report: &Report) -> Result<()> {
    serde_json::to_writer(&mut *out, report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sounddrive_config::Configuration;
    use sounddrive_hal::mock::{MockHal, SinkCommand};
    use std::sync::mpsc::Sender;

    fn mock_controller(hal: &MockHal) -> SpeedController {
        let config = Configuration::new(3.0, 9.0, 12.0, true, 4.4, 0.5).unwrap();
        SpeedController::new(
            config,
            Box::new(hal.sink.clone()),
            Box::new(hal.ownership.clone()),
        )
        .unwrap()
    }

    fn send_lines(tx: &Sender<ControlEvent>, lines: &[&str]) {
        for line in lines {
            if let Some(event) = ControlEvent::parse(line).unwrap() {
                tx.send(event).unwrap();
            }
        }
    }

    fn reports(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_run_reports_each_sample() {
        let hal = MockHal::new(MockProfile::Phone);
        let mut controller = mock_controller(&hal);
        let (tx, rx) = channel();
        send_lines(&tx, &["1.0", "13", "speed 5 broadcast", "quit", "20"]);

        let mut out = Vec::new();
        run(&mut controller, &rx, &mut out).unwrap();

        let reports = reports(&out);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0]["event"], "sample");
        assert_eq!(reports[0]["set_volume"], 1);
        assert_eq!(reports[1]["playback"], "start");
        assert_eq!(reports[1]["state"], "playing");
        assert_eq!(reports[2]["playback"], "stop");
        assert_eq!(reports[2]["source"], "broadcast");
    }

    #[test]
    fn test_run_applies_configuration_in_order() {
        let hal = MockHal::new(MockProfile::Phone);
        let mut controller = mock_controller(&hal);
        let (tx, rx) = channel();
        send_lines(
            &tx,
            &["10", "configure start=10", "10", "disable", "10", "configure low=9 high=3"],
        );
        drop(tx);

        let mut out = Vec::new();
        run(&mut controller, &rx, &mut out).unwrap();

        let reports = reports(&out);
        assert_eq!(reports[0]["playback"], serde_json::Value::Null);
        assert_eq!(reports[1]["playback"], "start");
        assert_eq!(reports[2]["playback"], "stop");
        assert_eq!(reports[3]["event"], "rejected");
        assert_eq!(controller.config().snapshot().low_threshold, 3.0);
    }

    #[test]
    fn test_halt_after_run_pauses_sink() {
        let hal = MockHal::new(MockProfile::Phone);
        let mut controller = mock_controller(&hal);
        let (tx, rx) = channel();
        send_lines(&tx, &["15"]);
        drop(tx);

        let mut out = Vec::new();
        run(&mut controller, &rx, &mut out).unwrap();
        assert_eq!(controller.halt(), Some(PlaybackCommand::Stop));
        assert_eq!(hal.sink.commands().last(), Some(&SinkCommand::Pause));
    }

    #[test]
    fn test_build_from_default_config() {
        let config = SoundDriveConfig::default();
        let controller = build_controller(&config).unwrap();
        assert_eq!(controller.playback_state(), PlaybackState::Idle);
    }

    #[test]
    fn test_mock_denied_backend() {
        let config = DaemonConfig {
            ownership_backend: OwnershipBackend::MockDenied,
            ..DaemonConfig::default()
        };
        let mut ownership = build_ownership(&config);
        assert_eq!(
            ownership.request().unwrap(),
            sounddrive_hal::FocusGrant::Denied
        );
    }
}
