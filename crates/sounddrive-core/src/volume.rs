//! Speed to volume mapping

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("Volume band is empty: low ({low}) must be below high ({high})")]
    EmptyBand { low: f32, high: f32 },

    #[error("Device maximum volume must be positive, got {0}")]
    InvalidMaxVolume(i32),
}

/// Map a speed onto a volume step in `[1, max_volume]`.
///
/// The speed is normalized against the `[low, high]` band without clamping, scaled
/// to the device range, damped by `sensitivity` and truncated toward zero. Only the
/// final step is clamped, so the result is never 0 (silence belongs to pausing).
pub fn compute_volume(
    speed: f32,
    low: f32,
    high: f32,
    max_volume: i32,
    sensitivity: f32,
) -> Result<i32, VolumeError> {
    if max_volume <= 0 {
        return Err(VolumeError::InvalidMaxVolume(max_volume));
    }
    if low.is_nan() || high.is_nan() || low >= high {
        return Err(VolumeError::EmptyBand { low, high });
    }

    let normalized = (speed - low) / (high - low);
    let scaled = normalized * max_volume as f32 * sensitivity;

    // `as` truncates toward zero and saturates; NaN becomes 0
    Ok((scaled as i32).clamp(1, max_volume))
}
