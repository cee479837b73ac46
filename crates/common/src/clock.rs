//! Clock and pacing utilities for the frame loop.
//!
//! Every session is anchored to a monotonic epoch recorded at `start`.
//! Frame timestamps handed to the detector and the signal processor are
//! milliseconds since that epoch, as fractional `f64` values.

use std::time::{Duration, Instant};

/// A session clock that provides monotonic millisecond timestamps
/// relative to a fixed epoch (the moment the session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Milliseconds elapsed since session start.
    pub fn elapsed_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1_000.0
    }

    /// Seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert a millisecond timestamp to a `Duration`.
    ///
    /// Negative and non-finite values collapse to zero; values too large
    /// for a `Duration` saturate at `Duration::MAX`.
    pub fn ms_to_duration(ms: f64) -> Duration {
        if ms.is_finite() && ms > 0.0 {
            Duration::try_from_secs_f64(ms / 1_000.0).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

/// Interval between frames for a target refresh rate.
///
/// A target of 0 Hz means the loop is unpaced and runs as fast as the
/// frame source delivers.
pub fn frame_interval(target_fps: u32) -> Option<Duration> {
    if target_fps == 0 {
        None
    } else {
        Some(Duration::from_nanos(1_000_000_000 / target_fps as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        // Should be very small but non-negative
        assert!(clock.elapsed_ms() >= 0.0);
        assert!(clock.elapsed_ms() < 1_000.0);
    }

    #[test]
    fn test_ms_to_duration() {
        assert_eq!(SessionClock::ms_to_duration(1_500.0), Duration::from_millis(1_500));
        assert_eq!(SessionClock::ms_to_duration(-3.0), Duration::ZERO);
        assert_eq!(SessionClock::ms_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(SessionClock::ms_to_duration(1e25), Duration::MAX);
        assert_eq!(SessionClock::ms_to_duration(f64::MAX), Duration::MAX);
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval(0), None);
        assert_eq!(frame_interval(50), Some(Duration::from_millis(20)));
        // 60Hz ~ 16.67ms
        let interval = frame_interval(60).unwrap();
        assert!(interval > Duration::from_millis(16) && interval < Duration::from_millis(17));
    }
}
