//! Threshold checks on the one-byte heart-rate characteristic.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::BeaconConfig;
use crate::error::DecodeError;
use crate::signal::AlertTrigger;

/// The firmware sends the averaged bpm as a single byte.
pub fn decode_heart_rate(payload: &[u8]) -> Result<u8, DecodeError> {
    payload.first().copied().ok_or(DecodeError::EmptyReading)
}

pub struct HeartRateMonitor {
    high_bpm: u8,
    low_bpm: u8,
    cooldown: Duration,
    last_high: Option<Instant>,
    last_low: Option<Instant>,
}

impl HeartRateMonitor {
    pub fn new(config: &BeaconConfig) -> Self {
        HeartRateMonitor {
            high_bpm: config.heart_rate_high_bpm,
            low_bpm: config.heart_rate_low_bpm,
            cooldown: config.heart_rate_cooldown(),
            last_high: None,
            last_low: None,
        }
    }

    /// Check one reading. A reading of 0 means the sensor has no contact;
    /// a real stop is reported by the firmware as `HEART_STOP`.
    pub fn observe(&mut self, bpm: u8, now: Instant) -> Option<AlertTrigger> {
        trace!(bpm, "heart rate reading");
        if bpm == 0 {
            return None;
        }

        let (last_fired, trigger) = if bpm > self.high_bpm {
            (&mut self.last_high, AlertTrigger::HeartRateHigh { bpm: f64::from(bpm) })
        } else if bpm < self.low_bpm {
            (&mut self.last_low, AlertTrigger::HeartRateLow { bpm: f64::from(bpm) })
        } else {
            return None;
        };

        if let Some(last) = *last_fired {
            if now.duration_since(last) < self.cooldown {
                debug!(bpm, "heart rate out of range, still cooling down");
                return None;
            }
        }

        *last_fired = Some(now);
        Some(trigger)
    }
}
