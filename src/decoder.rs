//! Turns alert-characteristic payloads into typed triggers.
//!
//! The firmware sends plain ASCII codes. Anything outside the known
//! vocabulary is logged and dropped so newer firmware can add codes without
//! breaking older companions.

use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::signal::AlertTrigger;

/// Impact magnitude reported for `FALL_DETECTED`. The firmware sends no
/// payload with the code, so this is a fixed stand-in.
pub const FALL_MAGNITUDE: f64 = 2.5;

/// Receives every successfully decoded trigger.
pub trait TriggerHandler: Send + Sync {
    fn on_trigger(&self, trigger: AlertTrigger);
}

impl<F> TriggerHandler for F
where
    F: Fn(AlertTrigger) + Send + Sync,
{
    fn on_trigger(&self, trigger: AlertTrigger) {
        self(trigger)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SignalDecoder;

impl SignalDecoder {
    pub fn new() -> Self {
        SignalDecoder
    }

    /// Decode one payload. `Ok(None)` means the token was not recognised.
    pub fn decode(&self, payload: &[u8]) -> Result<Option<AlertTrigger>, DecodeError> {
        let token = std::str::from_utf8(payload)?;
        debug!(token, "alert token received");

        let trigger = match token {
            "FALL_DETECTED" => AlertTrigger::FallDetected { magnitude: FALL_MAGNITUDE },
            "HEART_STOP" => AlertTrigger::HeartStop,
            "MANUAL_ALERT" => AlertTrigger::ManualAlert,
            "FALSE_ALARM" => AlertTrigger::FalseAlarm,
            "DEVICE_WORN" => AlertTrigger::DeviceWorn,
            "DEVICE_NOT_WORN" => AlertTrigger::DeviceNotWorn,
            unknown => {
                warn!(token = unknown, "unknown alert token, dropping");
                return Ok(None);
            }
        };

        Ok(Some(trigger))
    }

    /// Decode and hand the trigger to `handler`. The handler runs at most once.
    pub fn process(
        &self,
        payload: &[u8],
        handler: &dyn TriggerHandler,
    ) -> Result<Option<AlertTrigger>, DecodeError> {
        let trigger = self.decode(payload)?;
        if let Some(trigger) = trigger {
            handler.on_trigger(trigger);
        }
        Ok(trigger)
    }
}
