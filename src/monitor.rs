//! Entry point for everything the beacon sends.
//!
//! The transport hands raw characteristic payloads to [`HealthMonitor`];
//! it decodes them, runs heart-rate checks and classifies the resulting
//! triggers. Errors are logged here and never reach the transport.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::alerts::{AlertKind, AlertManager, AlertRecord};
use crate::decoder::SignalDecoder;
use crate::heart_rate::{decode_heart_rate, HeartRateMonitor};
use crate::signal::{AlertTrigger, ControlCommand};

pub struct HealthMonitor {
    decoder: SignalDecoder,
    heart_rate: Mutex<HeartRateMonitor>,
    alerts: Arc<AlertManager>,
}

impl HealthMonitor {
    pub fn new(alerts: Arc<AlertManager>, heart_rate: HeartRateMonitor) -> Self {
        HealthMonitor {
            decoder: SignalDecoder::new(),
            heart_rate: Mutex::new(heart_rate),
            alerts,
        }
    }

    pub fn alerts(&self) -> &Arc<AlertManager> {
        &self.alerts
    }

    /// Payload from the alert characteristic.
    pub fn handle_alert_payload(&self, payload: &[u8]) -> Option<AlertTrigger> {
        match self.decoder.process(payload, self.alerts.as_ref()) {
            Ok(trigger) => trigger,
            Err(err) => {
                warn!(error = %err, len = payload.len(), "failed to decode alert payload");
                None
            }
        }
    }

    /// Payload from the heart-rate characteristic. Returns the reading so
    /// the caller can display it.
    pub fn handle_heart_rate_payload(&self, payload: &[u8]) -> Option<u8> {
        let bpm = match decode_heart_rate(payload) {
            Ok(bpm) => bpm,
            Err(err) => {
                warn!(error = %err, "failed to decode heart rate payload");
                return None;
            }
        };

        let trigger = self
            .heart_rate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(bpm, Instant::now());
        if let Some(trigger) = trigger {
            self.alerts.classify(trigger);
        }
        Some(bpm)
    }

    pub fn device_disconnected(&self) -> AlertRecord {
        self.alerts.classify(AlertTrigger::DeviceDisconnected)
    }

    /// The user answered an alert. Returns the command to send to the
    /// beacon, if the alert is one the firmware is still signalling.
    pub fn acknowledge(&self, id: Uuid) -> Option<ControlCommand> {
        let record = self.alerts.acknowledge(id)?;
        info!(id = %record.id, kind = ?record.kind, "alert acknowledged");

        match record.kind {
            AlertKind::FallDetected
            | AlertKind::HeartStop
            | AlertKind::ManualAlert
            | AlertKind::SosVoiceDetected => Some(ControlCommand::ResetAlert),
            AlertKind::HeartRateHigh
            | AlertKind::HeartRateLow
            | AlertKind::FalseAlarm
            | AlertKind::DeviceWorn
            | AlertKind::DeviceNotWorn
            | AlertKind::DeviceDisconnected => None,
        }
    }

    /// The user picked `action` on the notification for `record_id`, or
    /// closed it (`None`). Closing only counts as an answer when the
    /// notification's category reports dismissals.
    pub fn respond(&self, record_id: Uuid, action: Option<&str>, custom_dismiss: bool) -> Option<ControlCommand> {
        match action {
            Some("FALL_NEED_HELP") | Some("CALL_HELP") => {
                warn!(%record_id, "user asked for help, alert stays active");
                None
            }
            Some("FALL_OK") | Some("DISMISS") | Some("DISMISS_MANUAL") => self.acknowledge(record_id),
            Some(other) => {
                debug!(action = other, %record_id, "notification action");
                None
            }
            None if custom_dismiss => {
                info!(%record_id, "notification dismissed");
                self.acknowledge(record_id)
            }
            None => None,
        }
    }
}
