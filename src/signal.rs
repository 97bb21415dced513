use crate::alerts::AlertKind;
use crate::notification::PresentedNotification;

/// A discrete event reported by the beacon, already stripped of its wire form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertTrigger {
    HeartRateHigh { bpm: f64 },
    HeartRateLow { bpm: f64 },
    HeartStop,
    FallDetected { magnitude: f64 },
    ManualAlert,
    FalseAlarm,
    DeviceWorn,
    DeviceNotWorn,
    DeviceDisconnected,
    SosVoiceDetected,
}

impl AlertTrigger {
    pub fn kind(&self) -> AlertKind {
        match self {
            Self::HeartRateHigh { .. } => AlertKind::HeartRateHigh,
            Self::HeartRateLow { .. } => AlertKind::HeartRateLow,
            Self::HeartStop => AlertKind::HeartStop,
            Self::FallDetected { .. } => AlertKind::FallDetected,
            Self::ManualAlert => AlertKind::ManualAlert,
            Self::FalseAlarm => AlertKind::FalseAlarm,
            Self::DeviceWorn => AlertKind::DeviceWorn,
            Self::DeviceNotWorn => AlertKind::DeviceNotWorn,
            Self::DeviceDisconnected => AlertKind::DeviceDisconnected,
            Self::SosVoiceDetected => AlertKind::SosVoiceDetected,
        }
    }

    /// Numeric payload carried into the alert record, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::HeartRateHigh { bpm } | Self::HeartRateLow { bpm } => Some(*bpm),
            Self::HeartStop => Some(0.0),
            Self::FallDetected { magnitude } => Some(*magnitude),
            Self::ManualAlert
            | Self::FalseAlarm
            | Self::DeviceWorn
            | Self::DeviceNotWorn
            | Self::DeviceDisconnected
            | Self::SosVoiceDetected => None,
        }
    }
}

/// Commands the companion writes back to the beacon's control characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    ResetAlert,
    TriggerFall,
}

impl ControlCommand {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::ResetAlert => b"RESET_ALERT",
            Self::TriggerFall => b"TRIGGER_FALL",
        }
    }
}

/// Sent from the BLE / notification side to the window.
#[derive(Debug, Clone)]
pub enum BeaconSignal {
    HeartRate {
        bpm: u8,
    },
    ScanStarted,
    ActiveDevice(String),
    DeviceDisconnected,
    Notification(PresentedNotification),
}

/// Sent from the window to the BLE link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiSignal {
    Control(ControlCommand),
}
