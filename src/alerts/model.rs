// Alert model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signal::AlertTrigger;

/// Type tag of an alert record, one per trigger variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    HeartRateHigh,
    HeartRateLow,
    HeartStop,
    FallDetected,
    ManualAlert,
    FalseAlarm,
    DeviceWorn,
    DeviceNotWorn,
    DeviceDisconnected,
    SosVoiceDetected,
}

impl AlertKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HeartRateHigh => "High Heart Rate",
            Self::HeartRateLow => "Low Heart Rate",
            Self::HeartStop => "Heart Stop",
            Self::FallDetected => "Fall Detected",
            Self::ManualAlert => "Manual Alert",
            Self::FalseAlarm => "False Alarm",
            Self::DeviceWorn => "Device Worn",
            Self::DeviceNotWorn => "Device Not Worn",
            Self::DeviceDisconnected => "Device Disconnected",
            Self::SosVoiceDetected => "SOS Voice Detected",
        }
    }

    /// Severity used when the caller does not supply one.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::HeartStop | Self::FallDetected | Self::ManualAlert | Self::SosVoiceDetected => {
                Severity::Critical
            }
            Self::HeartRateHigh | Self::HeartRateLow => Severity::High,
            Self::DeviceNotWorn | Self::DeviceDisconnected => Severity::Medium,
            Self::FalseAlarm | Self::DeviceWorn => Severity::Low,
        }
    }

    pub fn all() -> &'static [AlertKind] {
        &[
            Self::HeartRateHigh,
            Self::HeartRateLow,
            Self::HeartStop,
            Self::FallDetected,
            Self::ManualAlert,
            Self::FalseAlarm,
            Self::DeviceWorn,
            Self::DeviceNotWorn,
            Self::DeviceDisconnected,
            Self::SosVoiceDetected,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Message used when the caller does not supply one.
pub fn default_message(trigger: &AlertTrigger) -> String {
    match trigger {
        AlertTrigger::HeartRateHigh { bpm } => format!("Heart rate elevated: {bpm:.0} BPM"),
        AlertTrigger::HeartRateLow { bpm } => format!("Heart rate low: {bpm:.0} BPM"),
        AlertTrigger::HeartStop => "No heartbeat detected by wearable device!".to_string(),
        AlertTrigger::FallDetected { magnitude } => {
            format!("Fall detected with impact magnitude {magnitude:.1}g")
        }
        AlertTrigger::ManualAlert => "Emergency button pressed on wearable device!".to_string(),
        AlertTrigger::FalseAlarm => "Alert cancelled by user (double button press)".to_string(),
        AlertTrigger::DeviceWorn => "Wearable device is being worn".to_string(),
        AlertTrigger::DeviceNotWorn => "Wearable device was taken off".to_string(),
        AlertTrigger::DeviceDisconnected => "Wearable device disconnected".to_string(),
        AlertTrigger::SosVoiceDetected => "SOS voice command detected".to_string(),
    }
}

/// One classified event. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: Uuid,
    pub kind: AlertKind,
    pub message: String,
    pub severity: Severity,
    pub value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_have_names() {
        for kind in AlertKind::all() {
            assert!(!kind.display_name().is_empty());
        }
    }

    #[test]
    fn test_default_severities() {
        assert_eq!(AlertKind::ManualAlert.default_severity(), Severity::Critical);
        assert_eq!(AlertKind::FalseAlarm.default_severity(), Severity::Low);
        assert!(Severity::Critical > Severity::High);
    }

    #[test]
    fn test_kind_serializes_with_firmware_names() {
        let yaml = serde_yaml::to_string(&AlertKind::SosVoiceDetected).unwrap();
        assert_eq!(yaml.trim(), "SOS_VOICE_DETECTED");
        let yaml = serde_yaml::to_string(&AlertKind::HeartRateHigh).unwrap();
        assert_eq!(yaml.trim(), "HEART_RATE_HIGH");
    }

    #[test]
    fn test_fall_message_carries_magnitude() {
        let message = default_message(&AlertTrigger::FallDetected { magnitude: 2.5 });
        assert!(message.contains("2.5g"));
    }
}
