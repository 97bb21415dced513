//! Maps alert records to notifications and hands them to the platform.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use super::center::NotificationCenter;
use super::model::{
    default_categories, NotificationRequest, Urgency, FALL_CATEGORY, FALSE_ALARM_CATEGORY,
    HEART_RATE_CATEGORY, MANUAL_ALERT_CATEGORY, SOS_CATEGORY,
};
use crate::alerts::{AlertKind, AlertRecord};
use crate::config::BeaconConfig;

pub struct NotificationService {
    center: Arc<dyn NotificationCenter>,
    delay: Duration,
    baseline_bpm: f64,
}

impl NotificationService {
    /// Registers the notification categories with `center`, so every
    /// dispatch through the returned service sees them.
    pub fn start(center: Arc<dyn NotificationCenter>, config: &BeaconConfig) -> Self {
        let categories = default_categories();
        info!(count = categories.len(), "registering notification categories");
        center.set_categories(categories);

        NotificationService {
            center,
            delay: config.notification_delay(),
            baseline_bpm: config.baseline_bpm,
        }
    }

    /// Schedule a notification for `record`, if its kind gets one.
    /// Returns without waiting for the platform.
    pub fn dispatch(&self, record: &AlertRecord) {
        let Some(request) = presentation_for(record, self.baseline_bpm) else {
            debug!(kind = ?record.kind, id = %record.id, "no notification for alert kind");
            return;
        };

        info!(
            title = %request.title,
            category = %request.category,
            urgency = ?request.urgency,
            "sending notification"
        );

        let record_id = record.id;
        self.center.add(
            request,
            self.delay,
            Box::new(move |result| match result {
                Ok(()) => debug!(%record_id, "notification scheduled"),
                Err(err) => warn!(%record_id, error = %err, "failed to send notification"),
            }),
        );
    }
}

/// The notification a record should raise, or `None` for kinds that are
/// recorded silently.
pub fn presentation_for(record: &AlertRecord, baseline_bpm: f64) -> Option<NotificationRequest> {
    let (title, body, category, thread, urgency) = match record.kind {
        AlertKind::HeartRateHigh | AlertKind::HeartRateLow => {
            let current = record.value.unwrap_or(0.0);
            let variation = (current - baseline_bpm).abs();
            let (title, direction) = if current > baseline_bpm {
                ("⚠️ High Heart Rate", "above")
            } else {
                ("⚠️ Low Heart Rate", "below")
            };
            (
                title.to_string(),
                format!(
                    "Heart rate is {current:.0} BPM, {variation:.0} BPM {direction} your baseline of {baseline_bpm:.0} BPM"
                ),
                HEART_RATE_CATEGORY,
                "heart-rate",
                Urgency::TimeSensitive,
            )
        }
        AlertKind::HeartStop => (
            "🚨 No Heartbeat Detected".to_string(),
            "The wearable device stopped detecting a heartbeat. Check on the wearer now."
                .to_string(),
            HEART_RATE_CATEGORY,
            "heart-rate",
            Urgency::TimeSensitive,
        ),
        AlertKind::FallDetected => {
            let magnitude = record.value.unwrap_or(0.0);
            let at = record.timestamp.with_timezone(&Local).format("%H:%M:%S");
            (
                "🚨 Fall Detected".to_string(),
                format!("Impact of {magnitude:.1}g detected at {at}. Are you OK?"),
                FALL_CATEGORY,
                "fall-detection",
                Urgency::TimeSensitive,
            )
        }
        AlertKind::ManualAlert => (
            "🚨 MANUAL ALERT".to_string(),
            "Emergency button pressed on wearable device!".to_string(),
            MANUAL_ALERT_CATEGORY,
            "manual-alert",
            Urgency::TimeSensitive,
        ),
        AlertKind::FalseAlarm => (
            "✅ False Alarm".to_string(),
            "Alert cancelled by user (double button press)".to_string(),
            FALSE_ALARM_CATEGORY,
            "false-alarm",
            Urgency::Active,
        ),
        AlertKind::DeviceWorn | AlertKind::DeviceNotWorn => return None,
        // Reserved; disconnects are shown in the status bar instead.
        AlertKind::DeviceDisconnected => return None,
        AlertKind::SosVoiceDetected => (
            "🚨 SOS Voice Detected".to_string(),
            record.message.clone(),
            SOS_CATEGORY,
            "sos-voice",
            Urgency::TimeSensitive,
        ),
    };

    Some(NotificationRequest {
        title,
        body,
        category: category.to_string(),
        thread: thread.to_string(),
        urgency,
        record_id: record.id,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::alerts::Severity;

    fn record(kind: AlertKind, value: Option<f64>) -> AlertRecord {
        AlertRecord {
            id: Uuid::new_v4(),
            kind,
            message: "custom message".to_string(),
            severity: Severity::High,
            value,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_silent_kinds() {
        for kind in AlertKind::all() {
            let silent = matches!(
                kind,
                AlertKind::DeviceWorn | AlertKind::DeviceNotWorn | AlertKind::DeviceDisconnected
            );
            assert_eq!(presentation_for(&record(*kind, None), 75.0).is_none(), silent, "{kind:?}");
        }
    }

    #[test]
    fn test_heart_rate_title_follows_baseline() {
        let high = presentation_for(&record(AlertKind::HeartRateHigh, Some(140.0)), 75.0).unwrap();
        assert_eq!(high.title, "⚠️ High Heart Rate");
        assert!(high.body.contains("65 BPM above"));

        let low = presentation_for(&record(AlertKind::HeartRateLow, Some(40.0)), 75.0).unwrap();
        assert_eq!(low.title, "⚠️ Low Heart Rate");
        assert!(low.body.contains("35 BPM below"));
        assert_eq!(low.category, HEART_RATE_CATEGORY);
    }

    #[test]
    fn test_fall_body_includes_magnitude() {
        let fall = presentation_for(&record(AlertKind::FallDetected, Some(2.5)), 75.0).unwrap();
        assert_eq!(fall.title, "🚨 Fall Detected");
        assert!(fall.body.contains("2.5g"));
        assert_eq!(fall.category, FALL_CATEGORY);
        assert_eq!(fall.urgency, Urgency::TimeSensitive);
    }

    #[test]
    fn test_false_alarm_is_less_urgent() {
        let request = presentation_for(&record(AlertKind::FalseAlarm, None), 75.0).unwrap();
        assert_eq!(request.title, "✅ False Alarm");
        assert_eq!(request.urgency, Urgency::Active);
        assert!(request.urgency < Urgency::TimeSensitive);
    }

    #[test]
    fn test_sos_uses_record_message() {
        let sos = record(AlertKind::SosVoiceDetected, None);
        let request = presentation_for(&sos, 75.0).unwrap();
        assert_eq!(request.body, "custom message");
        assert_eq!(request.category, SOS_CATEGORY);
        assert_eq!(request.thread, "sos-voice");
        assert_eq!(request.record_id, sos.id);
    }
}
