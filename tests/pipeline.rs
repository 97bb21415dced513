//! End-to-end: raw alert payload -> decoder -> alert manager -> notification center.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use beacon_companion::alerts::{AlertKind, AlertManager, Severity};
use beacon_companion::config::BeaconConfig;
use beacon_companion::decoder::SignalDecoder;
use beacon_companion::error::{DecodeError, NotificationError};
use beacon_companion::logging::init_test_logging;
use beacon_companion::notification::{
    Completion, NotificationCategory, NotificationCenter, NotificationRequest, NotificationService,
    Urgency,
};

/// Records every request; optionally rejects them all.
#[derive(Default)]
struct RecordingCenter {
    categories: Mutex<Vec<NotificationCategory>>,
    requests: Mutex<Vec<(NotificationRequest, Duration)>>,
    reject: bool,
}

impl NotificationCenter for RecordingCenter {
    fn set_categories(&self, categories: Vec<NotificationCategory>) {
        *self.categories.lock().unwrap() = categories;
    }

    fn add(&self, request: NotificationRequest, delay: Duration, completion: Completion) {
        assert!(
            self.categories
                .lock()
                .unwrap()
                .iter()
                .any(|c| c.identifier == request.category),
            "dispatched before category {} was registered",
            request.category
        );
        self.requests.lock().unwrap().push((request, delay));
        if self.reject {
            completion(Err(NotificationError::Rejected("permission denied".into())));
        } else {
            completion(Ok(()));
        }
    }
}

struct Pipeline {
    decoder: SignalDecoder,
    alerts: AlertManager,
    center: Arc<RecordingCenter>,
}

impl Pipeline {
    fn new(center: RecordingCenter) -> Self {
        init_test_logging();
        let config = BeaconConfig::default();
        let center = Arc::new(center);
        let service = NotificationService::start(center.clone(), &config);
        Pipeline {
            decoder: SignalDecoder::new(),
            alerts: AlertManager::new(&config, Arc::new(service)),
            center,
        }
    }

    fn feed(&self, payload: &[u8]) -> Result<(), DecodeError> {
        self.decoder.process(payload, &self.alerts).map(|_| ())
    }

    fn requests(&self) -> Vec<(NotificationRequest, Duration)> {
        self.center.requests.lock().unwrap().clone()
    }
}

#[test]
fn test_manual_alert_end_to_end() {
    let pipeline = Pipeline::new(RecordingCenter::default());
    pipeline.feed(b"MANUAL_ALERT").unwrap();

    let history = pipeline.alerts.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, AlertKind::ManualAlert);
    assert_eq!(history[0].severity, Severity::Critical);

    let requests = pipeline.requests();
    assert_eq!(requests.len(), 1);
    let (request, delay) = &requests[0];
    assert_eq!(request.title, "🚨 MANUAL ALERT");
    assert_eq!(request.category, "MANUAL_ALERT");
    assert_eq!(request.thread, "manual-alert");
    assert_eq!(request.urgency, Urgency::TimeSensitive);
    assert_eq!(request.record_id, history[0].id);
    assert_eq!(*delay, Duration::from_secs(1));
}

#[test]
fn test_false_alarm_end_to_end() {
    let pipeline = Pipeline::new(RecordingCenter::default());
    pipeline.feed(b"FALSE_ALARM").unwrap();

    let history = pipeline.alerts.history();
    assert_eq!(history[0].kind, AlertKind::FalseAlarm);
    assert_eq!(history[0].severity, Severity::Low);

    let requests = pipeline.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0.title, "✅ False Alarm");
    assert_eq!(requests[0].0.category, "FALSE_ALARM");
    assert_eq!(requests[0].0.urgency, Urgency::Active);
}

#[test]
fn test_fall_detected_carries_fixed_magnitude() {
    let pipeline = Pipeline::new(RecordingCenter::default());
    pipeline.feed(b"FALL_DETECTED").unwrap();

    let record = &pipeline.alerts.history()[0];
    assert_eq!(record.kind, AlertKind::FallDetected);
    assert_eq!(record.value, Some(2.5));
    assert!(pipeline.requests()[0].0.body.contains("2.5g"));
}

#[test]
fn test_garbage_creates_nothing() {
    let pipeline = Pipeline::new(RecordingCenter::default());
    pipeline.feed(b"GARBAGE").unwrap();

    assert!(pipeline.alerts.history().is_empty());
    assert!(pipeline.alerts.active_alerts().is_empty());
    assert!(pipeline.requests().is_empty());
}

#[test]
fn test_invalid_utf8_is_reported_and_dropped() {
    let pipeline = Pipeline::new(RecordingCenter::default());
    assert!(matches!(
        pipeline.feed(&[0x80, 0x81]),
        Err(DecodeError::InvalidUtf8(_))
    ));
    assert!(pipeline.alerts.history().is_empty());
    assert!(pipeline.requests().is_empty());
}

#[test]
fn test_wear_status_is_recorded_silently() {
    let pipeline = Pipeline::new(RecordingCenter::default());
    pipeline.feed(b"DEVICE_WORN").unwrap();
    pipeline.feed(b"DEVICE_NOT_WORN").unwrap();

    let kinds: Vec<_> = pipeline.alerts.history().iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![AlertKind::DeviceWorn, AlertKind::DeviceNotWorn]);
    assert!(pipeline.requests().is_empty());
}

#[test]
fn test_rejected_notification_keeps_record() {
    let pipeline = Pipeline::new(RecordingCenter {
        reject: true,
        ..RecordingCenter::default()
    });
    pipeline.feed(b"HEART_STOP").unwrap();

    assert_eq!(pipeline.requests().len(), 1);
    let history = pipeline.alerts.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, AlertKind::HeartStop);
    assert_eq!(pipeline.alerts.active_alerts().len(), 1);
}

#[test]
fn test_sequence_keeps_arrival_order() {
    let pipeline = Pipeline::new(RecordingCenter::default());
    for token in ["MANUAL_ALERT", "UNKNOWN", "FALSE_ALARM", "HEART_STOP"] {
        pipeline.feed(token.as_bytes()).unwrap();
    }

    let history = pipeline.alerts.history();
    let kinds: Vec<_> = history.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![AlertKind::ManualAlert, AlertKind::FalseAlarm, AlertKind::HeartStop]
    );
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert_eq!(pipeline.requests().len(), 3);
}

#[test]
fn test_concurrent_classification_appends_every_record() {
    let pipeline = Arc::new(Pipeline::new(RecordingCenter::default()));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    pipeline.feed(b"DEVICE_WORN").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(pipeline.alerts.history().len(), 100);
}
