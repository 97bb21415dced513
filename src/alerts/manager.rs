// Alert manager - builds alert records from triggers and keeps the alert log.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::model::{default_message, AlertRecord, Severity};
use crate::config::BeaconConfig;
use crate::decoder::TriggerHandler;
use crate::notification::NotificationService;
use crate::signal::AlertTrigger;

/// Caller-supplied replacements for a trigger's default message and severity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertOverrides {
    pub message: Option<String>,
    pub severity: Option<Severity>,
}

impl AlertOverrides {
    pub fn message(message: impl Into<String>) -> Self {
        AlertOverrides {
            message: Some(message.into()),
            severity: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Active and historical alerts, oldest first. Both are bounded; the oldest
/// entry is dropped once a list is full.
struct AlertLog {
    active: VecDeque<AlertRecord>,
    history: VecDeque<AlertRecord>,
    active_capacity: usize,
    history_capacity: usize,
    last_timestamp: Option<DateTime<Utc>>,
}

impl AlertLog {
    fn push(&mut self, record: AlertRecord) {
        if self.active.len() == self.active_capacity {
            if let Some(evicted) = self.active.pop_front() {
                debug!(id = %evicted.id, "active alert list full, dropping oldest");
            }
        }
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.active.push_back(record.clone());
        self.history.push_back(record);
    }

    /// Wall-clock time, clamped so records never go backwards.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}

pub struct AlertManager {
    log: Mutex<AlertLog>,
    notifications: Arc<NotificationService>,
}

impl AlertManager {
    pub fn new(config: &BeaconConfig, notifications: Arc<NotificationService>) -> Self {
        AlertManager {
            log: Mutex::new(AlertLog {
                active: VecDeque::new(),
                history: VecDeque::new(),
                active_capacity: config.active_capacity.max(1),
                history_capacity: config.history_capacity.max(1),
                last_timestamp: None,
            }),
            notifications,
        }
    }

    fn log(&self) -> MutexGuard<'_, AlertLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Classify with the default message and severity for the trigger.
    pub fn classify(&self, trigger: AlertTrigger) -> AlertRecord {
        self.classify_with(trigger, AlertOverrides::default())
    }

    /// Build a record for `trigger`, append it to the active list and
    /// history, then hand it to the notification service.
    pub fn classify_with(&self, trigger: AlertTrigger, overrides: AlertOverrides) -> AlertRecord {
        let kind = trigger.kind();
        let record = {
            let mut log = self.log();
            let record = AlertRecord {
                id: Uuid::new_v4(),
                kind,
                message: overrides.message.unwrap_or_else(|| default_message(&trigger)),
                severity: overrides.severity.unwrap_or_else(|| kind.default_severity()),
                value: trigger.value(),
                timestamp: log.next_timestamp(),
            };
            log.push(record.clone());
            record
        };

        info!(
            kind = ?record.kind,
            severity = ?record.severity,
            id = %record.id,
            message = %record.message,
            "alert triggered"
        );

        self.notifications.dispatch(&record);
        record
    }

    pub fn trigger_manual_alert(&self, message: impl Into<String>, severity: Severity) -> AlertRecord {
        self.classify_with(
            AlertTrigger::ManualAlert,
            AlertOverrides::message(message).with_severity(severity),
        )
    }

    pub fn trigger_false_alarm(&self, message: impl Into<String>) -> AlertRecord {
        self.classify_with(AlertTrigger::FalseAlarm, AlertOverrides::message(message))
    }

    pub fn active_alerts(&self) -> Vec<AlertRecord> {
        self.log().active.iter().cloned().collect()
    }

    pub fn history(&self) -> Vec<AlertRecord> {
        self.log().history.iter().cloned().collect()
    }

    /// Remove an alert from the active list. History is left untouched.
    pub fn acknowledge(&self, id: Uuid) -> Option<AlertRecord> {
        let mut log = self.log();
        let index = log.active.iter().position(|r| r.id == id)?;
        log.active.remove(index)
    }

    pub fn clear_active(&self) -> usize {
        let mut log = self.log();
        let cleared = log.active.len();
        log.active.clear();
        cleared
    }
}

impl TriggerHandler for AlertManager {
    fn on_trigger(&self, trigger: AlertTrigger) {
        self.classify(trigger);
    }
}
