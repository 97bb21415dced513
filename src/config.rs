//! Companion configuration.
//!
//! Every field has a default matching the stock beacon firmware, so a
//! missing config file is not an error. A YAML file overrides any subset.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;

pub const DEFAULT_DEVICE_NAME: &str = "ESP32-BEACON";
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x12345678_9012_3456_7890_1234567890ab);
pub const HEART_RATE_CHAR_UUID: Uuid = Uuid::from_u128(0x12345678_9012_3456_7890_1234567890ac);
pub const ALERT_CHAR_UUID: Uuid = Uuid::from_u128(0x12345678_9012_3456_7890_1234567890ad);
pub const CONTROL_CHAR_UUID: Uuid = Uuid::from_u128(0x12345678_9012_3456_7890_1234567890ae);
/// Upper bound for either alert list.
pub const MAX_ALERT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// Advertised local name of the beacon to connect to.
    pub device_name: String,
    pub service_uuid: Uuid,
    pub alert_characteristic: Uuid,
    pub heart_rate_characteristic: Uuid,
    pub control_characteristic: Uuid,
    /// Delay between dispatch and presentation of a notification.
    pub notification_delay_ms: u64,
    /// Resting heart rate that high/low readings are compared against.
    pub baseline_bpm: f64,
    pub heart_rate_high_bpm: u8,
    pub heart_rate_low_bpm: u8,
    pub heart_rate_cooldown_secs: u64,
    /// Most alerts kept in the active list before the oldest is dropped.
    pub active_capacity: usize,
    /// Most alerts kept in history before the oldest is dropped.
    pub history_capacity: usize,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        BeaconConfig {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            service_uuid: SERVICE_UUID,
            alert_characteristic: ALERT_CHAR_UUID,
            heart_rate_characteristic: HEART_RATE_CHAR_UUID,
            control_characteristic: CONTROL_CHAR_UUID,
            notification_delay_ms: 1000,
            baseline_bpm: 75.0,
            heart_rate_high_bpm: 120,
            heart_rate_low_bpm: 45,
            heart_rate_cooldown_secs: 30,
            active_capacity: 50,
            history_capacity: 500,
        }
    }
}

impl BeaconConfig {
    /// Load from `path`, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: BeaconConfig =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_name.trim().is_empty() {
            return Err(ConfigError::Invalid("device_name must not be empty".into()));
        }
        if self.active_capacity == 0 || self.history_capacity == 0 {
            return Err(ConfigError::Invalid("alert capacities must be at least 1".into()));
        }
        if self.active_capacity > MAX_ALERT_CAPACITY || self.history_capacity > MAX_ALERT_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "alert capacities must be at most {MAX_ALERT_CAPACITY}"
            )));
        }
        if self.heart_rate_low_bpm >= self.heart_rate_high_bpm {
            return Err(ConfigError::Invalid(format!(
                "heart_rate_low_bpm ({}) must be below heart_rate_high_bpm ({})",
                self.heart_rate_low_bpm, self.heart_rate_high_bpm
            )));
        }
        if !(self.baseline_bpm > 0.0) {
            return Err(ConfigError::Invalid("baseline_bpm must be positive".into()));
        }
        let low = f64::from(self.heart_rate_low_bpm);
        let high = f64::from(self.heart_rate_high_bpm);
        if !(low < self.baseline_bpm && self.baseline_bpm < high) {
            return Err(ConfigError::Invalid(format!(
                "baseline_bpm ({}) must lie between heart_rate_low_bpm ({}) and heart_rate_high_bpm ({})",
                self.baseline_bpm, self.heart_rate_low_bpm, self.heart_rate_high_bpm
            )));
        }
        Ok(())
    }

    pub fn notification_delay(&self) -> Duration {
        Duration::from_millis(self.notification_delay_ms)
    }

    pub fn heart_rate_cooldown(&self) -> Duration {
        Duration::from_secs(self.heart_rate_cooldown_secs)
    }
}
