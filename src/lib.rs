//! Companion for the BEACON wearable safety device.
//!
//! Alert codes from the beacon flow through [`decoder`] into
//! [`alerts::AlertManager`], which records them and hands them to
//! [`notification::NotificationService`] for presentation.

pub mod alerts;
pub mod ble;
pub mod config;
pub mod decoder;
pub mod error;
pub mod fake;
pub mod heart_rate;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod signal;

pub use alerts::{AlertKind, AlertManager, AlertOverrides, AlertRecord, Severity};
pub use config::BeaconConfig;
pub use decoder::{SignalDecoder, TriggerHandler};
pub use error::{ConfigError, DecodeError, NotificationError};
pub use monitor::HealthMonitor;
pub use notification::{NotificationCenter, NotificationService};
pub use signal::AlertTrigger;
