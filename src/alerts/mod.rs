// Alert classification and the in-memory alert log.
//
// - model.rs: alert kinds, severities and the record type
// - manager.rs: builds records from triggers, keeps the log, hands records
//   to the notification service

pub mod manager;
pub mod model;

pub use manager::{AlertManager, AlertOverrides};
pub use model::{AlertKind, AlertRecord, Severity};
