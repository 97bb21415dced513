// Local notifications for classified alerts.
//
// - model.rs: requests, urgency levels, categories and their actions
// - center.rs: the platform seam and the window-backed implementation
// - service.rs: record -> request mapping and dispatch

pub mod center;
pub mod model;
pub mod service;

pub use center::{Completion, NotificationCenter, WindowNotificationCenter};
pub use model::{
    default_categories, NotificationAction, NotificationCategory, NotificationRequest,
    PresentedNotification, Urgency,
};
pub use service::{presentation_for, NotificationService};
