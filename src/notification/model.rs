use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const HEART_RATE_CATEGORY: &str = "HEART_RATE_ALERT";
pub const FALL_CATEGORY: &str = "FALL_ALERT";
pub const MANUAL_ALERT_CATEGORY: &str = "MANUAL_ALERT";
pub const FALSE_ALARM_CATEGORY: &str = "FALSE_ALARM";
pub const SOS_CATEGORY: &str = "SOS_ALERT";

/// How hard a notification may interrupt the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    Passive,
    Active,
    TimeSensitive,
    Critical,
}

/// Everything the platform needs to present one alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub category: String,
    /// Groups related notifications together.
    pub thread: String,
    pub urgency: Urgency,
    /// Alert record this notification was raised for.
    pub record_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub identifier: String,
    pub title: String,
    pub foreground: bool,
    pub authentication_required: bool,
}

impl NotificationAction {
    fn new(identifier: &str, title: &str) -> Self {
        NotificationAction {
            identifier: identifier.to_string(),
            title: title.to_string(),
            foreground: false,
            authentication_required: false,
        }
    }

    fn foreground(mut self) -> Self {
        self.foreground = true;
        self
    }

    fn authenticated(mut self) -> Self {
        self.authentication_required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCategory {
    pub identifier: String,
    pub actions: Vec<NotificationAction>,
    /// Report an explicit dismissal back to the app instead of dropping it.
    pub custom_dismiss: bool,
}

/// A notification as the user sees it, after the platform delay.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedNotification {
    pub id: Uuid,
    pub request: NotificationRequest,
    pub actions: Vec<NotificationAction>,
    /// Closing this notification counts as an answer.
    pub custom_dismiss: bool,
}

/// Categories registered once at startup, before any alert is dispatched.
pub fn default_categories() -> Vec<NotificationCategory> {
    let call_help = NotificationAction::new("CALL_HELP", "Call Emergency")
        .foreground()
        .authenticated();
    let dismiss_manual = NotificationAction::new("DISMISS_MANUAL", "Dismiss");

    vec![
        NotificationCategory {
            identifier: HEART_RATE_CATEGORY.to_string(),
            actions: vec![
                NotificationAction::new("VIEW_HEART_RATE", "View Details").foreground(),
                NotificationAction::new("DISMISS", "Dismiss"),
            ],
            custom_dismiss: false,
        },
        NotificationCategory {
            identifier: FALL_CATEGORY.to_string(),
            actions: vec![
                NotificationAction::new("FALL_OK", "I'm OK")
                    .foreground()
                    .authenticated(),
                NotificationAction::new("FALL_NEED_HELP", "Need Help")
                    .foreground()
                    .authenticated(),
            ],
            custom_dismiss: true,
        },
        NotificationCategory {
            identifier: MANUAL_ALERT_CATEGORY.to_string(),
            actions: vec![call_help.clone(), dismiss_manual.clone()],
            custom_dismiss: false,
        },
        NotificationCategory {
            identifier: FALSE_ALARM_CATEGORY.to_string(),
            actions: vec![],
            custom_dismiss: false,
        },
        NotificationCategory {
            identifier: SOS_CATEGORY.to_string(),
            actions: vec![call_help, dismiss_manual],
            custom_dismiss: false,
        },
    ]
}
