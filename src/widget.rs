use beacon_companion::alerts::{AlertRecord, Severity};
use beacon_companion::notification::{NotificationAction, PresentedNotification, Urgency};
use eframe::egui::{Button, Color32, Label, RichText, Rounding};

pub fn get_heart_rate_label(heart_rate: u8) -> Label {
    let text = if heart_rate == 0 {
        "HR: --".to_string()
    } else {
        format!("HR: {}", heart_rate)
    };
    let live_hr_text = RichText::new(text)
        .color(Color32::RED)
        .background_color(Color32::WHITE)
        .size(40.0);

    Label::new(live_hr_text)
}

pub fn get_status_label(status: &str, connected: bool) -> Label {
    let background = if connected { Color32::DARK_GREEN } else { Color32::DARK_GRAY };
    let text = RichText::new(status)
        .color(Color32::WHITE)
        .background_color(background)
        .size(20.0);

    Label::new(text)
}

fn urgency_color(urgency: Urgency) -> Color32 {
    match urgency {
        Urgency::Critical | Urgency::TimeSensitive => Color32::RED,
        Urgency::Active => Color32::DARK_GREEN,
        Urgency::Passive => Color32::GRAY,
    }
}

pub fn get_banner_title(notification: &PresentedNotification) -> Label {
    let text = RichText::new(&notification.request.title)
        .color(urgency_color(notification.request.urgency))
        .strong()
        .size(22.0);

    Label::new(text)
}

pub fn get_action_button(action: &NotificationAction) -> Button<'static> {
    let text = RichText::new(action.title.clone())
        .color(Color32::WHITE)
        .size(18.0);

    Button::new(text)
        .fill(Color32::BLUE)
        .rounding(Rounding::same(8.0))
}

pub fn get_close_button() -> Button<'static> {
    let text = RichText::new("Close")
        .color(Color32::RED)
        .background_color(Color32::WHITE)
        .size(18.0);

    Button::new(text)
        .fill(Color32::BLUE)
        .rounding(Rounding::same(8.0))
}

pub fn get_test_fall_button() -> Button<'static> {
    let text = RichText::new("Test fall")
        .color(Color32::WHITE)
        .size(18.0);

    Button::new(text)
        .fill(Color32::DARK_RED)
        .rounding(Rounding::same(8.0))
}

pub fn get_alert_row(record: &AlertRecord) -> Label {
    let color = match record.severity {
        Severity::Critical => Color32::RED,
        Severity::High => Color32::from_rgb(255, 140, 0),
        Severity::Medium => Color32::YELLOW,
        Severity::Low => Color32::LIGHT_GRAY,
    };
    let text = RichText::new(format!(
        "{}  {}  {}",
        record.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
        record.kind.display_name(),
        record.message
    ))
    .color(color)
    .size(16.0);

    Label::new(text)
}
