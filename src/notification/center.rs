//! The platform side of notifications.
//!
//! [`NotificationCenter`] is the seam between the dispatcher and whatever
//! actually shows notifications. `add` must return immediately; the outcome
//! arrives later through the completion callback.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::Sender as TokioSender;
use tracing::debug;
use uuid::Uuid;

use super::model::{NotificationCategory, NotificationRequest, PresentedNotification};
use crate::error::NotificationError;
use crate::signal::BeaconSignal;

/// Called once with the delivery outcome of a scheduled notification.
pub type Completion = Box<dyn FnOnce(Result<(), NotificationError>) + Send + 'static>;

pub trait NotificationCenter: Send + Sync {
    /// Replace the set of known categories.
    fn set_categories(&self, categories: Vec<NotificationCategory>);

    /// Schedule `request` to be presented after `delay`. Must not block.
    fn add(&self, request: NotificationRequest, delay: Duration, completion: Completion);
}

/// Presents notifications as banners in the companion window.
pub struct WindowNotificationCenter {
    tx_to_gui: TokioSender<BeaconSignal>,
    runtime: Handle,
    categories: RwLock<HashMap<String, NotificationCategory>>,
}

impl WindowNotificationCenter {
    /// Must be called from inside a tokio runtime.
    pub fn new(tx_to_gui: TokioSender<BeaconSignal>) -> Self {
        WindowNotificationCenter {
            tx_to_gui,
            runtime: Handle::current(),
            categories: RwLock::new(HashMap::new()),
        }
    }
}

impl NotificationCenter for WindowNotificationCenter {
    fn set_categories(&self, categories: Vec<NotificationCategory>) {
        let mut known = self.categories.write().unwrap_or_else(PoisonError::into_inner);
        known.clear();
        for category in categories {
            debug!(category = %category.identifier, actions = category.actions.len(), "category registered");
            known.insert(category.identifier.clone(), category);
        }
    }

    fn add(&self, request: NotificationRequest, delay: Duration, completion: Completion) {
        let category = self
            .categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&request.category)
            .cloned();
        let Some(category) = category else {
            completion(Err(NotificationError::UnknownCategory(request.category)));
            return;
        };

        let tx = self.tx_to_gui.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let presented = PresentedNotification {
                id: Uuid::new_v4(),
                request,
                actions: category.actions,
                custom_dismiss: category.custom_dismiss,
            };
            let result = tx
                .send(BeaconSignal::Notification(presented))
                .await
                .map_err(|_| NotificationError::PresenterClosed);
            completion(result);
        });
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::{mpsc, oneshot};

    use super::*;
    use crate::notification::model::{default_categories, Urgency, FALL_CATEGORY, MANUAL_ALERT_CATEGORY};

    fn request(category: &str) -> NotificationRequest {
        NotificationRequest {
            title: "🚨 Fall Detected".to_string(),
            body: "Impact of 2.5g".to_string(),
            category: category.to_string(),
            thread: "fall-detection".to_string(),
            urgency: Urgency::TimeSensitive,
            record_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_presents_after_delay_with_category_actions() {
        let (tx, mut rx) = mpsc::channel(8);
        let center = WindowNotificationCenter::new(tx);
        center.set_categories(default_categories());

        let (done_tx, done_rx) = oneshot::channel();
        center.add(
            request(FALL_CATEGORY),
            Duration::from_millis(10),
            Box::new(move |result| {
                let _ = done_tx.send(result.is_ok());
            }),
        );

        let Some(BeaconSignal::Notification(presented)) = rx.recv().await else {
            panic!("expected a notification");
        };
        assert_eq!(presented.request.category, FALL_CATEGORY);
        assert_eq!(presented.actions.len(), 2);
        assert!(presented.custom_dismiss);
        assert!(done_rx.await.unwrap());
    }

    #[tokio::test]
    async fn test_plain_category_has_no_custom_dismiss() {
        let (tx, mut rx) = mpsc::channel(8);
        let center = WindowNotificationCenter::new(tx);
        center.set_categories(default_categories());

        center.add(request(MANUAL_ALERT_CATEGORY), Duration::ZERO, Box::new(|_| {}));

        let Some(BeaconSignal::Notification(presented)) = rx.recv().await else {
            panic!("expected a notification");
        };
        assert!(!presented.custom_dismiss);
    }

    #[tokio::test]
    async fn test_unknown_category_fails_without_presenting() {
        let (tx, mut rx) = mpsc::channel(8);
        let center = WindowNotificationCenter::new(tx);

        let (done_tx, done_rx) = oneshot::channel();
        center.add(
            request("NOT_REGISTERED"),
            Duration::ZERO,
            Box::new(move |result| {
                let _ = done_tx.send(result);
            }),
        );

        let result = done_rx.await.unwrap();
        assert!(matches!(result, Err(NotificationError::UnknownCategory(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_window_reports_failure() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let center = WindowNotificationCenter::new(tx);
        center.set_categories(default_categories());

        let (done_tx, done_rx) = oneshot::channel();
        center.add(
            request(FALL_CATEGORY),
            Duration::ZERO,
            Box::new(move |result| {
                let _ = done_tx.send(result);
            }),
        );

        assert!(matches!(done_rx.await.unwrap(), Err(NotificationError::PresenterClosed)));
    }
}
