use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::monitor::HealthMonitor;
use crate::signal::{BeaconSignal, ControlCommand, GuiSignal};

/// What the simulated beacon may send on the alert characteristic,
/// including one code the companion does not know.
const FAKE_TOKENS: &[&str] = &[
    "MANUAL_ALERT",
    "FALSE_ALARM",
    "FALL_DETECTED",
    "HEART_STOP",
    "DEVICE_WORN",
    "DEVICE_NOT_WORN",
    "BATTERY_LOW",
];

/// Stands in for a beacon: a heart-rate reading every 800 ms and a random
/// alert code roughly every 15 readings. Control commands from the window
/// are answered the way the firmware would.
pub async fn simulate_beacon(
    monitor: Arc<HealthMonitor>,
    tx_to_gui: Sender<BeaconSignal>,
    mut rx_from_gui: Receiver<GuiSignal>,
    cancel: CancellationToken,
) {
    info!("running simulated beacon");
    let _ = tx_to_gui
        .send(BeaconSignal::ActiveDevice("Simulated beacon".to_string()))
        .await;

    loop {
        let (bpm, token) = {
            let mut rng = rand::thread_rng();
            let bpm: u8 = rng.gen_range(40..135);
            let token = rng
                .gen_bool(1.0 / 15.0)
                .then(|| FAKE_TOKENS[rng.gen_range(0..FAKE_TOKENS.len())]);
            (bpm, token)
        };

        if let Some(bpm) = monitor.handle_heart_rate_payload(&[bpm]) {
            let _ = tx_to_gui.send(BeaconSignal::HeartRate { bpm }).await;
        }
        if let Some(token) = token {
            monitor.handle_alert_payload(token.as_bytes());
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            Some(GuiSignal::Control(command)) = rx_from_gui.recv() => {
                info!(?command, "simulated beacon got control command");
                match command {
                    ControlCommand::TriggerFall => {
                        monitor.handle_alert_payload(b"FALL_DETECTED");
                    }
                    ControlCommand::ResetAlert => {}
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(800)) => {}
        }
    }

    info!("simulated beacon stopped");
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::alerts::{AlertKind, AlertManager};
    use crate::config::BeaconConfig;
    use crate::heart_rate::HeartRateMonitor;
    use crate::notification::{
        Completion, NotificationCategory, NotificationCenter, NotificationRequest, NotificationService,
    };

    struct Discard;

    impl NotificationCenter for Discard {
        fn set_categories(&self, _categories: Vec<NotificationCategory>) {}

        fn add(&self, _request: NotificationRequest, _delay: Duration, completion: Completion) {
            completion(Ok(()));
        }
    }

    #[tokio::test]
    async fn test_trigger_fall_command_raises_fall() {
        let config = BeaconConfig::default();
        let service = Arc::new(NotificationService::start(Arc::new(Discard), &config));
        let alerts = Arc::new(AlertManager::new(&config, service));
        let monitor = Arc::new(HealthMonitor::new(alerts, HeartRateMonitor::new(&config)));

        let (tx, _rx) = mpsc::channel(64);
        let (tx_from_gui, rx_from_gui) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(simulate_beacon(monitor.clone(), tx, rx_from_gui, cancel.clone()));

        tx_from_gui
            .send(GuiSignal::Control(ControlCommand::TriggerFall))
            .await
            .unwrap();

        let fall_recorded = || {
            monitor
                .alerts()
                .history()
                .iter()
                .any(|r| r.kind == AlertKind::FallDetected)
        };
        tokio::time::timeout(Duration::from_secs(5), async {
            while !fall_recorded() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("fall was never recorded");

        cancel.cancel();
        task.await.unwrap();
    }
}
