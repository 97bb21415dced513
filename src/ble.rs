use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use btleplug::api::{
    Central, CharPropFlags, Characteristic, Manager as _, Peripheral, ScanFilter, ValueNotification, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral as PlatformPeripheral};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc::{Receiver as TokioReceiver, Sender as TokioSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::BeaconConfig;
use crate::monitor::HealthMonitor;
use crate::signal::{BeaconSignal, ControlCommand, GuiSignal};

const SCAN_INTERVAL: Duration = Duration::from_secs(1);

/// Feeds alert and heart-rate notifications from the beacon into the
/// health monitor, and writes control commands back.
pub struct BeaconLink {
    config: BeaconConfig,
    monitor: Arc<HealthMonitor>,
    tx_to_gui: TokioSender<BeaconSignal>,
    rx_from_gui: TokioReceiver<GuiSignal>,
    cancel: CancellationToken,
}

/// Characteristics found on a connected beacon.
struct BeaconChars {
    alert: Characteristic,
    heart_rate: Option<Characteristic>,
    control: Option<Characteristic>,
}

impl BeaconLink {
    pub fn new(
        config: BeaconConfig,
        monitor: Arc<HealthMonitor>,
        tx_to_gui: TokioSender<BeaconSignal>,
        rx_from_gui: TokioReceiver<GuiSignal>,
        cancel: CancellationToken,
    ) -> Self {
        BeaconLink {
            config,
            monitor,
            tx_to_gui,
            rx_from_gui,
            cancel,
        }
    }

    async fn get_adapter(&self) -> Result<Adapter> {
        let manager = Manager::new().await.context("failed to start BLE manager")?;
        let adapter_list = manager.adapters().await?;

        for adapter in adapter_list.iter() {
            let adapter_name = adapter.adapter_info().await.unwrap_or("No name adapter".to_string());
            debug!(
                adapter = %adapter_name,
                "found adapter"
            );
        }

        // TODO: let the user pick when there is more than one adapter
        adapter_list
            .into_iter()
            .next()
            .context("no Bluetooth adapter found")
    }

    /// Scan until a peripheral advertising the configured name shows up.
    async fn find_beacon(&self, adapter: &Adapter) -> Result<Option<PlatformPeripheral>> {
        let _ = self.tx_to_gui.send(BeaconSignal::ScanStarted).await;
        adapter
            .start_scan(ScanFilter {
                services: vec![self.config.service_uuid],
            })
            .await
            .context("can't scan BLE adapter")?;
        info!(device = %self.config.device_name, "scanning for beacon");

        let found = scan_until(&self.cancel, SCAN_INTERVAL, move || self.match_beacon(adapter)).await;
        let _ = adapter.stop_scan().await;
        if found.is_some() {
            info!(device = %self.config.device_name, "found beacon");
        }
        Ok(found)
    }

    async fn match_beacon(&self, adapter: &Adapter) -> Result<Option<PlatformPeripheral>> {
        for peripheral in adapter.peripherals().await.context("can't list peripherals")? {
            let Some(name) = get_peripheral_name(&peripheral).await else { continue; };
            if name == self.config.device_name {
                return Ok(Some(peripheral));
            }
        }
        Ok(None)
    }

    async fn discover(&self, peripheral: &PlatformPeripheral) -> Result<BeaconChars> {
        if !peripheral.is_connected().await? {
            peripheral.connect().await.context("error connecting to beacon")?;
        }
        peripheral.discover_services().await.context("service discovery failed")?;

        let find = |uuid: Uuid| {
            peripheral
                .characteristics()
                .into_iter()
                .find(|c| c.uuid == uuid)
        };

        let alert = find(self.config.alert_characteristic)
            .filter(|c| c.properties.contains(CharPropFlags::NOTIFY))
            .context("beacon has no notifying alert characteristic")?;
        let heart_rate = find(self.config.heart_rate_characteristic)
            .filter(|c| c.properties.contains(CharPropFlags::NOTIFY));
        let control = find(self.config.control_characteristic);

        Ok(BeaconChars {
            alert,
            heart_rate,
            control,
        })
    }

    async fn subscribe(&self, peripheral: &PlatformPeripheral) -> Result<(BeaconChars, NotificationStream)> {
        let chars = self.discover(peripheral).await?;

        peripheral.subscribe(&chars.alert).await?;
        debug!(uuid = %chars.alert.uuid, "subscribed to alert characteristic");
        match &chars.heart_rate {
            Some(heart_rate) => {
                peripheral.subscribe(heart_rate).await?;
                debug!(uuid = %heart_rate.uuid, "subscribed to heart rate characteristic");
            }
            None => warn!("beacon has no heart rate characteristic"),
        }

        let notifications = peripheral.notifications().await?;
        Ok((chars, notifications))
    }

    /// Process notifications until the link drops or we are cancelled.
    async fn stream(&mut self, peripheral: &PlatformPeripheral) -> LinkOutcome {
        let (chars, mut notifications) = match self.subscribe(peripheral).await {
            Ok(link) => link,
            Err(err) => {
                error!(error = %err, "could not link to beacon");
                return LinkOutcome::NeverLinked;
            }
        };
        let _ = self
            .tx_to_gui
            .send(BeaconSignal::ActiveDevice(self.config.device_name.clone()))
            .await;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return LinkOutcome::Cancelled,
                Some(GuiSignal::Control(command)) = self.rx_from_gui.recv() => {
                    write_control(peripheral, chars.control.as_ref(), command).await;
                }
                data = notifications.next() => {
                    let Some(data) = data else { return LinkOutcome::Dropped; };
                    if data.uuid == chars.alert.uuid {
                        self.monitor.handle_alert_payload(&data.value);
                    } else if Some(data.uuid) == chars.heart_rate.as_ref().map(|c| c.uuid) {
                        if let Some(bpm) = self.monitor.handle_heart_rate_payload(&data.value) {
                            let _ = self.tx_to_gui.send(BeaconSignal::HeartRate { bpm }).await;
                        }
                    } else {
                        debug!(uuid = %data.uuid, "ignoring notification");
                    }
                }
            }
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let adapter = self.get_adapter().await?;

        while !self.cancel.is_cancelled() {
            let Some(peripheral) = self.find_beacon(&adapter).await? else { break; };

            let outcome = self.stream(&peripheral).await;
            let _ = peripheral.disconnect().await;
            if outcome == LinkOutcome::Cancelled || self.cancel.is_cancelled() {
                break;
            }

            if outcome.records_disconnect() {
                info!(device = %self.config.device_name, "beacon disconnected");
                self.monitor.device_disconnected();
                let _ = self.tx_to_gui.send(BeaconSignal::DeviceDisconnected).await;
            } else {
                warn!(device = %self.config.device_name, "retrying beacon link");
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(SCAN_INTERVAL) => {}
            }
        }

        info!("beacon link stopped");
        Ok(())
    }
}

type NotificationStream = Pin<Box<dyn Stream<Item = ValueNotification> + Send>>;

/// How a streaming session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkOutcome {
    /// Setup failed before any notification could arrive.
    NeverLinked,
    /// The notification stream ended under us.
    Dropped,
    Cancelled,
}

impl LinkOutcome {
    /// Only a link that was actually up can go down.
    fn records_disconnect(self) -> bool {
        matches!(self, LinkOutcome::Dropped)
    }
}

/// Run `scan` every `interval` until it finds something or `cancel` fires.
/// Failed attempts are logged and retried.
async fn scan_until<T, F, Fut>(cancel: &CancellationToken, interval: Duration, mut scan: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    loop {
        if cancel.is_cancelled() {
            return None;
        }
        match scan().await {
            Ok(Some(found)) => return Some(found),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "scan attempt failed"),
        }

        // Don't scan a billion times per second
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

async fn write_control(
    peripheral: &PlatformPeripheral,
    control: Option<&Characteristic>,
    command: ControlCommand,
) {
    let Some(control) = control else {
        warn!(?command, "beacon has no control characteristic");
        return;
    };
    match peripheral
        .write(control, command.as_bytes(), WriteType::WithResponse)
        .await
    {
        Ok(()) => info!(?command, "control command sent"),
        Err(err) => warn!(?command, error = %err, "failed to send control command"),
    }
}

async fn get_peripheral_name(peripheral: &PlatformPeripheral) -> Option<String> {
    let Ok(Some(properties)) = peripheral.properties().await else { return None; };

    properties.local_name
}
