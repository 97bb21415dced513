use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui::{self, ScrollArea};
use tokio::spawn;
use tokio::sync::mpsc::{self, Receiver as TokioReceiver, Sender as TokioSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use beacon_companion::alerts::AlertManager;
use beacon_companion::ble::BeaconLink;
use beacon_companion::config::BeaconConfig;
use beacon_companion::fake;
use beacon_companion::heart_rate::HeartRateMonitor;
use beacon_companion::logging::init_logging;
use beacon_companion::monitor::HealthMonitor;
use beacon_companion::notification::{NotificationService, PresentedNotification, WindowNotificationCenter};
use beacon_companion::signal::{BeaconSignal, ControlCommand, GuiSignal};

mod widget;

const MAX_FPS: f64 = 60.0;

/// Companion window for the BEACON wearable.
#[derive(Parser, Debug)]
#[command(name = "beacon", version, about)]
struct Cli {
    /// YAML config file; defaults are used for anything it leaves out
    #[arg(long)]
    config: Option<PathBuf>,

    /// Advertised name of the beacon (overrides the config file)
    #[arg(long)]
    device_name: Option<String>,

    /// Run against a simulated beacon instead of Bluetooth
    #[arg(long)]
    simulate: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(cli: &Cli) -> Result<BeaconConfig> {
    let mut config = match &cli.config {
        Some(path) => BeaconConfig::load(path)?,
        None => BeaconConfig::default(),
    };
    if let Some(name) = &cli.device_name {
        config.device_name = name.clone();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let config = load_config(&cli)?;
    info!(device = %config.device_name, simulate = cli.simulate, "starting beacon companion");

    let (tx, rx) = mpsc::channel(128);
    let (tx_from_gui, rx_to_link) = mpsc::channel(16);

    let center = Arc::new(WindowNotificationCenter::new(tx.clone()));
    let notifications = Arc::new(NotificationService::start(center, &config));
    let alerts = Arc::new(AlertManager::new(&config, notifications));
    let monitor = Arc::new(HealthMonitor::new(alerts, HeartRateMonitor::new(&config)));
    let cancel = CancellationToken::new();

    if cli.simulate {
        spawn(fake::simulate_beacon(monitor.clone(), tx, rx_to_link, cancel.clone()));
    } else {
        let mut link = BeaconLink::new(config.clone(), monitor.clone(), tx, rx_to_link, cancel.clone());
        spawn(async move {
            if let Err(err) = link.run().await {
                error!(error = %err, "beacon link exited");
            }
        });
    }

    let native_options = eframe::NativeOptions::default();
    let result = eframe::run_native(
        "beacon",
        native_options,
        Box::new(move |cc| Ok(Box::new(CompanionApp::new(cc, rx, tx_from_gui, monitor)))),
    );

    cancel.cancel();
    info!("beacon companion exiting");
    result.map_err(|err| anyhow!("window failed: {err}"))
}

struct CompanionApp {
    rx_from_beacon: TokioReceiver<BeaconSignal>,
    tx_from_gui: TokioSender<GuiSignal>,
    monitor: Arc<HealthMonitor>,
    live_heart_rate: u8,
    status: String,
    connected: bool,
    banners: Vec<PresentedNotification>,
    frame_time: Duration,
}

impl CompanionApp {
    fn new(
        _cc: &eframe::CreationContext<'_>,
        rx_from_beacon: TokioReceiver<BeaconSignal>,
        tx_from_gui: TokioSender<GuiSignal>,
        monitor: Arc<HealthMonitor>,
    ) -> Self {
        CompanionApp {
            rx_from_beacon,
            tx_from_gui,
            monitor,
            live_heart_rate: 0,
            status: "Idle".to_string(),
            connected: false,
            banners: vec![],
            frame_time: Duration::from_secs_f64(1.0 / MAX_FPS),
        }
    }

    fn read_channel(&mut self) {
        while let Ok(signal) = self.rx_from_beacon.try_recv() {
            match signal {
                BeaconSignal::HeartRate { bpm } => self.live_heart_rate = bpm,
                BeaconSignal::ScanStarted => {
                    self.status = "Scanning...".to_string();
                    self.connected = false;
                }
                BeaconSignal::ActiveDevice(name) => {
                    self.status = format!("Connected: {name}");
                    self.connected = true;
                }
                BeaconSignal::DeviceDisconnected => {
                    self.status = "Disconnected".to_string();
                    self.connected = false;
                    self.live_heart_rate = 0;
                }
                BeaconSignal::Notification(notification) => {
                    debug!(category = %notification.request.category, "presenting notification");
                    self.banners.push(notification);
                }
            }
        }
    }

    fn send_control(&self, command: ControlCommand) {
        if let Err(err) = self.tx_from_gui.try_send(GuiSignal::Control(command)) {
            debug!(error = %err, ?command, "no beacon link to send control command to");
        }
    }

    /// The user picked `action_id` on a banner (or closed it).
    fn respond(&mut self, notification: &PresentedNotification, action_id: Option<&str>) {
        let command = self.monitor.respond(
            notification.request.record_id,
            action_id,
            notification.custom_dismiss,
        );
        if let Some(command) = command {
            self.send_control(command);
        }
        self.banners.retain(|b| b.id != notification.id);
    }
}

impl eframe::App for CompanionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.read_channel();

        let mut responses = vec![];
        let mut test_fall = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add(widget::get_heart_rate_label(self.live_heart_rate));
                ui.add(widget::get_status_label(&self.status, self.connected));
                test_fall = ui
                    .add_enabled(self.connected, widget::get_test_fall_button())
                    .clicked();
            });
            ui.separator();

            for banner in self.banners.iter().rev() {
                ui.group(|ui| {
                    ui.add(widget::get_banner_title(banner));
                    ui.label(banner.request.body.as_str());
                    ui.horizontal(|ui| {
                        for action in &banner.actions {
                            if ui.add(widget::get_action_button(action)).clicked() {
                                responses.push((banner.clone(), Some(action.identifier.clone())));
                            }
                        }
                        if ui.add(widget::get_close_button()).clicked() {
                            responses.push((banner.clone(), None));
                        }
                    });
                });
            }

            ui.separator();
            ui.heading("Active alerts");
            ScrollArea::vertical().show(ui, |ui| {
                for record in self.monitor.alerts().active_alerts().iter().rev() {
                    ui.add(widget::get_alert_row(record));
                }
            });
        });

        if test_fall {
            info!("asking beacon for a test fall");
            self.send_control(ControlCommand::TriggerFall);
        }
        for (banner, action) in responses {
            self.respond(&banner, action.as_deref());
        }

        ctx.request_repaint_after(self.frame_time);
    }
}
