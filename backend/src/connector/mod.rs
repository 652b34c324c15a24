// Live connector facade over the running serial link and scoreboard connection.

use std::sync::Arc;

use async_trait::async_trait;
use machine_core::settings::{ScoreboardEndpoint, Settings};
use machine_core::timing::DerivedTimings;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::constants::PIEZO_COMMAND_PREFIX;
use crate::store::LiveWarnings;

mod scoreboard;
mod serial;
mod websocket;

pub use scoreboard::ScoreboardSender;
pub use serial::SerialLink;
pub use websocket::WebsocketLink;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("serial io error: {0}")]
    SerialIo(#[from] std::io::Error),
    #[error("serial port is not open")]
    SerialClosed,
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("{0}")]
    Unreachable(String),
    #[error("scoreboard rejected heartbeat with status {0}")]
    Rejected(u16),
    #[error("websocket error: {0}")]
    Websocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Operations the reconfiguration path may perform on the running machine.
#[async_trait]
pub trait LiveConnector: Send + Sync {
    async fn set_timing(&self, timings: DerivedTimings);
    async fn set_piezo_threshold(&self, value: i32) -> Result<(), ConnectorError>;
    /// Closes the serial link and reopens it on `device`.
    async fn reload_serial(&self, device: &str) -> Result<(), ConnectorError>;
    async fn set_scoreboard_endpoint(&self, endpoint: &ScoreboardEndpoint);
    async fn check_connection(&self) -> Result<(), ConnectorError>;
    async fn reload_websocket(&self) -> Result<(), ConnectorError>;
}

/// Live connections of the machine: game timings, serial link and scoreboard.
pub struct MachineConnector {
    timings: RwLock<DerivedTimings>,
    serial: SerialLink,
    sender: ScoreboardSender,
    websocket: WebsocketLink,
}

impl MachineConnector {
    pub fn new(settings: &Settings, serial_baud: u32) -> Result<Self, ConnectorError> {
        let endpoint = Arc::new(RwLock::new(settings.scoreboard.endpoint.clone()));
        Ok(Self {
            timings: RwLock::new(DerivedTimings::from_waiting_secs(
                settings.machine.waiting_time,
            )),
            serial: SerialLink::new(serial_baud),
            sender: ScoreboardSender::new(endpoint.clone())?,
            websocket: WebsocketLink::new(endpoint),
        })
    }

    /// Brings up the serial link and the websocket; failures are returned as
    /// warnings so the admin surface stays reachable without hardware.
    pub async fn start(&self, settings: &Settings) -> LiveWarnings {
        let mut warnings = LiveWarnings::default();
        if let Err(err) = self.serial.open(&settings.machine.serial_device).await {
            warn!(?err, device = %settings.machine.serial_device, "serial open failed");
            warnings.machine.push(format!("serial: {err}"));
        } else if let Err(err) = self
            .set_piezo_threshold(settings.machine.piezo_threshold)
            .await
        {
            warn!(?err, "initial piezo threshold write failed");
            warnings.machine.push(format!("piezo threshold: {err}"));
        }
        if let Err(err) = self.websocket.reload().await {
            warn!(?err, "websocket connect failed");
            warnings.scoreboard.push(format!("websocket: {err}"));
        }
        warnings
    }

    pub async fn timings(&self) -> DerivedTimings {
        *self.timings.read().await
    }

    pub async fn shutdown(&self) {
        self.websocket.close().await;
        self.serial.close().await;
        info!("live connections closed");
    }
}

#[async_trait]
impl LiveConnector for MachineConnector {
    async fn set_timing(&self, timings: DerivedTimings) {
        *self.timings.write().await = timings;
        debug!(
            waiting_ms = timings.waiting().as_millis() as u64,
            debounce_ms = timings.debounce().as_millis() as u64,
            "game timings updated"
        );
    }

    async fn set_piezo_threshold(&self, value: i32) -> Result<(), ConnectorError> {
        self.serial
            .write(format!("{PIEZO_COMMAND_PREFIX}{value}"))
            .await
    }

    async fn reload_serial(&self, device: &str) -> Result<(), ConnectorError> {
        self.serial.reload(device).await
    }

    async fn set_scoreboard_endpoint(&self, endpoint: &ScoreboardEndpoint) {
        self.sender.set_endpoint(endpoint.clone()).await;
    }

    async fn check_connection(&self) -> Result<(), ConnectorError> {
        self.sender.check_connection().await
    }

    async fn reload_websocket(&self) -> Result<(), ConnectorError> {
        self.websocket.reload().await
    }
}
