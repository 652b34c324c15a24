// Serial link to the machine's microcontroller.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serialport::SerialPort;
use tokio::task;
use tracing::{debug, info};

use super::ConnectorError;
use crate::constants::{SERIAL_RELOAD_PAUSE_MS, SERIAL_TIMEOUT_MS};

type Port = Box<dyn SerialPort>;

pub struct SerialLink {
    port: Arc<Mutex<Option<Port>>>,
    baud_rate: u32,
}

impl SerialLink {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            port: Arc::new(Mutex::new(None)),
            baud_rate,
        }
    }

    pub async fn open(&self, device: &str) -> Result<(), ConnectorError> {
        let path = device.to_string();
        let baud_rate = self.baud_rate;
        let opened = task::spawn_blocking(move || {
            serialport::new(path.as_str(), baud_rate)
                .timeout(Duration::from_millis(SERIAL_TIMEOUT_MS))
                .data_bits(serialport::DataBits::Eight)
                .stop_bits(serialport::StopBits::One)
                .parity(serialport::Parity::None)
                .open()
        })
        .await??;
        info!(%device, baud_rate, "serial port opened");
        *lock(&self.port) = Some(opened);
        Ok(())
    }

    pub async fn close(&self) {
        let port = lock(&self.port).take();
        if port.is_some() {
            // Dropping the handle closes the device.
            let _ = task::spawn_blocking(move || drop(port)).await;
            debug!("serial port closed");
        }
    }

    pub async fn write(&self, command: String) -> Result<(), ConnectorError> {
        let port = self.port.clone();
        task::spawn_blocking(move || -> Result<(), ConnectorError> {
            let mut guard = lock(&port);
            let port = guard.as_mut().ok_or(ConnectorError::SerialClosed)?;
            port.write_all(command.as_bytes())?;
            port.flush()?;
            debug!(%command, "serial command written");
            Ok(())
        })
        .await?
    }

    pub async fn reload(&self, device: &str) -> Result<(), ConnectorError> {
        self.close().await;
        tokio::time::sleep(Duration::from_millis(SERIAL_RELOAD_PAUSE_MS)).await;
        self.open(device).await
    }

    pub fn is_open(&self) -> bool {
        lock(&self.port).is_some()
    }
}

fn lock(port: &Mutex<Option<Port>>) -> MutexGuard<'_, Option<Port>> {
    port.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
