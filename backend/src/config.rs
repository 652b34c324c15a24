// Process configuration read from the environment.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_DEVICE_DIR, DEFAULT_HTTP_PORT, DEFAULT_SERIAL_BAUD, SETTINGS_FILE};
use crate::net::{resolve_bind_ip, ANY_INTERFACE};

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub interface: String,
    pub http_port: u16,
    pub data_dir: PathBuf,
    pub device_dir: PathBuf,
    pub serial_baud: u32,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let interface = lookup("INT").unwrap_or_else(|| ANY_INTERFACE.to_string());
        let http_port = lookup("HTTP_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_HTTP_PORT);
        let data_dir = lookup("DASCR_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let device_dir = lookup("DEVICE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE_DIR));
        let serial_baud = lookup("SERIAL_BAUD")
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(DEFAULT_SERIAL_BAUD);

        Self {
            interface,
            http_port,
            data_dir,
            device_dir,
            serial_baud,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        settings_path(&self.data_dir)
    }

    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let ip: IpAddr = resolve_bind_ip(&self.interface)?;
        Ok(SocketAddr::new(ip, self.http_port))
    }
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE)
}

fn default_data_dir() -> PathBuf {
    let local = PathBuf::from("./data");
    if local.is_dir() {
        return local;
    }
    let parent = PathBuf::from("../data");
    if parent.is_dir() {
        return parent;
    }
    local
}
