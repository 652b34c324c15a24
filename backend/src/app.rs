// Application state shared by the HTTP handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::coordinator::Coordinator;
use crate::store::SettingsStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SettingsStore>,
    pub coordinator: Arc<Coordinator>,
    pub device_dir: PathBuf,
}

impl AppState {
    pub fn new(coordinator: Arc<Coordinator>, device_dir: PathBuf) -> Self {
        Self {
            store: coordinator.store().clone(),
            coordinator,
            device_dir,
        }
    }
}
