// Test doubles for the live connector and the settings backend.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::Notify;
use dart_machine_server::connector::{ConnectorError, LiveConnector};
use dart_machine_server::coordinator::Coordinator;
use dart_machine_server::store::{PersistenceError, SettingsBackend, SettingsStore};
use machine_core::settings::{MachineSettings, ScoreboardEndpoint, ScoreboardSettings, Settings};
use machine_core::timing::DerivedTimings;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    SetTiming(DerivedTimings),
    SetPiezoThreshold(i32),
    ReloadSerial(String),
    SetScoreboardEndpoint(ScoreboardEndpoint),
    CheckConnection,
    ReloadWebsocket,
}

#[derive(Default)]
pub struct RecordingConnector {
    calls: Mutex<Vec<Call>>,
    check_error: Mutex<Option<String>>,
    fail_piezo: AtomicBool,
    fail_serial: AtomicBool,
    fail_websocket: AtomicBool,
    piezo_gate: Mutex<Option<Arc<Notify>>>,
    parked: Notify,
}

impl RecordingConnector {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("calls lock").clear();
    }

    pub fn fail_check_with(&self, message: &str) {
        *self.check_error.lock().expect("check lock") = Some(message.to_string());
    }

    pub fn pass_check(&self) {
        *self.check_error.lock().expect("check lock") = None;
    }

    pub fn fail_piezo(&self) {
        self.fail_piezo.store(true, Ordering::SeqCst);
    }

    pub fn fail_serial(&self) {
        self.fail_serial.store(true, Ordering::SeqCst);
    }

    pub fn fail_websocket(&self) {
        self.fail_websocket.store(true, Ordering::SeqCst);
    }

    pub fn pass_websocket(&self) {
        self.fail_websocket.store(false, Ordering::SeqCst);
    }

    /// Parks the next `set_piezo_threshold` call until the returned gate is
    /// notified.
    pub fn hold_next_piezo(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.piezo_gate.lock().expect("gate lock") = Some(gate.clone());
        gate
    }

    /// Resolves once a held `set_piezo_threshold` call is parked.
    pub async fn piezo_parked(&self) {
        self.parked.notified().await;
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl LiveConnector for RecordingConnector {
    async fn set_timing(&self, timings: DerivedTimings) {
        self.record(Call::SetTiming(timings));
    }

    async fn set_piezo_threshold(&self, value: i32) -> Result<(), ConnectorError> {
        self.record(Call::SetPiezoThreshold(value));
        let gate = self.piezo_gate.lock().expect("gate lock").take();
        if let Some(gate) = gate {
            self.parked.notify_one();
            gate.notified().await;
        }
        if self.fail_piezo.load(Ordering::SeqCst) {
            return Err(ConnectorError::SerialClosed);
        }
        Ok(())
    }

    async fn reload_serial(&self, device: &str) -> Result<(), ConnectorError> {
        self.record(Call::ReloadSerial(device.to_string()));
        if self.fail_serial.load(Ordering::SeqCst) {
            return Err(ConnectorError::SerialClosed);
        }
        Ok(())
    }

    async fn set_scoreboard_endpoint(&self, endpoint: &ScoreboardEndpoint) {
        self.record(Call::SetScoreboardEndpoint(endpoint.clone()));
    }

    async fn check_connection(&self) -> Result<(), ConnectorError> {
        self.record(Call::CheckConnection);
        match self.check_error.lock().expect("check lock").clone() {
            Some(message) => Err(ConnectorError::Unreachable(message)),
            None => Ok(()),
        }
    }

    async fn reload_websocket(&self) -> Result<(), ConnectorError> {
        self.record(Call::ReloadWebsocket);
        if self.fail_websocket.load(Ordering::SeqCst) {
            return Err(ConnectorError::Unreachable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    saved: Mutex<Option<Settings>>,
    fail_saves: AtomicBool,
}

impl MemoryBackend {
    pub fn with(settings: Settings) -> Self {
        Self {
            saved: Mutex::new(Some(settings)),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn saved(&self) -> Option<Settings> {
        self.saved.lock().expect("saved lock").clone()
    }

    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }
}

impl SettingsBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Settings>, PersistenceError> {
        Ok(self.saved())
    }

    fn save(&self, settings: &Settings) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable("disk full".to_string()));
        }
        *self.saved.lock().expect("saved lock") = Some(settings.clone());
        Ok(())
    }
}

pub fn initial_settings() -> Settings {
    Settings {
        machine: MachineSettings {
            waiting_time: 5,
            piezo_threshold: 1800,
            serial_device: "/dev/ttyACM0".to_string(),
        },
        scoreboard: ScoreboardSettings {
            endpoint: ScoreboardEndpoint {
                https: false,
                host: "scoreboard.local".to_string(),
                port: "8000".to_string(),
                game_id: "dascr".to_string(),
                user: "admin".to_string(),
                pass: "admin".to_string(),
            },
            last_error: String::new(),
        },
    }
}

pub struct Harness {
    pub connector: Arc<RecordingConnector>,
    pub backend: Arc<MemoryBackend>,
    pub store: Arc<SettingsStore>,
    pub coordinator: Arc<Coordinator>,
}

pub fn harness() -> Harness {
    let connector = Arc::new(RecordingConnector::default());
    let backend = Arc::new(MemoryBackend::with(initial_settings()));
    let store = Arc::new(SettingsStore::open(backend.clone()).expect("open store"));
    let coordinator = Arc::new(Coordinator::new(store.clone(), connector.clone()));
    Harness {
        connector,
        backend,
        store,
        coordinator,
    }
}

pub fn temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("dart-machine-{name}-{stamp}"));
    std::fs::create_dir_all(&path).expect("create temp dir");
    path
}
