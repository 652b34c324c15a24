// Settings store: the in-memory source of truth mirrored to a durable backend.
// Invariants: writes replace a whole sub-domain snapshot; persist never rolls back memory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use machine_core::settings::{MachineSettings, ScoreboardSettings, Settings};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("settings backend unavailable: {0}")]
    Unavailable(String),
}

pub trait SettingsBackend: Send + Sync {
    /// Returns `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Settings>, PersistenceError>;
    fn save(&self, settings: &Settings) -> Result<(), PersistenceError>;
}

pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<Settings>, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&self, settings: &Settings) -> Result<(), PersistenceError> {
        let text = serde_json::to_string_pretty(settings)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, text).map_err(|err| self.io_error(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateDomain {
    Machine,
    Scoreboard,
}

impl UpdateDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateDomain::Machine => "machine",
            UpdateDomain::Scoreboard => "scoreboard",
        }
    }
}

/// Soft failures from the latest update of each sub-domain. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveWarnings {
    pub machine: Vec<String>,
    pub scoreboard: Vec<String>,
}

struct StoreState {
    settings: Settings,
    warnings: LiveWarnings,
}

pub struct SettingsStore {
    state: RwLock<StoreState>,
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsStore {
    pub fn new(settings: Settings, backend: Arc<dyn SettingsBackend>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                settings,
                warnings: LiveWarnings::default(),
            }),
            backend,
        }
    }

    /// Loads saved settings, writing defaults when the backend is empty.
    pub fn open(backend: Arc<dyn SettingsBackend>) -> Result<Self, PersistenceError> {
        let settings = match backend.load()? {
            Some(settings) => {
                info!("settings loaded");
                settings
            }
            None => {
                let settings = Settings::default();
                backend.save(&settings)?;
                info!("no saved settings, wrote defaults");
                settings
            }
        };
        Ok(Self::new(settings, backend))
    }

    pub async fn current(&self) -> Settings {
        self.state.read().await.settings.clone()
    }

    pub async fn replace(&self, machine: MachineSettings, scoreboard: ScoreboardSettings) {
        let mut state = self.state.write().await;
        state.settings = Settings {
            machine,
            scoreboard,
        };
    }

    pub async fn replace_machine(&self, machine: MachineSettings) {
        self.state.write().await.settings.machine = machine;
    }

    pub async fn replace_scoreboard(&self, scoreboard: ScoreboardSettings) {
        self.state.write().await.settings.scoreboard = scoreboard;
    }

    pub async fn persist(&self) -> Result<(), PersistenceError> {
        let snapshot = self.current().await;
        self.backend.save(&snapshot)?;
        debug!("settings persisted");
        Ok(())
    }

    pub async fn warnings(&self) -> LiveWarnings {
        self.state.read().await.warnings.clone()
    }

    pub async fn set_warnings(&self, domain: UpdateDomain, warnings: Vec<String>) {
        let mut state = self.state.write().await;
        match domain {
            UpdateDomain::Machine => state.warnings.machine = warnings,
            UpdateDomain::Scoreboard => state.warnings.scoreboard = warnings,
        }
    }
}
