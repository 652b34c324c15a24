// Persisted machine and scoreboard settings.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSettings {
    /// Seconds the machine waits after the third dart before accepting input again.
    pub waiting_time: u32,
    pub piezo_threshold: i32,
    pub serial_device: String,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            waiting_time: 5,
            piezo_threshold: 1800,
            serial_device: "/dev/ttyACM0".to_string(),
        }
    }
}

/// Scoreboard connection parameters as proposed by the operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardEndpoint {
    pub https: bool,
    pub host: String,
    pub port: String,
    pub game_id: String,
    pub user: String,
    pub pass: String,
}

impl ScoreboardEndpoint {
    pub fn http_base(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn ws_base(&self) -> String {
        let scheme = if self.https { "wss" } else { "ws" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl Default for ScoreboardEndpoint {
    fn default() -> Self {
        Self {
            https: false,
            host: "localhost".to_string(),
            port: "8000".to_string(),
            game_id: "dascr".to_string(),
            user: "admin".to_string(),
            pass: "admin".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardSettings {
    #[serde(flatten)]
    pub endpoint: ScoreboardEndpoint,
    /// Result of the most recent connection check; empty when it succeeded.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_error: String,
}

impl ScoreboardSettings {
    pub fn is_reachable(&self) -> bool {
        self.last_error.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub machine: MachineSettings,
    pub scoreboard: ScoreboardSettings,
}
