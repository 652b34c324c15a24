// Conversion of raw admin form values into proposed settings snapshots.
// Invariants: parsing completes before anything is compared or applied.

use thiserror::Error;

use crate::discovery::NOT_FOUND_MARKER;
use crate::settings::{MachineSettings, ScoreboardEndpoint};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputValidationError {
    #[error("invalid integer for '{field}': {value:?}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("'{field}' must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },
}

/// Raw machine form fields: `delay`, `thresh`, `serial`.
#[derive(Clone, Debug, Default)]
pub struct MachineInput<'a> {
    pub delay: &'a str,
    pub thresh: &'a str,
    pub serial: &'a str,
}

/// Proposed machine settings. `serial_device` is `None` when the operator kept
/// the current device, which is resolved against the stored snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineUpdate {
    pub waiting_time: u32,
    pub piezo_threshold: i32,
    pub serial_device: Option<String>,
}

impl MachineUpdate {
    pub fn resolve(self, current_serial: &str) -> MachineSettings {
        MachineSettings {
            waiting_time: self.waiting_time,
            piezo_threshold: self.piezo_threshold,
            serial_device: self
                .serial_device
                .unwrap_or_else(|| current_serial.to_string()),
        }
    }
}

impl From<MachineSettings> for MachineUpdate {
    fn from(settings: MachineSettings) -> Self {
        Self {
            waiting_time: settings.waiting_time,
            piezo_threshold: settings.piezo_threshold,
            serial_device: Some(settings.serial_device),
        }
    }
}

impl MachineInput<'_> {
    /// Builds the proposed update. The not-found marker never names a device,
    /// so submitting it keeps whatever device is stored when the update runs.
    pub fn into_proposed(self) -> Result<MachineUpdate, InputValidationError> {
        let delay = parse_int("delay", self.delay)?;
        let waiting_time = u32::try_from(delay).map_err(|_| {
            if delay < 0 {
                InputValidationError::Negative {
                    field: "delay",
                    value: delay,
                }
            } else {
                InputValidationError::InvalidInteger {
                    field: "delay",
                    value: self.delay.to_string(),
                }
            }
        })?;
        let thresh = parse_int("thresh", self.thresh)?;
        let piezo_threshold =
            i32::try_from(thresh).map_err(|_| InputValidationError::InvalidInteger {
                field: "thresh",
                value: self.thresh.to_string(),
            })?;

        let serial_device = (self.serial != NOT_FOUND_MARKER).then(|| self.serial.to_string());

        Ok(MachineUpdate {
            waiting_time,
            piezo_threshold,
            serial_device,
        })
    }
}

/// Raw scoreboard form fields; `sbprot` is a checkbox, so presence means HTTPS.
#[derive(Clone, Debug, Default)]
pub struct ScoreboardInput<'a> {
    pub sbprot: Option<&'a str>,
    pub sbhost: &'a str,
    pub sbport: &'a str,
    pub sbgame: &'a str,
    pub sbuser: &'a str,
    pub sbpass: &'a str,
}

impl ScoreboardInput<'_> {
    pub fn into_proposed(self) -> ScoreboardEndpoint {
        ScoreboardEndpoint {
            https: self.sbprot.is_some_and(|value| !value.is_empty()),
            host: self.sbhost.to_string(),
            port: self.sbport.to_string(),
            game_id: self.sbgame.to_string(),
            user: self.sbuser.to_string(),
            pass: self.sbpass.to_string(),
        }
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, InputValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| InputValidationError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}
