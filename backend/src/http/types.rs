// HTTP form and response payload types.

use machine_core::form::{MachineInput, ScoreboardInput};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MachineForm {
    pub delay: String,
    pub thresh: String,
    pub serial: String,
}

impl MachineForm {
    pub fn as_input(&self) -> MachineInput<'_> {
        MachineInput {
            delay: &self.delay,
            thresh: &self.thresh,
            serial: &self.serial,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScoreboardForm {
    pub sbprot: Option<String>,
    pub sbhost: String,
    pub sbport: String,
    pub sbgame: String,
    pub sbuser: String,
    pub sbpass: String,
}

impl ScoreboardForm {
    pub fn as_input(&self) -> ScoreboardInput<'_> {
        ScoreboardInput {
            sbprot: self.sbprot.as_deref(),
            sbhost: &self.sbhost,
            sbport: &self.sbport,
            sbgame: &self.sbgame,
            sbuser: &self.sbuser,
            sbpass: &self.sbpass,
        }
    }
}
