// Diffing of proposed settings against the stored snapshot.
// Invariants: a plan only names live actions for fields that actually changed.

use crate::settings::{MachineSettings, ScoreboardEndpoint};
use crate::timing::DerivedTimings;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MachinePlan {
    pub timings: Option<DerivedTimings>,
    pub piezo_threshold: Option<i32>,
    pub serial_device: Option<String>,
}

impl MachinePlan {
    pub fn diff(current: &MachineSettings, proposed: &MachineSettings) -> Self {
        Self {
            timings: (current.waiting_time != proposed.waiting_time)
                .then(|| DerivedTimings::from_waiting_secs(proposed.waiting_time)),
            piezo_threshold: (current.piezo_threshold != proposed.piezo_threshold)
                .then_some(proposed.piezo_threshold),
            serial_device: (current.serial_device != proposed.serial_device)
                .then(|| proposed.serial_device.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timings.is_none() && self.piezo_threshold.is_none() && self.serial_device.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreboardField {
    Https,
    Host,
    Port,
    GameId,
    User,
    Pass,
}

impl ScoreboardField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreboardField::Https => "https",
            ScoreboardField::Host => "host",
            ScoreboardField::Port => "port",
            ScoreboardField::GameId => "game_id",
            ScoreboardField::User => "user",
            ScoreboardField::Pass => "pass",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreboardPlan {
    pub changed: Vec<ScoreboardField>,
}

impl ScoreboardPlan {
    pub fn diff(current: &ScoreboardEndpoint, proposed: &ScoreboardEndpoint) -> Self {
        let checks = [
            (ScoreboardField::Https, current.https != proposed.https),
            (ScoreboardField::Host, current.host != proposed.host),
            (ScoreboardField::Port, current.port != proposed.port),
            (ScoreboardField::GameId, current.game_id != proposed.game_id),
            (ScoreboardField::User, current.user != proposed.user),
            (ScoreboardField::Pass, current.pass != proposed.pass),
        ];
        Self {
            changed: checks
                .into_iter()
                .filter_map(|(field, changed)| changed.then_some(field))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}
