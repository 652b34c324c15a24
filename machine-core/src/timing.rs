// Waiting and debounce timings derived from the configured delay.

use std::time::Duration;

pub const DEBOUNCE_OFFSET: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivedTimings {
    waiting: Duration,
    debounce: Duration,
}

impl DerivedTimings {
    pub fn from_waiting_secs(secs: u32) -> Self {
        let waiting = Duration::from_secs(u64::from(secs));
        Self {
            waiting,
            debounce: waiting + DEBOUNCE_OFFSET,
        }
    }

    pub fn waiting(&self) -> Duration {
        self.waiting
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}
