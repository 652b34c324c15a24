// Reconfiguration coordinator: drives operator updates into live state and persists them.
// Invariants: one update in flight at a time; live side effects run in a fixed order;
// a failed persist leaves the applied in-memory state in place.

use std::sync::Arc;

use machine_core::form::MachineUpdate;
use machine_core::plan::{MachinePlan, ScoreboardPlan};
use machine_core::settings::ScoreboardEndpoint;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::connector::LiveConnector;
use crate::store::{PersistenceError, SettingsStore, UpdateDomain};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiveAction {
    SetTiming,
    SetPiezoThreshold,
    ReloadSerial,
    SetScoreboardEndpoint,
    CheckConnection,
    ReloadWebsocket,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub actions: Vec<LiveAction>,
    /// Live propagation failures that did not stop the update.
    pub warnings: Vec<String>,
    pub connection_error: Option<String>,
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to persist settings: {0}")]
    Persistence(#[from] PersistenceError),
}

pub struct Coordinator {
    store: Arc<SettingsStore>,
    connector: Arc<dyn LiveConnector>,
    update_lock: Mutex<()>,
}

impl Coordinator {
    pub fn new(store: Arc<SettingsStore>, connector: Arc<dyn LiveConnector>) -> Self {
        Self {
            store,
            connector,
            update_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<SettingsStore> {
        &self.store
    }

    /// Applies a machine update. A proposal without a serial device keeps the
    /// device stored at the time the update lock is held.
    pub async fn apply_machine_update(
        &self,
        proposed: impl Into<MachineUpdate>,
    ) -> Result<UpdateReport, UpdateError> {
        let proposed = proposed.into();
        let _update = self.update_lock.lock().await;
        let current = self.store.current().await.machine;
        let proposed = proposed.resolve(&current.serial_device);
        let plan = MachinePlan::diff(&current, &proposed);
        let mut report = UpdateReport::default();
        let mut next = current;

        if let Some(timings) = plan.timings {
            self.connector.set_timing(timings).await;
            next.waiting_time = proposed.waiting_time;
            self.store.replace_machine(next.clone()).await;
            report.actions.push(LiveAction::SetTiming);
            debug!(
                waiting_secs = timings.waiting().as_secs(),
                debounce_secs = timings.debounce().as_secs(),
                "waiting and debounce time changed"
            );
        }

        if let Some(threshold) = plan.piezo_threshold {
            if let Err(err) = self.connector.set_piezo_threshold(threshold).await {
                warn!(?err, threshold, "piezo threshold not written to machine");
                report.warnings.push(format!("piezo threshold: {err}"));
            }
            next.piezo_threshold = threshold;
            report.actions.push(LiveAction::SetPiezoThreshold);
            debug!(threshold, "piezo threshold changed");
        }

        if let Some(device) = plan.serial_device.as_ref() {
            next.serial_device = device.clone();
        }
        self.store.replace_machine(next).await;

        if let Some(device) = plan.serial_device {
            debug!(%device, "serial port changed, reloading serial connection");
            report.actions.push(LiveAction::ReloadSerial);
            match self.connector.reload_serial(&device).await {
                Ok(()) => debug!("finished reloading serial connection"),
                Err(err) => {
                    warn!(?err, %device, "serial reload failed");
                    report.warnings.push(format!("serial: {err}"));
                }
            }
        }

        self.store
            .set_warnings(UpdateDomain::Machine, report.warnings.clone())
            .await;
        self.persist(UpdateDomain::Machine).await?;
        info!(actions = report.actions.len(), "machine settings updated");
        Ok(report)
    }

    pub async fn apply_scoreboard_update(
        &self,
        proposed: ScoreboardEndpoint,
    ) -> Result<UpdateReport, UpdateError> {
        let _update = self.update_lock.lock().await;
        let current = self.store.current().await.scoreboard;
        let plan = ScoreboardPlan::diff(&current.endpoint, &proposed);
        let mut report = UpdateReport::default();
        let mut next = current;

        if !plan.is_empty() {
            let fields: Vec<&str> = plan.changed.iter().map(|field| field.as_str()).collect();
            debug!(?fields, "scoreboard configuration changed");
            next.endpoint = proposed;
            self.store.replace_scoreboard(next.clone()).await;
            self.connector.set_scoreboard_endpoint(&next.endpoint).await;
            report.actions.push(LiveAction::SetScoreboardEndpoint);
        }

        debug!("checking scoreboard connection");
        report.actions.push(LiveAction::CheckConnection);
        match self.connector.check_connection().await {
            Ok(()) => next.last_error.clear(),
            Err(err) => {
                warn!(?err, "scoreboard connection check failed");
                next.last_error = err.to_string();
                report.connection_error = Some(next.last_error.clone());
            }
        }
        self.store.replace_scoreboard(next).await;

        debug!("reloading websocket");
        report.actions.push(LiveAction::ReloadWebsocket);
        match self.connector.reload_websocket().await {
            Ok(()) => debug!("finished reloading websocket"),
            Err(err) => {
                warn!(?err, "websocket reload failed");
                report.warnings.push(format!("websocket: {err}"));
            }
        }

        self.store
            .set_warnings(UpdateDomain::Scoreboard, report.warnings.clone())
            .await;
        self.persist(UpdateDomain::Scoreboard).await?;
        info!(
            actions = report.actions.len(),
            reachable = report.connection_error.is_none(),
            "scoreboard settings updated"
        );
        Ok(report)
    }

    async fn persist(&self, domain: UpdateDomain) -> Result<(), UpdateError> {
        self.store.persist().await.map_err(|err| {
            warn!(?err, domain = domain.as_str(), "settings not saved; live state kept");
            UpdateError::from(err)
        })
    }
}
