// Scoreboard endpoint holder and heartbeat check.

use std::sync::Arc;
use std::time::Duration;

use machine_core::settings::ScoreboardEndpoint;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::debug;

use super::ConnectorError;
use crate::constants::HEARTBEAT_TIMEOUT_SECS;

pub struct ScoreboardSender {
    endpoint: Arc<RwLock<ScoreboardEndpoint>>,
    client: Client,
}

impl ScoreboardSender {
    pub fn new(endpoint: Arc<RwLock<ScoreboardEndpoint>>) -> Result<Self, ConnectorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HEARTBEAT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { endpoint, client })
    }

    pub async fn set_endpoint(&self, endpoint: ScoreboardEndpoint) {
        *self.endpoint.write().await = endpoint;
    }

    pub async fn endpoint(&self) -> ScoreboardEndpoint {
        self.endpoint.read().await.clone()
    }

    /// Requests the configured game with the configured credentials; anything
    /// but a 2xx answer counts as a failed heartbeat.
    pub async fn check_connection(&self) -> Result<(), ConnectorError> {
        let endpoint = self.endpoint().await;
        let url = heartbeat_url(&endpoint);
        debug!(%url, "scoreboard heartbeat");
        let response = self
            .client
            .get(&url)
            .basic_auth(&endpoint.user, Some(&endpoint.pass))
            .send()
            .await
            .map_err(|err| ConnectorError::Unreachable(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConnectorError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

pub fn heartbeat_url(endpoint: &ScoreboardEndpoint) -> String {
    format!("{}/api/game/{}", endpoint.http_base(), endpoint.game_id)
}
