//! HTTP data source for the raffle backend.
//!
//! Reads the four JSON endpoints under `{base_url}/api/`. Every failure,
//! including non-2xx statuses and undecodable bodies, surfaces as
//! `FetchFailed` carrying the endpoint name.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::config::HttpSourceConfig;
use crate::domain::{
    EpochBoundsPayload, ParticipantsPayload, PrizePayload, RaffleSyncError, WinnerPayload,
};
use crate::ports::RaffleDataSource;

const PRIZE_ENDPOINT: &str = "current-prize";
const PARTICIPANTS_ENDPOINT: &str = "participants";
const WINNER_ENDPOINT: &str = "latest-winner";
const EPOCH_ENDPOINT: &str = "current-epoch";

/// Raffle backend reached over HTTP.
pub struct HttpRaffleSource {
    client: Client,
    base_url: String,
}

impl HttpRaffleSource {
    /// Create a new source with the configured timeouts.
    pub fn new(config: &HttpSourceConfig) -> Result<Self, RaffleSyncError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| RaffleSyncError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint)
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        endpoint: &'static str,
    ) -> Result<R, RaffleSyncError> {
        let url = self.url(endpoint);
        trace!(%url, "GET");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() {
                let reason = format!("cannot connect to {}", self.base_url);
                RaffleSyncError::fetch_failed(endpoint, reason)
            } else if e.is_timeout() {
                RaffleSyncError::fetch_failed(endpoint, "request timed out")
            } else {
                RaffleSyncError::fetch_failed(endpoint, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RaffleSyncError::fetch_failed(endpoint, format!("HTTP {status}")));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| RaffleSyncError::fetch_failed(endpoint, format!("invalid body: {e}")))
    }
}

#[async_trait]
impl RaffleDataSource for HttpRaffleSource {
    async fn fetch_prize(&self) -> Result<PrizePayload, RaffleSyncError> {
        self.get_json(PRIZE_ENDPOINT).await
    }

    async fn fetch_participants(&self) -> Result<ParticipantsPayload, RaffleSyncError> {
        self.get_json(PARTICIPANTS_ENDPOINT).await
    }

    async fn fetch_latest_winner(&self) -> Result<WinnerPayload, RaffleSyncError> {
        self.get_json(WINNER_ENDPOINT).await
    }

    async fn fetch_epoch_bounds(&self) -> Result<EpochBoundsPayload, RaffleSyncError> {
        self.get_json(EPOCH_ENDPOINT).await
    }

    fn source_id(&self) -> &str {
        &self.base_url
    }
}
