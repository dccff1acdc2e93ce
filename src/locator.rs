//! Remote dataset location resolution.
//!
//! Given a worker identity, the backend returns a time-limited signed URL
//! pointing at that worker's bulk voter-data object. The response body is
//! held to a single explicit schema (`{ "s3_url": string|null }`);
//! nonconforming bodies are a typed parse error rather than a best-effort
//! guess.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VoterRollError};
use crate::session::SessionContext;

/// Backend endpoint that resolves a worker's dataset location.
pub const LOCATE_ENDPOINT: &str = "/iConnect_get_all_voter_detailsV2_web";

/// Request body for the locate endpoint.
#[derive(Debug, Serialize)]
struct LocateRequest {
    /// Backend deployment stage.
    stage: String,
    /// Worker whose dataset is being located.
    party_worker_id: String,
}

/// Response body from the locate endpoint.
#[derive(Debug, Deserialize)]
struct LocateResponse {
    /// Signed object-storage URL; null or absent when the worker has no
    /// dataset.
    #[serde(default)]
    s3_url: Option<String>,
}

/// A resolver from worker identity to a bulk dataset location.
///
/// `Ok(None)` means the backend answered but has no dataset for the worker;
/// the bootstrap then settles into an empty ready state without surfacing
/// an error.
#[async_trait]
pub trait DatasetLocator: Send + Sync + std::fmt::Debug {
    /// Resolve the dataset location for the given worker.
    async fn resolve(&self, worker_id: &str) -> Result<Option<String>>;
}

/// HTTP implementation of [`DatasetLocator`].
#[derive(Debug, Clone)]
pub struct HttpDatasetLocator {
    /// HTTP client for backend requests.
    client: Client,
    /// Backend base URL, without a trailing slash.
    base_url: String,
    /// Deployment stage sent with every request.
    stage: String,
}

impl HttpDatasetLocator {
    /// Create a locator against the given backend base URL, taking the
    /// stage from the session context.
    pub fn new<S: Into<String>>(base_url: S, session: &SessionContext) -> Self {
        HttpDatasetLocator {
            client: Client::new(),
            base_url: base_url.into(),
            stage: session.stage().to_string(),
        }
    }
}

#[async_trait]
impl DatasetLocator for HttpDatasetLocator {
    async fn resolve(&self, worker_id: &str) -> Result<Option<String>> {
        let request = LocateRequest {
            stage: self.stage.clone(),
            party_worker_id: worker_id.to_string(),
        };

        let response = self
            .client
            .post(format!("{}{LOCATE_ENDPOINT}", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let location = parse_locate_response(&body)?;
        debug!(worker_id, located = location.is_some(), "resolved dataset location");
        Ok(location)
    }
}

/// Parse a locate-endpoint response body against its declared schema.
pub(crate) fn parse_locate_response(body: &[u8]) -> Result<Option<String>> {
    let response: LocateResponse = serde_json::from_slice(body).map_err(|e| {
        VoterRollError::parse(format!("locate response does not match schema: {e}"))
    })?;

    Ok(response.s3_url.filter(|url| !url.is_empty()))
}
