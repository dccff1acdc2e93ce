//! Per-voter drill-down lookup.
//!
//! Used only when a user opens a single voter's detail view; not part of
//! the bootstrap path. The response schema is `{ "RESULT": [details, ...] }`
//! with the first element carrying the detail record; an empty or absent
//! array means "no additional details". Callers catch and log failures so
//! a broken lookup never disrupts the page list.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VoterRollError};
use crate::record::VoterDetails;
use crate::session::SessionContext;

/// Backend endpoint for the per-voter detail lookup.
pub const DETAILS_ENDPOINT: &str = "/iConnect_get_other_voter_details_web";

/// Request body for the detail endpoint.
#[derive(Debug, Serialize)]
struct DetailRequest {
    /// Backend deployment stage.
    stage: String,
    /// Voter identity: `voter_id`, falling back to `epic_number`.
    voter_id: String,
}

/// Response body from the detail endpoint.
#[derive(Debug, Deserialize)]
struct DetailResponse {
    /// Detail records; only the first is used.
    #[serde(rename = "RESULT", default)]
    result: Vec<VoterDetails>,
}

/// HTTP client for the drill-down endpoint.
#[derive(Debug, Clone)]
pub struct DetailClient {
    /// HTTP client for backend requests.
    client: Client,
    /// Backend base URL, without a trailing slash.
    base_url: String,
    /// Deployment stage sent with every request.
    stage: String,
}

impl DetailClient {
    /// Create a client against the given backend base URL, taking the stage
    /// from the session context.
    pub fn new<S: Into<String>>(base_url: S, session: &SessionContext) -> Self {
        DetailClient {
            client: Client::new(),
            base_url: base_url.into(),
            stage: session.stage().to_string(),
        }
    }

    /// Look up additional details for the given voter identity.
    pub async fn get_other_voter_details(&self, identifier: &str) -> Result<Option<VoterDetails>> {
        let request = DetailRequest {
            stage: self.stage.clone(),
            voter_id: identifier.to_string(),
        };

        let response = self
            .client
            .post(format!("{}{DETAILS_ENDPOINT}", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let details = parse_detail_response(&body)?;
        debug!(identifier, found = details.is_some(), "voter detail lookup");
        Ok(details)
    }
}

/// Parse a detail-endpoint response body against its declared schema.
pub(crate) fn parse_detail_response(body: &[u8]) -> Result<Option<VoterDetails>> {
    let response: DetailResponse = serde_json::from_slice(body).map_err(|e| {
        VoterRollError::parse(format!("detail response does not match schema: {e}"))
    })?;

    Ok(response.result.into_iter().next())
}
