//! Bulk dataset retrieval.
//!
//! One network retrieval per bootstrap: the signed URL from the locator is
//! fetched as a single payload and parsed strictly as an array of voter
//! records. There is no retry policy; a failure here aborts the bootstrap
//! and the controller settles into an empty ready state.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{Result, VoterRollError};
use crate::record::{VoterRecord, validate_dataset};

/// A retriever for the bulk voter dataset.
#[async_trait]
pub trait DatasetFetcher: Send + Sync + std::fmt::Debug {
    /// Fetch and parse the dataset at the given location.
    async fn fetch(&self, url: &str) -> Result<Vec<VoterRecord>>;
}

/// HTTP implementation of [`DatasetFetcher`].
#[derive(Debug, Clone, Default)]
pub struct HttpDatasetFetcher {
    /// HTTP client for the object-storage request.
    client: Client,
}

impl HttpDatasetFetcher {
    /// Create a fetcher with a default client.
    pub fn new() -> Self {
        HttpDatasetFetcher {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl DatasetFetcher for HttpDatasetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<VoterRecord>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        let records = parse_dataset(&body)?;
        debug!(records = records.len(), "fetched bulk dataset");
        Ok(records)
    }
}

/// Parse a bulk dataset body against its declared schema: a JSON array of
/// voter records, each carrying an identity key.
pub(crate) fn parse_dataset(body: &[u8]) -> Result<Vec<VoterRecord>> {
    let records: Vec<VoterRecord> = serde_json::from_slice(body)
        .map_err(|e| VoterRollError::parse(format!("dataset does not match schema: {e}")))?;

    validate_dataset(&records)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset_preserves_source_order() {
        let body = br#"[
            {"voter_id": "V3", "voter_full_name": "C"},
            {"voter_id": "V1", "voter_full_name": "A"},
            {"voter_id": "V2", "voter_full_name": "B"}
        ]"#;

        let records = parse_dataset(body).unwrap();
        let ids: Vec<_> = records.iter().filter_map(|r| r.identity_key()).collect();
        assert_eq!(ids, vec!["V3", "V1", "V2"]);
    }

    #[test]
    fn test_parse_dataset_rejects_non_array() {
        let err = parse_dataset(br#"{"RESULT": []}"#).unwrap_err();
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_parse_dataset_rejects_record_without_identity() {
        let body = br#"[{"voter_id": "V1"}, {"gender": "Male"}]"#;
        let err = parse_dataset(body).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_parse_dataset_empty_array() {
        assert!(parse_dataset(b"[]").unwrap().is_empty());
    }
}
