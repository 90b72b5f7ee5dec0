use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{AuthorLookup, LookupError};

/// Google Books volumes search: the first result's authors, comma separated.
pub struct GoogleBooksLookup {
    client: Client,
    url: String,
}

#[derive(Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Deserialize)]
struct VolumeInfo {
    #[serde(default)]
    authors: Vec<String>,
}

impl GoogleBooksLookup {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl AuthorLookup for GoogleBooksLookup {
    async fn lookup(&self, title: &str) -> Result<String, LookupError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("q", title)])
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LookupError::Request(format!(
                "volumes search failed ({})",
                resp.status()
            )));
        }

        let body: VolumesResponse = resp
            .json()
            .await
            .map_err(|e| LookupError::Response(e.to_string()))?;

        Ok(body
            .items
            .into_iter()
            .next()
            .map(|volume| volume.volume_info.authors.join(", "))
            .unwrap_or_default())
    }
}
