use crate::domain::model::StreamRecord;
use crate::domain::ports::StreamsSource;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Client for the private streams API. Authenticates with a `key` query
/// parameter and expects a JSON array of stream records.
pub struct HttpStreamsSource {
    client: Client,
    api_path: String,
    api_key: String,
}

impl HttpStreamsSource {
    pub fn new(api_path: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_path,
            api_key,
        }
    }
}

#[async_trait]
impl StreamsSource for HttpStreamsSource {
    async fn fetch_streams(&self) -> Result<Vec<StreamRecord>> {
        tracing::debug!("Fetching current streams from {}", self.api_path);

        let response = self
            .client
            .get(&self.api_path)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::StreamsApiError {
                status: status.as_u16(),
            });
        }

        let records: Vec<StreamRecord> = response.json().await?;
        tracing::debug!("Streams API returned {} records", records.len());
        Ok(records)
    }
}
