use crate::error::{Error, Result};
use reqwest::{Client, Response};
use responses::{Record, RecordRequest};
use std::time::Duration;
use tracing::debug;

pub mod responses;

/// The production CloudDNS API
pub const DEFAULT_API_URL: &str = "https://engine.anexia-it.com";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Timeout applied independently to every outbound API call
const TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the CloudDNS zone API.
///
/// Constructed fresh for every challenge with the bearer token resolved for
/// it; holds no state beyond the underlying HTTP client.
#[derive(Clone, Debug)]
pub struct CloudDnsClient {
    http: Client,
    base_url: String,
    token: String,
}

impl CloudDnsClient {
    /// Create a client authenticated with the given bearer token.
    ///
    /// An empty `base_url` selects the production API.
    pub fn new(base_url: &str, token: String) -> Result<CloudDnsClient> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()
            .map_err(Error::ClientSetup)?;

        let base_url = if base_url.is_empty() {
            DEFAULT_API_URL
        } else {
            base_url
        };

        Ok(CloudDnsClient {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    /// List all records in a zone
    pub async fn list_records(&self, zone: &str) -> Result<Vec<Record>> {
        debug!(%zone, "listing records");

        let response = self
            .http
            .get(self.records_url(zone))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let records = Self::checked(response).await?.json().await?;

        Ok(records)
    }

    /// Create a record in a zone.
    ///
    /// The provider does not deduplicate: creating the same record twice
    /// yields two records.
    pub async fn create_record(&self, zone: &str, record: &RecordRequest) -> Result<Record> {
        debug!(%zone, name = %record.name, r#type = %record.type_, "creating record");

        let response = self
            .http
            .post(self.records_url(zone))
            .bearer_auth(&self.token)
            .json(record)
            .send()
            .await?;
        let record = Self::checked(response).await?.json().await?;

        Ok(record)
    }

    /// Delete a record in a zone by its provider-assigned identifier
    pub async fn delete_record(&self, zone: &str, identifier: &str) -> Result<()> {
        debug!(%zone, %identifier, "deleting record");

        let response = self
            .http
            .delete(format!("{}/{identifier}", self.records_url(zone)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::checked(response).await?;

        Ok(())
    }

    fn records_url(&self, zone: &str) -> String {
        format!("{}/api/clouddns/v1/zone.json/{zone}/records", self.base_url)
    }

    /// Convert a non-success response into an API error carrying the body
    async fn checked(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(Error::Api { status, message })
    }
}
