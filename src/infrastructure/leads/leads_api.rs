use error_stack::ResultExt;
use serde_json::Value;
use thiserror::Error;

use crate::infrastructure::config::leads_config::LeadsApiConfig;

/// Client for the protected lead-form endpoint.
pub struct LeadsApi {
    config: LeadsApiConfig,
    client: reqwest::Client,
}

#[derive(Debug, Error)]
pub enum LeadsApiError {
    #[error("lead API request failed")]
    RequestFailed,
    #[error("lead API returned an unsuccessful status")]
    UnsuccessfulStatus,
    #[error("lead API response body is not valid JSON")]
    InvalidJson,
}

impl LeadsApi {
    pub fn new(config: LeadsApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Fetches the raw form-data payload. The body is kept as loose JSON on
    /// purpose: the upstream shape is unreliable and is validated by the
    /// caller, not assumed here.
    pub async fn fetch_form_data(&self) -> error_stack::Result<Value, LeadsApiError> {
        let response = self
            .client
            .get(self.config.endpoint.as_ref())
            .bearer_auth(self.config.bearer_token.as_ref())
            .send()
            .await
            .change_context(LeadsApiError::RequestFailed)
            .attach_printable_lazy(|| format!("endpoint: {}", self.config.endpoint))?;

        let response = response
            .error_for_status()
            .change_context(LeadsApiError::UnsuccessfulStatus)?;

        response
            .json::<Value>()
            .await
            .change_context(LeadsApiError::InvalidJson)
    }
}
