#[derive(serde::Deserialize, Debug, Clone)]
pub struct LeadsApiConfig {
    pub endpoint: Box<str>,
    /// Static bearer token for the protected form-data endpoint.
    pub bearer_token: Box<str>,
}
