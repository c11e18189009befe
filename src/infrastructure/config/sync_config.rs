#[derive(serde::Deserialize, Debug, Clone)]
pub struct SyncConfig {
    /// Seconds to sleep between sync runs.
    pub interval_secs: u64,
}
