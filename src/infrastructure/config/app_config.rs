use config::Config;

use super::leads_config::LeadsApiConfig;
use super::sheets_config::SpreadsheetConfig;
use super::sync_config::SyncConfig;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: SpreadsheetConfig,
    pub leads_api: LeadsApiConfig,
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Loads the configuration once at startup: built-in production defaults,
    /// overridable by an optional local `Config` file and `LEAD_SYNC__*`
    /// environment variables.
    pub fn load() -> Self {
        let builder = Config::builder()
            .set_default("sheets.credentials_file", "/etc/secrets/service_account.json")
            .expect("valid default for sheets.credentials_file")
            .set_default("sheets.workbook", "Expo-Sales-Management")
            .expect("valid default for sheets.workbook")
            .set_default("sheets.worksheet", "exhibitors-1")
            .expect("valid default for sheets.worksheet")
            .set_default(
                "leads_api.endpoint",
                "https://b2bgrowthexpo.com/wp-json/custom-api/v1/protected/exhibitor-media-pack-form-data",
            )
            .expect("valid default for leads_api.endpoint")
            .set_default("leads_api.bearer_token", "")
            .expect("valid default for leads_api.bearer_token")
            .set_default("sync.interval_secs", 7200)
            .expect("valid default for sync.interval_secs")
            .add_source(config::File::with_name("Config").required(false))
            .add_source(config::Environment::with_prefix("LEAD_SYNC").separator("__"));

        match builder.build() {
            Ok(config) => config,
            Err(e) => match e {
                config::ConfigError::NotFound(property) => {
                    panic!("Missing config property: {:?}", property);
                }
                _ => {
                    panic!("Error reading config file: {:?}", e);
                }
            },
        }
        .try_deserialize()
        .expect("Should deserialize built config into struct")
    }
}
