mod application;
mod domain;
mod infrastructure;

use std::time::Duration;

use application::lead_sync::LeadSyncRoutine;
use application::scheduler::Scheduler;
use domain::lead::LeadRules;
use infrastructure::config::app_config::AppConfig;
use infrastructure::leads::leads_api::LeadsApi;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load();
    tracing::info!(
        "⚙️ Syncing leads into '{}' / '{}' every {} seconds",
        config.sheets.workbook,
        config.sheets.worksheet,
        config.sync.interval_secs
    );

    let routine = LeadSyncRoutine::new(
        config.sheets.clone(),
        LeadsApi::new(config.leads_api.clone()),
        LeadRules::standard(),
    );
    let scheduler = Scheduler::new(Duration::from_secs(config.sync.interval_secs));

    scheduler.run_forever(&routine, tokio::time::sleep).await
}
