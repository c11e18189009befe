use std::collections::HashSet;

use error_stack::ResultExt;
use serde_json::Value;

use crate::domain::email_index::{build_email_index, locate_email_column};
use crate::domain::lead::{evaluate_entry, LeadRow, LeadRules};
use crate::domain::routine::{Routine, RoutineError};
use crate::infrastructure::config::sheets_config::SpreadsheetConfig;
use crate::infrastructure::leads::leads_api::LeadsApi;
use crate::infrastructure::sheets::spreadsheet_manager::SpreadsheetManager;

/// The full sync pipeline as a single schedulable routine: read the dedup
/// index, fetch the raw leads, filter and transform them, batch-write the
/// survivors.
pub struct LeadSyncRoutine {
    sheets_config: SpreadsheetConfig,
    api: LeadsApi,
    rules: LeadRules,
}

impl LeadSyncRoutine {
    pub fn new(sheets_config: SpreadsheetConfig, api: LeadsApi, rules: LeadRules) -> Self {
        Self {
            sheets_config,
            api,
            rules,
        }
    }
}

/// The upstream payload is usable only when its `data` field is an array.
/// Anything else is an upstream anomaly the caller soft-fails on.
pub fn form_data_entries(payload: &Value) -> Option<&Vec<Value>> {
    payload.get("data").and_then(Value::as_array)
}

/// Walks the raw entries in API order and returns the accepted rows, also in
/// API order. Every accepted email is added to `existing_emails` right away,
/// so a batch can never insert the same address twice.
pub fn collect_new_leads(
    entries: &[Value],
    existing_emails: &mut HashSet<String>,
    rules: &LeadRules,
) -> Vec<LeadRow> {
    let mut new_leads = Vec::new();

    for entry in entries {
        match evaluate_entry(entry, existing_emails, rules) {
            Ok(accepted) => {
                if accepted.row.pitch_deck_url.is_empty() {
                    tracing::warn!("⚠️ No pitch deck found for expo: {}", accepted.row.show);
                }
                existing_emails.insert(accepted.email_key);
                new_leads.push(accepted.row);
            }
            Err(rejection) if rejection.is_routine_skip() => {
                tracing::info!("⏭️ Skipping {}", rejection);
            }
            Err(rejection) => {
                tracing::warn!("⚠️ Skipping entry: {}", rejection);
            }
        }
    }

    new_leads
}

#[async_trait::async_trait]
impl Routine for LeadSyncRoutine {
    fn name(&self) -> &str {
        "Lead Sync"
    }

    async fn run(&self) -> error_stack::Result<(), RoutineError> {
        tracing::info!("🔧 Setting up spreadsheet access...");
        let manager = SpreadsheetManager::connect(self.sheets_config.clone())
            .await
            .change_context_lazy(|| {
                RoutineError::routine_failure("connecting to the spreadsheet service")
            })?;

        tracing::info!("📦 Fetching existing emails from sheet...");
        let header = manager
            .read_header_row()
            .await
            .change_context_lazy(|| RoutineError::routine_failure("reading the header row"))?;
        let email_column = locate_email_column(&header)
            .change_context_lazy(|| RoutineError::routine_failure("locating the email column"))?;
        let email_cells = manager
            .read_column_below_header(email_column)
            .await
            .change_context_lazy(|| RoutineError::routine_failure("reading the email column"))?;
        let mut existing_emails = build_email_index(email_cells);
        tracing::info!("📊 Found {} existing emails in sheet.", existing_emails.len());

        tracing::info!("🌐 Fetching leads from API...");
        let payload = self
            .api
            .fetch_form_data()
            .await
            .change_context_lazy(|| RoutineError::routine_failure("fetching leads from the API"))?;

        // A malformed `data` field is common enough upstream that it must not
        // count as a failed run: log it and end the run without writing.
        let Some(entries) = form_data_entries(&payload) else {
            tracing::error!("❌ Unexpected API response shape for 'data'");
            tracing::error!("🔍 Raw API response: {}", payload);
            return Ok(());
        };
        tracing::info!("📥 Received {} entries from API.", entries.len());

        let new_leads = collect_new_leads(entries, &mut existing_emails, &self.rules);
        tracing::info!("🧾 Found {} new unique leads to insert.", new_leads.len());

        if new_leads.is_empty() {
            tracing::info!("🔁 No new leads to add.");
            return Ok(());
        }

        let row_count = new_leads.len();
        let mut rows: Vec<Vec<String>> = new_leads.into_iter().map(LeadRow::into_cells).collect();
        // Newest-first: the last processed lead ends up directly under the header.
        rows.reverse();

        manager
            .insert_rows_below_header(rows)
            .await
            .change_context_lazy(|| RoutineError::routine_failure("inserting the new leads"))?;
        tracing::info!("✅ Inserted {} leads in one batch at row 2.", row_count);

        manager
            .reset_row_background(row_count)
            .await
            .change_context_lazy(|| {
                RoutineError::routine_failure("formatting the inserted rows")
            })?;

        Ok(())
    }
}
