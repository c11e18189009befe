use error_stack::{report, Result, ResultExt};
use google_drive3::DriveHub;
use google_sheets4::api::{
    BatchUpdateSpreadsheetRequest, CellData, CellFormat, Color, DimensionRange, GridRange,
    InsertDimensionRequest, RepeatCellRequest, Request, ValueRange,
};
use google_sheets4::Sheets;
use thiserror::Error;
use tracing::instrument;

use crate::domain::sheets::column::Column;
use crate::infrastructure::config::sheets_config::SpreadsheetConfig;
use crate::infrastructure::http_client;

use super::auth;
use super::value_range_factory::{ValueRangeCells, ValueRangeFactory};

type Connector = google_sheets4::hyper_rustls::HttpsConnector<
    google_sheets4::hyper::client::HttpConnector,
>;

/// Handle to one worksheet of a named workbook. Connecting resolves the
/// workbook name to a spreadsheet id (Drive) and the worksheet title to a
/// numeric sheet id (Sheets metadata).
pub struct SpreadsheetManager {
    config: SpreadsheetConfig,
    hub: Sheets<Connector>,
    spreadsheet_id: String,
    sheet_id: i32,
}

#[derive(Debug, Error)]
pub enum SpreadsheetManagerError {
    #[error("could not load service account credentials")]
    CredentialsUnavailable,
    #[error("could not find the workbook on Drive")]
    WorkbookNotFound,
    #[error("could not find the worksheet in the workbook")]
    WorksheetNotFound,
    #[error("failed to fetch a range from the worksheet")]
    FailedToFetchRange,
    #[error("failed to write rows to the worksheet")]
    FailedToWriteRows,
    #[error("failed to format the inserted rows")]
    FailedToFormatRows,
}

impl SpreadsheetManager {
    pub async fn connect(config: SpreadsheetConfig) -> Result<Self, SpreadsheetManagerError> {
        let client = http_client::http_client();
        let authenticator = auth::auth(config.credentials_file.as_ref(), client.clone()).await?;

        let drive: DriveHub<Connector> = DriveHub::new(client.clone(), authenticator.clone());
        let spreadsheet_id = resolve_workbook_id(&drive, config.workbook.as_ref()).await?;

        let hub: Sheets<Connector> = Sheets::new(client, authenticator);
        let sheet_id = resolve_sheet_id(&hub, &spreadsheet_id, config.worksheet.as_ref()).await?;

        Ok(SpreadsheetManager {
            config,
            hub,
            spreadsheet_id,
            sheet_id,
        })
    }

    #[instrument(skip(self))]
    async fn read_range(&self, range: &str) -> Result<ValueRange, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, range)
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToFetchRange)
            .attach_printable_lazy(|| format!("range: {}", range))?;

        Ok(response.1)
    }

    /// Reads the worksheet header row.
    pub async fn read_header_row(&self) -> Result<Vec<String>, SpreadsheetManagerError> {
        let range = format!("'{}'!1:1", self.config.worksheet);
        let value_range = self.read_range(&range).await?;
        Ok(value_range.into_rows().into_iter().next().unwrap_or_default())
    }

    /// Reads one full column, starting just below the header. Cells come back
    /// positionally, so blank cells inside the column stay in the result.
    pub async fn read_column_below_header(
        &self,
        column: Column,
    ) -> Result<Vec<String>, SpreadsheetManagerError> {
        let range = format!("'{}'!{}2:{}", self.config.worksheet, column, column);
        let value_range = self.read_range(&range).await?;
        Ok(value_range
            .into_rows()
            .into_iter()
            .map(|mut row| {
                if row.is_empty() {
                    String::new()
                } else {
                    row.remove(0)
                }
            })
            .collect())
    }

    /// Inserts the given rows in one batch directly below the header: first
    /// reserves the space with an InsertDimension, then writes the values
    /// with spreadsheet-native interpretation (`USER_ENTERED`).
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub async fn insert_rows_below_header(
        &self,
        rows: Vec<Vec<String>>,
    ) -> Result<(), SpreadsheetManagerError> {
        let row_count = rows.len() as i32;

        let insert = Request {
            insert_dimension: Some(InsertDimensionRequest {
                range: Some(DimensionRange {
                    sheet_id: Some(self.sheet_id),
                    dimension: Some("ROWS".to_string()),
                    start_index: Some(1),
                    end_index: Some(1 + row_count),
                }),
                inherit_from_before: Some(false),
            }),
            ..Default::default()
        };

        self.hub
            .spreadsheets()
            .batch_update(
                BatchUpdateSpreadsheetRequest {
                    requests: Some(vec![insert]),
                    ..Default::default()
                },
                &self.spreadsheet_id,
            )
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToWriteRows)
            .attach_printable("inserting empty rows below the header")?;

        let range = format!("'{}'!A2", self.config.worksheet);
        self.hub
            .spreadsheets()
            .values_update(
                ValueRange::from_row_major(rows),
                &self.spreadsheet_id,
                &range,
            )
            .value_input_option("USER_ENTERED")
            .doit()
            .await
            .map(|_| ())
            .change_context(SpreadsheetManagerError::FailedToWriteRows)
            .attach_printable_lazy(|| format!("range: {}", range))
    }

    /// Resets the background of the freshly inserted rows (columns A..Z) to
    /// white, as a visual cue for rows added by the sync.
    #[instrument(skip(self))]
    pub async fn reset_row_background(
        &self,
        row_count: usize,
    ) -> Result<(), SpreadsheetManagerError> {
        let white = Color {
            red: Some(1.0),
            green: Some(1.0),
            blue: Some(1.0),
            ..Default::default()
        };

        let repeat_cell = Request {
            repeat_cell: Some(RepeatCellRequest {
                range: Some(GridRange {
                    sheet_id: Some(self.sheet_id),
                    start_row_index: Some(1),
                    end_row_index: Some(1 + row_count as i32),
                    start_column_index: Some(0),
                    end_column_index: Some(26),
                }),
                cell: Some(CellData {
                    user_entered_format: Some(CellFormat {
                        background_color: Some(white),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                fields: "userEnteredFormat.backgroundColor".parse().ok(),
            }),
            ..Default::default()
        };

        self.hub
            .spreadsheets()
            .batch_update(
                BatchUpdateSpreadsheetRequest {
                    requests: Some(vec![repeat_cell]),
                    ..Default::default()
                },
                &self.spreadsheet_id,
            )
            .doit()
            .await
            .map(|_| ())
            .change_context(SpreadsheetManagerError::FailedToFormatRows)
    }
}

async fn resolve_workbook_id(
    drive: &DriveHub<Connector>,
    workbook: &str,
) -> Result<String, SpreadsheetManagerError> {
    let response = drive
        .files()
        .list()
        .q(&format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            workbook
        ))
        .doit()
        .await
        .change_context(SpreadsheetManagerError::WorkbookNotFound)
        .attach_printable_lazy(|| format!("workbook: {}", workbook))?;

    response
        .1
        .files
        .unwrap_or_default()
        .into_iter()
        .find_map(|file| file.id)
        .ok_or(report!(SpreadsheetManagerError::WorkbookNotFound))
        .attach_printable_lazy(|| format!("workbook: {}", workbook))
}

async fn resolve_sheet_id(
    hub: &Sheets<Connector>,
    spreadsheet_id: &str,
    worksheet: &str,
) -> Result<i32, SpreadsheetManagerError> {
    let response = hub
        .spreadsheets()
        .get(spreadsheet_id)
        .doit()
        .await
        .change_context(SpreadsheetManagerError::WorksheetNotFound)?;

    response
        .1
        .sheets
        .unwrap_or_default()
        .into_iter()
        .filter_map(|sheet| sheet.properties)
        .find(|props| props.title.as_deref() == Some(worksheet))
        .and_then(|props| props.sheet_id)
        .ok_or(report!(SpreadsheetManagerError::WorksheetNotFound))
        .attach_printable_lazy(|| format!("worksheet: {}", worksheet))
}
