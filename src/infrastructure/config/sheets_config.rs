#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Path to the service account JSON key.
    pub credentials_file: Box<str>,
    /// Workbook name as shown on Drive, resolved to an id at connect time.
    pub workbook: Box<str>,
    /// Tab inside the workbook that holds the lead rows.
    pub worksheet: Box<str>,
}
