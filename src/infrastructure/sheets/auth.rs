use error_stack::ResultExt;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use google_sheets4::{hyper, hyper_rustls};

use crate::infrastructure::http_client::HttpsClient;

use super::spreadsheet_manager::SpreadsheetManagerError;

pub type SheetsAuthenticator =
    Authenticator<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>;

/// Builds a service-account authenticator over the shared hyper client.
pub async fn auth(
    credentials_file: &str,
    client: HttpsClient,
) -> error_stack::Result<SheetsAuthenticator, SpreadsheetManagerError> {
    let secret: oauth2::ServiceAccountKey = oauth2::read_service_account_key(credentials_file)
        .await
        .change_context(SpreadsheetManagerError::CredentialsUnavailable)
        .attach_printable_lazy(|| format!("credentials file: {}", credentials_file))?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(SpreadsheetManagerError::CredentialsUnavailable)
}
