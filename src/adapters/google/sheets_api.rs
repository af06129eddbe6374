use std::fmt::Debug;

use error_stack::{report, ResultExt};
use google_sheets4::{
    api::{Spreadsheet, SpreadsheetProperties, ValueRange},
    oauth2::authenticator::Authenticator,
    Sheets,
};
use tracing::instrument;

use super::http_client::{HttpClient, HttpsConnector};
use super::value_range_factory::ValueRangeFactory;
use crate::domain::sheets::{Grid, SpreadsheetId};
use crate::ports::remote::{RemoteApiError, SheetsService};

/// Sheets v4 hub. Every call is issued with the session scopes.
pub struct GoogleSheets {
    hub: Sheets<HttpsConnector>,
    scopes: Vec<String>,
}

impl Debug for GoogleSheets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GoogleSheets {{ scopes: {:?} }}", self.scopes)
    }
}

impl GoogleSheets {
    pub fn new(client: HttpClient, auth: Authenticator<HttpsConnector>, scopes: &[&str]) -> Self {
        Self {
            hub: Sheets::new(client, auth),
            scopes: scopes.iter().map(|scope| scope.to_string()).collect(),
        }
    }
}

#[async_trait::async_trait]
impl SheetsService for GoogleSheets {
    #[instrument]
    async fn create_spreadsheet(
        &self,
        title: &str,
    ) -> error_stack::Result<SpreadsheetId, RemoteApiError> {
        let request = Spreadsheet {
            properties: Some(SpreadsheetProperties {
                title: Some(title.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let (_, spreadsheet) = self
            .hub
            .spreadsheets()
            .create(request)
            .param("fields", "spreadsheetId")
            .add_scopes(&self.scopes)
            .doit()
            .await
            .change_context(RemoteApiError::FailedToCreateSpreadsheet)
            .attach_printable_lazy(|| format!("Spreadsheet title: {}", title))?;

        spreadsheet
            .spreadsheet_id
            .map(SpreadsheetId::new)
            .ok_or_else(|| report!(RemoteApiError::MissingSpreadsheetId))
            .attach_printable_lazy(|| format!("Spreadsheet title: {}", title))
    }

    #[instrument(skip(values), fields(rows = values.len()))]
    async fn write_values(
        &self,
        spreadsheet_id: &SpreadsheetId,
        anchor: &str,
        values: Grid,
    ) -> error_stack::Result<(), RemoteApiError> {
        self.hub
            .spreadsheets()
            .values_update(ValueRange::from_grid(values), spreadsheet_id.as_str(), anchor)
            .value_input_option("RAW")
            .add_scopes(&self.scopes)
            .doit()
            .await
            .map(|_| ())
            .change_context(RemoteApiError::FailedToWriteValues)
            .attach_printable_lazy(|| {
                format!("Failed to write to {} at {}", spreadsheet_id, anchor)
            })
    }
}
