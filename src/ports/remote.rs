use thiserror::Error;

use crate::domain::sheets::{Grid, SpreadsheetId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteApiError {
    #[error("Failed to create spreadsheet")]
    FailedToCreateSpreadsheet,
    #[error("Spreadsheet id not present in create response")]
    MissingSpreadsheetId,
    #[error("Failed to fetch parents of file")]
    FailedToFetchParents,
    #[error("Failed to update parents of file")]
    FailedToUpdateParents,
    #[error("Failed to write values")]
    FailedToWriteValues,
}

/// Spreadsheet content operations.
#[async_trait::async_trait]
pub trait SheetsService: Send + Sync {
    /// Creates an empty spreadsheet and returns the id the service assigned to it.
    async fn create_spreadsheet(
        &self,
        title: &str,
    ) -> error_stack::Result<SpreadsheetId, RemoteApiError>;

    /// Writes `values` in one request, starting at `anchor`. Values are stored
    /// literally, formulas are not evaluated.
    async fn write_values(
        &self,
        spreadsheet_id: &SpreadsheetId,
        anchor: &str,
        values: Grid,
    ) -> error_stack::Result<(), RemoteApiError>;
}

/// File and folder operations.
#[async_trait::async_trait]
pub trait DriveService: Send + Sync {
    async fn get_parents(&self, file_id: &str) -> error_stack::Result<Vec<String>, RemoteApiError>;

    /// Adds and removes parents in a single update. Returns the parents reported
    /// by the service after the update.
    async fn update_parents(
        &self,
        file_id: &str,
        add_parents: &[String],
        remove_parents: &[String],
    ) -> error_stack::Result<Vec<String>, RemoteApiError>;
}
