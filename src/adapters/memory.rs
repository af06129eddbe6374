use std::collections::HashSet;

use error_stack::report;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::domain::sheets::{Grid, SpreadsheetId};
use crate::ports::remote::{DriveService, RemoteApiError, SheetsService};

/// Folder new spreadsheets land in, like the root of "My Drive".
pub const DEFAULT_ROOT_FOLDER: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    CreateSpreadsheet,
    GetParents,
    UpdateParents,
    WriteValues,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSpreadsheet {
    pub id: SpreadsheetId,
    pub title: String,
    pub parents: Vec<String>,
    pub anchor: Option<String>,
    pub values: Grid,
}

#[derive(Debug, Default)]
struct RemoteState {
    spreadsheets: Vec<StoredSpreadsheet>,
    failing: HashSet<RemoteOperation>,
}

/// Drive + Sheets stand-in that keeps everything in memory.
/// Backs `--dry-run` and the tests.
#[derive(Debug)]
pub struct InMemoryRemote {
    root_folder: String,
    state: RwLock<RemoteState>,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::with_root_folder(DEFAULT_ROOT_FOLDER)
    }
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_folder(root_folder: impl Into<String>) -> Self {
        Self {
            root_folder: root_folder.into(),
            state: RwLock::new(RemoteState::default()),
        }
    }

    /// Makes every subsequent call of `operation` fail.
    pub async fn fail_on(&self, operation: RemoteOperation) {
        self.state.write().await.failing.insert(operation);
    }

    /// Spreadsheets in creation order.
    pub async fn spreadsheets(&self) -> Vec<StoredSpreadsheet> {
        self.state.read().await.spreadsheets.clone()
    }

    pub async fn spreadsheet(&self, id: &SpreadsheetId) -> Option<StoredSpreadsheet> {
        self.state
            .read()
            .await
            .spreadsheets
            .iter()
            .find(|spreadsheet| &spreadsheet.id == id)
            .cloned()
    }

    async fn check(
        &self,
        operation: RemoteOperation,
        error: RemoteApiError,
    ) -> error_stack::Result<(), RemoteApiError> {
        if self.state.read().await.failing.contains(&operation) {
            return Err(report!(error)
                .attach_printable(format!("Injected failure for {:?}", operation)));
        }
        Ok(())
    }
}

fn not_found(id: &str, error: RemoteApiError) -> error_stack::Report<RemoteApiError> {
    report!(error).attach_printable(format!("File not found: {}", id))
}

#[async_trait::async_trait]
impl SheetsService for InMemoryRemote {
    #[instrument(skip(self))]
    async fn create_spreadsheet(
        &self,
        title: &str,
    ) -> error_stack::Result<SpreadsheetId, RemoteApiError> {
        self.check(
            RemoteOperation::CreateSpreadsheet,
            RemoteApiError::FailedToCreateSpreadsheet,
        )
        .await?;

        let mut state = self.state.write().await;
        let id = SpreadsheetId::new(format!("memory-{}", state.spreadsheets.len() + 1));
        state.spreadsheets.push(StoredSpreadsheet {
            id: id.clone(),
            title: title.to_string(),
            parents: vec![self.root_folder.clone()],
            anchor: None,
            values: Grid::new(),
        });

        Ok(id)
    }

    #[instrument(skip(self, values))]
    async fn write_values(
        &self,
        spreadsheet_id: &SpreadsheetId,
        anchor: &str,
        values: Grid,
    ) -> error_stack::Result<(), RemoteApiError> {
        self.check(
            RemoteOperation::WriteValues,
            RemoteApiError::FailedToWriteValues,
        )
        .await?;

        let mut state = self.state.write().await;
        let spreadsheet = state
            .spreadsheets
            .iter_mut()
            .find(|spreadsheet| &spreadsheet.id == spreadsheet_id)
            .ok_or_else(|| {
                not_found(spreadsheet_id.as_str(), RemoteApiError::FailedToWriteValues)
            })?;

        spreadsheet.anchor = Some(anchor.to_string());
        spreadsheet.values = values;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DriveService for InMemoryRemote {
    #[instrument(skip(self))]
    async fn get_parents(&self, file_id: &str) -> error_stack::Result<Vec<String>, RemoteApiError> {
        self.check(
            RemoteOperation::GetParents,
            RemoteApiError::FailedToFetchParents,
        )
        .await?;

        self.state
            .read()
            .await
            .spreadsheets
            .iter()
            .find(|spreadsheet| spreadsheet.id.as_str() == file_id)
            .map(|spreadsheet| spreadsheet.parents.clone())
            .ok_or_else(|| not_found(file_id, RemoteApiError::FailedToFetchParents))
    }

    #[instrument(skip(self))]
    async fn update_parents(
        &self,
        file_id: &str,
        add_parents: &[String],
        remove_parents: &[String],
    ) -> error_stack::Result<Vec<String>, RemoteApiError> {
        self.check(
            RemoteOperation::UpdateParents,
            RemoteApiError::FailedToUpdateParents,
        )
        .await?;

        let mut state = self.state.write().await;
        let spreadsheet = state
            .spreadsheets
            .iter_mut()
            .find(|spreadsheet| spreadsheet.id.as_str() == file_id)
            .ok_or_else(|| not_found(file_id, RemoteApiError::FailedToUpdateParents))?;

        spreadsheet
            .parents
            .retain(|parent| !remove_parents.contains(parent));
        for parent in add_parents {
            if !spreadsheet.parents.contains(parent) {
                spreadsheet.parents.push(parent.clone());
            }
        }

        Ok(spreadsheet.parents.clone())
    }
}
