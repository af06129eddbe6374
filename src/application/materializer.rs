use error_stack::ResultExt;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::application::session::Session;
use crate::domain::sheets::{dataset_to_grid, SpreadsheetId, TOP_LEFT};
use crate::domain::tabular::TabularDataset;
use crate::ports::remote::RemoteApiError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterializeError {
    #[error("Failed to create spreadsheet")]
    Create,
    #[error("Spreadsheet {spreadsheet_id} was created but could not be moved to the target folder")]
    Relocate { spreadsheet_id: SpreadsheetId },
    #[error("Spreadsheet {spreadsheet_id} was created but its values could not be written")]
    Populate { spreadsheet_id: SpreadsheetId },
}

impl MaterializeError {
    /// Id of the spreadsheet left behind by a failure after creation.
    pub fn orphaned_spreadsheet(&self) -> Option<&SpreadsheetId> {
        match self {
            MaterializeError::Create => None,
            MaterializeError::Relocate { spreadsheet_id }
            | MaterializeError::Populate { spreadsheet_id } => Some(spreadsheet_id),
        }
    }
}

/// Blank folder ids mean "leave the spreadsheet where it was created".
pub fn target_folder(folder_id: Option<&str>) -> Option<&str> {
    folder_id
        .map(str::trim)
        .filter(|folder_id| !folder_id.is_empty())
}

/// Turns a tabular dataset into a remote spreadsheet:
/// create, optionally move into a folder, then write header and rows at `A1`.
#[derive(Debug, Clone)]
pub struct SpreadsheetMaterializer {
    session: Session,
}

impl SpreadsheetMaterializer {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    #[instrument(skip(self, dataset), fields(rows = dataset.row_count(), columns = dataset.column_count()))]
    pub async fn create(
        &self,
        folder_id: Option<&str>,
        dataset: &TabularDataset,
        title: &str,
    ) -> error_stack::Result<SpreadsheetId, MaterializeError> {
        let spreadsheet_id = self
            .session
            .sheets
            .create_spreadsheet(title)
            .await
            .change_context(MaterializeError::Create)?;
        debug!("Created spreadsheet {} for '{}'", spreadsheet_id, title);

        if let Some(folder_id) = target_folder(folder_id) {
            self.move_to_folder(&spreadsheet_id, folder_id)
                .await
                .change_context_lazy(|| MaterializeError::Relocate {
                    spreadsheet_id: spreadsheet_id.clone(),
                })?;
        }

        self.session
            .sheets
            .write_values(&spreadsheet_id, TOP_LEFT, dataset_to_grid(dataset))
            .await
            .change_context_lazy(|| MaterializeError::Populate {
                spreadsheet_id: spreadsheet_id.clone(),
            })?;

        info!("Spreadsheet '{}' created with id {}", title, spreadsheet_id);
        Ok(spreadsheet_id)
    }

    /// Reads the current parents, then adds `folder_id` and removes the rest in
    /// one update. The two calls are not atomic.
    #[instrument(skip(self))]
    async fn move_to_folder(
        &self,
        spreadsheet_id: &SpreadsheetId,
        folder_id: &str,
    ) -> error_stack::Result<(), RemoteApiError> {
        let previous_parents = self
            .session
            .drive
            .get_parents(spreadsheet_id.as_str())
            .await?;

        if previous_parents.len() == 1 && previous_parents[0] == folder_id {
            debug!("Spreadsheet {} already in folder {}", spreadsheet_id, folder_id);
            return Ok(());
        }

        let remove_parents = previous_parents
            .into_iter()
            .filter(|parent| parent != folder_id)
            .collect::<Vec<_>>();

        self.session
            .drive
            .update_parents(
                spreadsheet_id.as_str(),
                &[folder_id.to_string()],
                &remove_parents,
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryRemote, RemoteOperation};
    use crate::domain::tabular::CellValue;
    use serde_json::json;
    use std::sync::Arc;

    fn dataset() -> TabularDataset {
        TabularDataset::new(
            vec!["city".into(), "population".into()],
            vec![
                vec![CellValue::from("Lisbon"), CellValue::from(545_000i64)],
                vec![CellValue::from("Porto"), CellValue::Empty],
            ],
        )
        .unwrap()
    }

    fn materializer(remote: &Arc<InMemoryRemote>) -> SpreadsheetMaterializer {
        SpreadsheetMaterializer::new(Session::in_memory(remote.clone()))
    }

    #[test]
    fn test_target_folder() {
        assert_eq!(target_folder(None), None);
        assert_eq!(target_folder(Some("")), None);
        assert_eq!(target_folder(Some("   ")), None);
        assert_eq!(target_folder(Some(" abc ")), Some("abc"));
    }

    #[tokio::test]
    async fn test_create_without_folder() {
        let remote = Arc::new(InMemoryRemote::new());
        let id = materializer(&remote)
            .create(None, &dataset(), "cities.csv")
            .await
            .unwrap();

        let stored = remote.spreadsheet(&id).await.unwrap();
        assert_eq!(stored.title, "cities.csv");
        assert_eq!(stored.parents, vec!["root".to_string()]);
        assert_eq!(stored.anchor.as_deref(), Some("A1"));
        assert_eq!(
            stored.values,
            vec![
                vec![json!("city"), json!("population")],
                vec![json!("Lisbon"), json!(545_000)],
                vec![json!("Porto"), json!("")],
            ]
        );
    }

    #[tokio::test]
    async fn test_move_replaces_all_parents() {
        let remote = Arc::new(InMemoryRemote::with_root_folder("P1"));
        let id = materializer(&remote)
            .create(Some("P2"), &dataset(), "cities.csv")
            .await
            .unwrap();

        assert_eq!(
            remote.spreadsheet(&id).await.unwrap().parents,
            vec!["P2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_move_into_current_folder_is_a_no_op() {
        let remote = Arc::new(InMemoryRemote::with_root_folder("P1"));
        remote.fail_on(RemoteOperation::UpdateParents).await;

        let id = materializer(&remote)
            .create(Some("P1"), &dataset(), "cities.csv")
            .await
            .unwrap();

        assert_eq!(
            remote.spreadsheet(&id).await.unwrap().parents,
            vec!["P1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_blank_folder_skips_move() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.fail_on(RemoteOperation::GetParents).await;

        let result = materializer(&remote)
            .create(Some("  "), &dataset(), "cities.csv")
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_failure_yields_no_id() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.fail_on(RemoteOperation::CreateSpreadsheet).await;

        let report = materializer(&remote)
            .create(Some("P2"), &dataset(), "cities.csv")
            .await
            .unwrap_err();

        assert_eq!(report.current_context(), &MaterializeError::Create);
        assert_eq!(report.current_context().orphaned_spreadsheet(), None);
        assert!(remote.spreadsheets().await.is_empty());
    }

    #[tokio::test]
    async fn test_move_failure_reports_orphan() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.fail_on(RemoteOperation::GetParents).await;

        let report = materializer(&remote)
            .create(Some("P2"), &dataset(), "cities.csv")
            .await
            .unwrap_err();

        let created = remote.spreadsheets().await;
        assert_eq!(created.len(), 1);
        assert_eq!(
            report.current_context(),
            &MaterializeError::Relocate {
                spreadsheet_id: created[0].id.clone()
            }
        );
    }

    #[tokio::test]
    async fn test_write_failure_reports_orphan() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.fail_on(RemoteOperation::WriteValues).await;

        let report = materializer(&remote)
            .create(None, &dataset(), "cities.csv")
            .await
            .unwrap_err();

        let created = remote.spreadsheets().await;
        assert_eq!(
            report.current_context().orphaned_spreadsheet(),
            Some(&created[0].id)
        );
        assert!(created[0].values.is_empty());
    }
}
