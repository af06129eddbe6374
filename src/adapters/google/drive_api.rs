use std::fmt::Debug;

use error_stack::ResultExt;
use google_drive3::{api::File, DriveHub};
use google_sheets4::oauth2::authenticator::Authenticator;
use tracing::instrument;

use super::http_client::{HttpClient, HttpsConnector};
use crate::ports::remote::{DriveService, RemoteApiError};

/// Drive v3 hub, used only to read and rewrite the parents of created files.
pub struct GoogleDrive {
    hub: DriveHub<HttpsConnector>,
    scopes: Vec<String>,
}

impl Debug for GoogleDrive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GoogleDrive {{ scopes: {:?} }}", self.scopes)
    }
}

impl GoogleDrive {
    pub fn new(client: HttpClient, auth: Authenticator<HttpsConnector>, scopes: &[&str]) -> Self {
        Self {
            hub: DriveHub::new(client, auth),
            scopes: scopes.iter().map(|scope| scope.to_string()).collect(),
        }
    }
}

#[async_trait::async_trait]
impl DriveService for GoogleDrive {
    #[instrument]
    async fn get_parents(&self, file_id: &str) -> error_stack::Result<Vec<String>, RemoteApiError> {
        let (_, file) = self
            .hub
            .files()
            .get(file_id)
            .param("fields", "parents")
            .supports_all_drives(true)
            .add_scopes(&self.scopes)
            .doit()
            .await
            .change_context(RemoteApiError::FailedToFetchParents)
            .attach_printable_lazy(|| format!("File id: {}", file_id))?;

        Ok(file.parents.unwrap_or_default())
    }

    #[instrument]
    async fn update_parents(
        &self,
        file_id: &str,
        add_parents: &[String],
        remove_parents: &[String],
    ) -> error_stack::Result<Vec<String>, RemoteApiError> {
        let mut call = self
            .hub
            .files()
            .update(File::default(), file_id)
            .param("fields", "id, parents")
            .supports_all_drives(true)
            .add_scopes(&self.scopes);

        if !add_parents.is_empty() {
            call = call.add_parents(&add_parents.join(","));
        }
        if !remove_parents.is_empty() {
            call = call.remove_parents(&remove_parents.join(","));
        }

        let (_, file) = call
            .doit_without_upload()
            .await
            .change_context(RemoteApiError::FailedToUpdateParents)
            .attach_printable_lazy(|| {
                format!(
                    "File id: {}, add: [{}], remove: [{}]",
                    file_id,
                    add_parents.join(", "),
                    remove_parents.join(", ")
                )
            })?;

        Ok(file.parents.unwrap_or_default())
    }
}
