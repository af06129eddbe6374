use std::fmt::Debug;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::adapters::google::{
    auth::{self, AuthError, ServiceAccountCredential, SCOPES},
    http_client, GoogleDrive, GoogleSheets,
};
use crate::adapters::memory::InMemoryRemote;
use crate::ports::remote::{DriveService, SheetsService};

/// The two capability handles every upload goes through.
/// Read-only after construction; cloning shares the same handles.
#[derive(Clone)]
pub struct Session {
    pub drive: Arc<dyn DriveService>,
    pub sheets: Arc<dyn SheetsService>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("drive", &"<DriveService>")
            .field("sheets", &"<SheetsService>")
            .finish()
    }
}

impl Session {
    pub fn new(drive: Arc<dyn DriveService>, sheets: Arc<dyn SheetsService>) -> Self {
        Self { drive, sheets }
    }

    /// Authenticates with a service-account credential and builds the Drive v3
    /// and Sheets v4 handles, both scoped to [`SCOPES`].
    #[instrument(name = "Session::connect")]
    pub async fn connect(
        credential: &ServiceAccountCredential,
    ) -> error_stack::Result<Self, AuthError> {
        let client = http_client::http_client();

        let drive_auth = auth::authenticator(credential, client.clone()).await?;
        let sheets_auth = auth::authenticator(credential, client.clone()).await?;

        info!(
            "Connected to Google Drive and Sheets as {}",
            credential.client_email()
        );

        Ok(Self::new(
            Arc::new(GoogleDrive::new(client.clone(), drive_auth, &SCOPES)),
            Arc::new(GoogleSheets::new(client, sheets_auth, &SCOPES)),
        ))
    }

    /// Both handles backed by the same in-memory remote.
    pub fn in_memory(remote: Arc<InMemoryRemote>) -> Self {
        Self::new(remote.clone(), remote)
    }
}
