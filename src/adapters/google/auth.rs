use std::fmt::Debug;
use std::path::Path;

use error_stack::{report, ResultExt};
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use thiserror::Error;
use tracing::instrument;

use super::http_client::{HttpClient, HttpsConnector};

/// Permissions requested for every call: legacy spreadsheet feed, spreadsheet
/// read/write, per-file drive access and full drive access.
pub const SCOPES: [&str; 4] = [
    "https://spreadsheets.google.com/feeds",
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/drive",
];

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to read credential file")]
    FailedToReadCredential,
    #[error("Credential is not a valid service account key")]
    InvalidCredential,
    #[error("Could not create an authenticator")]
    FailedToBuildAuthenticator,
}

/// Parsed service-account key. Validated on construction, never mutated.
#[derive(Clone)]
pub struct ServiceAccountCredential {
    key: oauth2::ServiceAccountKey,
}

impl Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("client_email", &self.key.client_email)
            .field("project_id", &self.key.project_id)
            .finish()
    }
}

impl ServiceAccountCredential {
    pub fn from_value(value: serde_json::Value) -> error_stack::Result<Self, AuthError> {
        let key: oauth2::ServiceAccountKey = serde_json::from_value(value)
            .change_context(AuthError::InvalidCredential)?;

        if let Some(key_type) = key.key_type.as_deref() {
            if key_type != SERVICE_ACCOUNT_TYPE {
                return Err(report!(AuthError::InvalidCredential)).attach_printable(format!(
                    "Expected credential type '{}', found '{}'",
                    SERVICE_ACCOUNT_TYPE, key_type
                ));
            }
        }

        for (field, value) in [
            ("client_email", &key.client_email),
            ("private_key", &key.private_key),
            ("token_uri", &key.token_uri),
        ] {
            if value.trim().is_empty() {
                return Err(report!(AuthError::InvalidCredential))
                    .attach_printable(format!("Field '{}' is empty", field));
            }
        }

        Ok(Self { key })
    }

    pub fn from_json(json: &str) -> error_stack::Result<Self, AuthError> {
        let value: serde_json::Value =
            serde_json::from_str(json).change_context(AuthError::InvalidCredential)?;
        Self::from_value(value)
    }

    #[instrument]
    pub async fn from_file(path: &Path) -> error_stack::Result<Self, AuthError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .change_context(AuthError::FailedToReadCredential)
            .attach_printable_lazy(|| {
                format!("Could not read service account key at '{}'", path.display())
            })?;

        Self::from_json(&json)
            .attach_printable_lazy(|| format!("Credential file: '{}'", path.display()))
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }
}

/// Builds a service-account authenticator. The private key is loaded here, so
/// a malformed key fails before any remote call is attempted.
#[instrument(skip(client))]
pub async fn authenticator(
    credential: &ServiceAccountCredential,
    client: HttpClient,
) -> error_stack::Result<Authenticator<HttpsConnector>, AuthError> {
    oauth2::ServiceAccountAuthenticator::with_client(credential.key.clone(), client)
        .build()
        .await
        .change_context(AuthError::FailedToBuildAuthenticator)
        .attach_printable_lazy(|| {
            format!(
                "Service account '{}' could not be loaded",
                credential.client_email()
            )
        })
}
