pub mod auth;
pub mod drive_api;
pub mod http_client;
pub mod sheets_api;
pub mod value_range_factory;

pub use auth::{AuthError, ServiceAccountCredential, SCOPES};
pub use drive_api::GoogleDrive;
pub use sheets_api::GoogleSheets;
