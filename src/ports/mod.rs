pub mod remote;

pub use remote::{DriveService, RemoteApiError, SheetsService};
