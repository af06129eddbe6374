pub mod batch;
pub mod materializer;
pub mod session;

pub use batch::{ArchiveBatchDriver, BatchError, BatchOptions, BatchReport, FileError, FileOutcome};
pub use materializer::{MaterializeError, SpreadsheetMaterializer};
pub use session::Session;
