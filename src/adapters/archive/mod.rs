pub mod zip_archive;

pub use zip_archive::{remove_extracted, ArchiveError, CsvArchive, CsvEntry};
