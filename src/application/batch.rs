use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use error_stack::ResultExt;
use indicatif::ProgressStyle;
use thiserror::Error;
use tracing::{error, info, info_span, instrument, warn, Instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::adapters::archive::{remove_extracted, CsvArchive, CsvEntry};
use crate::adapters::csv::parse_csv_file;
use crate::application::materializer::SpreadsheetMaterializer;
use crate::application::session::Session;
use crate::domain::sheets::SpreadsheetId;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to open archive")]
    FailedToOpenArchive,
    #[error("Failed to list archive entries")]
    FailedToListEntries,
}

/// Stage at which a single file failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("Failed to extract archive entry")]
    Extract,
    #[error("Failed to parse CSV")]
    Parse,
    #[error("Failed to upload spreadsheet")]
    Materialize,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub result: error_stack::Result<SpreadsheetId, FileError>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file outcomes in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Drive folder the spreadsheets are moved into.
    pub folder_id: Option<String>,
    /// Where entries are extracted before parsing.
    pub work_dir: PathBuf,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            folder_id: None,
            work_dir: std::env::temp_dir(),
        }
    }
}

/// Uploads every CSV entry of an archive, one file at a time.
/// A failing file is recorded and the batch moves on.
#[derive(Debug)]
pub struct ArchiveBatchDriver {
    materializer: SpreadsheetMaterializer,
    options: BatchOptions,
}

impl ArchiveBatchDriver {
    pub fn new(session: Session, options: BatchOptions) -> Self {
        Self {
            materializer: SpreadsheetMaterializer::new(session),
            options,
        }
    }

    pub fn list_entries(archive_path: &Path) -> error_stack::Result<Vec<CsvEntry>, BatchError> {
        CsvArchive::open(archive_path)
            .change_context(BatchError::FailedToOpenArchive)?
            .csv_entries()
            .change_context(BatchError::FailedToListEntries)
    }

    #[instrument(skip(self))]
    pub async fn run_file(
        &self,
        archive_path: &Path,
    ) -> error_stack::Result<BatchReport, BatchError> {
        let mut archive =
            CsvArchive::open(archive_path).change_context(BatchError::FailedToOpenArchive)?;
        self.run(&mut archive).await
    }

    pub async fn run<R: Read + Seek + Send>(
        &self,
        archive: &mut CsvArchive<R>,
    ) -> error_stack::Result<BatchReport, BatchError> {
        let entries = archive
            .csv_entries()
            .change_context(BatchError::FailedToListEntries)?;
        info!("Uploading {} CSV files", entries.len());

        let batch_span = info_span!("batch", files = entries.len());
        batch_span.pb_set_style(&progress_style());
        batch_span.pb_set_length(entries.len() as u64);

        let report = async {
            let mut report = BatchReport::default();
            for entry in &entries {
                let result = self
                    .process_entry(archive, entry)
                    .instrument(info_span!("file", name = %entry.file_name))
                    .await;

                match &result {
                    Ok(spreadsheet_id) => {
                        info!("✅ {}: created {}", entry.file_name, spreadsheet_id)
                    }
                    Err(error) => error!("❌ {}: {:?}", entry.file_name, error),
                }

                report.outcomes.push(FileOutcome {
                    file_name: entry.file_name.clone(),
                    result,
                });
                Span::current().pb_inc(1);
            }
            report
        }
        .instrument(batch_span)
        .await;

        Ok(report)
    }

    /// Extract, parse, upload. A failed extraction leaves no file behind; a
    /// successful one is removed whatever happens next.
    async fn process_entry<R: Read + Seek + Send>(
        &self,
        archive: &mut CsvArchive<R>,
        entry: &CsvEntry,
    ) -> error_stack::Result<SpreadsheetId, FileError> {
        let path = archive
            .extract(entry, &self.options.work_dir)
            .change_context(FileError::Extract)?;

        let result = self.upload(&path, &entry.file_name).await;

        if let Err(error) = remove_extracted(&path) {
            warn!("Could not remove temporary file: {:?}", error);
        }

        result
    }

    async fn upload(
        &self,
        path: &Path,
        title: &str,
    ) -> error_stack::Result<SpreadsheetId, FileError> {
        let dataset = parse_csv_file(path).change_context(FileError::Parse)?;

        self.materializer
            .create(self.options.folder_id.as_deref(), &dataset, title)
            .await
            .change_context(FileError::Materialize)
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{span_child_prefix}{spinner} [{bar:30}] {pos}/{len} files")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}
