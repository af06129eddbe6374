use std::sync::Arc;

use error_stack::{report, ResultExt};
use thiserror::Error;
use tracing::{info, instrument};

use csv_to_sheets::adapters::google::ServiceAccountCredential;
use csv_to_sheets::adapters::memory::InMemoryRemote;
use csv_to_sheets::application::{ArchiveBatchDriver, BatchReport, Session};

use super::args::{Mode, Settings};
use super::report::render as render_report;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to load configuration")]
    Config,
    #[error("No credential file given; pass --credentials or set CSV_TO_SHEETS_CREDENTIALS")]
    MissingCredentials,
    #[error("Failed to set up the Google session")]
    Session,
    #[error("Failed to process archive")]
    Archive,
}

/// Runs one invocation. Per-file failures end up in the printed report;
/// only setup failures are returned as errors.
#[instrument(skip(settings), fields(archive = %settings.archive.display()))]
pub async fn run(settings: Settings) -> error_stack::Result<(), CommandError> {
    let session = match &settings.mode {
        Mode::List => return list(&settings),
        Mode::DryRun => {
            info!("Dry run: nothing is sent to Google");
            Session::in_memory(Arc::new(InMemoryRemote::new()))
        }
        Mode::Upload { credentials } => {
            let path = credentials
                .as_deref()
                .ok_or_else(|| report!(CommandError::MissingCredentials))?;
            let credential = ServiceAccountCredential::from_file(path)
                .await
                .change_context(CommandError::Session)?;
            Session::connect(&credential)
                .await
                .change_context(CommandError::Session)?
        }
    };

    let driver = ArchiveBatchDriver::new(session, settings.batch.clone());
    let batch_report: BatchReport = driver
        .run_file(&settings.archive)
        .await
        .change_context(CommandError::Archive)?;

    for line in render_report(&batch_report) {
        println!("{}", line);
    }

    Ok(())
}

fn list(settings: &Settings) -> error_stack::Result<(), CommandError> {
    let entries =
        ArchiveBatchDriver::list_entries(&settings.archive).change_context(CommandError::Archive)?;

    for entry in &entries {
        println!("{}", entry.name);
    }
    println!("{} CSV files", entries.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv_to_sheets::application::BatchOptions;
    use std::io::Write;
    use std::path::PathBuf;

    fn archive(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("upload.zip");
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        zip.start_file("a.csv", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"x\n1\n").unwrap();
        zip.finish().unwrap();
        path
    }

    fn settings(archive: PathBuf, mode: Mode, work_dir: PathBuf) -> Settings {
        Settings {
            archive,
            mode,
            batch: BatchOptions {
                folder_id: None,
                work_dir,
            },
        }
    }

    #[tokio::test]
    async fn test_dry_run_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = tempfile::tempdir().unwrap();
        let path = archive(dir.path());

        run(settings(path.clone(), Mode::DryRun, work_dir.path().into()))
            .await
            .unwrap();
        run(settings(path, Mode::List, work_dir.path().into()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_without_credentials_fails() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(settings(
            archive(dir.path()),
            Mode::Upload { credentials: None },
            dir.path().into(),
        ))
        .await
        .unwrap_err();

        assert!(matches!(
            report.current_context(),
            CommandError::MissingCredentials
        ));
    }

    #[tokio::test]
    async fn test_unreadable_credential_fails_before_upload() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(settings(
            archive(dir.path()),
            Mode::Upload {
                credentials: Some(dir.path().join("missing.json")),
            },
            dir.path().into(),
        ))
        .await
        .unwrap_err();

        assert!(matches!(report.current_context(), CommandError::Session));
    }

    #[tokio::test]
    async fn test_missing_archive_fails() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(settings(
            dir.path().join("missing.zip"),
            Mode::DryRun,
            dir.path().into(),
        ))
        .await
        .unwrap_err();

        assert!(matches!(report.current_context(), CommandError::Archive));
    }
}
