use std::fmt::Debug;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use error_stack::{report, ResultExt};
use thiserror::Error;
use tracing::instrument;
use zip::ZipArchive;

/// Entries are selected by this suffix, case-sensitive.
pub const CSV_EXTENSION: &str = ".csv";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("Failed to open archive")]
    FailedToOpen,
    #[error("Failed to read archive entry")]
    FailedToReadEntry,
    #[error("Failed to write extracted file")]
    FailedToWriteFile,
    #[error("Failed to remove extracted file")]
    FailedToRemoveFile,
}

/// A CSV member of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvEntry {
    /// Position in the archive's central directory.
    pub index: usize,
    /// Full name inside the archive, including directories.
    pub name: String,
    /// Base file name; used as the temp file name and the spreadsheet title.
    pub file_name: String,
}

pub fn is_csv_name(name: &str) -> bool {
    name.ends_with(CSV_EXTENSION)
}

/// Last path component of an archive entry name.
pub fn base_file_name(name: &str) -> Option<String> {
    name.rsplit(['/', '\\'])
        .next()
        .filter(|file_name| !file_name.is_empty())
        .map(str::to_string)
}

pub struct CsvArchive<R> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Debug for CsvArchive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CsvArchive {{ entries: {} }}", self.archive.len())
    }
}

impl CsvArchive<File> {
    #[instrument]
    pub fn open(path: &Path) -> error_stack::Result<Self, ArchiveError> {
        let file = File::open(path)
            .change_context(ArchiveError::FailedToOpen)
            .attach_printable_lazy(|| format!("Path: {}", path.display()))?;

        Self::from_reader(file).attach_printable_lazy(|| format!("Path: {}", path.display()))
    }
}

impl<R: Read + Seek> CsvArchive<R> {
    pub fn from_reader(reader: R) -> error_stack::Result<Self, ArchiveError> {
        let archive = ZipArchive::new(reader).change_context(ArchiveError::FailedToOpen)?;
        Ok(Self { archive })
    }

    /// CSV entries in archive order. Directories and entries without a base
    /// name are skipped.
    pub fn csv_entries(&mut self) -> error_stack::Result<Vec<CsvEntry>, ArchiveError> {
        let mut entries = Vec::new();

        for index in 0..self.archive.len() {
            let entry = self
                .archive
                .by_index(index)
                .change_context(ArchiveError::FailedToReadEntry)
                .attach_printable_lazy(|| format!("Entry index: {}", index))?;

            if !entry.is_file() || !is_csv_name(entry.name()) {
                continue;
            }

            if let Some(file_name) = base_file_name(entry.name()) {
                entries.push(CsvEntry {
                    index,
                    name: entry.name().to_string(),
                    file_name,
                });
            }
        }

        Ok(entries)
    }

    /// Writes the entry to `dir/<file_name>`, overwriting any file already there.
    /// The entry is decompressed and checksummed before the file is created, and
    /// a failed write removes what was written, so an error leaves nothing behind.
    #[instrument(skip(self))]
    pub fn extract(
        &mut self,
        entry: &CsvEntry,
        dir: &Path,
    ) -> error_stack::Result<PathBuf, ArchiveError> {
        let mut contents = Vec::new();
        self.archive
            .by_index(entry.index)
            .change_context(ArchiveError::FailedToReadEntry)?
            .read_to_end(&mut contents)
            .change_context(ArchiveError::FailedToReadEntry)
            .attach_printable_lazy(|| format!("Entry: {}", entry.name))?;

        let target = dir.join(&entry.file_name);
        if let Err(error) = std::fs::write(&target, &contents) {
            let _ = std::fs::remove_file(&target);
            return Err(report!(error))
                .change_context(ArchiveError::FailedToWriteFile)
                .attach_printable_lazy(|| format!("Path: {}", target.display()));
        }

        Ok(target)
    }
}

#[instrument]
pub fn remove_extracted(path: &Path) -> error_stack::Result<(), ArchiveError> {
    std::fs::remove_file(path)
        .change_context(ArchiveError::FailedToRemoveFile)
        .attach_printable_lazy(|| format!("Path: {}", path.display()))
}
