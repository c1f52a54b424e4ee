use std::io::Write;
use std::path::{Path, PathBuf};

use author_rows::{AuthorRow, Workbook};
use tempfile::NamedTempFile;

use crate::error::ClientError;

pub const NOTHING_TO_EXPORT_MESSAGE: &str = "No author records to export.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const fn filename(self) -> &'static str {
        match self {
            Self::Csv => "authors.csv",
            Self::Xlsx => "authors.xlsx",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv;charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Encodes `rows` in this format. Runs only when an export is requested.
    pub fn encode(self, rows: &[AuthorRow]) -> Result<Vec<u8>, ClientError> {
        Ok(match self {
            Self::Csv => author_rows::encode_csv(rows)?.into_bytes(),
            Self::Xlsx => author_rows::encode_workbook(rows)?,
        })
    }
}

/// Saves finished exports into a directory.
///
/// Content is first written to a temporary file next to the target and then
/// renamed into place; the temporary file never outlives the call.
#[derive(Debug, Clone)]
pub struct DownloadSink {
    dir: PathBuf,
}

impl DownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, content: &[u8], mime_type: &str, filename: &str) -> Result<PathBuf, ClientError> {
        let target = self.dir.join(filename);
        let mut transient = NamedTempFile::new_in(&self.dir)?;
        transient.write_all(content)?;
        transient.flush()?;
        transient
            .persist(&target)
            .map_err(|error| ClientError::Io(error.error.to_string()))?;

        tracing::info!(path = %target.display(), mime_type, bytes = content.len(), "saved export");
        Ok(target)
    }

    pub fn save_workbook(&self, workbook: &mut Workbook, filename: &str) -> Result<PathBuf, ClientError> {
        let bytes = workbook
            .save_to_buffer()
            .map_err(|error| ClientError::Export(error.to_string()))?;
        self.save(&bytes, ExportFormat::Xlsx.mime_type(), filename)
    }

    pub fn export(&self, format: ExportFormat, rows: &[AuthorRow]) -> Result<PathBuf, ClientError> {
        if rows.is_empty() {
            return Err(ClientError::Validation(NOTHING_TO_EXPORT_MESSAGE.to_string()));
        }

        match format {
            ExportFormat::Csv => self.save(&format.encode(rows)?, format.mime_type(), format.filename()),
            ExportFormat::Xlsx => {
                let mut workbook = author_rows::build_workbook(rows)?;
                self.save_workbook(&mut workbook, format.filename())
            }
        }
    }
}
