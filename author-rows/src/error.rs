use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook write error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("invalid utf-8 csv output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected an array of paper entries, found {found}")]
    NotAnArray { found: &'static str },
}
